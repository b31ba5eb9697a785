// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Catalog search by title or code.

use crate::models::Territory;

/// Lowercase and strip diacritics ("Évreux" -> "evreux").
pub fn fold_key(s: &str) -> String {
    deunicode::deunicode(s).to_lowercase()
}

/// Filter a catalog by a free-text query.
///
/// Every whitespace-separated word must appear in the folded title or,
/// verbatim, in the code. Results keep catalog order and are capped at
/// `limit`. A blank query returns nothing.
pub fn search(catalog: &[Territory], query: &str, limit: usize) -> Vec<Territory> {
    let words: Vec<&str> = query.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }
    let folded_words: Vec<String> = words.iter().map(|w| fold_key(w)).collect();

    catalog
        .iter()
        .filter(|t| {
            let title = fold_key(&t.title);
            words
                .iter()
                .zip(&folded_words)
                .all(|(raw, folded)| title.contains(folded.as_str()) || t.code.contains(raw))
        })
        .take(limit)
        .cloned()
        .collect()
}
