// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Chat assistant backed by a generative language model.
//!
//! Answers are always a string: missing credentials and request failures
//! come back as a literal error message shown in the chat.

use crate::config::Config;
use crate::models::{ChatRole, ChatTurn, IndicatorSet};
use crate::services::upstream::{fetch_json, http_client, SourceError};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

const UPSTREAM: &str = "llm";
const API_KEY_HEADER: &str = "x-goog-api-key";

pub const MISSING_KEY_MESSAGE: &str = "Erreur : clé API du modèle de langage manquante.";

const INSTRUCTIONS: &str = "Tu es un assistant spécialisé dans l'analyse des territoires français. \
Réponds en français, de manière concise, en t'appuyant sur les indicateurs fournis. \
Si une information n'est pas disponible dans ces données, dis-le clairement.";

/// Format an indicator value without a trailing ".0" for whole numbers.
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

/// Build the full prompt sent to the model.
pub fn build_prompt(
    question: &str,
    territory_name: &str,
    indicators: &IndicatorSet,
    history: &[ChatTurn],
) -> String {
    let mut prompt = String::new();
    let _ = writeln!(prompt, "{}\n", INSTRUCTIONS);
    let _ = writeln!(prompt, "Territoire : {}", territory_name);

    prompt.push_str("Indicateurs :\n");
    if indicators.is_empty() {
        prompt.push_str("- aucun indicateur disponible\n");
    }
    for (name, value) in indicators.iter() {
        let _ = writeln!(prompt, "- {}: {}", name, format_value(value));
    }

    if !history.is_empty() {
        prompt.push_str("\nHistorique de la conversation :\n");
        for turn in history {
            let speaker = match turn.role {
                ChatRole::User => "Utilisateur",
                ChatRole::Assistant => "Assistant",
            };
            let _ = writeln!(prompt, "{} : {}", speaker, turn.text);
        }
    }

    let _ = write!(prompt, "\nQuestion : {}", question.trim());
    prompt
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .find_map(|p| p.text)
    }
}

#[derive(Clone)]
pub struct ChatService {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl ChatService {
    pub fn new(config: &Config) -> Self {
        Self {
            http: http_client(config.timeouts.llm),
            base_url: config.llm_base_url.clone(),
            api_key: config.llm_api_key.clone(),
            model: config.llm_model.clone(),
        }
    }

    /// Ask the model a question about a territory.
    pub async fn ask(
        &self,
        question: &str,
        territory_name: &str,
        indicators: &IndicatorSet,
        history: &[ChatTurn],
    ) -> String {
        let Some(api_key) = self.api_key.as_deref() else {
            return MISSING_KEY_MESSAGE.to_string();
        };

        let prompt = build_prompt(question, territory_name, indicators, history);
        match self.generate(&prompt, api_key).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "Chat request failed");
                format!("Erreur lors de l'appel au modèle : {}", e)
            }
        }
    }

    async fn generate(&self, prompt: &str, api_key: &str) -> Result<String, SourceError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url,
            urlencoding::encode(&self.model)
        );
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
        };
        let request = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .json(&body);

        let response: GenerateResponse = fetch_json(request, UPSTREAM)
            .await?
            .ok_or_else(|| SourceError::malformed(UPSTREAM, "empty response"))?;

        response
            .first_text()
            .ok_or_else(|| SourceError::malformed(UPSTREAM, "no candidate text"))
    }
}
