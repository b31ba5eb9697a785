// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Boundary resolution over an ordered chain of sources.
//!
//! Sources are tried in order and the first one that yields a non-empty
//! boundary wins. A source answering "nothing here" and a source that fails
//! are both skipped, but only failures are logged at warn level.

mod geo_api;
mod nominatim;
mod static_dataset;

pub use geo_api::GeoApiSource;
pub use nominatim::{nominatim_query, NominatimSource};
pub use static_dataset::StaticDatasetSource;

use crate::config::Config;
use crate::models::{Boundary, TerritoryKind};
use crate::services::cache::SharedCache;
use crate::services::upstream::SourceError;
use futures_util::future::BoxFuture;
use std::sync::Arc;

/// What to resolve: the official code plus the display name for text search.
#[derive(Debug, Clone)]
pub struct BoundaryRequest {
    pub code: String,
    pub kind: TerritoryKind,
    pub name: String,
}

impl BoundaryRequest {
    pub fn new(kind: TerritoryKind, code: &str, name: impl Into<String>) -> Self {
        Self {
            code: kind.pad_code(code),
            kind,
            name: name.into(),
        }
    }
}

/// One strategy for obtaining a boundary.
pub trait BoundarySource: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Ok(None)` means the source has nothing for this request.
    fn attempt<'a>(
        &'a self,
        request: &'a BoundaryRequest,
    ) -> BoxFuture<'a, Result<Option<Boundary>, SourceError>>;
}

pub type BoundaryCache = SharedCache<(TerritoryKind, String), Arc<Boundary>>;

/// Resolves boundaries by trying each source in priority order.
#[derive(Clone)]
pub struct BoundaryResolver {
    sources: Vec<Arc<dyn BoundarySource>>,
    cache: BoundaryCache,
}

impl BoundaryResolver {
    pub fn new(sources: Vec<Arc<dyn BoundarySource>>, cache: BoundaryCache) -> Self {
        Self { sources, cache }
    }

    /// Default chain: geo.api.gouv.fr, then Nominatim, then the static dataset.
    pub fn from_config(config: &Config, cache: BoundaryCache) -> Self {
        let sources: Vec<Arc<dyn BoundarySource>> = vec![
            Arc::new(GeoApiSource::new(config)),
            Arc::new(NominatimSource::new(config)),
            Arc::new(StaticDatasetSource::new(config)),
        ];
        Self::new(sources, cache)
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Resolve a boundary, or `None` if no source has one.
    pub async fn resolve(&self, request: &BoundaryRequest) -> Option<Arc<Boundary>> {
        let key = (request.kind, request.code.clone());
        if let Some(cached) = self.cache.get(&key) {
            return Some(cached);
        }

        for source in &self.sources {
            match source.attempt(request).await {
                Ok(Some(boundary)) => {
                    tracing::info!(
                        code = %request.code,
                        kind = %request.kind,
                        source = source.name(),
                        "Boundary resolved"
                    );
                    let boundary = Arc::new(boundary);
                    self.cache.insert(key, boundary.clone());
                    return Some(boundary);
                }
                Ok(None) => {
                    tracing::debug!(
                        code = %request.code,
                        source = source.name(),
                        "Source has no boundary, trying next"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        code = %request.code,
                        source = source.name(),
                        error = %e,
                        "Boundary source failed, trying next"
                    );
                }
            }
        }

        tracing::info!(code = %request.code, kind = %request.kind, "No boundary found");
        None
    }

    pub fn invalidate(&self, kind: TerritoryKind, code: &str) {
        self.cache.invalidate(&(kind, kind.pad_code(code)));
    }
}
