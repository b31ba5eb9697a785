// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! INSEE Geo Finder: search French territories and map their boundaries
//!
//! This crate resolves communes, intercommunalities, departments, regions
//! and employment zones against the INSEE catalog, fetches their boundary
//! from a chain of public sources and serves map, indicators and chat
//! over HTTP.

pub mod config;
pub mod error;
pub mod html;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use models::{IndicatorSet, Territory, TerritoryKind};
use services::boundary::BoundaryCache;
use services::{
    BoundaryResolver, BoundarySource, CatalogService, ChatService, IndicatorsService,
    MemoryCache, SessionStore, SharedCache, SireneService,
};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub catalog_service: CatalogService,
    pub boundary_resolver: BoundaryResolver,
    pub indicators_service: IndicatorsService,
    pub chat_service: ChatService,
    pub sirene_service: SireneService,
    pub sessions: SessionStore,
    caches: Caches,
}

/// Handles kept so every cache can be cleared at once.
struct Caches {
    catalog: SharedCache<TerritoryKind, Arc<Vec<Territory>>>,
    boundaries: BoundaryCache,
    indicators: SharedCache<(TerritoryKind, String), IndicatorSet>,
}

impl AppState {
    /// Wire all services with fresh in-memory caches.
    pub fn new(config: Config) -> Self {
        let capacity = config.cache_capacity;
        let catalog_cache = MemoryCache::shared(capacity);
        let boundary_cache = MemoryCache::shared(capacity);
        let indicator_cache = MemoryCache::shared(capacity);

        let caches = Caches {
            catalog: catalog_cache.clone(),
            boundaries: boundary_cache.clone(),
            indicators: indicator_cache.clone(),
        };

        Self {
            catalog_service: CatalogService::new(&config, catalog_cache),
            boundary_resolver: BoundaryResolver::from_config(&config, boundary_cache),
            indicators_service: IndicatorsService::new(&config, indicator_cache),
            chat_service: ChatService::new(&config),
            sirene_service: SireneService::new(&config),
            sessions: SessionStore::new(config.max_sessions),
            config,
            caches,
        }
    }

    /// Replace the boundary source chain, keeping the shared boundary cache.
    pub fn with_boundary_sources(mut self, sources: Vec<Arc<dyn BoundarySource>>) -> Self {
        self.boundary_resolver = BoundaryResolver::new(sources, self.caches.boundaries.clone());
        self
    }

    /// Drop every cached catalog, boundary and indicator set.
    pub fn clear_caches(&self) {
        self.caches.catalog.clear();
        self.caches.boundaries.clear();
        self.caches.indicators.clear();
        tracing::info!("All caches cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;
    use models::{Boundary, BoundaryGeometry};

    #[test]
    fn test_clear_caches_empties_every_cache() {
        let state = AppState::new(Config::test_default());
        let vernon = Territory::new(TerritoryKind::Commune, "27701", "Vernon");
        let boundary = Boundary {
            code: "27701".to_string(),
            kind: TerritoryKind::Commune,
            source: "geo-api",
            geometry: BoundaryGeometry::Polygon(geo::polygon![
                (x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 0.0)
            ]),
            properties: Default::default(),
        };

        state
            .caches
            .catalog
            .insert(TerritoryKind::Commune, Arc::new(vec![vernon]));
        state.caches.boundaries.insert(
            (TerritoryKind::Commune, "27701".to_string()),
            Arc::new(boundary),
        );
        state.caches.indicators.insert(
            (TerritoryKind::Commune, "27701".to_string()),
            IndicatorSet::default(),
        );

        state.clear_caches();

        assert!(state.caches.catalog.is_empty());
        assert!(state.caches.boundaries.is_empty());
        assert!(state.caches.indicators.is_empty());
    }
}
