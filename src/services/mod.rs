// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod boundary;
pub mod cache;
pub mod catalog;
pub mod chat;
pub mod indicators;
pub mod render;
pub mod search;
pub mod session;
pub mod sirene;
pub mod upstream;

pub use boundary::{BoundaryRequest, BoundaryResolver, BoundarySource};
pub use cache::{KeyedCache, MemoryCache, SharedCache};
pub use catalog::CatalogService;
pub use chat::ChatService;
pub use indicators::IndicatorsService;
pub use render::MapView;
pub use session::{SessionStore, Selection};
pub use sirene::SireneService;
pub use upstream::SourceError;
