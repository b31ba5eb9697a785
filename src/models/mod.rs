// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod boundary;
pub mod chat;
pub mod indicators;
pub mod territory;

pub use boundary::{Boundary, BoundaryGeometry};
pub use chat::{ChatRole, ChatTurn};
pub use indicators::IndicatorSet;
pub use territory::{Territory, TerritoryKind};
