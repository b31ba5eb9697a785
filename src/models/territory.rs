// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Territory model and kind-dependent code handling.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Kind of French territory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum TerritoryKind {
    Commune,
    Intercommunality,
    Department,
    Region,
    StudyZoning,
}

impl TerritoryKind {
    pub const ALL: [TerritoryKind; 5] = [
        TerritoryKind::Commune,
        TerritoryKind::Intercommunality,
        TerritoryKind::Department,
        TerritoryKind::Region,
        TerritoryKind::StudyZoning,
    ];

    /// Path segment under `metadonnees/geo/` listing this kind.
    pub fn metadata_endpoint(self) -> &'static str {
        match self {
            TerritoryKind::Commune => "communes",
            TerritoryKind::Intercommunality => "intercommunalites",
            TerritoryKind::Department => "departements",
            TerritoryKind::Region => "regions",
            TerritoryKind::StudyZoning => "zonesDEmploi2020",
        }
    }

    /// Width official codes are zero-padded to.
    pub fn code_width(self) -> usize {
        match self {
            TerritoryKind::Commune => 5,
            TerritoryKind::Intercommunality => 9,
            TerritoryKind::Department | TerritoryKind::Region => 2,
            TerritoryKind::StudyZoning => 4,
        }
    }

    /// Prefix used in insee.fr dossier links and local-data geography levels.
    pub fn insee_prefix(self) -> &'static str {
        match self {
            TerritoryKind::Commune => "COM",
            TerritoryKind::Intercommunality => "EPCI",
            TerritoryKind::Department => "DEP",
            TerritoryKind::Region => "REG",
            TerritoryKind::StudyZoning => "ZE2020",
        }
    }

    /// geo.api.gouv.fr collection, if the API serves this kind.
    pub fn geo_api_collection(self) -> Option<&'static str> {
        match self {
            TerritoryKind::Commune => Some("communes"),
            TerritoryKind::Intercommunality => Some("epcis"),
            TerritoryKind::Department => Some("departements"),
            TerritoryKind::Region => Some("regions"),
            TerritoryKind::StudyZoning => None,
        }
    }

    /// Default map zoom; wider for large territories.
    pub fn default_zoom(self) -> u8 {
        match self {
            TerritoryKind::Commune => 12,
            TerritoryKind::Intercommunality => 10,
            TerritoryKind::StudyZoning => 9,
            TerritoryKind::Department => 8,
            TerritoryKind::Region => 7,
        }
    }

    /// Human-readable label for the kind selector.
    pub fn label(self) -> &'static str {
        match self {
            TerritoryKind::Commune => "Communes",
            TerritoryKind::Intercommunality => "EPCI (Intercommunalités)",
            TerritoryKind::Department => "Départements",
            TerritoryKind::Region => "Régions",
            TerritoryKind::StudyZoning => "Zones d'emploi",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TerritoryKind::Commune => "commune",
            TerritoryKind::Intercommunality => "intercommunality",
            TerritoryKind::Department => "department",
            TerritoryKind::Region => "region",
            TerritoryKind::StudyZoning => "study-zoning",
        }
    }

    /// Zero-pad a code to this kind's width.
    ///
    /// Codes that are already wide enough, or that contain non-digits
    /// (Corsica's `2A`/`2B`), are returned trimmed but otherwise unchanged,
    /// so padding is idempotent.
    pub fn pad_code(self, raw: &str) -> String {
        let code = raw.trim();
        let width = self.code_width();
        if code.len() >= width || !code.chars().all(|c| c.is_ascii_digit()) {
            return code.to_string();
        }
        format!("{:0>width$}", code, width = width)
    }
}

impl fmt::Display for TerritoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TerritoryKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "commune" | "communes" => Ok(TerritoryKind::Commune),
            "intercommunality" | "epci" | "intercommunalites" => {
                Ok(TerritoryKind::Intercommunality)
            }
            "department" | "departements" => Ok(TerritoryKind::Department),
            "region" | "regions" => Ok(TerritoryKind::Region),
            "study-zoning" | "zone-emploi" => Ok(TerritoryKind::StudyZoning),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown territory kind: {0}")]
pub struct UnknownKind(pub String);

/// A territory from the INSEE catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Territory {
    /// Official code, padded to the kind width
    pub code: String,
    /// Display title (e.g. "Vernon")
    pub title: String,
    pub kind: TerritoryKind,
}

impl Territory {
    pub fn new(kind: TerritoryKind, code: &str, title: impl Into<String>) -> Self {
        Self {
            code: kind.pad_code(code),
            title: title.into(),
            kind,
        }
    }

    /// "Title (code)" as shown in the result picker.
    pub fn display(&self) -> String {
        format!("{} ({})", self.title, self.code)
    }

    /// Link to the statistical dossier on insee.fr.
    pub fn dossier_url(&self) -> String {
        format!(
            "https://www.insee.fr/fr/statistiques/2011101?geo={}-{}",
            self.kind.insee_prefix(),
            self.code
        )
    }
}
