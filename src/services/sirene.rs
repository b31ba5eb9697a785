// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SIRENE legal-unit lookup for local authorities ("Mairie de Toulouse").

use crate::config::Config;
use crate::error::AppError;
use crate::services::upstream::{fetch_json, http_client, SourceError};
use serde::Deserialize;
use serde_json::Value;

const UPSTREAM: &str = "insee-sirene";
const SIRENE_PATH: &str = "api-sirene/3.11";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "unitesLegales", default)]
    unites_legales: Vec<LegalUnit>,
}

#[derive(Debug, Deserialize)]
struct LegalUnit {
    siren: String,
}

/// Build the SIRENE search query; the `:` separator must stay unescaped.
pub fn sirene_query(name: &str) -> String {
    format!("raisonSociale:{}", urlencoding::encode(name.trim()))
}

#[derive(Clone)]
pub struct SireneService {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl SireneService {
    pub fn new(config: &Config) -> Self {
        Self {
            http: http_client(config.timeouts.metadata),
            base_url: format!("{}/{}", config.insee_base_url, SIRENE_PATH),
            api_key: config.insee_api_key.clone(),
        }
    }

    /// Find the first legal unit matching `name` and return its full record.
    pub async fn find(&self, name: &str) -> Result<Option<Value>, AppError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(AppError::MissingCredential("INSEE_API_KEY"))?;

        // Built by hand so reqwest doesn't percent-encode the ':'.
        let search_url = format!(
            "{}/siren?q={}&nombre=1",
            self.base_url,
            sirene_query(name)
        );
        tracing::info!(name = %name, "Searching SIRENE");

        let search: Option<SearchResponse> = fetch_json(self.authed(&search_url, api_key), UPSTREAM)
            .await
            .map_err(upstream_error)?;

        let Some(siren) = search
            .and_then(|s| s.unites_legales.into_iter().next())
            .map(|u| u.siren)
        else {
            return Ok(None);
        };

        tracing::info!(siren = %siren, "SIREN found, fetching legal unit");
        let dossier_url = format!("{}/siren/{}", self.base_url, urlencoding::encode(&siren));
        fetch_json(self.authed(&dossier_url, api_key), UPSTREAM)
            .await
            .map_err(upstream_error)
    }

    fn authed(&self, url: &str, api_key: &str) -> reqwest::RequestBuilder {
        self.http
            .get(url)
            .bearer_auth(api_key)
            .header(reqwest::header::ACCEPT, "application/json")
    }
}

fn upstream_error(e: SourceError) -> AppError {
    AppError::Upstream(e.to_string())
}
