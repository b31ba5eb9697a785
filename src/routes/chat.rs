// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Chat about the selected territory.

use crate::error::{AppError, Result};
use crate::middleware::SessionId;
use crate::models::{ChatRole, ChatTurn};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::State,
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/chat", get(get_transcript).post(ask))
}

#[derive(Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1, max = 2000))]
    pub question: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TurnResponse {
    pub role: ChatRole,
    pub text: String,
    pub at: String,
}

impl From<ChatTurn> for TurnResponse {
    fn from(turn: ChatTurn) -> Self {
        Self {
            role: turn.role,
            text: turn.text,
            at: format_utc_rfc3339(turn.at),
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TranscriptResponse {
    /// Code of the territory the conversation is about
    pub territory: Option<String>,
    pub transcript: Vec<TurnResponse>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ChatResponse {
    pub answer: String,
    pub transcript: Vec<TurnResponse>,
}

fn to_responses(turns: Vec<ChatTurn>) -> Vec<TurnResponse> {
    turns.into_iter().map(TurnResponse::from).collect()
}

async fn get_transcript(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionId>,
) -> Json<TranscriptResponse> {
    Json(TranscriptResponse {
        territory: state.sessions.selection(&session.0).map(|s| s.code),
        transcript: to_responses(state.sessions.transcript(&session.0)),
    })
}

/// Ask a question about the selected territory.
///
/// Model failures come back as the answer text, never as an HTTP error.
async fn ask(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionId>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    if body.question.trim().is_empty() {
        return Err(AppError::BadRequest("Question vide".to_string()));
    }

    let selection = state.sessions.selection(&session.0).ok_or_else(|| {
        AppError::BadRequest("Sélectionnez d'abord un territoire".to_string())
    })?;

    let indicators = state
        .indicators_service
        .fetch(selection.kind, &selection.code)
        .await;
    let history = state.sessions.transcript(&session.0);

    let answer = state
        .chat_service
        .ask(&body.question, &selection.title, &indicators, &history)
        .await;

    let recorded = state.sessions.append_turns(
        &session.0,
        &selection,
        vec![
            ChatTurn::user(body.question.trim()),
            ChatTurn::assistant(answer.clone()),
        ],
    );
    if !recorded {
        tracing::info!(code = %selection.code, "Territory changed during chat, answer dropped");
    }

    Ok(Json(ChatResponse {
        answer,
        transcript: to_responses(state.sessions.transcript(&session.0)),
    }))
}
