use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use rg_core::{Error, RSS_CONTENT_TYPE};
use rg_scrapers::{JobOutcome, ScrapeContext};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, warn};

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SourceInfo {
    pub key: String,
    pub title: String,
    pub link: String,
    pub description: String,
    pub path: String,
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn list_feeds(State(state): State<Arc<AppState>>) -> Json<Vec<SourceInfo>> {
    let sources = state
        .manager
        .scrapers()
        .iter()
        .map(|s| {
            let d = s.descriptor();
            SourceInfo {
                key: d.key.clone(),
                title: d.title.clone(),
                link: d.link.clone(),
                description: d.description.clone(),
                path: format!("/feeds/{}", d.key),
            }
        })
        .collect();
    Json(sources)
}

pub async fn get_feed(State(state): State<Arc<AppState>>, Path(key): Path<String>) -> Response {
    let scraper = match state.manager.get_scraper(&key) {
        Ok(scraper) => scraper,
        Err(e) => return error_response(e),
    };

    let ctx = ScrapeContext::with_timeout(state.request_timeout);
    match scraper.scrape(&ctx, false).await {
        Ok(xml) => ([(header::CONTENT_TYPE, RSS_CONTENT_TYPE)], xml).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn job_status(State(state): State<Arc<AppState>>) -> Json<BTreeMap<String, JobOutcome>> {
    match &state.status {
        Some(board) => Json(board.snapshot().await),
        None => Json(BTreeMap::new()),
    }
}

fn error_response(err: Error) -> Response {
    match err {
        Error::UnknownSource(key) => {
            warn!(source = %key, "Request for unknown source");
            (StatusCode::NOT_FOUND, format!("unknown source: {}", key)).into_response()
        }
        other => {
            error!(error = %other, "Feed request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()).into_response()
        }
    }
}
