//! Email subscription endpoint
//!
//! Shared by every site: the host router never rewrites `/api/*`, so the
//! tenant is carried in the request body instead.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::ApiResult,
    notify::dispatch_welcome,
    state::AppState,
    subscribers::SubscribeOutcome,
};

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub site: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub success: bool,
    pub message: String,
}

/// Subscribe an email address to a site
///
/// POST /api/subscribe
pub async fn subscribe(
    State(state): State<AppState>,
    payload: Result<Json<SubscribeRequest>, JsonRejection>,
) -> ApiResult<Json<SubscribeResponse>> {
    let Json(req) = payload?;
    let email = req.email.unwrap_or_default();
    let site = req.site.unwrap_or_default();

    let message = match state.store.subscribe(&email, &site).await? {
        SubscribeOutcome::Subscribed(subscriber) => {
            // Fire and forget: the response never waits on the transport
            dispatch_welcome(
                state.notifier.clone(),
                subscriber.email,
                subscriber.site,
                state.config.public_url.clone(),
            );
            "Subscribed successfully"
        }
        SubscribeOutcome::AlreadySubscribed => "Already subscribed",
    };

    Ok(Json(SubscribeResponse {
        success: true,
        message: message.to_string(),
    }))
}
