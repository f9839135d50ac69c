use crate::bucket::bucket_for;
use crate::errors::RolloutError;
use crate::identifier::IdentifierGenerator;
use crate::metrics_defs::{
    FEATURE_EVALUATIONS, IDENTIFIER_GENERATED, IDENTIFIER_MISSING, REQUEST_DURATION,
};
use crate::provider::{FeatureProvider, TargetingContext};
use crate::{counter, histogram};
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

pub const EMAIL_ROUTE: &str = "/api/BetaFeatureFunction";
pub const ACCESS_ROUTE: &str = "/api/BetaFeatureAccess";

const MISSING_EMAIL_MESSAGE: &str = "Please provide 'email' as query parameter.";

#[derive(Clone)]
pub struct AppState {
    pub feature: Arc<str>,
    pub provider: Arc<dyn FeatureProvider>,
    pub identifiers: Arc<dyn IdentifierGenerator>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(EMAIL_ROUTE, get(email_handler))
        .route(ACCESS_ROUTE, get(access_handler))
        .with_state(state)
}

/// Health and readiness probes, served on the admin listener.
pub fn admin_router() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok\n" }))
        .route("/ready", get(|| async { "ok\n" }))
}

#[derive(Deserialize, Debug)]
struct EmailParams {
    email: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct AccessParams {
    user_id: Option<String>,
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccessResponse {
    pub user_id: String,
    pub has_access: bool,
    pub bucket: u8,
    pub message: String,
}

impl IntoResponse for AccessResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

fn access_message(identifier: &str, feature: &str, enabled: bool) -> String {
    if enabled {
        format!("✅ {identifier} has access to {feature}.")
    } else {
        format!("🚫 {identifier} does NOT have access to {feature}.")
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

async fn decide(state: &AppState, identifier: &str) -> Result<(u8, bool), RolloutError> {
    let bucket = bucket_for(identifier);
    tracing::info!(
        user_id = %identifier.to_lowercase(),
        bucket,
        "User falls into percentage bucket"
    );

    let context = TargetingContext::new(identifier);
    let enabled = state.provider.is_enabled(&state.feature, &context).await?;

    counter!(
        FEATURE_EVALUATIONS,
        "feature" => state.feature.to_string(),
        "enabled" => enabled.to_string(),
    )
    .increment(1);

    Ok((bucket, enabled))
}

fn record_duration(endpoint: &'static str, start: Instant, status: StatusCode) {
    histogram!(
        REQUEST_DURATION,
        "endpoint" => endpoint,
        "status" => status.as_u16().to_string(),
    )
    .record(start.elapsed().as_secs_f64());
}

async fn email_handler(
    State(state): State<AppState>,
    Query(params): Query<EmailParams>,
) -> Result<Response, RolloutError> {
    let start = Instant::now();
    let result = email_response(&state, params).await;

    let status = match &result {
        Ok(response) => response.status(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    record_duration("email", start, status);
    result
}

async fn email_response(state: &AppState, params: EmailParams) -> Result<Response, RolloutError> {
    let Some(email) = non_blank(params.email) else {
        counter!(IDENTIFIER_MISSING, "endpoint" => "email").increment(1);
        return Ok((StatusCode::BAD_REQUEST, MISSING_EMAIL_MESSAGE).into_response());
    };

    let (_, enabled) = decide(state, &email).await?;
    let message = access_message(&email, &state.feature, enabled);
    Ok((StatusCode::OK, message).into_response())
}

async fn access_handler(
    State(state): State<AppState>,
    Query(params): Query<AccessParams>,
) -> Result<AccessResponse, RolloutError> {
    let start = Instant::now();
    let result = access_response(&state, params).await;

    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    record_duration("access", start, status);
    result
}

async fn access_response(
    state: &AppState,
    params: AccessParams,
) -> Result<AccessResponse, RolloutError> {
    let user_id = match non_blank(params.user_id) {
        Some(user_id) => user_id,
        None => {
            counter!(IDENTIFIER_MISSING, "endpoint" => "access").increment(1);
            let generated = state.identifiers.generate()?;
            counter!(IDENTIFIER_GENERATED).increment(1);
            tracing::debug!(user_id = %generated, "Generated identifier for anonymous request");
            generated
        }
    };

    let (bucket, has_access) = decide(state, &user_id).await?;
    let message = access_message(&user_id, &state.feature, has_access);
    Ok(AccessResponse {
        user_id,
        has_access,
        bucket,
        message,
    })
}
