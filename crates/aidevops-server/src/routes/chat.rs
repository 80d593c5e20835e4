use crate::state::AppState;
use aidevops::{assistant::Assistant, prompt::ContextItem, providers::factory};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize, Serialize)]
struct ChatRequest {
    prompt: String,
    #[serde(default)]
    extra_context: Option<Vec<ContextItem>>,
}

#[derive(Debug, Deserialize, Serialize)]
struct ChatResponse {
    /// The model's message object exactly as the provider returned it
    response: Value,
}

#[derive(Debug, Deserialize, Serialize)]
struct ErrorResponse {
    detail: String,
}

/// Any failure while answering a chat request, reported to the caller as a 400
struct ChatError(anyhow::Error);

impl<E: Into<anyhow::Error>> From<E> for ChatError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        tracing::error!("Chat request failed: {:#}", self.0);
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                detail: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

async fn handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ChatError> {
    let provider = factory::get_provider(state.provider_config)?;
    let assistant = Assistant::new(provider, state.gatherer, state.system_prompt);

    let extra_context = request.extra_context.unwrap_or_default();
    let completion = assistant.reply(&request.prompt, &extra_context).await?;

    Ok(Json(ChatResponse {
        response: completion.raw,
    }))
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(handler))
        .with_state(state)
}
