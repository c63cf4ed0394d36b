use std::sync::Arc;

use axum::{
  extract::{Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use broker::{Broker, InMemoryBroker, InMemoryResultBackend, ResultBackend};
use coordinator::Coordinator;
use diagnostic::{diagnostic::Diagnostic, error_kind::ErrorKind, DiagnosticEngine, HttpError};
use serde::{Deserialize, Serialize};
use telemetry::Telemetry;

use crate::config::Settings;

pub struct AppState {
  pub settings: Settings,
  pub broker: Arc<dyn Broker>,
  pub backend: Arc<dyn ResultBackend>,
}

impl AppState {
  pub fn new(settings: Settings) -> Self {
    let backend = Arc::new(InMemoryResultBackend::default());
    let broker = Arc::new(InMemoryBroker::new(backend.clone()));
    Self { settings, broker, backend }
  }
}

#[derive(Debug, Deserialize)]
pub struct CalculateQuery {
  pub expression: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CalculateResponse {
  pub result: f64,
  pub workflow: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
  pub detail: String,
}

pub async fn calculate(State(state): State<Arc<AppState>>, Query(query): Query<CalculateQuery>) -> Response {
  let Some(expression) = query.expression else {
    return (
      StatusCode::UNPROCESSABLE_ENTITY,
      Json(ErrorResponse {
        detail: "query parameter `expression` is required".to_string(),
      }),
    )
      .into_response();
  };

  match run(&state, &expression).await {
    Ok(response) => (StatusCode::OK, Json(response)).into_response(),
    Err(diagnostic) => diagnostic_response(&diagnostic),
  }
}

async fn run(state: &AppState, expression: &str) -> Result<CalculateResponse, Diagnostic> {
  let mut engine = DiagnosticEngine::new();
  let tree = match parser::parse(expression, &mut engine) {
    Some(tree) => tree,
    None => return Err(engine.first().cloned().unwrap_or_else(|| Diagnostic::from_kind(ErrorKind::SyntaxMalformed))),
  };

  let ir = compiler::compile(&tree);
  let workflow = compiler::render::render(&ir);

  let coordinator = Coordinator::new(state.broker.clone(), state.backend.clone())
    .with_deadline(state.settings.request_deadline)
    .with_telemetry(Telemetry::new(telemetry::StdoutSink));

  let result = coordinator.execute(&ir).await?;
  Ok(CalculateResponse { result, workflow })
}

fn diagnostic_response(diagnostic: &Diagnostic) -> Response {
  let http_error: HttpError = diagnostic.into();
  let status = StatusCode::from_u16(http_error.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
  (status, Json(ErrorResponse { detail: http_error.detail })).into_response()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn state() -> AppState {
    AppState::new(Settings {
      broker_url: None,
      result_backend_url: None,
      request_deadline: std::time::Duration::from_millis(3000),
      http_addr: "127.0.0.1:0".to_string(),
    })
  }

  #[tokio::test]
  async fn a_valid_expression_returns_its_result_and_rendered_workflow() {
    let response = run(&state(), "(2 + 3) * 4").await.unwrap();
    assert_eq!(response.result, 20.0);
    assert_eq!(response.workflow, "add(2, 3) -> mul(y=4)");
  }

  #[tokio::test]
  async fn division_by_zero_surfaces_as_a_400_level_diagnostic() {
    let err = run(&state(), "1 / 0").await.unwrap_err();
    let http_error: HttpError = (&err).into();
    assert_eq!(http_error.status, 400);
  }

  #[tokio::test]
  async fn an_empty_expression_is_rejected_before_compiling() {
    let err = run(&state(), "").await.unwrap_err();
    assert_eq!(err.kind.code(), "SYNTAX_EMPTY");
  }
}
