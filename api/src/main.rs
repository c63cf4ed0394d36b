mod config;
mod handlers;

use std::sync::Arc;

use axum::{routing::get, Router};
use config::Settings;
use handlers::{calculate, AppState};

#[tokio::main]
async fn main() {
  let settings = Settings::from_env();
  let addr = settings.http_addr.clone();
  let state = Arc::new(AppState::new(settings));

  let app = Router::new().route("/api/calculate", get(calculate)).with_state(state);

  println!("listening on {addr}");
  let listener = tokio::net::TcpListener::bind(&addr).await.expect("failed to bind HTTP address");
  axum::serve(listener, app).await.expect("server error");
}
