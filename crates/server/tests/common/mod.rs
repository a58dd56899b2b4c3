//! # Common Test Utilities
//!
//! `TestApp` spawns the real server on a random port with its AI provider
//! pointed at an `httpmock::MockServer`, so tests exercise the full HTTP path
//! from multipart upload to chat-completion request.

// Not every test file uses every helper.
#![allow(unused)]

use anyhow::Result;
use axum::serve;
use glr_server::{
    config, router,
    state::{build_app_state, AppState},
};
use httpmock::prelude::*;
use httpmock::Mock;
use reqwest::{multipart, Client};
use serde_json::{json, Value};
use std::{fs::File, io::Write, net::SocketAddr};
use tempfile::{tempdir, TempDir};
use tokio::{net::TcpListener, task::JoinHandle};

pub const CHAT_PATH: &str = "/v1/chat/completions";

/// A harness for end-to-end testing of the Axum server.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mock_server: MockServer,
    pub app_state: AppState,
    _config_dir: TempDir,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    /// Spawns the application server with an API key configured.
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with_key(Some("test-key")).await
    }

    pub async fn spawn_with_key(api_key: Option<&str>) -> Result<Self> {
        dotenvy::dotenv().ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let mock_server = MockServer::start();
        let config_dir = tempdir()?;
        let config_path = config_dir.path().join("config.yml");
        let api_key = api_key.map_or("null".to_string(), |key| format!("\"{key}\""));
        let config_content = format!(
            r#"
port: 0
provider:
  api_url: "{}"
  api_key: {api_key}
  model_name: "mock-chat-model"
  timeout_secs: 5
extraction:
  voting_rounds: 3
  missing_value: "N/A"
  preview_chars: 64
max_upload_bytes: 1048576
"#,
            mock_server.url(CHAT_PATH),
        );
        File::create(&config_path)?.write_all(config_content.as_bytes())?;

        let mut config = config::get_config(config_path.to_str())?;
        if config.provider.api_key.as_deref() != Some("test-key") {
            // OPENROUTER_API_KEY from a developer's .env must not leak into keyless tests.
            config.provider.api_key = None;
        }
        let app_state = build_app_state(config)?;
        let app_state_for_harness = app_state.clone();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = router::create_router(app_state);
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Ok(Self {
            address,
            client: Client::new(),
            mock_server,
            app_state: app_state_for_harness,
            _config_dir: config_dir,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// Mocks the chat-completions endpoint for requests whose body contains `marker`.
    pub fn mock_chat(&self, marker: &str, content: &str) -> Mock<'_> {
        let body = chat_completion(content);
        self.mock_server.mock(|when, then| {
            when.method(POST)
                .path(CHAT_PATH)
                .header("authorization", "Bearer test-key")
                .body_contains(marker);
            then.status(200).json_body(body);
        })
    }

    pub async fn post_form(&self, path: &str, form: multipart::Form) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(format!("{}{path}", self.address))
            .multipart(form)
            .send()
            .await?)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// An OpenAI-style chat completion response carrying `content`.
pub fn chat_completion(content: &str) -> Value {
    json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    })
}

pub fn file_part(name: &str, bytes: Vec<u8>) -> multipart::Part {
    multipart::Part::bytes(bytes).file_name(name.to_string())
}

/// Builds the upload form the web page sends.
pub fn upload_form(
    template: Option<Vec<u8>>,
    pdfs: Vec<(&str, Vec<u8>)>,
    mode: Option<&str>,
) -> multipart::Form {
    let mut form = multipart::Form::new();
    if let Some(template) = template {
        form = form.part("template", file_part("template.docx", template));
    }
    for (name, pdf) in pdfs {
        form = form.part("pdfs", file_part(name, pdf));
    }
    if let Some(mode) = mode {
        form = form.text("mode", mode.to_string());
    }
    form
}
