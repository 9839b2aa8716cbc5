//! Common test utilities for integration tests
//!
//! Every test gets a fresh database from `#[sqlx::test]`; this module wraps
//! it in a router with a scripted text generator and offers request helpers.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use sqlx::PgPool;
use std::sync::{Arc, Mutex};
use taskpad_api::{
    app::{build_router, AppState},
    config::Config,
};
use taskpad_shared::generation::{client::TextGenerator, GenerationError, TaskGenerator};
use tower::ServiceExt;

pub const PASSWORD: &str = "password123";

/// Text generator that replays a scripted reply and records prompts
#[derive(Default)]
pub struct ScriptedGenerator {
    reply: Mutex<Option<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn reply_with(&self, text: &str) {
        *self.reply.lock().unwrap() = Some(Ok(text.to_string()));
    }

    pub fn fail_with(&self, message: &str) {
        *self.reply.lock().unwrap() = Some(Err(message.to_string()));
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate_text(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.reply.lock().unwrap().clone() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(GenerationError::Upstream(message)),
            None => Err(GenerationError::NotConfigured),
        }
    }
}

/// Test context containing the router and its collaborators
pub struct TestContext {
    pub db: PgPool,
    pub app: Router,
    pub generator: Arc<ScriptedGenerator>,
}

/// A response reduced to what tests assert on
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestContext {
    pub fn new(db: PgPool) -> Self {
        Self::with_env(db, &[])
    }

    /// Builds the app with extra configuration variables
    pub fn with_env(db: PgPool, vars: &[(&str, &str)]) -> Self {
        let vars: Vec<(String, String)> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let config = Config::from_lookup(|key| {
            if key == "DATABASE_URL" {
                return Some("postgres://unused".to_string());
            }
            vars.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
        })
        .expect("test config");

        let generator = Arc::new(ScriptedGenerator::default());
        let state = AppState::new(db.clone(), config, TaskGenerator::new(generator.clone()));

        Self {
            db,
            app: build_router(state),
            generator,
        }
    }

    /// Sends a request and returns the status and JSON body (`Null` when empty)
    pub async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        self.send_raw(request).await
    }

    pub async fn send_raw(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str, token: &str) -> TestResponse {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> TestResponse {
        self.send(Method::DELETE, uri, Some(token), None).await
    }

    pub async fn register(&self, first_name: &str, last_name: &str, email: &str) -> TestResponse {
        self.post(
            "/api/register",
            None,
            serde_json::json!({
                "first_name": first_name,
                "last_name": last_name,
                "email": email,
                "password": PASSWORD,
                "password_confirmation": PASSWORD,
            }),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.post(
            "/api/login",
            None,
            serde_json::json!({ "email": email, "password": password }),
        )
        .await
    }

    /// Registers a user and returns a fresh bearer token for them
    pub async fn user_token(&self, email: &str) -> String {
        let registered = self.register("Test", "User", email).await;
        assert_eq!(registered.status, StatusCode::CREATED, "{}", registered.body);

        let login = self.login(email, PASSWORD).await;
        assert_eq!(login.status, StatusCode::OK, "{}", login.body);
        login.body["token"].as_str().unwrap().to_string()
    }

    /// Creates a task through the API and returns its JSON
    pub async fn create_task(&self, token: &str, body: Value) -> Value {
        let response = self.post("/api/tasks", Some(token), body).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body
    }

    pub async fn task_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM tasks")
            .fetch_one(&self.db)
            .await
            .unwrap()
    }
}
