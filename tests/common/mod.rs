#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use rastarockets_api::auth::{hash_password, PasswordPolicy};
use rastarockets_api::config::AppConfig;
use rastarockets_api::database::models::{Customer, CustomerContact, User, UserRole};
use rastarockets_api::database::{DocumentStore, MemoryStore};
use rastarockets_api::services::{NewContact, NewUser};
use rastarockets_api::state::AppState;

pub const PASSWORD: &str = "correct horse battery staple";
pub const BOUNDARY: &str = "rastarocketsboundary";

/// Router over a fresh in-memory store, with one seeded user
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub uploads: TempDir,
    pub user: User,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub bytes: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.bytes).unwrap_or(Value::Null)
    }
}

fn test_policy() -> PasswordPolicy {
    PasswordPolicy {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    }
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        let uploads = tempfile::tempdir().context("failed to create upload folder")?;

        let mut config = AppConfig::development();
        config.security.secret_key = "integration-secret".to_string();
        config.api.enable_request_logging = false;
        config.uploads.folder = uploads.path().join("files");
        config.uploads.max_upload_bytes = 64 * 1024;

        let store = Arc::new(MemoryStore::new());
        let shared: Arc<dyn DocumentStore> = store.clone();
        let state = AppState::new(config, shared)?;

        let password_hash = hash_password(&test_policy(), PASSWORD)?;
        let user = state
            .users
            .create_user(NewUser {
                email: "jane.doe@rastarockets.io".to_string(),
                name: "Jane Doe".to_string(),
                role: UserRole::Other,
                password_hash: Some(password_hash),
            })
            .await?
            .context("seed user not created")?;

        let router = rastarockets_api::app(state.clone());
        Ok(Self {
            router,
            state,
            store,
            uploads,
            user,
        })
    }

    pub fn token(&self) -> String {
        self.token_for(&self.user)
    }

    pub fn token_for(&self, user: &User) -> String {
        self.state.issuer.issue(&user.id, None).expect("token issue")
    }

    pub async fn add_user(&self, email: &str, name: &str, role: UserRole) -> Result<User> {
        self.state
            .users
            .create_user(NewUser {
                email: email.to_string(),
                name: name.to_string(),
                role,
                password_hash: Some(hash_password(&test_policy(), PASSWORD)?),
            })
            .await?
            .context("user not created")
    }

    pub async fn add_customer(&self, name: &str) -> Result<Customer> {
        self.state
            .customers
            .create_customer(name)
            .await?
            .context("customer not created")
    }

    pub async fn add_contact(&self, customer: &Customer, name: &str) -> Result<CustomerContact> {
        self.state
            .customers
            .create_contact(&NewContact {
                name: name.to_string(),
                email: format!("{}@client.io", name.to_lowercase().replace(' ', ".")),
                customer: customer.id.clone(),
            })
            .await?
            .context("contact not created")
    }

    pub async fn request(&self, request: Request<Body>) -> Result<TestResponse> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?.to_vec();
        Ok(TestResponse { status, headers, bytes })
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<TestResponse> {
        self.request(build(Method::GET, uri, token, None)?).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Result<TestResponse> {
        self.request(build(Method::DELETE, uri, token, None)?).await
    }

    pub async fn post_json(&self, uri: &str, token: Option<&str>, body: Value) -> Result<TestResponse> {
        self.request(build(Method::POST, uri, token, Some(body))?).await
    }

    pub async fn put_json(&self, uri: &str, token: Option<&str>, body: Value) -> Result<TestResponse> {
        self.request(build(Method::PUT, uri, token, Some(body))?).await
    }

    pub async fn upload(&self, uri: &str, token: &str, filename: &str, bytes: &[u8]) -> Result<TestResponse> {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Token {}", token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body("file", filename, bytes)))?;
        self.request(request).await
    }
}

fn build(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Result<Request<Body>> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Token {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => builder.body(Body::empty())?,
    };
    Ok(request)
}

pub fn basic_auth(email: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", email, password)))
}

pub fn multipart_body(field: &str, filename: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}
