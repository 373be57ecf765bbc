//! Shared utilities for integration testing.

use memorial_api::{AppConfig, HttpServer, Shutdown};
use tokio::net::TcpListener;

/// A real server on an ephemeral loopback port, stopped on drop.
pub struct TestServer {
    pub base_url: String,
    shutdown: Shutdown,
}

impl TestServer {
    pub async fn spawn(mut config: AppConfig) -> Self {
        config.server.bind_address = "127.0.0.1:0".to_string();
        config.auth.jwt_secret = "integration-test-secret".to_string();

        let listener = TcpListener::bind(&config.server.bind_address)
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");

        let shutdown = Shutdown::new();
        let receiver = shutdown.subscribe();
        let server = HttpServer::new(config);
        tokio::spawn(async move {
            let _ = server.run(listener, receiver).await;
        });

        Self {
            base_url: format!("http://{}", addr),
            shutdown,
        }
    }

    /// Spawn with rate limiting disabled, for flow tests that make
    /// many credential calls.
    pub async fn spawn_unlimited() -> Self {
        let mut config = AppConfig::default();
        config.rate_limit.enabled = false;
        Self::spawn(config).await
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Register a user and return the created record's JSON.
#[allow(dead_code)]
pub async fn register(
    client: &reqwest::Client,
    server: &TestServer,
    username: &str,
    password: &str,
    is_admin: bool,
) -> serde_json::Value {
    let response = client
        .post(server.url("/api/v1/users"))
        .json(&serde_json::json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": password,
            "is_admin": is_admin,
        }))
        .send()
        .await
        .expect("register request");
    assert_eq!(response.status().as_u16(), 201, "register {username}");
    response.json().await.expect("register body")
}

/// Log in and return (access_token, refresh_token).
#[allow(dead_code)]
pub async fn login(
    client: &reqwest::Client,
    server: &TestServer,
    username: &str,
    password: &str,
) -> (String, String) {
    let response = client
        .post(server.url("/api/v1/users/login"))
        .json(&serde_json::json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("login request");
    assert_eq!(response.status().as_u16(), 200, "login {username}");
    let body: serde_json::Value = response.json().await.expect("login body");
    (
        body["access_token"].as_str().expect("access token").to_string(),
        body["refresh_token"].as_str().expect("refresh token").to_string(),
    )
}
