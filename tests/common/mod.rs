//! Common test utilities for E2E tests

use devfolio::{AppState, config};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a new test server instance
    pub async fn new() -> Self {
        // Create temporary directory for test database
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        // Create test configuration
        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
                domain: "localhost".to_string(),
                protocol: "http".to_string(),
            },
            database: config::DatabaseConfig { path: db_path },
            // bcrypt's minimum cost keeps the test suite fast
            security: config::SecurityConfig { bcrypt_cost: 4 },
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };

        // Initialize app state
        let state = AppState::new(config).await.unwrap();

        // Create HTTP client
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        // Build router
        let app = devfolio::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait a bit for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            addr: addr_str,
            state,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Register an account through the API and return the response body
    pub async fn register_account(&self, username: &str, email: &str) -> serde_json::Value {
        let response = self
            .client
            .post(self.url("/api/v1/accounts"))
            .json(&serde_json::json!({
                "username": username,
                "email": email,
                "password": "Password123!",
            }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 201);
        response.json().await.unwrap()
    }

    /// Create a post through the API and return the response body
    pub async fn create_post(&self, created_by: &str, title: &str) -> serde_json::Value {
        let response = self
            .client
            .post(self.url("/api/v1/posts"))
            .json(&serde_json::json!({
                "title": title,
                "body": "A project body",
                "tags": ["Rust"],
                "created_by": created_by,
            }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 201);
        response.json().await.unwrap()
    }
}
