use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use auth::Authenticator;
use auth::TokenLifetimes;
use serde_json::json;
use tokio::sync::mpsc;
use tokio::sync::Mutex;
use user_service::domain::auth::errors::EmailDispatchError;
use user_service::domain::auth::models::EmailJob;
use user_service::domain::auth::models::EmailSettings;
use user_service::domain::auth::ports::EmailDispatcher;
use user_service::domain::auth::service::AuthService;
use user_service::domain::user::models::EmailAddress;
use user_service::domain::user::models::User;
use user_service::domain::user::ports::UserRepository;
use user_service::domain::user::service::UserService;
use user_service::inbound::http::router::create_router;
use user_service::outbound::repositories::InMemoryUserRepository;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Email dispatcher that hands every job back to the test.
pub struct RecordingDispatcher {
    jobs: mpsc::UnboundedSender<EmailJob>,
}

#[async_trait]
impl EmailDispatcher for RecordingDispatcher {
    async fn send(&self, job: EmailJob) -> Result<(), EmailDispatchError> {
        self.jobs
            .send(job)
            .map_err(|e| EmailDispatchError::DeliveryFailed(e.to_string()))
    }
}

/// Test application that spawns a real server on the in-memory store
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
    pub repository: Arc<InMemoryUserRepository>,
    pub authenticator: Arc<Authenticator>,
    outbox: Mutex<mpsc::UnboundedReceiver<EmailJob>>,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let repository = Arc::new(InMemoryUserRepository::new());
        let (jobs, outbox) = mpsc::unbounded_channel();
        let dispatcher = Arc::new(RecordingDispatcher { jobs });

        let authenticator = Arc::new(
            Authenticator::new(TEST_SECRET, 1, TokenLifetimes::default())
                .expect("Failed to create authenticator"),
        );

        let user_service = Arc::new(UserService::new(
            Arc::clone(&repository),
            auth::PasswordHasher::with_cost(1).expect("Failed to create hasher"),
        ));
        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&repository),
            dispatcher,
            Arc::clone(&authenticator),
            EmailSettings::new("Test Project", "http://localhost:3000/"),
        ));

        let router = create_router(auth_service, user_service);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            api_client: reqwest::Client::new(),
            repository,
            authenticator,
            outbox: Mutex::new(outbox),
        }
    }

    /// Wait for the next email the service handed off.
    pub async fn next_email(&self) -> EmailJob {
        let mut outbox = self.outbox.lock().await;
        tokio::time::timeout(Duration::from_secs(5), outbox.recv())
            .await
            .expect("Timed out waiting for email")
            .expect("Email channel closed")
    }

    /// Token carried by the next email.
    pub async fn next_email_token(&self) -> String {
        self.next_email()
            .await
            .variables
            .get("token")
            .cloned()
            .expect("Email has no token")
    }

    /// Store a user directly, bypassing the registration flow
    pub async fn seed_user(
        &self,
        email: &str,
        password: &str,
        is_active: bool,
        is_superuser: bool,
    ) -> User {
        let mut user = User::new(
            EmailAddress::new(email.to_string()).unwrap(),
            self.authenticator.hash_password(password).unwrap(),
        );
        user.is_active = is_active;
        user.is_superuser = is_superuser;
        self.repository.create(user).await.expect("Failed to seed user")
    }

    /// Register, confirm through the emailed token and return the account
    pub async fn register_confirmed(&self, email: &str, password: &str) {
        let response = self
            .post("/api/auth/registration")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let token = self.next_email_token().await;
        let response = self
            .post("/api/auth/registration/validation")
            .json(&json!({ "token": token }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);
    }

    /// Log in and return the raw response
    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/api/auth/access-token")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Log in and return the access token
    pub async fn access_token(&self, email: &str, password: &str) -> String {
        let body: serde_json::Value = self
            .login(email, password)
            .await
            .json()
            .await
            .expect("Failed to parse response");
        body["data"]["access_token"]
            .as_str()
            .expect("No access token in response")
            .to_string()
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    /// Helper to make PUT request with Bearer token
    pub fn put_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .put(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    /// Helper to make DELETE request with Bearer token
    pub fn delete_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .delete(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }
}
