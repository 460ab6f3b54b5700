use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::{Client, Method, RequestBuilder};
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use crate::config::{AuthBackendKind, AuthConfig};
use crate::errors::{AuthError, AuthResult};
use crate::models::{ActivityLogEntry, User};

pub const DEMO_PASSWORD: &str = "music-connect";

// Everything the pages need from the authentication service
#[async_trait]
pub trait AuthService: Send + Sync {
    fn current_user(&self) -> Option<User>;
    async fn get_activity_logs(&self) -> AuthResult<Vec<ActivityLogEntry>>;
    async fn delete_account(&self, password: &str) -> AuthResult<()>;
    async fn logout(&self) -> AuthResult<()>;
}

// Response shape shared by every endpoint of the authentication service
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    logs: Option<Vec<ActivityLogEntry>>,
    #[serde(default)]
    error: Option<String>,
}

pub struct HttpAuthService {
    client: Client,
    base_url: String,
    token: Option<String>,
    user: Option<User>,
}

impl HttpAuthService {
    pub fn new(client: Client, base_url: &str, token: Option<String>, user: Option<User>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            user,
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self.client.request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> AuthResult<Envelope> {
        let response = request.send().await?;
        let status = response.status();
        let envelope: Envelope = response
            .json()
            .await
            .map_err(|e| AuthError::InvalidResponse(format!("{} (status {})", e, status)))?;

        if envelope.success {
            Ok(envelope)
        } else {
            tracing::debug!("Authentication service rejected request with status {}", status);
            Err(AuthError::Rejected(envelope.error))
        }
    }
}

#[async_trait]
impl AuthService for HttpAuthService {
    fn current_user(&self) -> Option<User> {
        self.user.clone()
    }

    async fn get_activity_logs(&self) -> AuthResult<Vec<ActivityLogEntry>> {
        let envelope = self.send(self.request(Method::GET, "/auth/activity-logs")).await?;
        Ok(envelope.logs.unwrap_or_default())
    }

    async fn delete_account(&self, password: &str) -> AuthResult<()> {
        let request = self
            .request(Method::DELETE, "/auth/account")
            .json(&json!({ "password": password }));
        self.send(request).await?;
        Ok(())
    }

    async fn logout(&self) -> AuthResult<()> {
        // The body is irrelevant; only the status matters
        self.request(Method::POST, "/auth/logout")
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct CallCounts {
    pub activity_logs: AtomicUsize,
    pub delete_account: AtomicUsize,
    pub logout: AtomicUsize,
}

// Self-contained service for local development and tests
pub struct InMemoryAuthService {
    user: Mutex<Option<User>>,
    logs: Mutex<Vec<ActivityLogEntry>>,
    password: String,
    logs_failure: Option<String>,
    logout_failure: Option<String>,
    delete_rejection: Option<Option<String>>,
    delete_failure: Option<String>,
    latency: Option<std::time::Duration>,
    pub calls: CallCounts,
}

impl InMemoryAuthService {
    pub fn new(user: User, password: &str) -> Self {
        Self {
            user: Mutex::new(Some(user)),
            logs: Mutex::new(Vec::new()),
            password: password.to_string(),
            logs_failure: None,
            logout_failure: None,
            delete_rejection: None,
            delete_failure: None,
            latency: None,
            calls: CallCounts::default(),
        }
    }

    pub fn demo() -> Self {
        let now = Utc::now();
        let entry = |id: u32, activity: &str, minutes_ago: i64| ActivityLogEntry {
            id: id.to_string(),
            activity: activity.to_string(),
            timestamp: now - Duration::minutes(minutes_ago),
            details: None,
        };
        let user = User {
            username: Some("demo".to_string()),
            full_name: Some("Demo Musician".to_string()),
            email: Some("demo@music-connect.local".to_string()),
            created_at: Some(now - Duration::days(30)),
        };
        Self::new(user, DEMO_PASSWORD).with_logs(vec![
            entry(3, "LOGIN_SUCCESS", 5),
            entry(2, "LOGIN_FAILED", 7),
            entry(1, "ACCOUNT_CREATED", 30 * 24 * 60),
        ])
    }

    pub fn with_logs(self, logs: Vec<ActivityLogEntry>) -> Self {
        match self.logs.lock() {
            Ok(mut current) => *current = logs,
            Err(poisoned) => *poisoned.into_inner() = logs,
        }
        self
    }

    pub fn failing_activity_logs(mut self, error: &str) -> Self {
        self.logs_failure = Some(error.to_string());
        self
    }

    pub fn failing_logout(mut self, error: &str) -> Self {
        self.logout_failure = Some(error.to_string());
        self
    }

    // Every delete is answered with success: false and the given message
    pub fn rejecting_delete(mut self, error: Option<&str>) -> Self {
        self.delete_rejection = Some(error.map(str::to_string));
        self
    }

    // Every delete fails as if the service could not be reached
    pub fn failing_delete(mut self, error: &str) -> Self {
        self.delete_failure = Some(error.to_string());
        self
    }

    // Every call waits this long before answering
    pub fn with_latency(mut self, latency: std::time::Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    pub fn activity_log_calls(&self) -> usize {
        self.calls.activity_logs.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.calls.delete_account.load(Ordering::SeqCst)
    }

    pub fn logout_calls(&self) -> usize {
        self.calls.logout.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthService for InMemoryAuthService {
    fn current_user(&self) -> Option<User> {
        match self.user.lock() {
            Ok(user) => user.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    async fn get_activity_logs(&self) -> AuthResult<Vec<ActivityLogEntry>> {
        self.calls.activity_logs.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        if let Some(error) = &self.logs_failure {
            return Err(AuthError::Rejected(Some(error.clone())));
        }
        let logs = self
            .logs
            .lock()
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;
        Ok(logs.clone())
    }

    async fn delete_account(&self, password: &str) -> AuthResult<()> {
        self.calls.delete_account.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        if let Some(error) = &self.delete_failure {
            return Err(AuthError::Unavailable(error.clone()));
        }
        if let Some(rejection) = &self.delete_rejection {
            return Err(AuthError::Rejected(rejection.clone()));
        }
        if password != self.password {
            return Err(AuthError::Rejected(Some("Invalid password".to_string())));
        }

        let mut user = self
            .user
            .lock()
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;
        tracing::info!(
            "Deleted in-memory account {}",
            user.as_ref().and_then(|u| u.username.as_deref()).unwrap_or("<unknown>")
        );
        *user = None;
        Ok(())
    }

    async fn logout(&self) -> AuthResult<()> {
        self.calls.logout.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        match &self.logout_failure {
            Some(error) => Err(AuthError::Unavailable(error.clone())),
            None => Ok(()),
        }
    }
}

// Chooses the service implementation and binds it to one browser's credentials
#[derive(Clone)]
pub enum AuthBackend {
    Http { client: Client, base_url: String },
    Memory(Arc<InMemoryAuthService>),
}

impl AuthBackend {
    pub fn from_config(config: &AuthConfig) -> AuthResult<Self> {
        match config.backend {
            AuthBackendKind::Http => {
                let mut builder = Client::builder();
                if let Some(secs) = config.request_timeout_secs {
                    builder = builder.timeout(std::time::Duration::from_secs(secs));
                }
                Ok(AuthBackend::Http {
                    client: builder.build()?,
                    base_url: config.base_url.clone(),
                })
            }
            AuthBackendKind::Memory => {
                tracing::warn!("Using in-memory authentication service");
                Ok(AuthBackend::Memory(Arc::new(InMemoryAuthService::demo())))
            }
        }
    }

    // The in-memory demo account has no credentials to check
    pub fn requires_token(&self) -> bool {
        matches!(self, AuthBackend::Http { .. })
    }

    pub fn connect(&self, token: Option<String>, user: Option<User>) -> Arc<dyn AuthService> {
        match self {
            AuthBackend::Http { client, base_url } => {
                Arc::new(HttpAuthService::new(client.clone(), base_url, token, user))
            }
            AuthBackend::Memory(service) => service.clone(),
        }
    }
}
