use async_trait::async_trait;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower_sessions::Session;
use crate::errors::{StorageError, StorageResult};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    async fn remove(&self, key: &str) -> StorageResult<()>;
    async fn clear(&self) -> StorageResult<()>;
}

#[derive(Default)]
pub struct InMemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StorageResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|e| StorageError::Backend(format!("poisoned store: {}", e)))
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    async fn clear(&self) -> StorageResult<()> {
        self.lock()?.clear();
        Ok(())
    }
}

// Session-scoped storage on top of tower-sessions
pub struct SessionStore {
    session: Session,
}

impl SessionStore {
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}

#[async_trait]
impl KeyValueStore for SessionStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.session.get::<String>(key).await?)
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.session.insert(key, value.to_string()).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        self.session.remove::<String>(key).await?;
        Ok(())
    }

    async fn clear(&self) -> StorageResult<()> {
        self.session.clear().await;
        Ok(())
    }
}

// Durable storage kept in persistent cookies. Only cookies carrying the
// prefix belong to this store; everything else in the jar is left alone.
pub struct CookieStore {
    jar: Mutex<CookieJar>,
    prefix: String,
    secure: bool,
}

impl CookieStore {
    pub fn new(jar: CookieJar, prefix: impl Into<String>, secure: bool) -> Self {
        Self {
            jar: Mutex::new(jar),
            prefix: prefix.into(),
            secure,
        }
    }

    pub fn cookie_name(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    // Jar with every pending addition and removal, to be returned in the response
    pub fn jar(&self) -> StorageResult<CookieJar> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> StorageResult<std::sync::MutexGuard<'_, CookieJar>> {
        self.jar
            .lock()
            .map_err(|e| StorageError::Backend(format!("poisoned cookie jar: {}", e)))
    }

    fn removal(&self, name: String) -> Cookie<'static> {
        let mut cookie = Cookie::new(name, "");
        cookie.set_path("/");
        cookie
    }

    fn update<F>(&self, f: F) -> StorageResult<()>
    where
        F: FnOnce(CookieJar) -> CookieJar,
    {
        let mut jar = self.lock()?;
        let current = std::mem::take(&mut *jar);
        *jar = f(current);
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for CookieStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let name = self.cookie_name(key);
        Ok(self.lock()?.get(&name).map(|c| decode_value(c.value())))
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        // Values are percent-encoded so JSON survives the Cookie header
        let encoded = urlencoding::encode(value).into_owned();
        let mut cookie = Cookie::new(self.cookie_name(key), encoded);
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_secure(self.secure);
        cookie.make_permanent();
        self.update(|jar| jar.add(cookie))
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        let cookie = self.removal(self.cookie_name(key));
        self.update(|jar| jar.remove(cookie))
    }

    async fn clear(&self) -> StorageResult<()> {
        let names: Vec<String> = self
            .lock()?
            .iter()
            .filter(|c| c.name().starts_with(&self.prefix))
            .map(|c| c.name().to_string())
            .collect();
        let removals: Vec<Cookie<'static>> = names.into_iter().map(|n| self.removal(n)).collect();
        self.update(|jar| removals.into_iter().fold(jar, |jar, cookie| jar.remove(cookie)))
    }
}

fn decode_value(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(value) => value.into_owned(),
        Err(_) => raw.to_string(),
    }
}

// The two stores a page can touch: session-scoped and durable (token/user)
#[derive(Clone)]
pub struct BrowserStorage {
    pub session: Arc<dyn KeyValueStore>,
    pub local: Arc<dyn KeyValueStore>,
}

impl BrowserStorage {
    pub fn new(session: Arc<dyn KeyValueStore>, local: Arc<dyn KeyValueStore>) -> Self {
        Self { session, local }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::new()), Arc::new(InMemoryStore::new()))
    }

    // Wipe the session and drop the persisted credentials. Never fails.
    pub async fn clear_after_logout(&self) {
        if let Err(e) = self.session.clear().await {
            tracing::warn!("Failed to clear session storage: {}", e);
        }
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.local.remove(key).await {
                tracing::warn!("Failed to remove {} from local storage: {}", key, e);
            }
        }
    }

    // Wipe both stores entirely. Never fails.
    pub async fn clear_all(&self) {
        if let Err(e) = self.session.clear().await {
            tracing::warn!("Failed to clear session storage: {}", e);
        }
        if let Err(e) = self.local.clear().await {
            tracing::warn!("Failed to clear local storage: {}", e);
        }
    }
}
