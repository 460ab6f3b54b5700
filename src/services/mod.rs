mod auth;
mod navigation;
mod storage;

pub use auth::{AuthBackend, AuthService, HttpAuthService, InMemoryAuthService, DEMO_PASSWORD};
pub use navigation::{Navigation, NavigationRecorder, Navigator};
pub use storage::{
    BrowserStorage, CookieStore, InMemoryStore, KeyValueStore, SessionStore, TOKEN_KEY, USER_KEY,
};
