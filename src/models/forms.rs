use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct DeleteAccountForm {
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirmation: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogoutTarget {
    Home,
    Login,
}

#[derive(Debug, Deserialize)]
pub struct LogoutForm {
    pub target: LogoutTarget,
}

#[derive(Debug, Deserialize)]
pub struct HeaderDeleteForm {
    #[serde(default)]
    pub password: String,
}

// Which overlays are open when a page is rendered
#[derive(Debug, Deserialize, Default)]
pub struct PageQuery {
    pub dialog: Option<String>,
    pub menu: Option<String>,
    pub logout: Option<String>,
}
