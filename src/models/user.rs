use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Snapshot of the signed-in user as held by the authentication service
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn display_name(&self) -> &str {
        match self.full_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => self.username.as_deref().unwrap_or(""),
        }
    }

    pub fn created_on(&self) -> String {
        self.created_at
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "N/A".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn display_name_prefers_full_name() {
        let user = User {
            username: Some("ana".into()),
            full_name: Some("Ana Lima".into()),
            ..Default::default()
        };
        assert_eq!(user.display_name(), "Ana Lima");

        let user = User {
            username: Some("ana".into()),
            full_name: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(user.display_name(), "ana");
    }

    #[test]
    fn created_on_falls_back_to_na() {
        assert_eq!(User::default().created_on(), "N/A");

        let user = User {
            created_at: Some(Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap()),
            ..Default::default()
        };
        assert_eq!(user.created_on(), "2024-03-09");
    }

    #[test]
    fn deserializes_camel_case_with_missing_fields() {
        let user: User = serde_json::from_str(
            r#"{"username":"bo","email":"bo@example.com","createdAt":"2023-01-02T03:04:05Z"}"#,
        )
        .unwrap();
        assert_eq!(user.username.as_deref(), Some("bo"));
        assert_eq!(user.full_name, None);
        assert_eq!(user.created_on(), "2023-01-02");
    }
}
