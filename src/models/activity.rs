use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ActivityLogEntry {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub activity: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Map<String, Value>>,
}

impl ActivityLogEntry {
    // "PASSWORD_RESET_SUCCESS" -> "PASSWORD RESET SUCCESS"
    pub fn label(&self) -> String {
        self.activity.replace('_', " ")
    }

    pub fn details_json(&self) -> Option<String> {
        match &self.details {
            Some(details) if !details.is_empty() => serde_json::to_string(details).ok(),
            _ => None,
        }
    }
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "activity log id must be a string or number, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_numeric_and_string_ids() {
        let logs: Vec<ActivityLogEntry> = serde_json::from_str(
            r#"[
                {"id": 42, "activity": "LOGIN_SUCCESS", "timestamp": "2024-05-01T10:00:00Z"},
                {"id": "a-7", "activity": "LOGOUT", "timestamp": "2024-04-30T09:00:00Z", "details": {}}
            ]"#,
        )
        .unwrap();
        assert_eq!(logs[0].id, "42");
        assert_eq!(logs[1].id, "a-7");
    }

    #[test]
    fn details_shown_only_when_non_empty() {
        let mut entry: ActivityLogEntry = serde_json::from_str(
            r#"{"id": 1, "activity": "LOGIN_FAILED", "timestamp": "2024-05-01T10:00:00Z", "details": {}}"#,
        )
        .unwrap();
        assert_eq!(entry.details_json(), None);

        let mut details = Map::new();
        details.insert("ip".into(), Value::String("10.0.0.1".into()));
        entry.details = Some(details);
        assert_eq!(entry.details_json().as_deref(), Some(r#"{"ip":"10.0.0.1"}"#));
        assert_eq!(entry.label(), "LOGIN FAILED");
    }
}
