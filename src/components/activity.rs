// Icon and chip color for each known activity tag.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipColor {
    Success,
    Error,
    Warning,
    Info,
    Default,
}

impl ChipColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChipColor::Success => "success",
            ChipColor::Error => "error",
            ChipColor::Warning => "warning",
            ChipColor::Info => "info",
            ChipColor::Default => "default",
        }
    }
}

pub const DEFAULT_ICON: &str = "📝";

const ACTIVITY_STYLES: [(&str, &str, ChipColor); 8] = [
    ("LOGIN_SUCCESS", "✅", ChipColor::Success),
    ("LOGIN_FAILED", "❌", ChipColor::Error),
    ("ACCOUNT_LOCKED", "🔒", ChipColor::Error),
    ("SECURITY_ALERT", "⚠️", ChipColor::Warning),
    ("LOGOUT", "🚪", ChipColor::Default),
    ("PASSWORD_RESET_REQUESTED", "🔑", ChipColor::Info),
    ("PASSWORD_RESET_SUCCESS", "✔️", ChipColor::Success),
    ("ACCOUNT_CREATED", "🎉", ChipColor::Success),
];

fn lookup(activity: &str) -> Option<&'static (&'static str, &'static str, ChipColor)> {
    ACTIVITY_STYLES.iter().find(|(tag, _, _)| *tag == activity)
}

pub fn activity_icon(activity: &str) -> &'static str {
    lookup(activity).map(|(_, icon, _)| *icon).unwrap_or(DEFAULT_ICON)
}

pub fn activity_color(activity: &str) -> ChipColor {
    lookup(activity).map(|(_, _, color)| *color).unwrap_or(ChipColor::Default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tags_map_to_fixed_pairs() {
        let expected = [
            ("LOGIN_SUCCESS", "✅", "success"),
            ("LOGIN_FAILED", "❌", "error"),
            ("ACCOUNT_LOCKED", "🔒", "error"),
            ("SECURITY_ALERT", "⚠️", "warning"),
            ("LOGOUT", "🚪", "default"),
            ("PASSWORD_RESET_REQUESTED", "🔑", "info"),
            ("PASSWORD_RESET_SUCCESS", "✔️", "success"),
            ("ACCOUNT_CREATED", "🎉", "success"),
        ];
        for (tag, icon, color) in expected {
            assert_eq!(activity_icon(tag), icon, "icon for {}", tag);
            assert_eq!(activity_color(tag).as_str(), color, "color for {}", tag);
        }
    }

    #[test]
    fn unknown_tags_use_defaults() {
        for tag in ["", "login_success", "TWO_FACTOR_ENABLED", "LOGIN_SUCCESS "] {
            assert_eq!(activity_icon(tag), DEFAULT_ICON);
            assert_eq!(activity_color(tag), ChipColor::Default);
        }
    }
}
