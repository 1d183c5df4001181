//! User role with collapse rule.

use serde::{Deserialize, Serialize};

/// Role of an authenticated user.
///
/// Exactly two roles are recognized. Whatever set of role strings the
/// backend hands out, any set containing `"ADMIN"` collapses to [`Role::Admin`]
/// and every other non-empty set collapses to [`Role::User`]. An empty set
/// yields no role at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Full access to administrative operations (order status, user
    /// directory, product management).
    Admin,
    /// Regular shopper.
    User,
}

impl Role {
    /// Collapse a set of backend role strings into a single [`Role`].
    ///
    /// Returns `None` when the set is empty.
    #[must_use]
    pub fn from_role_strings<S: AsRef<str>>(roles: &[S]) -> Option<Self> {
        if roles.is_empty() {
            return None;
        }
        if roles.iter().any(|r| r.as_ref() == "ADMIN") {
            Some(Self::Admin)
        } else {
            Some(Self::User)
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "ADMIN"),
            Self::User => write!(f, "USER"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Self::Admin),
            "USER" => Ok(Self::User),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_wins_over_user() {
        let roles = ["ADMIN", "USER"];
        assert_eq!(Role::from_role_strings(&roles), Some(Role::Admin));
    }

    #[test]
    fn test_plain_user() {
        let roles = ["USER"];
        assert_eq!(Role::from_role_strings(&roles), Some(Role::User));
    }

    #[test]
    fn test_unknown_roles_collapse_to_user() {
        let roles = ["SUPPORT", "AUDITOR"];
        assert_eq!(Role::from_role_strings(&roles), Some(Role::User));
    }

    #[test]
    fn test_empty_set_has_no_role() {
        let roles: [&str; 0] = [];
        assert_eq!(Role::from_role_strings(&roles), None);
    }

    #[test]
    fn test_display_from_str_roundtrip() {
        assert_eq!(Role::Admin.to_string().parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::User.to_string().parse::<Role>().unwrap(), Role::User);
        assert!("manager".parse::<Role>().is_err());
    }

    #[test]
    fn test_serde_wire_format() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
        let role: Role = serde_json::from_str("\"USER\"").unwrap();
        assert_eq!(role, Role::User);
    }
}
