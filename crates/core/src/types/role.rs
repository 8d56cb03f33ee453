//! Account roles granted by the REST API.

use serde::{Deserialize, Serialize};

/// Role attached to a user account.
///
/// The API sends roles as upper-case strings. Role names this storefront
/// does not know about deserialize to `Other` instead of failing the login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// May create, edit and delete products.
    Admin,
    /// Regular shopper.
    User,
    /// Any role string not listed above.
    #[serde(other)]
    Other,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "ADMIN"),
            Self::User => write!(f, "USER"),
            Self::Other => write!(f, "OTHER"),
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
    fn test_deserialize_known_and_unknown_roles() {
        let roles: Vec<Role> = serde_json::from_str(r#"["ADMIN","USER","SUPPORT"]"#).unwrap();
        assert_eq!(roles, vec![Role::Admin, Role::User, Role::Other]);
    }

    #[test]
    fn test_from_str_roundtrip() {
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::User.to_string(), "USER");
        assert!("admin".parse::<Role>().is_err());
    }
}
