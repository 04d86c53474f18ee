//! Authenticated identity passed explicitly into notification hooks

use serde::{Deserialize, Serialize};

/// The user performing an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: String,
    pub display_name: Option<String>,
    pub is_admin: bool,
}

impl AuthContext {
    pub fn user(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            display_name: None,
            is_admin: false,
        }
    }

    pub fn admin(user_id: &str) -> Self {
        Self {
            is_admin: true,
            ..Self::user(user_id)
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.display_name = Some(name.to_string());
        self
    }

    /// Name shown to other users
    pub fn display(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => "Someone",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_falls_back() {
        assert_eq!(AuthContext::user("u1").display(), "Someone");
        assert_eq!(AuthContext::user("u1").with_name("Dana").display(), "Dana");
        assert!(AuthContext::admin("a1").is_admin);
    }
}
