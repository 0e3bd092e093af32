//! The user record: the only entity in the service.

use serde::{Deserialize, Serialize};

use crate::id::UserId;

/// A stored user record.
///
/// Serializes as `{"id", "name", "email"}` in stored form, with no derived fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl User {
    pub fn from_draft(id: UserId, draft: UserDraft) -> Self {
        Self {
            id,
            name: draft.name,
            email: draft.email,
        }
    }
}

/// Writable fields of a user.
///
/// Used for both insert and update; an update replaces both fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
}

impl UserDraft {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_serializes_with_exactly_three_keys() {
        let user = User::from_draft(UserId::new(1), UserDraft::new("Ann", "ann@x.com"));
        let json = serde_json::to_value(&user).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "id": 1, "name": "Ann", "email": "ann@x.com" })
        );
        assert_eq!(json.as_object().unwrap().len(), 3);
    }
}
