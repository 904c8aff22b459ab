use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// User document from the `users` collection.
///
/// Accounts are created and maintained by the auth service; this side only
/// reads them.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(default)]
    pub username: String,
    pub email: String,
    /// Password hash as stored
    #[serde(rename = "password", default)]
    pub password_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

impl User {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(),
            username: username.into(),
            email: email.into(),
            password_hash: String::new(),
            profile_picture: None,
        }
    }

    /// Whether `email` names this user, ignoring ASCII case
    pub fn has_email(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email)
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"[redacted]")
            .field("profile_picture", &self.profile_picture)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{self, doc};

    #[test]
    fn test_reads_stored_field_names() {
        let id = ObjectId::new();
        let user: User = bson::from_document(doc! {
            "_id": id,
            "username": "ada",
            "email": "ada@example.com",
            "password": "$2b$10$abcdefghijklmnopqrstuv",
            "profilePicture": "uploads/profile-1.png"
        })
        .unwrap();

        assert_eq!(user.id, id);
        assert_eq!(user.password_hash, "$2b$10$abcdefghijklmnopqrstuv");
        assert_eq!(user.profile_picture.as_deref(), Some("uploads/profile-1.png"));
    }

    #[test]
    fn test_debug_redacts_password_hash() {
        let mut user = User::new("ada", "ada@example.com");
        user.password_hash = "secret-hash".to_string();
        assert!(!format!("{user:?}").contains("secret-hash"));
    }

    #[test]
    fn test_email_match_ignores_case() {
        let user = User::new("ada", "Ada@Example.com");
        assert!(user.has_email("ada@example.com"));
        assert!(!user.has_email("bob@example.com"));
    }
}
