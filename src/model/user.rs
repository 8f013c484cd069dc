//! Users, roles and the identity attached to each request.

use crate::model::Password;
use crate::validator::Validator;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct User {
    pub id: i64,
    pub name: String,
    #[serde(skip)]
    pub password: Password,
    pub role: Role,
}

/// Who is making the request. Anonymous callers are a distinct variant, never a
/// user with blank fields.
#[derive(Debug, Clone)]
pub enum CurrentUser {
    Anonymous,
    User(Arc<User>),
}

impl CurrentUser {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }

    pub fn user(&self) -> Option<&Arc<User>> {
        match self {
            Self::Anonymous => None,
            Self::User(user) => Some(user),
        }
    }
}

pub fn validate_password_plaintext(v: &mut Validator, password: &str) {
    v.check(!password.is_empty(), "password", "must be provided");
    v.check(password.len() >= 8, "password", "must be at least 8 bytes long");
    v.check(password.len() <= 72, "password", "must not be more than 72 bytes long");
}

/// Rules for a new account: its name and the plaintext password before hashing.
pub fn validate_user(v: &mut Validator, name: &str, password: &str) {
    validate_user_name(v, name);
    validate_password_plaintext(v, password);
}

fn validate_user_name(v: &mut Validator, name: &str) {
    v.check(!name.is_empty(), "name", "must be provided");
    v.check(name.len() <= 200, "name", "must not be more than 200 bytes long");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> User {
        User {
            id: 0,
            name: name.into(),
            password: Password::from_hash("$argon2id$placeholder"),
            role: Role::User,
        }
    }

    #[test]
    fn user_name_rules() {
        let mut v = Validator::new();
        validate_user_name(&mut v, "alice");
        assert!(v.valid());

        let mut v = Validator::new();
        validate_user_name(&mut v, "");
        assert_eq!(v.errors()["name"], "must be provided");

        let mut v = Validator::new();
        validate_user_name(&mut v, &"x".repeat(201));
        assert_eq!(v.errors()["name"], "must not be more than 200 bytes long");
    }

    #[test]
    fn name_limit_counts_bytes() {
        // 101 two-byte characters: 101 symbols but 202 bytes.
        let mut v = Validator::new();
        validate_user_name(&mut v, &"ж".repeat(101));
        assert!(!v.valid());
    }

    #[test]
    fn user_rules_cover_name_and_password() {
        let mut v = Validator::new();
        validate_user(&mut v, "alice", "password123");
        assert!(v.valid());

        let mut v = Validator::new();
        validate_user(&mut v, "", "short");
        assert_eq!(v.errors()["name"], "must be provided");
        assert_eq!(v.errors()["password"], "must be at least 8 bytes long");
    }

    #[test]
    fn password_plaintext_rules() {
        let mut v = Validator::new();
        validate_password_plaintext(&mut v, "");
        assert_eq!(v.errors()["password"], "must be provided");

        let mut v = Validator::new();
        validate_password_plaintext(&mut v, "short");
        assert_eq!(v.errors()["password"], "must be at least 8 bytes long");

        let mut v = Validator::new();
        validate_password_plaintext(&mut v, &"p".repeat(73));
        assert_eq!(v.errors()["password"], "must not be more than 72 bytes long");

        let mut v = Validator::new();
        validate_password_plaintext(&mut v, "password123");
        assert!(v.valid());
    }

    #[test]
    fn user_json_has_no_password() {
        let json = serde_json::to_value(user("bob")).unwrap();
        assert_eq!(json, serde_json::json!({"id": 0, "name": "bob", "role": "user"}));
    }

    #[test]
    fn anonymous_is_identified_by_variant() {
        assert!(CurrentUser::Anonymous.is_anonymous());
        let blank = CurrentUser::User(Arc::new(user("")));
        assert!(!blank.is_anonymous());
        assert!(blank.user().is_some());
    }

    #[test]
    fn role_round_trips_through_str() {
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!(Role::User.as_str(), "user");
        assert!("root".parse::<Role>().is_err());
    }
}
