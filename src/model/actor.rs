//! Actors and their validation rules.

use crate::validator::{permitted_value, Validator};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            other => Err(format!("unknown gender: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Actor {
    pub id: i64,
    pub full_name: String,
    pub gender: Gender,
    /// RFC 3339.
    pub birth_date: DateTime<Utc>,
    /// Ids of the movies the actor appears in. Empty, never null.
    #[serde(rename = "movies")]
    pub movie_ids: Vec<i64>,
}

/// Actor fields as received from a client. Used for both create and partial
/// update: absent fields are `None`.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ActorDraft {
    pub full_name: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<DateTime<Utc>>,
}

impl ActorDraft {
    /// Fill the fields this draft leaves out from `current`.
    pub fn merged_onto(self, current: &Actor) -> Self {
        Self {
            full_name: self.full_name.or_else(|| Some(current.full_name.clone())),
            gender: self.gender.or_else(|| Some(current.gender.as_str().to_string())),
            birth_date: self.birth_date.or(Some(current.birth_date)),
        }
    }

    /// Validate and build the actor. On failure the complete set of field errors is returned.
    pub fn into_actor(self, id: i64, movie_ids: Vec<i64>) -> Result<Actor, Validator> {
        let v = validate_actor(&self);
        if !v.valid() {
            return Err(v);
        }
        let gender = self.gender.as_deref().and_then(|g| g.parse::<Gender>().ok());
        match (self.full_name, gender, self.birth_date) {
            (Some(full_name), Some(gender), Some(birth_date)) => Ok(Actor {
                id,
                full_name,
                gender,
                birth_date,
                movie_ids,
            }),
            _ => Err(v),
        }
    }
}

pub fn validate_actor(draft: &ActorDraft) -> Validator {
    validate_actor_at(draft, Utc::now())
}

fn validate_actor_at(draft: &ActorDraft, now: DateTime<Utc>) -> Validator {
    let mut v = Validator::new();

    let full_name = draft.full_name.as_deref().unwrap_or("");
    v.check(!full_name.is_empty(), "full_name", "must be provided");
    v.check(
        full_name.chars().count() <= 200,
        "full_name",
        "must be no more than 200 symbols",
    );

    match draft.gender.as_deref() {
        None | Some("") => v.add_error("gender", "must be provided"),
        Some(g) => v.check(
            permitted_value(&g, &["male", "female"]),
            "gender",
            "must be either male or female",
        ),
    }

    match draft.birth_date {
        None => v.add_error("birth_date", "must be provided"),
        Some(d) => v.check(d < now, "birth_date", "must be in the past"),
    }

    v
}
