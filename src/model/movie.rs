//! Movies and their validation rules.

use crate::validator::{unique, Validator};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// RFC 3339.
    pub release_date: DateTime<Utc>,
    pub rating: f32,
    /// Cast, ascending by actor id.
    #[serde(rename = "actors")]
    pub actor_ids: Vec<i64>,
}

/// Movie fields as received from a client; absent fields are `None`.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct MovieDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub release_date: Option<DateTime<Utc>>,
    pub rating: Option<f32>,
    pub actors: Option<Vec<i64>>,
}

impl MovieDraft {
    /// Fill the fields this draft leaves out from `current`. A present `actors`
    /// list replaces the whole cast.
    pub fn merged_onto(self, current: &Movie) -> Self {
        Self {
            title: self.title.or_else(|| Some(current.title.clone())),
            description: self.description.or_else(|| Some(current.description.clone())),
            release_date: self.release_date.or(Some(current.release_date)),
            rating: self.rating.or(Some(current.rating)),
            actors: self.actors.or_else(|| Some(current.actor_ids.clone())),
        }
    }

    pub fn into_movie(self, id: i64) -> Result<Movie, Validator> {
        let v = validate_movie(&self);
        if !v.valid() {
            return Err(v);
        }
        match (self.title, self.description, self.release_date, self.rating, self.actors) {
            (Some(title), Some(description), Some(release_date), Some(rating), Some(mut actor_ids)) => {
                actor_ids.sort_unstable();
                Ok(Movie {
                    id,
                    title,
                    description,
                    release_date,
                    rating,
                    actor_ids,
                })
            }
            _ => Err(v),
        }
    }
}

pub fn validate_movie(draft: &MovieDraft) -> Validator {
    let mut v = Validator::new();

    let title = draft.title.as_deref().unwrap_or("");
    v.check(!title.is_empty(), "title", "must be provided");
    v.check(title.chars().count() <= 150, "title", "must be no more than 150 symbols");

    let description = draft.description.as_deref().unwrap_or("");
    v.check(!description.is_empty(), "description", "must be provided");
    v.check(
        description.chars().count() < 1000,
        "description",
        "must be less than 1000 symbols",
    );

    v.check(draft.release_date.is_some(), "release_date", "must be provided");

    match draft.rating {
        None => v.add_error("rating", "must be provided"),
        // NaN fails both comparisons.
        Some(r) => v.check((0.0..=10.0).contains(&r), "rating", "must be between 0 and 10"),
    }

    let actors = draft.actors.as_deref().unwrap_or(&[]);
    v.check(!actors.is_empty(), "actors", "must contain at least one actor");
    v.check(unique(actors), "actors", "must not contain duplicate actors");

    v
}
