//! PostgreSQL actor repository.

use crate::model::Actor;
use crate::store::{with_timeout, ActorStore, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

// array_agg over a LEFT JOIN with no link rows yields {NULL}; array_remove turns it into {}.
const SELECT_ACTOR: &str = r#"
    SELECT
        a.actor_id, a.full_name, a.gender, a.birth_date,
        array_remove(array_agg(ma.movie_id ORDER BY ma.movie_id), NULL) AS movie_ids
    FROM actors a
    LEFT JOIN movies_actors ma ON ma.actor_id = a.actor_id
    WHERE a.actor_id = $1
    GROUP BY a.actor_id
"#;

const SELECT_ACTORS: &str = r#"
    SELECT
        a.actor_id, a.full_name, a.gender, a.birth_date,
        array_remove(array_agg(ma.movie_id ORDER BY ma.movie_id), NULL) AS movie_ids
    FROM actors a
    LEFT JOIN movies_actors ma ON ma.actor_id = a.actor_id
    GROUP BY a.actor_id
    ORDER BY a.actor_id
"#;

#[derive(sqlx::FromRow)]
struct ActorRow {
    actor_id: i64,
    full_name: String,
    gender: String,
    birth_date: DateTime<Utc>,
    movie_ids: Vec<i64>,
}

impl TryFrom<ActorRow> for Actor {
    type Error = StoreError;

    fn try_from(row: ActorRow) -> Result<Self, Self::Error> {
        Ok(Actor {
            id: row.actor_id,
            full_name: row.full_name,
            gender: row.gender.parse().map_err(StoreError::InvalidData)?,
            birth_date: row.birth_date,
            movie_ids: row.movie_ids,
        })
    }
}

pub struct PgActorStore {
    pool: PgPool,
}

impl PgActorStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActorStore for PgActorStore {
    async fn insert(&self, actor: &Actor) -> Result<i64, StoreError> {
        with_timeout(async {
            let id: i64 = sqlx::query_scalar(
                "INSERT INTO actors (full_name, gender, birth_date) VALUES ($1, $2, $3) RETURNING actor_id",
            )
            .bind(&actor.full_name)
            .bind(actor.gender.as_str())
            .bind(actor.birth_date)
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::from_write)?;
            tracing::debug!(actor_id = id, "actor inserted");
            Ok(id)
        })
        .await
    }

    async fn get(&self, id: i64) -> Result<Actor, StoreError> {
        with_timeout(async {
            let row: Option<ActorRow> = sqlx::query_as(SELECT_ACTOR)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
            row.ok_or(StoreError::RecordNotFound)?.try_into()
        })
        .await
    }

    async fn get_all(&self) -> Result<Vec<Actor>, StoreError> {
        with_timeout(async {
            let rows: Vec<ActorRow> = sqlx::query_as(SELECT_ACTORS).fetch_all(&self.pool).await?;
            rows.into_iter().map(Actor::try_from).collect()
        })
        .await
    }

    async fn update(&self, actor: &Actor) -> Result<(), StoreError> {
        with_timeout(async {
            let result = sqlx::query(
                "UPDATE actors SET full_name = $1, gender = $2, birth_date = $3 WHERE actor_id = $4",
            )
            .bind(&actor.full_name)
            .bind(actor.gender.as_str())
            .bind(actor.birth_date)
            .bind(actor.id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_write)?;
            if result.rows_affected() == 0 {
                return Err(StoreError::RecordNotFound);
            }
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        with_timeout(async {
            // movies_actors rows go with it (ON DELETE CASCADE); movies stay.
            let result = sqlx::query("DELETE FROM actors WHERE actor_id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;
            if result.rows_affected() == 0 {
                return Err(StoreError::RecordNotFound);
            }
            tracing::debug!(actor_id = id, "actor deleted");
            Ok(())
        })
        .await
    }
}
