//! Persistence: actor, movie and user repositories.
//!
//! Handlers only see the [`ActorStore`], [`MovieStore`] and [`UserStore`] traits.
//! [`Models::postgres`] backs them with PostgreSQL; [`Models::in_memory`] with
//! a map-based fake that enforces the same integrity rules.

mod actors;
mod memory;
mod movies;
pub mod schema;
mod users;

use crate::model::{Actor, Filters, Movie, User};
use async_trait::async_trait;
use sqlx::PgPool;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub use actors::PgActorStore;
pub use memory::MemoryStore;
pub use movies::PgMovieStore;
pub use schema::{ensure_database_exists, ensure_schema};
pub use users::PgUserStore;

/// Upper bound for a single store operation, transaction included.
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record not found")]
    RecordNotFound,
    #[error("duplicate name")]
    DuplicateName,
    #[error("one or more actor IDs do not exist")]
    ActorsNotFound,
    #[error("query exceeded {0:?}")]
    Timeout(Duration),
    #[error("invalid stored value: {0}")]
    InvalidData(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
}

impl StoreError {
    /// Unique violations become `DuplicateName`; everything else stays a database error.
    fn from_write(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateName,
            _ => StoreError::Db(e),
        }
    }

    /// For link-table writes: a foreign-key violation means an actor vanished mid-write.
    fn from_link_write(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => StoreError::ActorsNotFound,
            _ => StoreError::Db(e),
        }
    }
}

/// Run `fut` under [`QUERY_TIMEOUT`]. Dropping an unfinished transaction rolls it back.
async fn with_timeout<T, F>(fut: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    tokio::time::timeout(QUERY_TIMEOUT, fut)
        .await
        .map_err(|_| StoreError::Timeout(QUERY_TIMEOUT))?
}

#[async_trait]
pub trait ActorStore: Send + Sync {
    /// Insert and return the new id. `actor.id` and `actor.movie_ids` are ignored.
    async fn insert(&self, actor: &Actor) -> Result<i64, StoreError>;
    async fn get(&self, id: i64) -> Result<Actor, StoreError>;
    async fn get_all(&self) -> Result<Vec<Actor>, StoreError>;
    /// Replace name, gender and birth date of `actor.id`.
    async fn update(&self, actor: &Actor) -> Result<(), StoreError>;
    /// Remove the actor and its cast entries. Movies are kept.
    async fn delete(&self, id: i64) -> Result<(), StoreError>;
}

#[async_trait]
pub trait MovieStore: Send + Sync {
    /// Insert the movie and its cast atomically; return the new id.
    async fn insert(&self, movie: &Movie) -> Result<i64, StoreError>;
    async fn get(&self, id: i64) -> Result<Movie, StoreError>;
    async fn get_all(&self, filters: &Filters) -> Result<Vec<Movie>, StoreError>;
    /// Replace scalar fields and the whole cast atomically.
    async fn update(&self, movie: &Movie) -> Result<(), StoreError>;
    async fn delete(&self, id: i64) -> Result<(), StoreError>;
    /// Movies whose title contains `title` and whose cast has an actor whose
    /// name contains `actor`, case-insensitively. Empty strings match anything.
    async fn search(&self, title: &str, actor: &str) -> Result<Vec<Movie>, StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: &User) -> Result<i64, StoreError>;
    async fn get(&self, name: &str) -> Result<User, StoreError>;
}

/// The set of repositories shared by all handlers.
#[derive(Clone)]
pub struct Models {
    pub actors: Arc<dyn ActorStore>,
    pub movies: Arc<dyn MovieStore>,
    pub users: Arc<dyn UserStore>,
}

impl Models {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            actors: Arc::new(PgActorStore::new(pool.clone())),
            movies: Arc::new(PgMovieStore::new(pool.clone())),
            users: Arc::new(PgUserStore::new(pool)),
        }
    }

    /// All three repositories share one in-memory database.
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            actors: store.clone(),
            movies: store.clone(),
            users: store,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn slow_operation_times_out() {
        let result: Result<(), StoreError> = with_timeout(async {
            tokio::time::sleep(QUERY_TIMEOUT * 2).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(StoreError::Timeout(d)) if d == QUERY_TIMEOUT));
    }

    #[tokio::test]
    async fn fast_operation_passes_through() {
        let result = with_timeout(async { Ok::<_, StoreError>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }
}
