//! PostgreSQL movie repository. Writes that touch the cast run in one transaction.

use crate::model::{Filters, Movie};
use crate::store::{with_timeout, MovieStore, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

const SELECT_MOVIE: &str = r#"
    SELECT
        m.movie_id, m.title, m.description, m.release_date, m.rating,
        array_remove(array_agg(ma.actor_id ORDER BY ma.actor_id), NULL) AS actor_ids
    FROM movies m
    LEFT JOIN movies_actors ma ON ma.movie_id = m.movie_id
    WHERE m.movie_id = $1
    GROUP BY m.movie_id
"#;

const SELECT_MOVIES_BY_IDS: &str = r#"
    SELECT
        m.movie_id, m.title, m.description, m.release_date, m.rating,
        array_remove(array_agg(ma.actor_id ORDER BY ma.actor_id), NULL) AS actor_ids
    FROM movies m
    LEFT JOIN movies_actors ma ON ma.movie_id = m.movie_id
    WHERE m.movie_id = ANY($1)
    GROUP BY m.movie_id
    ORDER BY m.movie_id
"#;

const SEARCH_MOVIE_IDS: &str = r#"
    SELECT DISTINCT m.movie_id
    FROM movies m
    LEFT JOIN movies_actors ma ON ma.movie_id = m.movie_id
    LEFT JOIN actors a ON a.actor_id = ma.actor_id
    WHERE ($1 = '' OR m.title ILIKE '%' || $1 || '%' ESCAPE '\')
      AND ($2 = '' OR a.full_name ILIKE '%' || $2 || '%' ESCAPE '\')
"#;

#[derive(sqlx::FromRow)]
struct MovieRow {
    movie_id: i64,
    title: String,
    description: String,
    release_date: DateTime<Utc>,
    rating: f32,
    actor_ids: Vec<i64>,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Movie {
            id: row.movie_id,
            title: row.title,
            description: row.description,
            release_date: row.release_date,
            rating: row.rating,
            actor_ids: row.actor_ids,
        }
    }
}

/// Backslash-escape LIKE metacharacters so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Fails on the first id with no actor row.
async fn ensure_actors_exist(conn: &mut PgConnection, actor_ids: &[i64]) -> Result<(), StoreError> {
    for id in actor_ids {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM actors WHERE actor_id = $1)")
            .bind(id)
            .fetch_one(&mut *conn)
            .await?;
        if !exists {
            tracing::debug!(actor_id = id, "cast references missing actor");
            return Err(StoreError::ActorsNotFound);
        }
    }
    Ok(())
}

async fn insert_links(conn: &mut PgConnection, movie_id: i64, actor_ids: &[i64]) -> Result<(), StoreError> {
    for actor_id in actor_ids {
        sqlx::query("INSERT INTO movies_actors (movie_id, actor_id) VALUES ($1, $2)")
            .bind(movie_id)
            .bind(actor_id)
            .execute(&mut *conn)
            .await
            .map_err(StoreError::from_link_write)?;
    }
    Ok(())
}

pub struct PgMovieStore {
    pool: PgPool,
}

impl PgMovieStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MovieStore for PgMovieStore {
    async fn insert(&self, movie: &Movie) -> Result<i64, StoreError> {
        with_timeout(async {
            let mut tx = self.pool.begin().await?;
            ensure_actors_exist(&mut tx, &movie.actor_ids).await?;
            let id: i64 = sqlx::query_scalar(
                "INSERT INTO movies (title, description, release_date, rating) VALUES ($1, $2, $3, $4) RETURNING movie_id",
            )
            .bind(&movie.title)
            .bind(&movie.description)
            .bind(movie.release_date)
            .bind(movie.rating)
            .fetch_one(&mut *tx)
            .await
            .map_err(StoreError::from_write)?;
            insert_links(&mut tx, id, &movie.actor_ids).await?;
            tx.commit().await?;
            tracing::debug!(movie_id = id, actors = movie.actor_ids.len(), "movie inserted");
            Ok(id)
        })
        .await
    }

    async fn get(&self, id: i64) -> Result<Movie, StoreError> {
        with_timeout(async {
            let row: Option<MovieRow> = sqlx::query_as(SELECT_MOVIE)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
            row.map(Movie::from).ok_or(StoreError::RecordNotFound)
        })
        .await
    }

    async fn get_all(&self, filters: &Filters) -> Result<Vec<Movie>, StoreError> {
        let sql = format!(
            r#"
            SELECT
                m.movie_id, m.title, m.description, m.release_date, m.rating,
                array_remove(array_agg(ma.actor_id ORDER BY ma.actor_id), NULL) AS actor_ids
            FROM movies m
            LEFT JOIN movies_actors ma ON ma.movie_id = m.movie_id
            GROUP BY m.movie_id
            ORDER BY m.{} {}, m.movie_id ASC
            "#,
            filters.sort_column(),
            filters.sort_direction()
        );
        with_timeout(async {
            let rows: Vec<MovieRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
            Ok(rows.into_iter().map(Movie::from).collect())
        })
        .await
    }

    async fn update(&self, movie: &Movie) -> Result<(), StoreError> {
        with_timeout(async {
            let mut tx = self.pool.begin().await?;
            ensure_actors_exist(&mut tx, &movie.actor_ids).await?;
            let result = sqlx::query(
                "UPDATE movies SET title = $1, description = $2, release_date = $3, rating = $4 WHERE movie_id = $5",
            )
            .bind(&movie.title)
            .bind(&movie.description)
            .bind(movie.release_date)
            .bind(movie.rating)
            .bind(movie.id)
            .execute(&mut *tx)
            .await
            .map_err(StoreError::from_write)?;
            if result.rows_affected() == 0 {
                return Err(StoreError::RecordNotFound);
            }
            sqlx::query("DELETE FROM movies_actors WHERE movie_id = $1")
                .bind(movie.id)
                .execute(&mut *tx)
                .await?;
            insert_links(&mut tx, movie.id, &movie.actor_ids).await?;
            tx.commit().await?;
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        with_timeout(async {
            let result = sqlx::query("DELETE FROM movies WHERE movie_id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;
            if result.rows_affected() == 0 {
                return Err(StoreError::RecordNotFound);
            }
            tracing::debug!(movie_id = id, "movie deleted");
            Ok(())
        })
        .await
    }

    async fn search(&self, title: &str, actor: &str) -> Result<Vec<Movie>, StoreError> {
        let title = escape_like(title);
        let actor = escape_like(actor);
        with_timeout(async {
            let ids: Vec<i64> = sqlx::query_scalar(SEARCH_MOVIE_IDS)
                .bind(&title)
                .bind(&actor)
                .fetch_all(&self.pool)
                .await?;
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            let rows: Vec<MovieRow> = sqlx::query_as(SELECT_MOVIES_BY_IDS)
                .bind(&ids)
                .fetch_all(&self.pool)
                .await?;
            Ok(rows.into_iter().map(Movie::from).collect())
        })
        .await
    }
}
