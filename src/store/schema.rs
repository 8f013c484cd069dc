//! Catalog table DDL and database bootstrap.

use crate::store::StoreError;
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::str::FromStr;

/// Idempotent DDL, applied in order. Link rows cascade from both sides.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS actors (
        actor_id BIGSERIAL PRIMARY KEY,
        full_name TEXT NOT NULL UNIQUE,
        gender TEXT NOT NULL CHECK (gender IN ('male', 'female')),
        birth_date TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS movies (
        movie_id BIGSERIAL PRIMARY KEY,
        title TEXT NOT NULL UNIQUE,
        description TEXT NOT NULL,
        release_date TIMESTAMPTZ NOT NULL,
        rating REAL NOT NULL CHECK (rating >= 0 AND rating <= 10)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS movies_actors (
        movie_id BIGINT NOT NULL REFERENCES movies (movie_id) ON DELETE CASCADE,
        actor_id BIGINT NOT NULL REFERENCES actors (actor_id) ON DELETE CASCADE,
        PRIMARY KEY (movie_id, actor_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS movies_actors_actor_id_idx ON movies_actors (actor_id)",
    r#"
    CREATE TABLE IF NOT EXISTS users (
        user_id BIGSERIAL PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'admin'))
    )
    "#,
];

/// Create the catalog tables if they do not exist.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    for ddl in SCHEMA {
        sqlx::query(ddl).execute(pool).await?;
    }
    tracing::debug!(statements = SCHEMA.len(), "schema ensured");
    Ok(())
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), StoreError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
        tracing::info!(database = %db_name, "database created");
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), StoreError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| StoreError::InvalidData("DATABASE_URL: no path".into()))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let mut parts = path_and_query.splitn(2, '?');
    let db_name = parts.next().unwrap_or("").trim();
    let query = parts.next().map(|q| format!("?{}", q)).unwrap_or_default();
    let base = url.get(..path_start).unwrap_or(url);
    Ok((format!("{}postgres{}", base, query), db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
