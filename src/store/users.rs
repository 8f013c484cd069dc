use crate::model::{Password, User};
use crate::store::{with_timeout, StoreError, UserStore};
use async_trait::async_trait;
use sqlx::PgPool;

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: i64,
    username: String,
    password_hash: String,
    role: String,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.user_id,
            name: row.username,
            password: Password::from_hash(row.password_hash),
            role: row.role.parse().map_err(StoreError::InvalidData)?,
        })
    }
}

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: &User) -> Result<i64, StoreError> {
        with_timeout(async {
            let id: i64 = sqlx::query_scalar(
                "INSERT INTO users (username, password_hash, role) VALUES ($1, $2, $3) RETURNING user_id",
            )
            .bind(&user.name)
            .bind(user.password.as_hash())
            .bind(user.role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::from_write)?;
            tracing::debug!(user_id = id, role = user.role.as_str(), "user inserted");
            Ok(id)
        })
        .await
    }

    async fn get(&self, name: &str) -> Result<User, StoreError> {
        with_timeout(async {
            let row: Option<UserRow> = sqlx::query_as(
                "SELECT user_id, username, password_hash, role FROM users WHERE username = $1",
            )
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
            row.ok_or(StoreError::RecordNotFound)?.try_into()
        })
        .await
    }
}
