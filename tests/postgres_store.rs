//! Store behaviour against a real PostgreSQL. Run with
//! `DATABASE_URL=postgres://... cargo test --test postgres_store -- --ignored`.

use chrono::{TimeZone, Utc};
use filmoteka::model::{Actor, Filters, Gender, Movie, Password, Role, User};
use filmoteka::{ensure_database_exists, ensure_schema, Models, StoreError};
use std::time::{SystemTime, UNIX_EPOCH};

async fn models() -> Option<Models> {
    let url = std::env::var("DATABASE_URL").ok()?;
    ensure_database_exists(&url).await.unwrap();
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .unwrap();
    ensure_schema(&pool).await.unwrap();
    Some(Models::postgres(pool))
}

/// Names are unique per run so tests can share one database.
fn unique(prefix: &str) -> String {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    format!("{} {}", prefix, nanos)
}

fn actor(name: &str) -> Actor {
    Actor {
        id: 0,
        full_name: name.to_string(),
        gender: Gender::Male,
        birth_date: Utc.with_ymd_and_hms(1960, 1, 1, 0, 0, 0).unwrap(),
        movie_ids: vec![],
    }
}

fn movie(title: &str, rating: f32, actor_ids: Vec<i64>) -> Movie {
    Movie {
        id: 0,
        title: title.to_string(),
        description: "description".to_string(),
        release_date: Utc.with_ymd_and_hms(1999, 1, 1, 0, 0, 0).unwrap(),
        rating,
        actor_ids,
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn actor_without_movies_has_empty_list() {
    let Some(models) = models().await else { return };
    let name = unique("Lonely Actor");
    let id = models.actors.insert(&actor(&name)).await.unwrap();
    let stored = models.actors.get(id).await.unwrap();
    assert_eq!(stored.full_name, name);
    assert!(stored.movie_ids.is_empty());

    let err = models.actors.insert(&actor(&name)).await.unwrap_err();
    assert!(matches!(err, StoreError::DuplicateName));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn movie_with_missing_actor_is_rolled_back() {
    let Some(models) = models().await else { return };
    let a = models.actors.insert(&actor(&unique("Cast"))).await.unwrap();
    let title = unique("Rolled Back");
    let err = models
        .movies
        .insert(&movie(&title, 5.0, vec![a, i64::MAX]))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::ActorsNotFound));
    assert!(models.movies.search(&title, "").await.unwrap().is_empty());
    assert!(models.actors.get(a).await.unwrap().movie_ids.is_empty());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn update_replaces_cast_and_delete_actor_keeps_movie() {
    let Some(models) = models().await else { return };
    let a = models.actors.insert(&actor(&unique("First"))).await.unwrap();
    let b = models.actors.insert(&actor(&unique("Second"))).await.unwrap();
    let title = unique("Recast");
    let id = models.movies.insert(&movie(&title, 6.0, vec![a, b])).await.unwrap();
    assert_eq!(models.movies.get(id).await.unwrap().actor_ids, vec![a, b]);

    let mut updated = movie(&title, 7.0, vec![b]);
    updated.id = id;
    models.movies.update(&updated).await.unwrap();
    let stored = models.movies.get(id).await.unwrap();
    assert_eq!(stored.actor_ids, vec![b]);
    assert_eq!(stored.rating, 7.0);

    models.actors.delete(b).await.unwrap();
    let stored = models.movies.get(id).await.unwrap();
    assert!(stored.actor_ids.is_empty());
    assert_eq!(models.movies.search(&title, "").await.unwrap().len(), 1);

    models.movies.delete(id).await.unwrap();
    assert!(matches!(models.movies.get(id).await, Err(StoreError::RecordNotFound)));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn ordering_and_search() {
    let Some(models) = models().await else { return };
    let tag = unique("tag");
    let star = models.actors.insert(&actor(&format!("Star {}", tag))).await.unwrap();
    let low = models.movies.insert(&movie(&format!("B {}", tag), 2.0, vec![star])).await.unwrap();
    let high = models.movies.insert(&movie(&format!("A {}", tag), 9.0, vec![star])).await.unwrap();

    let ours = |movies: Vec<Movie>| {
        movies
            .into_iter()
            .filter(|m| m.id == low || m.id == high)
            .map(|m| m.id)
            .collect::<Vec<_>>()
    };
    assert_eq!(ours(models.movies.get_all(&Filters::movies("-rating")).await.unwrap()), vec![high, low]);
    assert_eq!(ours(models.movies.get_all(&Filters::movies("rating")).await.unwrap()), vec![low, high]);
    assert_eq!(ours(models.movies.get_all(&Filters::movies("title")).await.unwrap()), vec![high, low]);

    let found = models.movies.search("", &format!("star {}", tag).to_uppercase()).await.unwrap();
    assert_eq!(found.iter().map(|m| m.id).collect::<Vec<_>>(), vec![low, high]);
    assert!(models.movies.search("100%", "").await.unwrap().iter().all(|m| m.title.contains("100%")));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn users_round_trip_with_hash() {
    let Some(models) = models().await else { return };
    let name = unique("user");
    let user = User {
        id: 0,
        name: name.clone(),
        password: Password::hash("password123").unwrap(),
        role: Role::Admin,
    };
    let id = models.users.insert(&user).await.unwrap();
    let stored = models.users.get(&name).await.unwrap();
    assert_eq!(stored.id, id);
    assert_eq!(stored.role, Role::Admin);
    assert!(stored.password.matches("password123").unwrap());
    assert!(matches!(models.users.insert(&user).await, Err(StoreError::DuplicateName)));
    assert!(matches!(models.users.get(&unique("ghost")).await, Err(StoreError::RecordNotFound)));
}
