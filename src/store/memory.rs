//! Map-backed implementation of all three stores, used by tests and local runs
//! without PostgreSQL. Mirrors the integrity rules of the SQL schema: unique
//! names, cascading link removal and all-or-nothing movie writes.

use crate::model::{Actor, Filters, Movie, User};
use crate::store::{ActorStore, MovieStore, StoreError, UserStore};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct MemoryDb {
    actors: BTreeMap<i64, Actor>,
    movies: BTreeMap<i64, Movie>,
    /// (movie_id, actor_id)
    links: BTreeSet<(i64, i64)>,
    users: BTreeMap<i64, User>,
    next_actor_id: i64,
    next_movie_id: i64,
    next_user_id: i64,
}

impl MemoryDb {
    fn actor_with_movies(&self, actor: &Actor) -> Actor {
        let movie_ids = self
            .links
            .iter()
            .filter(|(_, actor_id)| *actor_id == actor.id)
            .map(|(movie_id, _)| *movie_id)
            .collect();
        Actor {
            movie_ids,
            ..actor.clone()
        }
    }

    fn movie_with_actors(&self, movie: &Movie) -> Movie {
        let actor_ids = self
            .links
            .range((movie.id, i64::MIN)..=(movie.id, i64::MAX))
            .map(|(_, actor_id)| *actor_id)
            .collect();
        Movie {
            actor_ids,
            ..movie.clone()
        }
    }

    fn ensure_actors_exist(&self, actor_ids: &[i64]) -> Result<(), StoreError> {
        if actor_ids.iter().all(|id| self.actors.contains_key(id)) {
            Ok(())
        } else {
            Err(StoreError::ActorsNotFound)
        }
    }

    fn title_taken(&self, title: &str, except: i64) -> bool {
        self.movies.values().any(|m| m.id != except && m.title == title)
    }

    fn replace_links(&mut self, movie_id: i64, actor_ids: &[i64]) {
        self.links.retain(|(m, _)| *m != movie_id);
        self.links.extend(actor_ids.iter().map(|a| (movie_id, *a)));
    }
}

pub struct MemoryStore {
    db: RwLock<MemoryDb>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            db: RwLock::new(MemoryDb {
                next_actor_id: 1,
                next_movie_id: 1,
                next_user_id: 1,
                ..MemoryDb::default()
            }),
        }
    }

    // Every write validates before mutating, so a poisoned lock still guards consistent data.
    fn read(&self) -> RwLockReadGuard<'_, MemoryDb> {
        self.db.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, MemoryDb> {
        self.db.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn compare_movies(a: &Movie, b: &Movie, filters: &Filters) -> Ordering {
    let by_column = match filters.sort_column() {
        "title" => a.title.cmp(&b.title),
        "rating" => a.rating.total_cmp(&b.rating),
        "release_date" => a.release_date.cmp(&b.release_date),
        _ => a.id.cmp(&b.id),
    };
    let by_column = if filters.descending() {
        by_column.reverse()
    } else {
        by_column
    };
    by_column.then(a.id.cmp(&b.id))
}

#[async_trait]
impl ActorStore for MemoryStore {
    async fn insert(&self, actor: &Actor) -> Result<i64, StoreError> {
        let mut db = self.write();
        if db.actors.values().any(|a| a.full_name == actor.full_name) {
            return Err(StoreError::DuplicateName);
        }
        let id = db.next_actor_id;
        db.next_actor_id += 1;
        db.actors.insert(
            id,
            Actor {
                id,
                movie_ids: Vec::new(),
                ..actor.clone()
            },
        );
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Actor, StoreError> {
        let db = self.read();
        db.actors
            .get(&id)
            .map(|a| db.actor_with_movies(a))
            .ok_or(StoreError::RecordNotFound)
    }

    async fn get_all(&self) -> Result<Vec<Actor>, StoreError> {
        let db = self.read();
        Ok(db.actors.values().map(|a| db.actor_with_movies(a)).collect())
    }

    async fn update(&self, actor: &Actor) -> Result<(), StoreError> {
        let mut db = self.write();
        if !db.actors.contains_key(&actor.id) {
            return Err(StoreError::RecordNotFound);
        }
        if db
            .actors
            .values()
            .any(|a| a.id != actor.id && a.full_name == actor.full_name)
        {
            return Err(StoreError::DuplicateName);
        }
        if let Some(stored) = db.actors.get_mut(&actor.id) {
            stored.full_name = actor.full_name.clone();
            stored.gender = actor.gender;
            stored.birth_date = actor.birth_date;
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut db = self.write();
        if db.actors.remove(&id).is_none() {
            return Err(StoreError::RecordNotFound);
        }
        db.links.retain(|(_, actor_id)| *actor_id != id);
        Ok(())
    }
}

#[async_trait]
impl MovieStore for MemoryStore {
    async fn insert(&self, movie: &Movie) -> Result<i64, StoreError> {
        let mut db = self.write();
        db.ensure_actors_exist(&movie.actor_ids)?;
        if db.title_taken(&movie.title, 0) {
            return Err(StoreError::DuplicateName);
        }
        let id = db.next_movie_id;
        db.next_movie_id += 1;
        db.movies.insert(
            id,
            Movie {
                id,
                actor_ids: Vec::new(),
                ..movie.clone()
            },
        );
        db.replace_links(id, &movie.actor_ids);
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Movie, StoreError> {
        let db = self.read();
        db.movies
            .get(&id)
            .map(|m| db.movie_with_actors(m))
            .ok_or(StoreError::RecordNotFound)
    }

    async fn get_all(&self, filters: &Filters) -> Result<Vec<Movie>, StoreError> {
        let db = self.read();
        let mut movies: Vec<Movie> = db.movies.values().map(|m| db.movie_with_actors(m)).collect();
        movies.sort_by(|a, b| compare_movies(a, b, filters));
        Ok(movies)
    }

    async fn update(&self, movie: &Movie) -> Result<(), StoreError> {
        let mut db = self.write();
        db.ensure_actors_exist(&movie.actor_ids)?;
        if !db.movies.contains_key(&movie.id) {
            return Err(StoreError::RecordNotFound);
        }
        if db.title_taken(&movie.title, movie.id) {
            return Err(StoreError::DuplicateName);
        }
        db.movies.insert(
            movie.id,
            Movie {
                actor_ids: Vec::new(),
                ..movie.clone()
            },
        );
        db.replace_links(movie.id, &movie.actor_ids);
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut db = self.write();
        if db.movies.remove(&id).is_none() {
            return Err(StoreError::RecordNotFound);
        }
        db.links.retain(|(movie_id, _)| *movie_id != id);
        Ok(())
    }

    async fn search(&self, title: &str, actor: &str) -> Result<Vec<Movie>, StoreError> {
        let title = title.to_lowercase();
        let actor = actor.to_lowercase();
        let db = self.read();
        let found = db
            .movies
            .values()
            .filter(|m| m.title.to_lowercase().contains(&title))
            .map(|m| db.movie_with_actors(m))
            .filter(|m| {
                actor.is_empty()
                    || m.actor_ids.iter().any(|id| {
                        db.actors
                            .get(id)
                            .is_some_and(|a| a.full_name.to_lowercase().contains(&actor))
                    })
            })
            .collect();
        Ok(found)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, user: &User) -> Result<i64, StoreError> {
        let mut db = self.write();
        if db.users.values().any(|u| u.name == user.name) {
            return Err(StoreError::DuplicateName);
        }
        let id = db.next_user_id;
        db.next_user_id += 1;
        db.users.insert(id, User { id, ..user.clone() });
        Ok(id)
    }

    async fn get(&self, name: &str) -> Result<User, StoreError> {
        self.read()
            .users
            .values()
            .find(|u| u.name == name)
            .cloned()
            .ok_or(StoreError::RecordNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Gender, Password, Role};
    use chrono::{TimeZone, Utc};

    fn actor(name: &str) -> Actor {
        Actor {
            id: 0,
            full_name: name.into(),
            gender: Gender::Female,
            birth_date: Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap(),
            movie_ids: vec![],
        }
    }

    fn movie(title: &str, rating: f32, actor_ids: Vec<i64>) -> Movie {
        Movie {
            id: 0,
            title: title.into(),
            description: "description".into(),
            release_date: Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap(),
            rating,
            actor_ids,
        }
    }

    #[tokio::test]
    async fn duplicate_actor_leaves_store_unchanged() {
        let store = MemoryStore::new();
        ActorStore::insert(&store, &actor("Anna")).await.unwrap();
        let err = ActorStore::insert(&store, &actor("Anna")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateName));
        assert_eq!(ActorStore::get_all(&store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn movie_with_unknown_actor_is_not_created() {
        let store = MemoryStore::new();
        let a = ActorStore::insert(&store, &actor("Anna")).await.unwrap();
        let err = MovieStore::insert(&store, &movie("M", 5.0, vec![a, 99])).await.unwrap_err();
        assert!(matches!(err, StoreError::ActorsNotFound));
        assert!(MovieStore::get_all(&store, &Filters::movies("title")).await.unwrap().is_empty());
        assert!(ActorStore::get(&store, a).await.unwrap().movie_ids.is_empty());
    }

    #[tokio::test]
    async fn links_are_visible_from_both_sides() {
        let store = MemoryStore::new();
        let a = ActorStore::insert(&store, &actor("Anna")).await.unwrap();
        let b = ActorStore::insert(&store, &actor("Boris")).await.unwrap();
        let m = MovieStore::insert(&store, &movie("M", 5.0, vec![b, a])).await.unwrap();
        assert_eq!(MovieStore::get(&store, m).await.unwrap().actor_ids, vec![a, b]);
        assert_eq!(ActorStore::get(&store, b).await.unwrap().movie_ids, vec![m]);
    }

    #[tokio::test]
    async fn deleting_actor_keeps_movie() {
        let store = MemoryStore::new();
        let a = ActorStore::insert(&store, &actor("Anna")).await.unwrap();
        let m = MovieStore::insert(&store, &movie("M", 5.0, vec![a])).await.unwrap();
        ActorStore::delete(&store, a).await.unwrap();
        let kept = MovieStore::get(&store, m).await.unwrap();
        assert!(kept.actor_ids.is_empty());
    }

    #[tokio::test]
    async fn update_replaces_cast() {
        let store = MemoryStore::new();
        let a = ActorStore::insert(&store, &actor("Anna")).await.unwrap();
        let b = ActorStore::insert(&store, &actor("Boris")).await.unwrap();
        let m = MovieStore::insert(&store, &movie("M", 5.0, vec![a])).await.unwrap();
        let mut updated = movie("M2", 6.0, vec![b]);
        updated.id = m;
        MovieStore::update(&store, &updated).await.unwrap();
        let got = MovieStore::get(&store, m).await.unwrap();
        assert_eq!(got.title, "M2");
        assert_eq!(got.actor_ids, vec![b]);
        assert!(ActorStore::get(&store, a).await.unwrap().movie_ids.is_empty());
    }

    #[tokio::test]
    async fn ordering_follows_filters_with_id_tie_break() {
        let store = MemoryStore::new();
        let a = ActorStore::insert(&store, &actor("Anna")).await.unwrap();
        let low = MovieStore::insert(&store, &movie("B", 3.0, vec![a])).await.unwrap();
        let high = MovieStore::insert(&store, &movie("A", 9.0, vec![a])).await.unwrap();
        let tied = MovieStore::insert(&store, &movie("C", 9.0, vec![a])).await.unwrap();

        let ids = |movies: Vec<Movie>| movies.into_iter().map(|m| m.id).collect::<Vec<_>>();
        let by_rating = MovieStore::get_all(&store, &Filters::movies("-rating")).await.unwrap();
        assert_eq!(ids(by_rating), vec![high, tied, low]);
        let by_title = MovieStore::get_all(&store, &Filters::movies("title")).await.unwrap();
        assert_eq!(ids(by_title), vec![high, low, tied]);
    }

    #[tokio::test]
    async fn search_is_case_insensitive_on_both_filters() {
        let store = MemoryStore::new();
        let a = ActorStore::insert(&store, &actor("Natalya Bondarchuk")).await.unwrap();
        let b = ActorStore::insert(&store, &actor("Donatas Banionis")).await.unwrap();
        let solaris = MovieStore::insert(&store, &movie("Solaris", 8.0, vec![a, b])).await.unwrap();
        MovieStore::insert(&store, &movie("Stalker", 8.0, vec![b])).await.unwrap();

        let found = MovieStore::search(&store, "SOL", "").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, solaris);

        let found = MovieStore::search(&store, "", "bondar").await.unwrap();
        assert_eq!(found.len(), 1);

        assert_eq!(MovieStore::search(&store, "", "banionis").await.unwrap().len(), 2);
        assert!(MovieStore::search(&store, "stalker", "bondar").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn users_are_unique_by_name() {
        let store = MemoryStore::new();
        let user = User {
            id: 0,
            name: "alice".into(),
            password: Password::from_hash("$argon2id$x"),
            role: Role::User,
        };
        let id = UserStore::insert(&store, &user).await.unwrap();
        assert_eq!(UserStore::get(&store, "alice").await.unwrap().id, id);
        assert!(matches!(
            UserStore::insert(&store, &user).await,
            Err(StoreError::DuplicateName)
        ));
        assert!(matches!(
            UserStore::get(&store, "bob").await,
            Err(StoreError::RecordNotFound)
        ));
    }
}
