//! Shared harness: the full router over a seeded in-memory store.
#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{TimeZone, Utc};
use filmoteka::model::{Actor, Gender, Movie, Password, Role, User};
use filmoteka::{app, AppState, Config, Environment, LimiterConfig, Models};
use serde_json::Value;
use tower::ServiceExt;

pub const PASSWORD: &str = "password123";
pub const ADMIN: (&str, &str) = ("admin", PASSWORD);
pub const USER: (&str, &str) = ("user", PASSWORD);

pub struct TestApp {
    pub router: Router,
    pub models: Models,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// Seeded with users `user` and `admin`, actors 1 and 2, and movie 1 starring both.
pub async fn spawn_app() -> TestApp {
    spawn_app_with_limiter(LimiterConfig::default()).await
}

pub async fn spawn_app_with_limiter(limiter: LimiterConfig) -> TestApp {
    let models = Models::in_memory();
    seed(&models).await;
    let state = AppState::new(Config::without_database(Environment::Development, limiter), models.clone());
    TestApp {
        router: app(state),
        models,
    }
}

async fn seed(models: &Models) {
    let password = Password::hash(PASSWORD).unwrap();
    for (name, role) in [("user", Role::User), ("admin", Role::Admin)] {
        models
            .users
            .insert(&User {
                id: 0,
                name: name.into(),
                password: password.clone(),
                role,
            })
            .await
            .unwrap();
    }

    for (name, gender) in [("Mock Actor 1", Gender::Male), ("Mock Actor 2", Gender::Female)] {
        models
            .actors
            .insert(&Actor {
                id: 0,
                full_name: name.into(),
                gender,
                birth_date: Utc.with_ymd_and_hms(1980, 5, 1, 0, 0, 0).unwrap(),
                movie_ids: vec![],
            })
            .await
            .unwrap();
    }

    models
        .movies
        .insert(&Movie {
            id: 0,
            title: "Mock Movie 1".into(),
            description: "First mock movie".into(),
            release_date: Utc.with_ymd_and_hms(2001, 9, 1, 0, 0, 0).unwrap(),
            rating: 7.5,
            actor_ids: vec![1, 2],
        })
        .await
        .unwrap();
}

pub fn basic_auth((name, password): (&str, &str)) -> HeaderValue {
    let encoded = STANDARD.encode(format!("{}:{}", name, password));
    HeaderValue::from_str(&format!("Basic {}", encoded)).unwrap()
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        auth: Option<(&str, &str)>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(credentials) = auth {
            builder = builder.header(header::AUTHORIZATION, basic_auth(credentials));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).unwrap()).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        TestResponse { status, headers, body }
    }

    pub async fn get(&self, uri: &str, auth: Option<(&str, &str)>) -> TestResponse {
        self.request(Method::GET, uri, auth, None).await
    }

    pub async fn post(&self, uri: &str, auth: Option<(&str, &str)>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, auth, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, auth: Option<(&str, &str)>, body: Value) -> TestResponse {
        self.request(Method::PATCH, uri, auth, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, auth: Option<(&str, &str)>) -> TestResponse {
        self.request(Method::DELETE, uri, auth, None).await
    }
}

/// Ids of the movies in a `{"movies": [...]}` body, in order.
pub fn movie_ids(body: &Value) -> Vec<i64> {
    body["movies"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_i64().unwrap())
        .collect()
}
