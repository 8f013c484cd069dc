use crate::error::ErrorBody;
use crate::handlers::users::RegisterUser;
use crate::model::{Actor, ActorDraft, Gender, Movie, MovieDraft, Role, User};
use crate::response::{
    ActorResponse, ActorsResponse, HealthResponse, MessageResponse, MovieResponse, MoviesResponse, SystemInfo,
    UserResponse,
};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub const BASIC_AUTH_SCHEME: &str = "basic_auth";

struct BasicAuth;

impl Modify for BasicAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            BASIC_AUTH_SCHEME,
            SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Filmoteka", description = "Movie catalog: actors, movies and users"),
    paths(
        crate::handlers::healthcheck::healthcheck,
        crate::handlers::users::register_user,
        crate::handlers::actors::create_actor,
        crate::handlers::actors::list_actors,
        crate::handlers::actors::get_actor,
        crate::handlers::actors::update_actor,
        crate::handlers::actors::delete_actor,
        crate::handlers::movies::create_movie,
        crate::handlers::movies::list_movies,
        crate::handlers::movies::get_movie,
        crate::handlers::movies::update_movie,
        crate::handlers::movies::delete_movie,
        crate::handlers::movies::search_movies,
    ),
    components(schemas(
        Actor,
        ActorDraft,
        Gender,
        Movie,
        MovieDraft,
        User,
        Role,
        RegisterUser,
        ActorResponse,
        ActorsResponse,
        MovieResponse,
        MoviesResponse,
        UserResponse,
        MessageResponse,
        HealthResponse,
        SystemInfo,
        ErrorBody,
    )),
    modifiers(&BasicAuth),
    tags(
        (name = "healthcheck", description = "Service status"),
        (name = "users", description = "Registration"),
        (name = "actors", description = "Actors and the movies they appear in"),
        (name = "movies", description = "Movies, their cast, sorting and search"),
    )
)]
pub struct ApiDoc;
