pub mod health;

use axum::{
    routing::{get, MethodRouter},
    Router,
};

use crate::models::records::{Education, Experience, PersonalInfo, Record, Skill, SocialMedia};
use crate::resume::handlers;
use crate::spelling::handlers::handle_correct_spelling;
use crate::state::AppState;

/// GET, POST and DELETE for one collection. PUT is added per route.
fn collection_routes<R: Record>() -> MethodRouter<AppState> {
    get(handlers::handle_get::<R>)
        .post(handlers::handle_create::<R>)
        .delete(handlers::handle_delete::<R>)
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/test", get(health::hello_handler))
        // Resume API
        .route(
            "/resume/experience",
            collection_routes::<Experience>().put(handlers::handle_replace::<Experience>),
        )
        .route("/resume/education", collection_routes::<Education>())
        .route("/resume/skill", collection_routes::<Skill>())
        .route(
            "/resume/socialmedia",
            collection_routes::<SocialMedia>().put(handlers::handle_replace::<SocialMedia>),
        )
        .route("/resume/personalinfo", collection_routes::<PersonalInfo>())
        // Spelling API
        .route(
            "/spelling/correct-spelling",
            get(handle_correct_spelling).post(handle_correct_spelling),
        )
        .with_state(state)
}
