pub mod db;
pub mod email;
pub mod extractors;
pub mod handlers;
pub mod names;
pub mod rejections;
pub mod services;

use axum::Router;

use crate::email::ResendEmailSender;
use crate::services::auth::AuthService;

#[derive(Clone)]
pub struct AppState {
    pub db: db::Db,
    pub auth: AuthService,
}

impl AppState {
    pub fn new(
        db: db::Db,
        email: ResendEmailSender,
        jwt_secret: String,
        token_ttl_hours: u64,
    ) -> Self {
        let auth = AuthService::new(db.clone(), email, jwt_secret, token_ttl_hours);
        Self { db, auth }
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(handlers::auth::routes())
        .merge(handlers::child::routes())
        .merge(handlers::subject::routes())
        .merge(handlers::chapter::routes())
        .merge(handlers::payment::routes())
        .merge(handlers::quiz::routes());

    Router::new().nest("/api/v1", api).with_state(state)
}
