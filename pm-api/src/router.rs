use axum::{http::Method, routing::get, Router};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::{app_state::AppState, config::Settings, routes};

pub fn create(app_state: AppState, config: &Settings) -> Router<()> {
    let app = Router::new()
        .route("/", get(|| async { "Construction PM API" }))
        .nest("/projects", routes::projects::router())
        .nest("/architects", routes::architects::router())
        .nest("/contractors", routes::contractors::router())
        .nest("/sync", routes::sync::router())
        .nest("/backups", routes::backups::router())
        .merge(routes::transfer::router());

    let allow_origin = match &config.application.app_url {
        Some(app_url) => AllowOrigin::exact(
            app_url
                .parse()
                .expect("application.app_url is not a valid origin"),
        ),
        None => AllowOrigin::any(),
    };
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(["content-type".parse().unwrap()])
        .allow_origin(allow_origin);

    app.with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
}
