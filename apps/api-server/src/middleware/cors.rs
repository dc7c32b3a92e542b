//! Cross-origin resource sharing.

use actix_cors::Cors;
use actix_web::http::header;

use crate::config::CorsSettings;

/// Build the CORS middleware. Preflights are answered before routing.
pub fn cors(settings: &CorsSettings) -> Cors {
    let cors = if settings.allows_any_origin() {
        Cors::default().allow_any_origin().send_wildcard()
    } else {
        settings
            .allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allowed_methods(["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers(["x-request-id", "x-ratelimit-remaining", "retry-after"])
        .max_age(3600)
}
