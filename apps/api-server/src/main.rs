//! # Quill API Server
//!
//! The main entry point for the Actix-web HTTP server.

use std::sync::Arc;

use actix_web::middleware::Condition;
use actix_web::{App, HttpServer, web};
use anyhow::Context;
use tracing_actix_web::TracingLogger;

use quill_core::ports::{PasswordService, RateLimiter, TokenService};
use quill_infra::{Argon2PasswordService, InMemoryRateLimiter, JwtTokenService};

mod config;
mod handlers;
mod middleware;
mod observability;
mod state;
mod telemetry;

use config::AppConfig;
use middleware::rate_limit::RateLimitMiddleware;
use observability::RequestIdMiddleware;
use state::AppState;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    telemetry::init_telemetry(&config.telemetry);
    config.warn_on_insecure_defaults();

    tracing::info!("Starting Quill API Server on {}:{}", config.host, config.port);

    let state = AppState::new(&config).await;

    let token_service: Arc<dyn TokenService> =
        Arc::new(JwtTokenService::new(config.auth.jwt.clone()));
    let password_service: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());
    let limiter: Arc<dyn RateLimiter> = Arc::new(
        InMemoryRateLimiter::new(config.rate_limit.quota.clone())
            .context("invalid rate limit configuration")?,
    );
    let rate_limit_enabled = config.rate_limit.enabled;
    let cors_settings = config.cors.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(Condition::new(
                rate_limit_enabled,
                RateLimitMiddleware::new(limiter.clone()),
            ))
            .wrap(TracingLogger::default())
            .wrap(middleware::cors::cors(&cors_settings))
            .wrap(RequestIdMiddleware)
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(token_service.clone()))
            .app_data(web::Data::new(password_service.clone()))
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))
    .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?
    .run()
    .await?;

    Ok(())
}
