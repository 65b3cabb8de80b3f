//! User service entry-point: loads settings, wires PostgreSQL and the message
//! broker into the HTTP adapter, and drives the server until shutdown.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), forbid(clippy::expect_used))]

mod server;

use std::sync::Arc;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{error, info, warn};

use server::{ServerConfig, create_server};
use user_service::config::AppSettings;
use user_service::domain::UserService;
use user_service::domain::ports::{DisabledEventPublisher, UserEventPublisher};
use user_service::inbound::http::health::HealthState;
use user_service::inbound::http::state::HttpState;
use user_service::outbound::events::{AmqpEventPublisher, EventSubscriber, USER_EVENTS_EXCHANGE};
use user_service::outbound::persistence::{
    DbPool, DieselUserRepository, PoolConfig, run_migrations_blocking,
};
use user_service::telemetry::init_tracing;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let settings = AppSettings::load()
        .map_err(|err| std::io::Error::other(format!("failed to load settings: {err}")))?;
    init_tracing(settings.log_level());
    info!(app_name = settings.app_name(), "application starting");

    let bind_addr = ServerConfig::parse_bind_addr(settings.bind_addr())?;

    run_migrations_blocking(settings.database_url().to_owned())
        .await
        .map_err(|err| {
            error!(error = %err, "database initialisation failed");
            std::io::Error::other(err.to_string())
        })?;
    let pool = DbPool::new(PoolConfig::new(settings.database_url()))
        .await
        .map_err(|err| {
            error!(error = %err, "database pool creation failed");
            std::io::Error::other(err.to_string())
        })?;
    let users = Arc::new(UserService::new(Arc::new(DieselUserRepository::new(pool))));

    let publisher =
        match AmqpEventPublisher::connect(settings.rabbitmq_url(), USER_EVENTS_EXCHANGE).await {
            Ok(publisher) => Some(Arc::new(publisher)),
            Err(err) => {
                warn!(error = %err, "event publisher unavailable; events will be dropped");
                None
            }
        };
    let events: Arc<dyn UserEventPublisher> = match &publisher {
        Some(publisher) => publisher.clone(),
        None => Arc::new(DisabledEventPublisher),
    };

    let subscriber = match EventSubscriber::setup(
        settings.rabbitmq_url(),
        USER_EVENTS_EXCHANGE,
        settings.events_queue(),
    )
    .await
    {
        Ok(subscriber) => Some(subscriber),
        Err(err) => {
            warn!(error = %err, "event subscriber unavailable");
            None
        }
    };

    let health_state = web::Data::new(HealthState::new());
    let http_state = web::Data::new(HttpState::new(users, events));
    let server = create_server(
        health_state.clone(),
        http_state,
        ServerConfig::new(bind_addr, settings.app_name()),
    )?;
    info!(bind_addr = %bind_addr, "application started");

    let outcome = server.await;

    health_state.mark_unhealthy();
    if let Some(subscriber) = subscriber {
        if let Err(err) = subscriber.teardown().await {
            error!(error = %err, "event subscriber teardown failed");
        }
    }
    if let Some(publisher) = publisher {
        if let Err(err) = publisher.close().await {
            error!(error = %err, "event publisher close failed");
        }
    }
    info!("application shutdown");

    outcome
}
