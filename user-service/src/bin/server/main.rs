use std::sync::Arc;

use auth::Authenticator;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use user_service::config::Config;
use user_service::domain::auth::models::EmailSettings;
use user_service::domain::auth::ports::EmailDispatcher;
use user_service::domain::auth::service::AuthService;
use user_service::inbound::http::router::create_router;
use user_service::outbound::email::KafkaEmailDispatcher;
use user_service::outbound::email::LogEmailDispatcher;
use user_service::outbound::repositories::InMemoryUserRepository;
use user_service::outbound::repositories::PostgresUserRepository;
use user_service::user::models::EmailAddress;
use user_service::user::ports::UserRepository;
use user_service::user::ports::UserServicePort;
use user_service::user::service::UserService;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "user_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "user-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        environment = ?config.environment,
        http_port = config.server.http_port,
        email_enabled = config.email.enabled,
        hash_cost = config.auth.hash_cost,
        "Configuration loaded"
    );

    let repository = user_repository(&config).await?;
    let dispatcher = email_dispatcher(&config)?;

    let authenticator = Arc::new(Authenticator::new(
        config.auth.secret_key.as_bytes(),
        config.auth.hash_cost,
        config.auth.lifetimes(),
    )?);

    let user_service = Arc::new(UserService::new(
        Arc::clone(&repository),
        auth::PasswordHasher::with_cost(config.auth.hash_cost)?,
    ));
    let auth_service = Arc::new(AuthService::new(
        repository,
        dispatcher,
        authenticator,
        EmailSettings::new(&config.email.project_name, &config.email.server_host),
    ));

    if let Some(superuser) = &config.first_superuser {
        let email = EmailAddress::new(superuser.email.clone())?;
        let user = user_service
            .ensure_superuser(email, &superuser.password)
            .await?;
        tracing::info!(user_id = %user.id, "First superuser ready");
    }

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(auth_service, user_service);
    axum::serve(http_listener, http_application).await?;

    tracing::info!("Server exited successfully");
    Ok(())
}

/// The `test` environment keeps users in memory. Every other environment uses PostgreSQL.
async fn user_repository(config: &Config) -> Result<Arc<dyn UserRepository>, anyhow::Error> {
    if config.environment.uses_in_memory_store() {
        tracing::warn!(database = "memory", "Using in-memory credential store");
        return Ok(Arc::new(InMemoryUserRepository::new()));
    }

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = 5,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    Ok(Arc::new(PostgresUserRepository::new(pg_pool)))
}

fn email_dispatcher(config: &Config) -> Result<Arc<dyn EmailDispatcher>, anyhow::Error> {
    if !config.email.enabled {
        tracing::warn!("Email delivery disabled, jobs will only be logged");
        return Ok(Arc::new(LogEmailDispatcher));
    }

    Ok(Arc::new(KafkaEmailDispatcher::new(config)?))
}
