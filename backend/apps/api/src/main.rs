//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; request errors render through
//! `kernel::error::AppError`.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use auth::domain::repository::{ActivationMailer, SessionStore, UserRepository};
use auth::{
    AuthAppState, AuthConfig, AuthorizationState, CredentialService, HttpMailer,
    InMemorySessionStore, LogMailer, PgUserRepository, PolicyEngine, RedisSessionStore,
    SigningKeys, TokenIssuer, auth_router, parse_algorithm, with_authorization,
};
use axum::{
    Json, Router, http,
    http::{Method, header},
    routing::get,
};
use platform::config::Env;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:31113";
const DEFAULT_POLICY_PATH: &str = "config/policy.json";
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:40922,http://127.0.0.1:40922";
const MAIL_RELAY_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything the router needs apart from the session store and mailer.
struct Components<U> {
    users: Arc<U>,
    tokens: Arc<TokenIssuer>,
    policy: Arc<PolicyEngine>,
    config: Arc<AuthConfig>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let env = Env::process();

    let config = AuthConfig::from_env(&env)?;
    tracing::info!(?config, "Auth configuration loaded");

    // Database connection
    let database_url = env.require("DATABASE_URL")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    let tokens = load_token_issuer(&env, &config).await?;

    let policy_path = env.or("POLICY_PATH", DEFAULT_POLICY_PATH);
    let policy_source = tokio::fs::read_to_string(&policy_path)
        .await
        .with_context(|| format!("Failed to read policy file {}", policy_path))?;
    let policy = PolicyEngine::from_json(&policy_source)
        .with_context(|| format!("Invalid policy file {}", policy_path))?;
    tracing::info!(path = %policy_path, rules = policy.len(), "Access policy loaded");

    let components = Components {
        users: Arc::new(PgUserRepository::new(pool)),
        tokens: Arc::new(tokens),
        policy: Arc::new(policy),
        config: Arc::new(config),
    };

    let mail_relay = env.get("MAIL_RELAY_URL");
    let app = match env.get("REDIS_URL") {
        Some(redis_url) => {
            let sessions =
                RedisSessionStore::connect(&redis_url, components.config.session_store_timeout)
                    .await
                    .context("Failed to connect to Redis")?;
            tracing::info!("Connected to Redis session store");
            with_mailer(components, Arc::new(sessions), mail_relay)?
        }
        None => {
            tracing::warn!("REDIS_URL is not set; sessions are kept in process memory");
            with_mailer(components, Arc::new(InMemorySessionStore::new()), mail_relay)?
        }
    };

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = env
        .list_or("FRONTEND_ORIGINS", DEFAULT_FRONTEND_ORIGINS)
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]));

    let app = app.layer(TraceLayer::new_for_http()).layer(cors);

    // Start server
    let addr: SocketAddr = env.parse_or("LISTEN_ADDR", DEFAULT_LISTEN_ADDR.parse()?)?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

async fn load_token_issuer(env: &Env, config: &AuthConfig) -> anyhow::Result<TokenIssuer> {
    let algorithm = parse_algorithm(&env.or("JWT_ALGORITHM", "EdDSA"))?;

    let access = SigningKeys::from_pem(
        algorithm,
        &read_key(env, "JWT_ACCESS_PRIVATE_KEY_PATH").await?,
        &read_key(env, "JWT_ACCESS_PUBLIC_KEY_PATH").await?,
    )
    .context("Access token keys")?;
    let refresh = SigningKeys::from_pem(
        algorithm,
        &read_key(env, "JWT_REFRESH_PRIVATE_KEY_PATH").await?,
        &read_key(env, "JWT_REFRESH_PUBLIC_KEY_PATH").await?,
    )
    .context("Refresh token keys")?;

    tracing::info!(algorithm = ?algorithm, "Token signing keys loaded");
    Ok(TokenIssuer::new(algorithm, access, refresh, config))
}

async fn read_key(env: &Env, name: &str) -> anyhow::Result<Vec<u8>> {
    let path = env.require(name)?;
    tokio::fs::read(Path::new(&path))
        .await
        .with_context(|| format!("Failed to read {} ({})", name, path))
}

fn with_mailer<U, S>(
    components: Components<U>,
    sessions: Arc<S>,
    mail_relay: Option<String>,
) -> anyhow::Result<Router>
where
    U: UserRepository + Sync + 'static,
    S: SessionStore + Sync + 'static,
{
    match mail_relay {
        Some(url) => {
            let mailer = HttpMailer::new(url, MAIL_RELAY_TIMEOUT)?;
            Ok(build_app(components, sessions, Arc::new(mailer)))
        }
        None => {
            let mailer = if cfg!(debug_assertions) {
                tracing::warn!(
                    "MAIL_RELAY_URL is not set; activation codes are logged at debug level"
                );
                LogMailer::revealing()
            } else {
                tracing::warn!(
                    "MAIL_RELAY_URL is not set; activation emails are dropped and new accounts cannot be activated"
                );
                LogMailer::default()
            };
            Ok(build_app(components, sessions, Arc::new(mailer)))
        }
    }
}

fn build_app<U, S, M>(components: Components<U>, sessions: Arc<S>, mailer: Arc<M>) -> Router
where
    U: UserRepository + Sync + 'static,
    S: SessionStore + Sync + 'static,
    M: ActivationMailer + Sync + 'static,
{
    let state = AuthAppState {
        users: components.users,
        sessions: sessions.clone(),
        mailer,
        credentials: CredentialService::new(&components.config),
        tokens: components.tokens.clone(),
        config: components.config,
    };

    let authorization = AuthorizationState {
        sessions,
        tokens: components.tokens,
        policy: components.policy,
    };

    let app = Router::new()
        .route("/health", get(health))
        .nest("/auth", auth_router(state));

    with_authorization(app, authorization)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
