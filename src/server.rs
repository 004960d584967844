//! Server runtime.
//!
//! [`ServerHandle`] owns the lifecycle: metrics recorder, storage and
//! migrations, service wiring, the HTTP listener and graceful shutdown.

use std::sync::{Arc, OnceLock};
use std::time::Instant;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use tracing::{error, info, warn};

use crate::application::{
    AccountAdminService, AccountSettings, LoginService, PasswordResetService, ResetSettings,
};
use crate::config::{AppConfig, StorageKind};
use crate::domain::UserRepositoryInterface;
use crate::infrastructure::{
    init_database, run_migrations, DatabaseConfig, InMemoryUserRepository, JwtConfig,
    JwtSessionIssuer, LogMailer, RolePolicy, UserRepository,
};
use crate::interfaces::http::middleware::{AuthState, TransportPolicy};
use crate::interfaces::http::modules::health::HealthState;
use crate::interfaces::http::modules::metrics::MetricsState;
use crate::interfaces::http::{create_router, AppState};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Options for starting the server.
pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
        }
    }
}

/// The global recorder can only be installed once per process.
fn prometheus_handle() -> Result<PrometheusHandle, BoxError> {
    static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
    if let Some(handle) = PROM_HANDLE.get() {
        return Ok(handle.clone());
    }
    let handle = PrometheusBuilder::new().install_recorder()?;
    info!("Prometheus metrics recorder installed");
    Ok(PROM_HANDLE.get_or_init(|| handle).clone())
}

/// Open the configured account store.
async fn open_storage(
    config: &AppConfig,
    auto_migrate: bool,
) -> Result<(Arc<dyn UserRepositoryInterface>, Option<DatabaseConnection>), BoxError> {
    match config.database.storage {
        StorageKind::Memory => {
            warn!("Accounts are kept in memory and will be lost on shutdown");
            Ok((Arc::new(InMemoryUserRepository::new()), None))
        }
        StorageKind::Sqlite => {
            let db_config = DatabaseConfig {
                url: config.database.connection_url(),
                max_connections: config.database.max_connections,
            };
            let db = init_database(&db_config).await?;
            if auto_migrate {
                run_migrations(&db).await?;
            }
            Ok((Arc::new(UserRepository::new(db.clone())), Some(db)))
        }
    }
}

/// Wire services and build the shared router state.
pub fn build_state(
    config: &AppConfig,
    repo: Arc<dyn UserRepositoryInterface>,
    db: Option<DatabaseConnection>,
    metrics: PrometheusHandle,
) -> AppState {
    let jwt_config = JwtConfig {
        secret: config.security.jwt_secret.clone(),
        expiration_hours: config.security.jwt_expiration_hours,
        issuer: "cms-accounts".to_string(),
    };
    let policy = Arc::new(RolePolicy::new());
    let mailer = Arc::new(LogMailer::new(
        config.mailer.from.clone(),
        config.mailer.base_url.clone(),
    ));
    let sessions = Arc::new(JwtSessionIssuer::new(jwt_config.clone()));

    let accounts = AccountAdminService::new(
        repo.clone(),
        policy.clone(),
        mailer.clone(),
        sessions.clone(),
        AccountSettings {
            default_per_page: config.pagination.default_per_page,
            bcrypt_cost: config.security.bcrypt_cost,
        },
    );
    let passwords = PasswordResetService::new(
        repo.clone(),
        policy,
        mailer,
        sessions.clone(),
        ResetSettings {
            base_url: config.mailer.base_url.clone(),
            reset_password_within_hours: config.security.reset_password_within_hours,
            bcrypt_cost: config.security.bcrypt_cost,
        },
    );

    AppState {
        accounts: Arc::new(accounts),
        passwords: Arc::new(passwords),
        login: Arc::new(LoginService::new(repo.clone(), sessions)),
        auth: AuthState {
            jwt_config,
            users: repo,
        },
        transport: TransportPolicy {
            require_ssl: config.security.require_ssl,
        },
        health: HealthState {
            db,
            started_at: Arc::new(Instant::now()),
        },
        metrics: MetricsState { handle: metrics },
    }
}

/// Handle to a running server.
pub struct ServerHandle {
    /// The configuration the server was started with.
    pub config: AppConfig,
    /// Port the listener is bound to.
    pub port: u16,

    db: Option<DatabaseConnection>,
    shutdown: ShutdownCoordinator,
    task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    pub async fn start(opts: ServerOptions) -> Result<Self, BoxError> {
        let config = opts.config;
        info!("Starting CMS accounts service...");

        let metrics = prometheus_handle()?;
        let (repo, db) = open_storage(&config, opts.auto_migrate).await?;
        let router = create_router(build_state(&config, repo, db.clone(), metrics));

        let shutdown = ShutdownCoordinator::new(config.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        let listener = tokio::net::TcpListener::bind(config.server.address()).await?;
        let local = listener.local_addr()?;
        info!("HTTP server listening on http://{}", local);
        info!("Swagger UI available at http://{}/docs/", local);

        let server = axum::serve(listener, router).with_graceful_shutdown(async move {
            shutdown_signal.wait().await;
            info!("HTTP server received shutdown signal");
        });

        let task = tokio::spawn(async move {
            if let Err(e) = server.await {
                error!("HTTP server error: {}", e);
            }
        });

        Ok(Self {
            config,
            port: local.port(),
            db,
            shutdown,
            task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for in-flight requests after shutdown was triggered, then close
    /// the database.
    pub async fn wait(self) {
        let task = self.task;
        let drained = self
            .shutdown
            .drain(async move {
                if let Err(e) = task.await {
                    error!("HTTP server task panicked: {}", e);
                }
            })
            .await;
        if !drained {
            warn!("Abandoning in-flight requests");
        }

        if let Some(db) = self.db {
            match db.close().await {
                Ok(()) => info!("Database connection closed"),
                Err(e) => warn!("Error closing database connection: {}", e),
            }
        }
        info!("CMS accounts service shutdown complete");
    }

    pub async fn shutdown(self) {
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

/// Initialize tracing from the `[logging]` section. `RUST_LOG` wins over
/// the configured level.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    let result = match config.logging.format.to_lowercase().as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init(),
    };
    if let Err(e) = result {
        eprintln!("Tracing already initialized: {}", e);
    }
}
