use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Args as ClapArgs, Parser, Subcommand};
use simsy_config::{Config, ConfigLoad, ConfigLoader};
use simsy_core::application::AppUnitOfWork;
use simsy_core::auth::AuthCrypto;
use simsy_core::database::PostgresDatabase;
use simsy_server::{AppState, create_app};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "simsy-server")]
#[command(about = "Media catalog and watch progress tracking server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Server port (overrides config)
    #[arg(short, long, env = "SIMSY_PORT")]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long, env = "SIMSY_HOST")]
    host: Option<String>,

    /// Path to a simsy.toml config file
    #[arg(long, env = "SIMSY_CONFIG")]
    config: Option<PathBuf>,

    /// Serve from process memory instead of PostgreSQL. Data is lost on exit.
    #[arg(long, default_value_t = false)]
    in_memory: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    Db(DbCommand),
    /// Create a staff account, or promote and re-password an existing one
    CreateAdmin {
        #[arg(long)]
        username: String,
        #[arg(long, env = "SIMSY_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, default_value = "")]
        email: String,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.serve)?;

    match cli.command {
        Some(Command::Db(DbCommand::Migrate)) => {
            let pg = connect_postgres(&config).await?;
            pg.migrate().await.context("database migration failed")?;
            info!("Database migrations applied successfully");
            Ok(())
        }
        Some(Command::CreateAdmin {
            username,
            password,
            email,
        }) => {
            let state = build_state(config, &cli.serve).await?;
            let user = state
                .accounts
                .create_admin(&username, &password, &email)
                .await
                .context("failed to create admin account")?;
            info!(user_id = %user.id, username = %user.username, "admin account ready");
            Ok(())
        }
        None => run_server(config, &cli.serve).await,
    }
}

fn load_config(args: &ServeArgs) -> anyhow::Result<Config> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_config_path(path.clone());
    }
    let ConfigLoad {
        mut config,
        warnings,
    } = loader.load().context("failed to load configuration")?;
    warnings.log();

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host.clone() {
        config.server.host = host;
    }
    if config.metadata.env_file_loaded {
        info!("loaded environment from .env");
    }
    Ok(config)
}

async fn connect_postgres(config: &Config) -> anyhow::Result<PostgresDatabase> {
    let Some(url) = config.database.primary_url.as_deref() else {
        bail!("no database configured; set DATABASE_URL or run with --in-memory");
    };
    PostgresDatabase::connect(url, config.database.max_connections)
        .await
        .context("failed to connect to PostgreSQL")
}

async fn build_state(config: Config, args: &ServeArgs) -> anyhow::Result<AppState> {
    let config = Arc::new(config);
    let auth = &config.auth;

    if args.in_memory {
        if !config.dev_mode {
            warn!("--in-memory outside dev mode; nothing will be persisted");
        }
        let crypto = AuthCrypto::insecure_fast(&auth.password_pepper, &auth.token_key)
            .context("failed to initialise auth crypto")?;
        return Ok(AppState::new(
            config.clone(),
            AppUnitOfWork::in_memory(),
            None,
            crypto,
        ));
    }

    let pg = connect_postgres(&config).await?;
    pg.migrate().await.context("database migration failed")?;
    let unit_of_work = AppUnitOfWork::from_postgres(&pg)
        .map_err(anyhow::Error::msg)
        .context("failed to assemble repositories")?;
    let crypto = AuthCrypto::new(&auth.password_pepper, &auth.token_key)
        .context("failed to initialise auth crypto")?;

    Ok(AppState::new(
        config.clone(),
        unit_of_work,
        Some(Arc::new(pg)),
        crypto,
    ))
}

async fn run_server(config: Config, args: &ServeArgs) -> anyhow::Result<()> {
    let addr = config.bind_address();
    let state = build_state(config, args).await?;
    info!(storage = state.storage_label(), media_root = %state.images.root().display(), "state ready");

    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "Simsy server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}
