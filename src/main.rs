use axum::http::Request;
use clap::{Parser, Subcommand};
use tower_http::trace::TraceLayer;
use tracing::Level;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use yatube::{AppState, Config, DataStore, SqliteStore, db::NewGroup, router};

/// Yatube blogging platform.
#[derive(Parser, Debug)]
#[command(name = "yatube")]
#[command(about = "Server-rendered blogging platform", long_about = None)]
struct Args {
    /// Path to .env file (optional).
    #[arg(long, env = "DOTENV_PATH", default_value = ".env")]
    dotenv: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Create a post group.
    AddGroup {
        #[arg(long)]
        title: String,
        #[arg(long)]
        slug: String,
        #[arg(long, default_value = "")]
        description: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if std::path::Path::new(&args.dotenv).exists() {
        dotenv::from_path(&args.dotenv)?;
        eprintln!("Loaded environment from {}", args.dotenv);
    }

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let store = SqliteStore::connect(&config.database_url).await?;
    store.migrate().await?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, store).await,
        Command::AddGroup { title, slug, description } => {
            let group = store
                .create_group(&NewGroup {
                    title,
                    slug,
                    description,
                })
                .await?;
            tracing::info!(id = group.id, slug = %group.slug, "group created");
            Ok(())
        }
    }
}

async fn serve(config: Config, store: SqliteStore) -> anyhow::Result<()> {
    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(config, store);

    let app = router(state).layer(TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
        tracing::span!(
            Level::INFO,
            "http_request",
            method = %request.method(),
            path = %request.uri().path(),
            query = request.uri().query().unwrap_or("")
        )
    }));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "starting server");

    axum::serve(listener, app).await?;

    Ok(())
}
