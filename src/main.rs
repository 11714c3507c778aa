use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use street_service::{api, config::AppConfig, db::Database};

#[derive(Parser)]
#[command(name = "street")]
#[command(about = "Street geometry service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Use the database-native point insertion strategy
        #[arg(long)]
        native: bool,
    },
    /// Insert the example streets into an empty database
    Seed,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "street_service=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn open_database(config: &AppConfig) -> anyhow::Result<Database> {
    let db = match &config.database_path {
        Some(path) => Database::open(path.clone())?,
        None => Database::open_default()?,
    };
    db.migrate()?;
    Ok(db)
}

async fn serve(mut config: AppConfig, port: u16, native: bool) -> anyhow::Result<()> {
    if native {
        config.feature_flags.use_native = true;
    }

    let db = open_database(&config)?;
    tracing::info!(
        use_native = config.feature_flags.use_native,
        "Starting street service on port {}",
        port
    );

    let app = api::create_router(api::AppState::new(db, config.feature_flags));

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("Street service listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = AppConfig::load();

    match cli.command {
        Some(Commands::Serve { port, native }) => serve(config, port, native).await?,
        Some(Commands::Seed) => {
            let db = open_database(&config)?;
            let inserted = db.seed_examples()?;
            println!("Seeded {} example streets", inserted);
        }
        None => serve(config, 3000, false).await?,
    }

    Ok(())
}
