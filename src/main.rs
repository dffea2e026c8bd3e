//! sqlchat - a terminal chatbot that answers natural-language questions
//! against a SQLite database.

use sqlchat::agent::{SqlAgent, StubAgent, ToolLoopAgent};
use sqlchat::app::Controller;
use sqlchat::cli::Cli;
use sqlchat::config::Config;
use sqlchat::db::SqliteClient;
use sqlchat::error::{Result, SqlchatError};
use sqlchat::llm::{create_llm_client, LlmProvider};
use sqlchat::secrets::SecretStore;
use sqlchat::{logging, tui};
use std::path::PathBuf;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();

    // File logging in TUI mode (stdout belongs to the terminal UI)
    if cli.is_headless() {
        logging::init_stderr_logging();
    } else {
        logging::init_file_logging();
    }

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("{}: {}", e.category(), e);
            eprintln!("{}: {}", e.category(), e);
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    let (agent, database_info) = build_agent(&cli, &config).await?;
    let controller = Controller::new(agent);

    if cli.is_headless() {
        tui::headless::run_headless(&cli, controller, database_info).await
    } else {
        tui::run(database_info, controller).await?;
        Ok(0)
    }
}

/// Builds the agent and the header label from CLI arguments and config.
///
/// With --mock-agent, a stub agent with canned responses is used and no
/// database or API key is required. Otherwise the database handle, the
/// LLM client, and the tool-loop agent are constructed and injected.
async fn build_agent(cli: &Cli, config: &Config) -> Result<(Box<dyn SqlAgent>, Option<String>)> {
    if cli.mock_agent {
        return Ok((Box::new(StubAgent::sample()), Some("stub agent".to_string())));
    }

    let db_path: PathBuf = cli
        .database
        .clone()
        .or_else(|| config.database.path.clone())
        .ok_or_else(|| {
            SqlchatError::config(
                "No database specified. Pass a path (sqlchat mydata.db) or set \
                 [database] path in the config file.",
            )
        })?;

    let provider: LlmProvider = cli
        .provider
        .as_deref()
        .unwrap_or(&config.llm.provider)
        .parse()
        .map_err(SqlchatError::config)?;
    let model = cli.model.clone().unwrap_or_else(|| config.llm.model.clone());

    let db = SqliteClient::open(&db_path).await?;
    let llm = create_llm_client(provider, &model, &SecretStore::new())?;
    let agent = ToolLoopAgent::new(llm, Box::new(db));

    let database_info = Some(format!(
        "{} | {}",
        db_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| db_path.display().to_string()),
        model
    ));

    info!("Using provider '{provider}' with model '{model}'");

    Ok((Box::new(agent), database_info))
}
