//! netops service
//!
//! One binary for every surface of the network assistant:
//! - HTTP API (chat, sessions, tools, knowledge base, log analysis)
//! - Interactive terminal chat
//! - One-shot tool execution, indexing and log analysis

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use netops_chat::{LogBook, SortOrder};
use netops_core::config::{get_config_opt, load_environment};
use netops_core::AppConfig;
use std::path::PathBuf;
use tracing::info;

mod app;
mod repl;
mod server;

use app::App;

#[derive(Parser, Debug)]
#[command(name = "netops-service")]
#[command(about = "LLM assistant for network operations", version)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Bind address (host:port)
    #[arg(short, long, global = true)]
    bind: Option<String>,

    /// Chat model (gpt-4o-mini, gpt-3.5-turbo, gpt-4o)
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Documentation directory
    #[arg(long, global = true)]
    docs_dir: Option<PathBuf>,

    /// TOML inventory file
    #[arg(long, global = true)]
    inventory: Option<PathBuf>,

    /// Model calls allowed per message
    #[arg(long, global = true)]
    max_iterations: Option<usize>,

    /// Token ceiling for the history sent to the model
    #[arg(long, global = true)]
    token_ceiling: Option<usize>,

    /// Disable CORS
    #[arg(long)]
    no_cors: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API (default)
    Serve,
    /// Chat in the terminal
    Chat,
    /// Build the documentation index and print a summary
    Index,
    /// Run one tool directly
    Tool {
        /// Tool name
        name: String,
        /// Arguments as a JSON object
        #[arg(default_value = "{}")]
        arguments: String,
    },
    /// Assess and sort aggregated device logs
    Analyze {
        /// JSON file with aggregated events
        #[arg(default_value = "logs/logs.json")]
        path: PathBuf,
        /// Grade event severity with the model
        #[arg(long)]
        assess: bool,
        #[arg(long, value_enum, default_value_t = SortArg::Frequency)]
        sort: SortArg,
        /// Explain the event at this position (1-based, after sorting)
        #[arg(long)]
        explain: Option<usize>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SortArg {
    Frequency,
    Severity,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Frequency => SortOrder::Frequency,
            SortArg::Severity => SortOrder::Severity,
        }
    }
}

impl Args {
    /// Command-line flags take precedence over the environment
    fn apply(&self, config: &mut AppConfig) {
        if let Some(bind) = &self.bind {
            config.bind = bind.clone();
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(dir) = &self.docs_dir {
            config.docs_dir = dir.clone();
        }
        if let Some(path) = &self.inventory {
            config.inventory_file = Some(path.clone());
        }
        if let Some(max) = self.max_iterations {
            config.max_iterations = max.max(1);
        }
        if let Some(ceiling) = self.token_ceiling {
            config.token_ceiling = Some(ceiling).filter(|c| *c > 0);
        }
    }
}

fn init_tracing() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("netops_service=info".parse()?)
        .add_directive("netops_chat=info".parse()?)
        .add_directive("netops_tools=info".parse()?)
        .add_directive("netops_rag=info".parse()?)
        .add_directive("tower_http=debug".parse()?);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if get_config_opt("NETOPS_LOG_FORMAT").as_deref() == Some("json") {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from /etc/netops/environment (if exists)
    let env_file = load_environment();

    init_tracing()?;

    let args = Args::parse();
    let mut config = AppConfig::from_env();
    args.apply(&mut config);
    if let Some(path) = env_file {
        info!("Environment loaded from {}", path);
    }

    let app = App::build(config).await?;

    match args.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            app.index_docs().await;
            let model = app.chat_model()?;
            let router = server::build_router(app.tools_state(), app.chat_state(model), !args.no_cors);
            info!(model = %app.model_id, "Starting netops service");
            server::serve(router, &app.config.bind).await?;
        }
        Commands::Chat => {
            app.index_docs().await;
            let assistant = app.assistant(app.chat_model()?);
            repl::run(&assistant).await?;
        }
        Commands::Index => {
            let report = app.knowledge.index_directory(&app.config.docs_dir).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Tool { name, arguments } => {
            let arguments: serde_json::Value =
                serde_json::from_str(&arguments).context("tool arguments must be JSON")?;
            if name == "lookup_docs" {
                app.index_docs().await;
            }
            match app.registry.execute(&name, &arguments).await {
                Ok(output) => println!("{}", output),
                Err(e) => bail!("{} failed: {}", name, e.to_observation()),
            }
        }
        Commands::Analyze {
            path,
            assess,
            sort,
            explain,
        } => {
            let mut book = LogBook::load(&path).await?;
            let analyzer = if assess || explain.is_some() {
                Some(app.analyzer(app.chat_model()?))
            } else {
                None
            };

            if let (true, Some(analyzer)) = (assess, &analyzer) {
                analyzer.assess_severity(&mut book).await;
            }
            book.sort(sort.into())?;
            println!("{}", book.describe());

            if let (Some(position), Some(analyzer)) = (explain, &analyzer) {
                let event = position
                    .checked_sub(1)
                    .and_then(|i| book.events.get(i))
                    .with_context(|| format!("no event at position {}", position))?;
                let explanation = analyzer.explain(event).await?;
                println!("\nAnalysis of {}:\n{}", event.event_type, explanation);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from([
            "netops-service",
            "chat",
            "--model",
            "gpt-4o",
            "--token-ceiling",
            "0",
            "--max-iterations",
            "3",
        ]);
        let mut config = AppConfig {
            token_ceiling: Some(500),
            ..AppConfig::default()
        };
        args.apply(&mut config);

        assert!(matches!(args.command, Some(Commands::Chat)));
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.max_iterations, 3);
        assert_eq!(config.token_ceiling, None);
    }

    #[test]
    fn test_analyze_arguments() {
        let args = Args::parse_from([
            "netops-service",
            "analyze",
            "events.json",
            "--assess",
            "--sort",
            "severity",
            "--explain",
            "2",
        ]);
        match args.command {
            Some(Commands::Analyze {
                path,
                assess,
                sort,
                explain,
            }) => {
                assert_eq!(path, PathBuf::from("events.json"));
                assert!(assess);
                assert_eq!(SortOrder::from(sort), SortOrder::Severity);
                assert_eq!(explain, Some(2));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
