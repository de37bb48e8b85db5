// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use rag_engine::utils::logging::{
    format_ai, format_error, format_human, format_info, format_success, format_warning,
};
use rag_engine::{
    Backend, Config, CredentialOverrides, HealthStatus, OperationTimer, RagError, Session,
    StagingArea, Validator, run_health_checks, vector_store,
};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "rag-engine")]
#[command(author = "cipher")]
#[command(version = "0.1.0")]
#[command(about = "Chat with your PDF documents using retrieval-augmented generation", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    #[arg(long, env = "PINECONE_API_KEY", hide_env_values = true)]
    pinecone_api_key: Option<String>,

    #[arg(long, env = "PINECONE_ENV")]
    pinecone_env: Option<String>,

    #[arg(long, env = "PINECONE_INDEX")]
    pinecone_index: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index PDF documents
    Ingest {
        #[arg(long)]
        pinecone: bool,

        #[arg(value_name = "FILES")]
        files: Vec<PathBuf>,
    },

    /// Ask one question against documents indexed earlier
    Ask {
        #[arg(long)]
        pinecone: bool,

        /// Print the chunks the answer was built from
        #[arg(long)]
        sources: bool,

        question: String,
    },

    /// Interactive chat; optionally index files first
    Chat {
        #[arg(long)]
        pinecone: bool,

        #[arg(value_name = "FILES")]
        files: Vec<PathBuf>,
    },

    Stats {
        #[arg(long)]
        pinecone: bool,
    },

    Verify {
        #[arg(long)]
        pinecone: bool,
    },

    Reset {
        #[arg(long)]
        confirm: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    rag_engine::utils::logging::init_logger(cli.color, cli.verbose);

    info!("RAG Engine");
    info!("Loading configuration from: {}", cli.config.display());

    if !cli.config.exists() {
        warn!(
            "Config file {} not found, using built-in defaults",
            cli.config.display()
        );
    }
    let mut config =
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?;

    config.apply_overrides(CredentialOverrides {
        openai_api_key: cli.openai_api_key,
        pinecone_api_key: cli.pinecone_api_key,
        pinecone_env: cli.pinecone_env,
        pinecone_index: cli.pinecone_index,
    });

    match cli.command {
        Commands::Ingest { pinecone, files } => {
            cmd_ingest(config, pinecone, files).await?;
        }
        Commands::Ask {
            pinecone,
            sources,
            question,
        } => {
            cmd_ask(config, pinecone, sources, &question).await?;
        }
        Commands::Chat { pinecone, files } => {
            cmd_chat(config, pinecone, files).await?;
        }
        Commands::Stats { pinecone } => {
            cmd_stats(&config, pinecone).await?;
        }
        Commands::Verify { pinecone } => {
            cmd_verify(&config, pinecone).await?;
        }
        Commands::Reset { confirm } => {
            cmd_reset(&config, confirm).await?;
        }
    }

    Ok(())
}

fn select_backend(config: &Config, pinecone: bool) -> Backend {
    if pinecone {
        Backend::Pinecone
    } else {
        config.vector_store.backend
    }
}

fn open_session(config: Config, pinecone: bool) -> Result<Session> {
    let backend = select_backend(&config, pinecone);
    let mut session = Session::new(config)
        .context("Failed to start session")?
        .with_progress(true);
    session.set_backend(backend);
    Ok(session)
}

/// User mistakes are shown as warnings; everything else fails the command.
fn report_error(err: RagError) -> Result<()> {
    if err.is_user_error() {
        eprintln!("{}", format_warning(&err.to_string()));
        Ok(())
    } else {
        eprintln!("{}", format_error(&format!("An error occurred: {}", err)));
        Err(err.into())
    }
}

async fn submit(session: &mut Session, files: &[PathBuf]) -> Result<()> {
    let timer = OperationTimer::new("document indexing");

    match session.process_documents(files).await {
        Ok(report) => {
            timer.warn_if_slow(Duration::from_secs(60));
            timer.finish();
            eprintln!(
                "{}",
                format_success(&format!(
                    "Indexed {} files ({} pages, {} chunks) into the {} store",
                    report.files.len(),
                    report.pages,
                    report.stored,
                    report.backend
                ))
            );
            Ok(())
        }
        Err(e) => report_error(e),
    }
}

async fn cmd_ingest(config: Config, pinecone: bool, files: Vec<PathBuf>) -> Result<()> {
    info!("Starting ingestion");
    let mut session = open_session(config, pinecone)?;
    submit(&mut session, &files).await
}

async fn cmd_ask(config: Config, pinecone: bool, sources: bool, question: &str) -> Result<()> {
    let mut session = open_session(config, pinecone)?;
    session
        .attach_existing_index()
        .await
        .context("Failed to open the vector store")?;

    match session.query(question).await {
        Ok(answer) => {
            println!("{}", answer.text);

            if sources {
                println!("\nSources:");
                for (idx, source) in answer.sources.iter().enumerate() {
                    println!("{}. {}", idx + 1, source.format_summary(200));
                }
            } else if !answer.sources.is_empty() {
                eprintln!(
                    "\n{}",
                    format_info(&format!("Sources: {}", answer.source_labels().join(", ")))
                );
            }
            Ok(())
        }
        Err(e) => report_error(e),
    }
}

async fn cmd_chat(config: Config, pinecone: bool, files: Vec<PathBuf>) -> Result<()> {
    let mut session = open_session(config, pinecone)?;

    if files.is_empty() {
        let count = session
            .attach_existing_index()
            .await
            .context("Failed to open the vector store")?;
        if count == 0 {
            eprintln!(
                "{}",
                format_info("No documents indexed yet. Use /add FILES... to upload.")
            );
        }
    } else {
        submit(&mut session, &files).await?;
    }

    eprintln!(
        "{}",
        format_info("Commands: /add FILES..., /history, /pinecone on|off, /quit")
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{}", format_human(""));
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.split_once(' ').unwrap_or((line, "")) {
            ("/quit" | "/exit", _) => break,
            ("/add", rest) => {
                let files: Vec<PathBuf> = rest.split_whitespace().map(PathBuf::from).collect();
                submit(&mut session, &files).await.ok();
            }
            ("/history", _) => {
                if session.history().is_empty() {
                    eprintln!("{}", format_info("No messages yet"));
                }
                for turn in session.history() {
                    println!("{}", format_human(&turn.question));
                    println!("{}", format_ai(&Validator::truncate_text(&turn.answer, 500)));
                }
            }
            ("/pinecone", arg) => {
                let backend = match arg.trim() {
                    "on" => Backend::Pinecone,
                    "off" => Backend::Local,
                    other => {
                        eprintln!("{}", format_warning(&format!("Expected on|off, got '{}'", other)));
                        continue;
                    }
                };
                session.set_backend(backend);
                eprintln!(
                    "{}",
                    format_info(&format!("Using the {} store; submit documents again", backend))
                );
            }
            (cmd, _) if cmd.starts_with('/') => {
                eprintln!("{}", format_warning(&format!("Unknown command {}", cmd)));
            }
            _ => match session.query(line).await {
                Ok(answer) => println!("{}", format_ai(&answer.text)),
                Err(e) => {
                    report_error(e).ok();
                }
            },
        }
    }

    info!("Chat ended after {} turns", session.history().len());
    Ok(())
}

async fn cmd_stats(config: &Config, pinecone: bool) -> Result<()> {
    info!("Gathering statistics");

    let backend = select_backend(config, pinecone);
    let store = vector_store::open(config, backend)
        .await
        .context("Failed to open the vector store")?;

    let count = store.count().await?;
    println!(
        "{}",
        format_info(&format!("{} store: {} chunks indexed", store.name(), count))
    );

    let staging = StagingArea::new(&config.storage.tmp_dir, config.pipeline.max_file_size_mb)?;
    info!("Staging directory: {}", staging.dir().display());

    Ok(())
}

async fn cmd_verify(config: &Config, pinecone: bool) -> Result<()> {
    info!("Verifying configuration and services");

    let backend = select_backend(config, pinecone);
    let report = run_health_checks(config, backend).await;
    println!("{}", report.format());

    if report.overall_status == HealthStatus::Unhealthy {
        error!("Health checks failed");
        return Err(anyhow::anyhow!("One or more health checks failed"));
    }

    Ok(())
}

async fn cmd_reset(config: &Config, confirm: bool) -> Result<()> {
    if !confirm {
        error!("This will delete the local index and staged files. Use --confirm to proceed");
        return Ok(());
    }

    warn!("Resetting local vector store - all indexed chunks will be lost");

    let store = vector_store::open(config, Backend::Local)
        .await
        .context("Failed to open the local vector store")?;
    store.clear().await.context("Failed to clear the local vector store")?;

    let staging = StagingArea::new(&config.storage.tmp_dir, config.pipeline.max_file_size_mb)?;
    let removed = staging.clear()?;

    eprintln!(
        "{}",
        format_success(&format!(
            "Local index dropped, {} staged files removed",
            removed
        ))
    );

    Ok(())
}
