use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use tokio::io::AsyncBufReadExt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use pethelp_engine::Engine;
use pethelp_gateway::config::{load_config, AppConfig};
use pethelp_gateway::{ChatGateway, GatewayError};
use pethelp_schema::{Emotion, Message, Role};
use pethelp_server::state::AppState;
use pethelp_store::{ConversationStore, JsonlStore};

#[derive(Parser)]
#[command(name = "pethelp", version, about = "Pet care chat assistant")]
struct Cli {
    #[arg(
        long,
        default_value = "~/.pethelp",
        help = "Config root directory (contains config/ and sessions/)"
    )]
    config_root: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Start the HTTP API server")]
    Serve {
        #[arg(long, help = "Override the configured port")]
        port: Option<u16>,
    },
    #[command(about = "Local chat REPL (Ctrl-C cancels an in-flight reply)")]
    Chat {
        #[arg(long, default_value = "local", help = "Session ID to chat under")]
        session: String,
    },
    #[command(subcommand, about = "Session management")]
    Session(SessionCommands),
    #[command(about = "Validate config files")]
    Validate,
}

#[derive(Subcommand)]
enum SessionCommands {
    #[command(about = "List stored sessions")]
    List,
    #[command(about = "Print a session transcript")]
    Show {
        #[arg(help = "Session ID")]
        session_id: String,
    },
    #[command(about = "Delete a session by ID")]
    Reset {
        #[arg(help = "Session ID")]
        session_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();

    // Expand ~ to home directory
    if cli.config_root.starts_with("~") {
        if let Some(home) = std::env::var_os("HOME") {
            cli.config_root = PathBuf::from(home).join(
                cli.config_root
                    .strip_prefix("~")
                    .unwrap_or(&cli.config_root),
            );
        }
    }

    let log_dir = cli.config_root.join("logs");
    std::fs::create_dir_all(&log_dir)?;
    let file_appender = tracing_appender::rolling::daily(&log_dir, "pethelp.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking),
        )
        .init();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = load_config(&cli.config_root.join("config"))?;

    match command {
        Commands::Serve { port } => {
            let state = AppState {
                engine: Arc::new(Engine::new()),
                store: open_store(&cli.config_root, &config),
            };
            let addr = match port {
                Some(port) => format!("{}:{}", config.server.bind, port),
                None => config.bind_addr(),
            };
            pethelp_server::serve(state, &addr).await?;
        }
        Commands::Chat { session } => {
            run_repl(&cli.config_root, &config, &session).await?;
        }
        Commands::Session(cmd) => {
            let store = open_store(&cli.config_root, &config);
            match cmd {
                SessionCommands::List => {
                    let sessions = store.list().await?;
                    if sessions.is_empty() {
                        println!("No stored sessions.");
                    } else {
                        println!("{:<24} {:<10} {:<20}", "SESSION", "MESSAGES", "LAST ACTIVE");
                        println!("{}", "-".repeat(56));
                        for session in sessions {
                            let last = session
                                .last_active
                                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                                .unwrap_or_else(|| "-".to_string());
                            println!(
                                "{:<24} {:<10} {:<20}",
                                session.session_id, session.message_count, last
                            );
                        }
                    }
                }
                SessionCommands::Show { session_id } => {
                    let transcript = store.load(&session_id).await?;
                    if transcript.is_empty() {
                        println!("No messages in session '{session_id}'.");
                    }
                    for message in transcript {
                        print_turn(&message);
                    }
                }
                SessionCommands::Reset { session_id } => {
                    if store.clear(&session_id).await? {
                        println!("Session '{session_id}' reset.");
                    } else {
                        println!("No session '{session_id}'.");
                    }
                }
            }
        }
        Commands::Validate => {
            let delay = match config.chat.thinking_delay_ms {
                Some([lo, hi]) => format!("{lo}-{hi}ms"),
                None => "off".to_string(),
            };
            println!(
                "Config valid. server {}, history limit {}, thinking delay {}, sessions dir {}",
                config.bind_addr(),
                config.chat.history_limit,
                delay,
                config.sessions_dir(&cli.config_root).display()
            );
        }
    }

    Ok(())
}

fn open_store(config_root: &Path, config: &AppConfig) -> Arc<dyn ConversationStore> {
    Arc::new(JsonlStore::with_dir(config.sessions_dir(config_root)))
}

async fn run_repl(config_root: &Path, config: &AppConfig, session_id: &str) -> Result<()> {
    let gateway = ChatGateway::new(
        Arc::new(Engine::new()),
        open_store(config_root, config),
        config.chat_limits(),
    );

    println!("PetHelp chat, session '{session_id}'.");
    println!("Type /quit to exit, /clear to reset the session. Ctrl-C cancels a pending reply.");
    println!("---");

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("you> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        match input {
            "/quit" | "/exit" => break,
            "/clear" => {
                gateway.reset(session_id).await?;
                println!("(session cleared)");
                continue;
            }
            _ => {}
        }

        tokio::select! {
            result = gateway.handle_message(session_id, input) => match result {
                Ok(reply) => print_turn(&reply),
                Err(GatewayError::Cancelled) => println!("(cancelled)"),
                Err(GatewayError::RateLimited) => println!("(too many requests, give it a moment)"),
                Err(GatewayError::Store(err)) => return Err(err.into()),
            },
            _ = tokio::signal::ctrl_c() => {
                gateway.cancel(session_id).await;
                println!();
                println!("(cancelled)");
            }
        }
    }

    Ok(())
}

fn print_turn(message: &Message) {
    match message.role {
        Role::User => println!("you> {}", message.content),
        Role::Assistant => {
            let tag = match message.emotion {
                Some(Emotion::Happy) => " [happy]",
                Some(Emotion::Concerned) => " [concerned]",
                Some(Emotion::Thoughtful) => " [thoughtful]",
                None => "",
            };
            println!("pet{tag}> {}", message.content);
            println!();
        }
        Role::System => println!("system> {}", message.content),
    }
}
