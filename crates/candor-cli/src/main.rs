mod bootstrap;
mod logging;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use candor_agents::{AgentRuntime, HistoryEntry};
use candor_config::ConfigLoader;
use candor_gateway::GatewayServer;
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "candor", version, about = "Interview practice with a coaching twin")]
struct Cli {
    /// Path to a YAML config file (defaults to ~/.candor/config.yml when present)
    #[arg(long, global = true, env = "CANDOR_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the web chat and JSON API
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Interactive interview in the terminal
    Chat,
    /// Ask a single question and print the reply
    Ask {
        #[arg(required = true, trailing_var_arg = true)]
        message: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_logging(match cli.command {
        Command::Serve { .. } => "info",
        Command::Chat | Command::Ask { .. } => "warn",
    });

    let mut config = ConfigLoader::load(cli.config.as_deref()).context("failed to load config")?;

    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.gateway.host = host;
            }
            if let Some(port) = port {
                config.gateway.port = port;
            }
            let runtime = Arc::new(bootstrap::build_runtime(&config));
            info!(
                "serving {} as {} with model {}",
                runtime.persona().identity.display_name,
                runtime.persona().identity.role_title,
                runtime.model()
            );
            GatewayServer::new(config, runtime).run().await?;
        }
        Command::Chat => {
            let runtime = bootstrap::build_runtime(&config);
            run_repl(&runtime).await?;
        }
        Command::Ask { message } => {
            let runtime = bootstrap::build_runtime(&config);
            let reply = runtime.chat(&message.join(" "), &[]).await;
            println!("{reply}");
        }
    }

    Ok(())
}

async fn run_repl(runtime: &AgentRuntime) -> Result<()> {
    let name = runtime.persona().identity.display_name.clone();
    println!("Interview with {name}. Type 'exit' or 'quit' to leave.\n");

    let mut history: Vec<HistoryEntry> = Vec::new();
    loop {
        let Some(line) = read_line().await? else {
            break;
        };
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if is_exit_command(message) {
            break;
        }

        let reply = runtime.chat(message, &history).await;
        println!("\n{name}: {reply}\n");
        history.push(HistoryEntry::pair(message, reply));
    }
    Ok(())
}

/// Prompt on a blocking thread. `None` means stdin is closed.
async fn read_line() -> Result<Option<String>> {
    let input = tokio::task::spawn_blocking(|| {
        dialoguer::Input::<String>::new()
            .with_prompt("You")
            .allow_empty(true)
            .interact_text()
    })
    .await
    .context("input task panicked")?;

    Ok(input.ok())
}

fn is_exit_command(message: &str) -> bool {
    matches!(message.to_ascii_lowercase().as_str(), "exit" | "quit")
}
