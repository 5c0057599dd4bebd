/*!
 * Lingo CLI - natural language terminal
 *
 * Interactive driver for the lingo_core pipeline: type a request, get a
 * validated command executed in the tracked working directory.
 */

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use lingo_core::{
    init_logger, make_id, CommandRequest, Engine, EngineConfig, LogConfig, LogLevel,
};

#[derive(Parser)]
#[command(name = "lingo_cli")]
#[command(about = "Lingo - natural language command terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive session
    Repl {
        /// Starting directory (default: current dir)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Session identifier (default: generated)
        #[arg(short, long)]
        session: Option<String>,

        /// Verbose structured logs on stderr
        #[arg(short, long)]
        verbose: bool,
    },

    /// Handle a single request and exit
    Run {
        /// The natural language request
        input: Vec<String>,

        /// Working directory (default: current dir)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Suggest completions for a partial input line
    Complete {
        /// The partial input
        text: String,

        /// Working directory (default: current dir)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Repl { dir, session, verbose } => {
            init_logger(LogConfig {
                stderr_output: verbose,
                min_level: if verbose { LogLevel::Debug } else { LogLevel::Warn },
                ..LogConfig::default()
            });
            repl(dir, session).await
        }
        Commands::Run { input, dir } => {
            init_logger(LogConfig {
                stderr_output: false,
                ..LogConfig::default()
            });
            run_once(input.join(" "), dir).await
        }
        Commands::Complete { text, dir } => {
            let working_dir = starting_dir(dir)?;
            for suggestion in lingo_core::suggest(&text, &working_dir) {
                println!("{}", suggestion);
            }
            Ok(())
        }
        Commands::Version => {
            println!("lingo_cli v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn run_once(input: String, dir: Option<PathBuf>) -> Result<()> {
    let engine = Engine::new(EngineConfig::from_env())?;
    let working_dir = starting_dir(dir)?;

    let response = engine
        .handle(CommandRequest {
            input,
            session_id: make_id("cli"),
            working_dir,
        })
        .await;

    match response {
        Ok(response) => {
            if let Some(command) = &response.translated_command {
                eprintln!("translated to: {}", command);
            }
            println!("{}", response.output);
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

async fn repl(dir: Option<PathBuf>, session: Option<String>) -> Result<()> {
    let engine = Engine::new(EngineConfig::from_env())?;
    let session_id = session.unwrap_or_else(|| make_id("repl"));
    let mut working_dir = starting_dir(dir)?;

    println!("lingo - describe what you want; 'exit' to quit");

    let stdin = io::stdin();
    loop {
        print!("{} > ", working_dir.display());
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        let response = engine
            .handle(CommandRequest {
                input: line.to_string(),
                session_id: session_id.clone(),
                working_dir: working_dir.clone(),
            })
            .await;

        match response {
            Ok(response) => {
                if let Some(command) = &response.translated_command {
                    println!("translated to: {}", command);
                }
                println!("{}", response.output);
                working_dir = response.working_dir;
            }
            Err(e) => println!("Error: {}", e),
        }
    }

    Ok(())
}

fn starting_dir(dir: Option<PathBuf>) -> Result<PathBuf> {
    match dir {
        Some(dir) => dir
            .canonicalize()
            .with_context(|| format!("invalid starting directory: {}", dir.display())),
        None => std::env::current_dir().context("cannot determine current directory"),
    }
}
