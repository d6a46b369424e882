// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cmdq: define DAGs of shell commands, transpile them to bash, run them.

mod commands;
mod exit_error;
mod store;

use clap::{Parser, Subcommand};
use exit_error::ExitError;

#[derive(Parser)]
#[command(name = "cmdq", version, about = "Compile DAGs of shell commands into runnable scripts")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new queue
    New(commands::new::NewArgs),
    /// Add a job to a queue
    Submit(commands::submit::SubmitArgs),
    /// Show a queue's jobs and last-run states
    Show(commands::show::ShowArgs),
    /// Finalize, write, and execute a queue
    Run(commands::run::RunArgs),
    /// Kill all cmdq tmux sessions
    Cleanup,
    /// List stored queues
    List,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::New(args) => commands::new::handle(args),
        Command::Submit(args) => commands::submit::handle(args),
        Command::Show(args) => commands::show::handle(args),
        Command::Run(args) => commands::run::handle(args).await,
        Command::Cleanup => commands::cleanup::handle().await,
        Command::List => commands::list::handle(),
    };

    if let Err(err) = result {
        match err.downcast_ref::<ExitError>() {
            Some(exit) => {
                if !exit.message.is_empty() {
                    eprintln!("{}", exit.message);
                }
                std::process::exit(exit.code);
            }
            None => {
                eprintln!("cmdq: {:#}", err);
                std::process::exit(1);
            }
        }
    }
}
