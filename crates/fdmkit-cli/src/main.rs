mod auth;
mod cli;
mod commands;
mod config;
mod logging;
mod output;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use fdmkit_core::ReconcileError;
use tracing::debug;

use cli::{Cli, Commands, OutputFormat};
use output::print_error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_tracing(&cli.log_level);

    if let Err(e) = run(cli).await {
        print_error(&format!("{e:#}"));
        std::process::exit(exit_code(&e));
    }
}

/// Exit status for a failed command: 2 when the request itself was at
/// fault, 1 otherwise.
fn exit_code(err: &anyhow::Error) -> i32 {
    match err.chain().find_map(|cause| cause.downcast_ref::<ReconcileError>()) {
        Some(reconcile) => {
            debug!(
                category = %reconcile.category(),
                client_error = reconcile.is_client_error(),
                "command failed"
            );
            if reconcile.is_client_error() { 2 } else { 1 }
        }
        None => 1,
    }
}

async fn run(cli: Cli) -> Result<()> {
    let profile = &cli.profile;
    let profile_cfg = config::load_profile(profile)?;
    let format = cli
        .format
        .or_else(|| profile_cfg.format.as_deref().and_then(OutputFormat::parse_config))
        .unwrap_or_default();

    match &cli.command {
        Commands::Login(args) => {
            let server = config::resolve_server(&cli.server, profile)?;
            commands::auth::login(&server, args, profile).await?;
        }
        Commands::Logout => {
            commands::auth::logout(profile)?;
        }
        Commands::Whoami => {
            commands::auth::whoami(profile)?;
        }
        Commands::Operations => {
            commands::run::list_operations();
        }
        Commands::Config(args) => match &args.command {
            cli::ConfigCommands::Show => {
                let not_set = || "(not set)".to_string();
                println!("{}: {}", "Profile".cyan(), profile);
                println!(
                    "{}: {}",
                    "Server".cyan(),
                    profile_cfg.server.clone().unwrap_or_else(not_set)
                );
                println!(
                    "{}: {}",
                    "Base path".cyan(),
                    profile_cfg
                        .base_path
                        .clone()
                        .unwrap_or_else(|| fdmkit_client::DEFAULT_BASE_PATH.to_string())
                );
                println!(
                    "{}: {}",
                    "Verify TLS".cyan(),
                    profile_cfg.verify_tls.unwrap_or(true)
                );
                println!(
                    "{}: {}",
                    "Timeout (s)".cyan(),
                    profile_cfg
                        .timeout_secs
                        .unwrap_or(fdmkit_client::DEFAULT_TIMEOUT.as_secs())
                );
                println!(
                    "{}: {}",
                    "Format".cyan(),
                    profile_cfg.format.as_deref().unwrap_or("json")
                );
            }
            cli::ConfigCommands::Set(set_args) => {
                let mut cfg = profile_cfg.clone();
                cfg.set(&set_args.key, &set_args.value)?;
                config::save_profile(profile, &cfg)?;
                output::print_success(&format!("Set {} = {}", set_args.key, set_args.value));
            }
        },
        Commands::Run(args) => {
            let server = config::resolve_server(&cli.server, profile)?;
            let client = commands::connect(&server, profile)?;
            let result = commands::run::run(&client, args, format).await;
            commands::persist_refreshed_session(&client, profile).await?;
            result?;
        }
        Commands::Resource(args) => {
            let server = config::resolve_server(&cli.server, profile)?;
            let client = commands::connect(&server, profile)?;
            let result = commands::resource::run(&client, args, format).await;
            commands::persist_refreshed_session(&client, profile).await?;
            result?;
        }
    }

    Ok(())
}
