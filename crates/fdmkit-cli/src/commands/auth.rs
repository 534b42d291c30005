use anyhow::{Context, Result};
use colored::Colorize;
use fdmkit_client::FdmClient;

use crate::auth::{self, StoredSession};
use crate::cli::LoginArgs;
use crate::output::{print_error, print_success};

pub async fn login(server: &str, args: &LoginArgs, profile: &str) -> Result<()> {
    let username = args
        .username
        .as_deref()
        .context("--username is required")?;
    let password = args
        .password
        .as_deref()
        .context("--password is required")?;

    let cfg = crate::config::load_profile(profile)?;
    let client = FdmClient::new(cfg.client_config(server)?)?;
    let session = client
        .login(username, password)
        .await
        .with_context(|| format!("Login to {server} failed"))?;

    let stored = StoredSession {
        server: server.to_string(),
        username: username.to_string(),
        session,
    };
    auth::save_session(profile, &stored)?;
    print_success(&format!(
        "Logged in to {} (user: {})",
        server.cyan(),
        username.cyan()
    ));
    Ok(())
}

pub fn logout(profile: &str) -> Result<()> {
    if auth::remove_session(profile)? {
        print_success("Logged out (session removed)");
    } else {
        println!("No session found for profile \"{profile}\"");
    }
    Ok(())
}

pub fn whoami(profile: &str) -> Result<()> {
    match auth::load_session(profile)? {
        Some(stored) => {
            println!("{}: {}", "Profile".cyan(), profile);
            println!("{}: {}", "Server".cyan(), stored.server.cyan());
            println!("{}: {}", "User".cyan(), stored.username);
            println!(
                "{}: {}",
                "Token".cyan(),
                auth::token_preview(&stored.session.access_token)
            );
            if stored.session.refresh_token.is_none() {
                println!("{}: none, re-login when the token expires", "Refresh".cyan());
            }
        }
        None => {
            print_error(&format!("Not logged in (profile: \"{profile}\")"));
        }
    }
    Ok(())
}
