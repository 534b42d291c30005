pub mod auth;
pub mod resource;
pub mod run;

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use fdmkit_client::FdmClient;
use fdmkit_core::{ConfigObject, Params, into_object};

/// Reads a JSON object payload from a file, or stdin for `-`.
pub fn read_data(path: &Path) -> Result<ConfigObject> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read from stdin")?;
        buf
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?
    };
    let value = serde_json::from_str(&content).context("Invalid JSON")?;
    Ok(into_object(value, "data")?)
}

/// Parses `key=value` pairs.
pub fn parse_params(raw: &[String]) -> Result<Params> {
    raw.iter()
        .map(|pair| {
            let (key, value) = pair
                .split_once('=')
                .with_context(|| format!("Invalid parameter \"{pair}\". Expected key=value"))?;
            if key.is_empty() {
                anyhow::bail!("Invalid parameter \"{pair}\". Key must not be empty");
            }
            Ok((key.to_string(), value.to_string()))
        })
        .collect()
}

/// Client for the profile's stored session.
pub fn connect(server: &str, profile: &str) -> Result<FdmClient> {
    let cfg = crate::config::load_profile(profile)?;
    let stored = crate::auth::load_session(profile)?
        .with_context(|| format!("Not logged in (profile: \"{profile}\"). Run: fdmkit login"))?;
    if stored.server != server {
        anyhow::bail!(
            "Stored session is for {}, not {server}. Run: fdmkit login",
            stored.server
        );
    }
    Ok(FdmClient::new(cfg.client_config(server)?)?.with_session(stored.session))
}

/// Saves the client's session if a token refresh replaced it.
pub async fn persist_refreshed_session(client: &FdmClient, profile: &str) -> Result<()> {
    let Some(session) = client.session().await else {
        return Ok(());
    };
    if let Some(mut stored) = crate::auth::load_session(profile)?
        && stored.session != session
    {
        tracing::debug!(profile, "saving refreshed session");
        stored.session = session;
        crate::auth::save_session(profile, &stored)?;
    }
    Ok(())
}
