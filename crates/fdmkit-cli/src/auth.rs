use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use fdmkit_client::Session;
use serde::{Deserialize, Serialize};

/// A logged-in session persisted per profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub server: String,
    pub username: String,
    #[serde(flatten)]
    pub session: Session,
}

fn session_path(profile: &str) -> Result<PathBuf> {
    Ok(crate::config::config_dir()?.join(format!("session.{profile}.json")))
}

fn load_from(path: &Path) -> Result<Option<StoredSession>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let stored: StoredSession = serde_json::from_str(&content)?;
    Ok(Some(stored))
}

fn save_to(path: &Path, stored: &StoredSession) -> Result<()> {
    let content = serde_json::to_string_pretty(stored)?;
    let mut file = open_private(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

/// Opens `path` for writing, readable by the owner only.
#[cfg(unix)]
fn open_private(path: &Path) -> Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies when the file is created.
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> Result<File> {
    Ok(OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?)
}

pub fn load_session(profile: &str) -> Result<Option<StoredSession>> {
    load_from(&session_path(profile)?)
}

pub fn save_session(profile: &str, stored: &StoredSession) -> Result<()> {
    save_to(&session_path(profile)?, stored)
}

pub fn remove_session(profile: &str) -> Result<bool> {
    let path = session_path(profile)?;
    if path.exists() {
        fs::remove_file(path)?;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Shortened token for display.
pub fn token_preview(token: &str) -> String {
    if token.len() > 20 {
        format!("{}...{}", &token[..8], &token[token.len() - 8..])
    } else {
        "*".repeat(token.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.default.json");
        let stored = StoredSession {
            server: "https://fdm".into(),
            username: "admin".into(),
            session: Session::from_access_token("a").with_refresh_token("r"),
        };

        save_to(&path, &stored).unwrap();
        assert_eq!(load_from(&path).unwrap(), Some(stored));
        assert_eq!(load_from(&dir.path().join("other.json")).unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_session_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.default.json");
        fs::write(&path, "{}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        let stored = StoredSession {
            server: "https://fdm".into(),
            username: "admin".into(),
            session: Session::from_access_token("a"),
        };
        save_to(&path, &stored).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(load_from(&path).unwrap(), Some(stored));
    }

    #[test]
    fn test_token_preview() {
        assert_eq!(token_preview("short"), "*****");
        let preview = token_preview("0123456789abcdefghijklmnopqrstuv");
        assert_eq!(preview, "01234567...opqrstuv");
    }
}
