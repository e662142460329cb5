//! Session persistence between CLI invocations.

use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use vitrine_gateway::Session;

/// Reads the stored session. A missing, unreadable-as-JSON, or expired file
/// yields `None`; an expired file is also removed.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or removed.
pub(crate) async fn load(path: &Path, max_age_secs: i64) -> anyhow::Result<Option<Session>> {
    let raw = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e)
                .with_context(|| format!("failed to read session file {}", path.display()));
        }
    };

    let session: Session = match serde_json::from_slice(&raw) {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "ignoring unreadable session file"
            );
            return Ok(None);
        }
    };

    if session.is_expired(max_age_secs, Utc::now()) {
        tracing::info!(issued_at = %session.issued_at, "stored session expired");
        remove(path).await?;
        return Ok(None);
    }
    Ok(Some(session))
}

/// Writes `session` to `path`, or removes the file when `session` is `None`.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub(crate) async fn store(path: &Path, session: Option<&Session>) -> anyhow::Result<()> {
    let Some(session) = session else {
        return remove(path).await;
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let body = serde_json::to_vec_pretty(session)?;
    tokio::fs::write(path, body)
        .await
        .with_context(|| format!("failed to write session file {}", path.display()))?;
    tracing::debug!(path = %path.display(), "session stored");
    Ok(())
}

async fn remove(path: &Path) -> anyhow::Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => {
            Err(e).with_context(|| format!("failed to remove session file {}", path.display()))
        }
    }
}
