//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::{info, warn};

/// Ensure the uploads directory exists and report whether the default avatar is present.
pub async fn ensure_env(uploads_dir: &str) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(uploads_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {uploads_dir}: {e}"))?;
    let avatar = Path::new(uploads_dir).join("defaultAvatar.jpg");
    if tokio::fs::metadata(&avatar).await.is_err() {
        warn!(path = %avatar.display(), "default avatar not found; new users get the configured avatar url");
    } else {
        info!(%uploads_dir, "uploads directory ready");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::ensure_env;

    #[tokio::test]
    async fn creates_missing_uploads_dir() {
        let dir = std::env::temp_dir().join(format!("carwash-uploads-{}", std::process::id()));
        let _ = tokio::fs::remove_dir_all(&dir).await;
        ensure_env(dir.to_str().unwrap()).await.unwrap();
        assert!(tokio::fs::metadata(&dir).await.unwrap().is_dir());
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
