//! Files under the uploads directory.

use std::path::Path;

use tracing::warn;

pub const DEFAULT_AVATAR_FILE: &str = "defaultAvatar.jpg";

fn path_safe(phone_number: &str) -> bool {
    !phone_number.is_empty() && phone_number.chars().all(|c| c.is_ascii_digit() || c == '+')
}

/// Public URL the user's own avatar will have once [`copy_default_avatar`] ran.
///
/// `None` when the template is missing or the phone number is not path-safe.
pub async fn user_avatar_url(uploads: &configs::UploadsConfig, phone_number: &str) -> Option<String> {
    if !path_safe(phone_number) {
        return None;
    }
    let template = Path::new(&uploads.dir).join(DEFAULT_AVATAR_FILE);
    if !tokio::fs::try_exists(&template).await.unwrap_or(false) {
        return None;
    }
    Some(format!("{}/users/{}/avatar.jpg", uploads.public_prefix.trim_end_matches('/'), phone_number))
}

/// Copy the shared default avatar into `users/<phone>/avatar.jpg`.
pub async fn copy_default_avatar(uploads: &configs::UploadsConfig, phone_number: &str) -> std::io::Result<()> {
    if !path_safe(phone_number) {
        return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, "phone number is not path-safe"));
    }
    let root = Path::new(&uploads.dir);
    let user_dir = root.join("users").join(phone_number);
    tokio::fs::create_dir_all(&user_dir).await.map_err(|e| {
        warn!(error = %e, dir = %user_dir.display(), "cannot create avatar dir");
        e
    })?;
    tokio::fs::copy(root.join(DEFAULT_AVATAR_FILE), user_dir.join("avatar.jpg")).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_uploads() -> configs::UploadsConfig {
        let dir = std::env::temp_dir().join(format!("carwash-uploads-{}", uuid::Uuid::new_v4()));
        configs::UploadsConfig { dir: dir.to_string_lossy().into_owned(), public_prefix: "/uploads".into() }
    }

    #[tokio::test]
    async fn copies_template_when_present() {
        let uploads = temp_uploads();
        tokio::fs::create_dir_all(&uploads.dir).await.unwrap();
        tokio::fs::write(Path::new(&uploads.dir).join(DEFAULT_AVATAR_FILE), b"jpg").await.unwrap();

        let url = user_avatar_url(&uploads, "70000000001").await;
        assert_eq!(url.as_deref(), Some("/uploads/users/70000000001/avatar.jpg"));
        let copied = Path::new(&uploads.dir).join("users/70000000001/avatar.jpg");
        assert!(!tokio::fs::try_exists(&copied).await.unwrap());

        copy_default_avatar(&uploads, "70000000001").await.unwrap();
        assert_eq!(tokio::fs::read(copied).await.unwrap(), b"jpg");

        tokio::fs::remove_dir_all(&uploads.dir).await.unwrap();
    }

    #[tokio::test]
    async fn none_without_template() {
        let uploads = temp_uploads();
        assert!(user_avatar_url(&uploads, "70000000001").await.is_none());
        assert!(copy_default_avatar(&uploads, "70000000001").await.is_err());
    }

    #[tokio::test]
    async fn rejects_path_like_phone_numbers() {
        let uploads = temp_uploads();
        tokio::fs::create_dir_all(&uploads.dir).await.unwrap();
        tokio::fs::write(Path::new(&uploads.dir).join(DEFAULT_AVATAR_FILE), b"jpg").await.unwrap();

        assert!(user_avatar_url(&uploads, "../etc").await.is_none());
        assert!(copy_default_avatar(&uploads, "../etc").await.is_err());
        assert!(!tokio::fs::try_exists(Path::new(&uploads.dir).join("etc")).await.unwrap());

        tokio::fs::remove_dir_all(&uploads.dir).await.unwrap();
    }
}
