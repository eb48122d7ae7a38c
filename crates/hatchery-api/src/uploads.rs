use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// Manages the profile-image upload directory.
///
/// Each image is stored flat as `{dir}/{user_id}.{ext}`, so a re-upload
/// for the same user with the same extension overwrites the old file.
pub struct Uploads {
    dir: PathBuf,
}

impl Uploads {
    pub async fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).await?;
        info!("Upload directory: {}", dir.display());
        Ok(Self { dir })
    }

    /// Write an uploaded image to disk and return the stored path.
    ///
    /// The file keeps the original extension; the stem is the user id,
    /// falling back to a millisecond timestamp when the id is unusable.
    pub async fn save_profile_image(
        &self,
        user_id: i64,
        original_name: &str,
        data: &[u8],
    ) -> Result<String> {
        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin");

        let stem = if user_id > 0 {
            user_id.to_string()
        } else {
            chrono::Utc::now().timestamp_millis().to_string()
        };

        let path = self.dir.join(format!("{stem}.{ext}"));
        fs::write(&path, data).await?;
        info!("Stored profile image at {}", path.display());

        Ok(path.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "hatchery-uploads-{}-{}",
            tag,
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ))
    }

    #[tokio::test]
    async fn stores_image_under_user_id_with_original_extension() {
        let dir = temp_dir("ext");
        let uploads = Uploads::new(dir.clone()).await.unwrap();

        let stored = uploads
            .save_profile_image(7, "me.PNG", b"img-bytes")
            .await
            .unwrap();

        assert!(stored.ends_with("7.PNG"));
        assert_eq!(fs::read(&stored).await.unwrap(), b"img-bytes");
        fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn falls_back_to_timestamp_stem_and_bin_extension() {
        let dir = temp_dir("fallback");
        let uploads = Uploads::new(dir.clone()).await.unwrap();

        let stored = uploads
            .save_profile_image(0, "no-extension", b"x")
            .await
            .unwrap();

        assert!(stored.ends_with(".bin"));
        assert!(!stored.contains("/0.bin"));
        fs::remove_dir_all(&dir).await.unwrap();
    }
}
