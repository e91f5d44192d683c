//! Filesystem helpers for downloads, caches and finished clips.

use std::path::Path;
use std::time::{Duration, SystemTime};
use tokio::fs;

use crate::error::{MediaError, MediaResult};

/// Whether `path` exists, is non-empty and was modified within `max_age`.
pub async fn is_fresh(path: impl AsRef<Path>, max_age: Duration) -> bool {
    let Ok(metadata) = fs::metadata(path.as_ref()).await else {
        return false;
    };
    if !metadata.is_file() || metadata.len() == 0 {
        return false;
    }
    metadata
        .modified()
        .ok()
        .and_then(|modified| SystemTime::now().duration_since(modified).ok())
        .map(|age| age <= max_age)
        .unwrap_or(false)
}

/// Move a file, falling back to copy and delete across filesystems.
///
/// The copy lands in a sibling temp file first and is renamed into place,
/// so readers never observe a partially written destination.
pub async fn move_file(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> MediaResult<()> {
    let (src, dst) = (src.as_ref(), dst.as_ref());

    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).await?;
    }

    match fs::rename(src, dst).await {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device_error(&e) => {
            tracing::debug!(
                "Cross-device rename, copying instead: {} -> {}",
                src.display(),
                dst.display()
            );
            let tmp_dst = dst.with_extension("partial");
            fs::copy(src, &tmp_dst).await?;
            if let Err(e) = fs::rename(&tmp_dst, dst).await {
                let _ = fs::remove_file(&tmp_dst).await;
                return Err(MediaError::from(e));
            }
            remove_quietly(src).await;
            Ok(())
        }
        Err(e) => Err(MediaError::from(e)),
    }
}

/// Delete a file, logging instead of failing.
pub async fn remove_quietly(path: impl AsRef<Path>) {
    let path = path.as_ref();
    if let Err(e) = fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("Failed to remove {}: {}", path.display(), e);
        }
    }
}

/// EXDEV (cross-device link) on Linux and macOS.
fn is_cross_device_error(e: &std::io::Error) -> bool {
    e.raw_os_error() == Some(18)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_move_file_to_subdirectory() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("clip.mp4");
        let dst = dir.path().join("out").join("clip.mp4");
        fs::write(&src, b"frames").await.unwrap();

        move_file(&src, &dst).await.unwrap();

        assert!(!src.exists());
        assert_eq!(fs::read(&dst).await.unwrap(), b"frames");
    }

    #[tokio::test]
    async fn test_is_fresh() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("video.mp4");
        assert!(!is_fresh(&path, Duration::from_secs(60)).await);

        fs::write(&path, b"").await.unwrap();
        assert!(!is_fresh(&path, Duration::from_secs(60)).await);

        fs::write(&path, b"data").await.unwrap();
        assert!(is_fresh(&path, Duration::from_secs(60)).await);
    }

    #[tokio::test]
    async fn test_remove_quietly_missing_file() {
        let dir = TempDir::new().unwrap();
        remove_quietly(dir.path().join("nope")).await;
    }

    #[test]
    fn test_is_cross_device_error() {
        assert!(is_cross_device_error(&std::io::Error::from_raw_os_error(18)));
        assert!(!is_cross_device_error(&std::io::Error::from_raw_os_error(2)));
    }
}
