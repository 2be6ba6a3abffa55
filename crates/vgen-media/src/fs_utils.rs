//! Filesystem helpers shared by the renderer and the editor.

use std::io::ErrorKind as IoErrorKind;
use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};

use crate::error::MediaResult;

/// `EXDEV` on Linux and macOS.
const CROSS_DEVICE_LINK: i32 = 18;

/// Create `dir` and its parents if missing.
pub async fn ensure_dir(dir: impl AsRef<Path>) -> MediaResult<()> {
    fs::create_dir_all(dir.as_ref()).await?;
    Ok(())
}

/// Move `src` to `dst`, replacing `dst`.
///
/// A rename is tried first. When source and destination live on different
/// filesystems the file is copied next to `dst` under a temporary name,
/// renamed into place, and only then is the source removed.
pub async fn move_file(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> MediaResult<()> {
    let (src, dst) = (src.as_ref(), dst.as_ref());

    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).await?;
    }

    match fs::rename(src, dst).await {
        Ok(()) => Ok(()),
        Err(e) if e.raw_os_error() == Some(CROSS_DEVICE_LINK) => {
            debug!(
                "Cross-device move {} -> {}, copying",
                src.display(),
                dst.display()
            );
            let staging = dst.with_extension("partial");
            if let Err(e) = fs::copy(src, &staging).await {
                remove_quietly(&staging).await;
                return Err(e.into());
            }
            if let Err(e) = fs::rename(&staging, dst).await {
                remove_quietly(&staging).await;
                return Err(e.into());
            }
            remove_quietly(src).await;
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete a file, ignoring "not found" and logging anything else.
pub async fn remove_quietly(path: impl AsRef<Path>) {
    let path = path.as_ref();
    match fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == IoErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
    }
}

/// Async existence check.
pub async fn file_exists(path: impl AsRef<Path>) -> bool {
    fs::metadata(path.as_ref())
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_move_file_replaces_destination() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("clip_0.mp4");
        let dst = dir.path().join("final.mp4");
        fs::write(&src, b"new").await.unwrap();
        fs::write(&dst, b"old").await.unwrap();

        move_file(&src, &dst).await.unwrap();

        assert!(!file_exists(&src).await);
        assert_eq!(fs::read(&dst).await.unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_move_file_creates_parent() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("a.mp4");
        let dst = dir.path().join("nested").join("b.mp4");
        fs::write(&src, b"x").await.unwrap();

        move_file(&src, &dst).await.unwrap();
        assert!(file_exists(&dst).await);
    }

    #[tokio::test]
    async fn test_move_missing_source_fails() {
        let dir = TempDir::new().unwrap();
        let result = move_file(dir.path().join("nope"), dir.path().join("dst")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_remove_quietly_ignores_missing() {
        let dir = TempDir::new().unwrap();
        remove_quietly(dir.path().join("ghost.txt")).await;
        assert!(!file_exists(dir.path()).await, "directories are not files");
    }
}
