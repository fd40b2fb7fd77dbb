//! Filesystem helpers

use std::io::Write;
use std::path::Path;

/// Write `bytes` to `path` through a temp file in the same directory, then
/// rename it into place. Readers never observe a partial file.
pub async fn write_atomic(path: &Path, bytes: Vec<u8>) -> std::io::Result<()> {
    let path = path.to_path_buf();
    let Some(dir) = path.parent().map(Path::to_path_buf) else {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "path has no parent directory",
        ));
    };

    tokio::task::spawn_blocking(move || -> std::io::Result<()> {
        std::fs::create_dir_all(&dir)?;
        let mut temp_file = tempfile::NamedTempFile::new_in(&dir)?;
        temp_file.write_all(&bytes)?;
        temp_file.persist(&path).map_err(|e| e.error)?;
        Ok(())
    })
    .await
    .map_err(std::io::Error::other)?
}
