//! Keyfile installation.
//!
//! Copies the shared secret from its mount point to the path the daemon is
//! pointed at and restricts it to owner read/write. The daemon refuses to
//! start with a keyfile readable by group or others.

use std::fs::Permissions;
use std::io::{self, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::Builder;
use thiserror::Error;
use tokio::fs;

/// Mode applied to the installed keyfile.
pub const KEYFILE_MODE: u32 = 0o600;

/// Errors raised while installing the keyfile. All of them are fatal.
#[derive(Debug, Error)]
pub enum KeyfileError {
    #[error("keyfile source {0} does not exist")]
    SourceMissing(PathBuf),

    #[error("keyfile source {0} is not a regular file")]
    NotAFile(PathBuf),

    #[error("failed to copy keyfile {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Copy `source` to `destination` with mode 0600.
///
/// The secret is written to a temporary file that is created owner-only,
/// synced, and renamed over `destination`, so the destination is never
/// readable by others, not even briefly. Safe to repeat: an existing
/// destination (possibly read-only from an earlier run) is replaced.
pub async fn install_keyfile(source: &Path, destination: &Path) -> Result<PathBuf, KeyfileError> {
    let copy_err = |e: io::Error| KeyfileError::Copy {
        from: source.to_path_buf(),
        to: destination.to_path_buf(),
        source: e,
    };

    let metadata = match fs::metadata(source).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(KeyfileError::SourceMissing(source.to_path_buf()));
        }
        Err(e) => return Err(copy_err(e)),
    };
    if !metadata.is_file() {
        return Err(KeyfileError::NotAFile(source.to_path_buf()));
    }

    let contents = fs::read(source).await.map_err(copy_err)?;
    let bytes = contents.len();

    let directory = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&directory).await.map_err(copy_err)?;

    let target = destination.to_path_buf();
    tokio::task::spawn_blocking(move || write_owner_only(&directory, &target, &contents))
        .await
        .map_err(|e| copy_err(io::Error::other(e)))?
        .map_err(copy_err)?;

    tracing::info!(
        source = %source.display(),
        destination = %destination.display(),
        bytes,
        mode = %format!("{:o}", KEYFILE_MODE),
        "Keyfile installed"
    );

    Ok(destination.to_path_buf())
}

/// Write `contents` to `path` through an owner-only temporary file in
/// `directory`, then rename it into place.
fn write_owner_only(directory: &Path, path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut builder = Builder::new();
    builder.prefix(".keyfile");
    builder.permissions(Permissions::from_mode(KEYFILE_MODE));

    let mut file = builder.tempfile_in(directory)?;
    // Creation mode is subject to the umask; pin it before any byte lands.
    file.as_file()
        .set_permissions(Permissions::from_mode(KEYFILE_MODE))?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|error| error.error)?;
    Ok(())
}
