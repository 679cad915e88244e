//! Cross-platform filesystem utilities
//!
//! - `atomic_rename`: atomic file replacement (Windows requires explicit delete)
//! - `config_file_path`: platform-appropriate location of `config.toml`
//! - `absolutize`: resolve client-supplied paths before they go on the wire

use std::io;
use std::path::{Path, PathBuf};

/// Directory name used under the platform config directory
pub const APP_DIR: &str = "steb";

/// Cross-platform atomic rename that handles Windows file replacement.
///
/// On Unix, `fs::rename` atomically replaces the target if it exists.
/// On Windows, `fs::rename` fails if the target exists, so the target is
/// deleted first.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use steb::fs_utils::atomic_rename;
///
/// std::fs::write("config.tmp", "[listener]\nport = 4404\n")?;
/// atomic_rename(Path::new("config.tmp"), Path::new("config.toml"))?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn atomic_rename(src: &Path, dst: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        if dst.exists() {
            std::fs::remove_file(dst)?;
        }
    }
    std::fs::rename(src, dst)
}

/// Location of the steb configuration file, if the platform has a config dir.
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

/// Make `path` absolute against `base` without touching the filesystem.
///
/// The listener runs with its own working directory, so relative paths
/// from a shell must be resolved on the client side.
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
