use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;

/// PID file under the user's runtime directory, `/tmp` as fallback.
pub fn default_path() -> PathBuf {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".to_string());
    Path::new(&runtime_dir).join("spacelightd.pid")
}

pub fn write(path: &Path) -> Result<()> {
    fs::write(path, format!("{}\n", std::process::id()))
        .with_context(|| format!("writing PID file {}", path.display()))
}

/// PID recorded in the file, if the file exists and parses.
pub fn read(path: &Path) -> Result<Option<i32>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("reading PID file {}", path.display()))
        }
    };
    let pid = content
        .trim()
        .parse::<i32>()
        .with_context(|| format!("PID file {} is malformed", path.display()))?;
    Ok(Some(pid))
}

/// PID from the file, but only when that process is still alive. A stale
/// file left by a dead process is removed on the way.
pub fn read_live_pid(path: &Path) -> Result<Option<i32>> {
    match read(path)? {
        Some(pid) if is_alive(pid) => Ok(Some(pid)),
        Some(_) => {
            remove(path);
            Ok(None)
        }
        None => Ok(None),
    }
}

/// Probe the process with a null signal.
pub fn is_alive(pid: i32) -> bool {
    kill(Pid::from_raw(pid), None).is_ok()
}

/// Ask the process to shut down.
pub fn terminate(pid: i32) -> Result<()> {
    kill(Pid::from_raw(pid), Signal::SIGTERM)
        .map_err(|err| anyhow::anyhow!("failed to send SIGTERM to process {pid}: {err}"))
}

pub fn remove(path: &Path) {
    if let Err(err) = fs::remove_file(path) {
        log::warn!("Could not remove PID file {}: {}", path.display(), err);
    }
}
