use std::path::PathBuf;
use std::time::Duration;

use crate::core::providers::fetch::FetchError;

/// Run an external command with a hard timeout, returning stdout.
///
/// Every failure mode (missing binary, non-zero exit, timeout, non-UTF8
/// output) maps to `ToolUnavailable` so callers degrade instead of crash.
pub async fn run_command(
    cmd: &str,
    args: &[&str],
    timeout: Duration,
) -> Result<String, FetchError> {
    let output = tokio::time::timeout(
        timeout,
        tokio::process::Command::new(cmd).args(args).output(),
    )
    .await
    .map_err(|_| FetchError::ToolUnavailable(format!("`{}` timed out", cmd)))?
    .map_err(|e| FetchError::ToolUnavailable(format!("failed to execute `{}`: {}", cmd, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(FetchError::ToolUnavailable(format!(
            "`{}` exited with {}: {}",
            cmd,
            output.status,
            stderr.trim()
        )));
    }

    String::from_utf8(output.stdout)
        .map(|s| s.trim().to_string())
        .map_err(|_| FetchError::ToolUnavailable(format!("non-UTF8 output from `{}`", cmd)))
}

/// Check if a binary exists in PATH. Returns the full path if found.
pub fn which(binary: &str) -> Option<PathBuf> {
    std::env::var_os("PATH").and_then(|paths| {
        std::env::split_paths(&paths)
            .map(|dir| dir.join(binary))
            .find(|p| p.is_file())
    })
}
