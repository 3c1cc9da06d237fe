//! External script invocation (§4.I, §6 Watcher script contract).

use std::path::Path;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

/// Run the configured script with `IMCP_NEW_MESSAGE_COUNT` set, bounded by
/// `timeout`. Never returns an error: failures are logged, matching §4.I's
/// "script execution errors are logged but not fatal".
pub async fn run_script(script_path: &Path, new_message_count: i64, timeout: Duration) {
    let mut command = Command::new(script_path);
    command.env("IMCP_NEW_MESSAGE_COUNT", new_message_count.to_string());
    command.stdout(std::process::Stdio::null());
    command.stderr(std::process::Stdio::piped());
    command.kill_on_drop(true);

    let spawned = match command.spawn() {
        Ok(child) => child,
        Err(err) => {
            warn!(script = %script_path.display(), error = %err, "failed to spawn watcher script");
            return;
        },
    };

    match tokio::time::timeout(timeout, spawned.wait_with_output()).await {
        Ok(Ok(output)) => {
            if output.status.success() {
                debug!(script = %script_path.display(), count = new_message_count, "watcher script completed");
            } else {
                let stderr = String::from_utf8_lossy(&output.stderr);
                warn!(
                    script = %script_path.display(),
                    status = ?output.status.code(),
                    stderr = %stderr,
                    "watcher script exited non-zero"
                );
            }
        },
        Ok(Err(err)) => {
            warn!(script = %script_path.display(), error = %err, "watcher script IO error");
        },
        Err(_) => {
            warn!(script = %script_path.display(), timeout_secs = timeout.as_secs(), "watcher script timed out");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_script_is_logged_not_panicked() {
        run_script(
            Path::new("/nonexistent/imcp-watcher-test-script"),
            5,
            Duration::from_secs(1),
        )
        .await;
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn successful_script_runs_to_completion() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("trigger.sh");
        std::fs::write(&script, "#!/bin/sh\nexit 0\n").unwrap();
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        }

        run_script(&script, 3, Duration::from_secs(5)).await;
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_script_is_timed_out_and_the_process_is_killed() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("slow.sh");
        let finished_marker = dir.path().join("finished");
        std::fs::write(
            &script,
            format!("#!/bin/sh\nsleep 3\ntouch {}\n", finished_marker.display()),
        )
        .unwrap();
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        }

        let start = tokio::time::Instant::now();
        run_script(&script, 1, Duration::from_millis(200)).await;
        assert!(start.elapsed() < Duration::from_secs(3));

        // If the child had survived the timeout (no `kill_on_drop`), it would
        // finish its 3-second sleep and leave the marker behind. Wait past
        // that point to prove it never ran to completion.
        tokio::time::sleep(Duration::from_secs(4)).await;
        assert!(
            !finished_marker.exists(),
            "timed-out script kept running to completion instead of being killed"
        );
    }
}
