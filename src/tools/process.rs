// Shared subprocess runner for command-executing tools
//
// Captures output with a hard size cap and a wall-clock deadline. On
// deadline the child is killed rather than left running; the original
// output-polling approach could leak a child blocked on I/O.

use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

#[derive(Debug)]
pub struct CommandOutput {
    pub stdout: String,
    pub truncated: bool,
    pub exit_code: Option<i32>,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("command timed out after {0} seconds")]
    TimedOut(u64),
    #[error("failed to spawn command: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Run `command` through `sh -c`, reading stdout until EOF, the size cap,
/// or the deadline. Callers append `2>&1` themselves when they want
/// combined output.
pub async fn run_shell(
    command: &str,
    timeout: Duration,
    max_output: usize,
) -> Result<CommandOutput, CommandError> {
    let mut child = Command::new("sh")
        .arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()?;

    let mut stdout = child.stdout.take().expect("stdout was piped");
    let deadline = tokio::time::Instant::now() + timeout;
    let mut buf: Vec<u8> = Vec::new();
    let mut chunk = [0u8; 4096];
    let mut truncated = false;

    loop {
        tokio::select! {
            read = stdout.read(&mut chunk) => {
                match read {
                    Ok(0) => break,
                    Ok(n) => {
                        buf.extend_from_slice(&chunk[..n]);
                        if buf.len() > max_output {
                            buf.truncate(max_output);
                            truncated = true;
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
            _ = tokio::time::sleep_until(deadline) => {
                let _ = child.kill().await;
                return Err(CommandError::TimedOut(timeout.as_secs()));
            }
        }
    }

    let exit_code = if truncated {
        // Output cap hit: stop the producer, exit status no longer meaningful
        let _ = child.kill().await;
        None
    } else {
        child.wait().await.ok().and_then(|status| status.code())
    };

    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&buf).into_owned(),
        truncated,
        exit_code,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_captures_stdout() {
        let out = run_shell("echo hello", Duration::from_secs(5), 10_000)
            .await
            .unwrap();
        assert_eq!(out.stdout.trim(), "hello");
        assert!(!out.truncated);
        assert_eq!(out.exit_code, Some(0));
    }

    #[tokio::test]
    async fn test_reports_exit_code() {
        let out = run_shell("exit 3", Duration::from_secs(5), 10_000)
            .await
            .unwrap();
        assert_eq!(out.exit_code, Some(3));
    }

    #[tokio::test]
    async fn test_truncates_at_cap() {
        let out = run_shell("yes | head -c 5000", Duration::from_secs(5), 100)
            .await
            .unwrap();
        assert!(out.truncated);
        assert_eq!(out.stdout.len(), 100);
    }

    #[tokio::test]
    async fn test_times_out_and_kills() {
        let err = run_shell("sleep 30", Duration::from_secs(1), 10_000)
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::TimedOut(1)));
    }

    #[tokio::test]
    async fn test_stderr_not_captured_without_redirection() {
        let out = run_shell("echo oops >&2", Duration::from_secs(5), 10_000)
            .await
            .unwrap();
        assert!(out.stdout.is_empty());
    }

    #[tokio::test]
    async fn test_stderr_captured_with_redirection() {
        let out = run_shell("(echo oops >&2) 2>&1", Duration::from_secs(5), 10_000)
            .await
            .unwrap();
        assert!(out.stdout.contains("oops"));
    }
}
