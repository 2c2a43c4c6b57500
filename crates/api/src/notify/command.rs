//! Email delivery through an external mail command (e.g. `sendmail -t`)

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::{Message, Notifier, TransportError};

/// Pipes a plain-text RFC 822 message into an external command's stdin
#[derive(Debug, Clone)]
pub struct CommandNotifier {
    program: String,
    args: Vec<String>,
    email_from: String,
    timeout: Duration,
}

impl CommandNotifier {
    /// Build from a whitespace-separated command line. Returns `None` when the
    /// command line is empty.
    pub fn from_command_line(
        command_line: &str,
        email_from: impl Into<String>,
        timeout: Duration,
    ) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;

        Some(Self {
            program,
            args: parts.collect(),
            email_from: email_from.into(),
            timeout,
        })
    }

    fn render(&self, destination: &str, message: &Message) -> String {
        format!(
            "From: {}\r\nTo: {}\r\nSubject: {}\r\nMIME-Version: 1.0\r\nContent-Type: text/plain; charset=utf-8\r\n\r\n{}",
            self.email_from, destination, message.subject, message.text
        )
    }

    async fn run(&self, input: String) -> Result<(), TransportError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(TransportError::Spawn)?;

        if let Some(mut stdin) = child.stdin.take() {
            // A command that exits without reading its input is judged by its
            // exit status below, not by the broken pipe.
            match stdin.write_all(input.as_bytes()).await {
                Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => {
                    return Err(TransportError::Spawn(e));
                }
                _ => {}
            }
            // Dropping stdin closes the pipe so the command sees EOF
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(TransportError::Spawn)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TransportError::Exit(format!(
                "{}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for CommandNotifier {
    fn name(&self) -> &'static str {
        "command"
    }

    async fn send(&self, destination: &str, message: &Message) -> Result<(), TransportError> {
        let input = self.render(destination, message);

        tokio::time::timeout(self.timeout, self.run(input))
            .await
            .map_err(|_| TransportError::Timeout(self.timeout))?
    }
}
