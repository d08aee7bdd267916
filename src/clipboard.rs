//! Fire-and-forget clipboard access.

use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

pub trait Clipboard: Send + Sync {
    /// Copies `text`. Never reports failure to the caller.
    fn write_text(&self, text: &str);
}

/// Candidate clipboard programs, tried in order
const CLIPBOARD_COMMANDS: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("pbcopy", &[]),
];

/// Pipes text into the first clipboard tool found on the system.
///
/// Must be used from within a tokio runtime; the copy runs in a detached task.
#[derive(Debug, Default, Clone)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }

    /// Copies `text` and waits for the tool to finish.
    ///
    /// Returns the program that accepted the text.
    pub async fn copy(&self, text: &str) -> std::io::Result<&'static str> {
        for (program, args) in CLIPBOARD_COMMANDS {
            match pipe_to(program, args, text).await {
                Ok(()) => {
                    debug!(program, "copied to clipboard");
                    return Ok(*program);
                }
                Err(e) => debug!(program, error = %e, "clipboard tool unavailable"),
            }
        }
        Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no clipboard tool found (tried wl-copy, xclip, pbcopy)",
        ))
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&self, text: &str) {
        let clipboard = self.clone();
        let text = text.to_string();
        tokio::spawn(async move {
            if let Err(e) = clipboard.copy(&text).await {
                warn!(error = %e, "clipboard copy failed");
            }
        });
    }
}

async fn pipe_to(program: &str, args: &[&str], text: &str) -> std::io::Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes()).await?;
    }

    let status = child.wait().await?;
    if status.success() {
        Ok(())
    } else {
        Err(std::io::Error::other(format!("{} exited with {}", program, status)))
    }
}
