//! Clipboard access with two transports:
//! 1. OSC 52 terminal escape sequence (works over SSH; needs stdout to be a tty)
//! 2. System clipboard via `arboard`

use std::io::{IsTerminal, Write};

use anyhow::Result;
use stackscroll_core::share::Clipboard;

/// Clipboard for a program that owns the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalClipboard;

impl TerminalClipboard {
    /// Writes the OSC 52 sequence; the terminal copies the payload.
    fn copy_osc52(text: &str) -> Result<(), ClipboardError> {
        use base64::Engine;

        let encoded = base64::engine::general_purpose::STANDARD.encode(text);

        // ESC ] 52 ; c ; <base64> ESC \   ('c' = system clipboard)
        let mut stdout = std::io::stdout();
        write!(stdout, "\x1b]52;c;{encoded}\x1b\\")
            .map_err(|e| ClipboardError::Osc52(e.to_string()))?;
        stdout
            .flush()
            .map_err(|e| ClipboardError::Osc52(e.to_string()))
    }

    fn copy_system(text: &str) -> Result<(), ClipboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ClipboardError::System(e.to_string()))?;
        clipboard
            .set_text(text)
            .map_err(|e| ClipboardError::System(e.to_string()))
    }
}

impl Clipboard for TerminalClipboard {
    /// OSC 52 only reaches a clipboard when stdout is a terminal; a pipe or
    /// file would just receive the escape bytes.
    fn copy_text(&self, text: &str) -> Result<()> {
        if std::io::stdout().is_terminal() && Self::copy_osc52(text).is_ok() {
            return Ok(());
        }
        Ok(Self::copy_system(text)?)
    }
}

/// Clipboard operation errors.
#[derive(Debug)]
pub enum ClipboardError {
    Osc52(String),
    System(String),
}

impl std::fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClipboardError::Osc52(msg) => write!(f, "OSC 52 clipboard failed: {msg}"),
            ClipboardError::System(msg) => write!(f, "System clipboard failed: {msg}"),
        }
    }
}

impl std::error::Error for ClipboardError {}
