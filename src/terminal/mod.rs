// Terminal presentation: styled output, serialized streaming writes, and
// the interactive confirmation dialog.

use crossterm::style::Stylize;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use std::io::{self, Write};
use std::sync::Mutex;

/// Visual category for a line of output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Normal,
    User,
    System,
    Error,
    Success,
    Tool,
    Model,
    Warning,
    Header,
}

fn style(text: &str, kind: MessageType) -> String {
    match kind {
        MessageType::Normal => text.to_string(),
        MessageType::User => text.blue().to_string(),
        MessageType::System => text.yellow().to_string(),
        MessageType::Error => text.red().to_string(),
        MessageType::Success => text.green().to_string(),
        MessageType::Tool => text.cyan().to_string(),
        MessageType::Model => text.white().to_string(),
        MessageType::Warning => text.yellow().bold().to_string(),
        MessageType::Header => text.magenta().bold().to_string(),
    }
}

pub fn print(text: &str, kind: MessageType) {
    println!("{}", style(text, kind));
}

pub fn print_inline(text: &str, kind: MessageType) {
    print!("{}", style(text, kind));
    let _ = io::stdout().flush();
}

// Streaming chunks arrive from the network read loop; a single lock keeps
// interleaved writes whole.
static STREAM_LOCK: Mutex<()> = Mutex::new(());

pub fn stream_chunk(text: &str, kind: MessageType) {
    let _guard = STREAM_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    print!("{}", style(text, kind));
    let _ = io::stdout().flush();
}

/// What a confirmation dialog is protecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmKind {
    ShellCommand,
    FileOperation,
    Calculation,
}

/// Blocking allow/deny checkpoint for risky tool actions. Injected into
/// tools so tests can substitute a fake.
pub trait ConfirmationGate: Send + Sync {
    fn confirm(&self, kind: ConfirmKind, title: &str, message: &str, details: &str, tip: &str)
        -> bool;
}

/// Restores the terminal on every exit path, including panics.
struct RawModeGuard {
    active: bool,
}

impl RawModeGuard {
    fn new() -> Self {
        Self {
            active: enable_raw_mode().is_ok(),
        }
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if self.active {
            let _ = disable_raw_mode();
        }
    }
}

/// Read a single keypress without echo or line buffering.
fn read_keypress() -> Option<KeyCode> {
    let _guard = RawModeGuard::new();
    loop {
        match event::read() {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => return Some(key.code),
            Ok(_) => continue,
            Err(_) => return None,
        }
    }
}

/// The interactive gate: renders the dialog and waits for one keypress.
/// Enter confirms; any other key cancels. Stateless across calls.
pub struct TerminalGate;

impl ConfirmationGate for TerminalGate {
    fn confirm(
        &self,
        kind: ConfirmKind,
        title: &str,
        message: &str,
        details: &str,
        tip: &str,
    ) -> bool {
        let header = match kind {
            ConfirmKind::ShellCommand => "----------- SHELL COMMAND CONFIRMATION -----------",
            ConfirmKind::FileOperation => "----------- FILE OPERATION CONFIRMATION -----------",
            ConfirmKind::Calculation => "----------- CALCULATION SAFETY WARNING -----------",
        };

        println!();
        print(header, MessageType::Warning);
        print(title, MessageType::Header);
        print(&format!("  {}", message), MessageType::Normal);

        if !details.is_empty() {
            println!();
            print("Details:", MessageType::Header);
            print(details, MessageType::Normal);
        }

        println!();
        print_inline(
            "Press Enter to confirm, or any other key to cancel: ",
            MessageType::System,
        );

        if !tip.is_empty() {
            println!();
            print(tip, MessageType::Normal);
        }

        let confirmed = matches!(read_keypress(), Some(KeyCode::Enter));

        println!();
        if confirmed {
            print("Confirmed.", MessageType::Success);
        } else {
            print("Cancelled.", MessageType::Error);
        }
        print(&"-".repeat(header.len()), MessageType::Warning);

        confirmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_passes_text_through() {
        assert!(style("hello", MessageType::Error).contains("hello"));
        assert_eq!(style("plain", MessageType::Normal), "plain");
    }

    #[test]
    fn test_stream_chunk_is_callable_concurrently() {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                std::thread::spawn(move || {
                    stream_chunk(&format!("chunk{}", i), MessageType::Model);
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
    }
}
