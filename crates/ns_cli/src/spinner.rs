use crossterm::cursor::MoveToColumn;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use crossterm::execute;
use std::io::{stderr, IsTerminal};
use std::time::Duration;
use tokio::task::JoinHandle;

const FRAMES: [&str; 4] = ["|", "/", "-", "\\"];

/// Loading indicator drawn on stderr while a search is in flight.
pub struct Spinner {
    handle: Option<JoinHandle<()>>,
}

impl Spinner {
    pub fn start(label: String) -> Self {
        if !stderr().is_terminal() {
            return Self { handle: None };
        }

        let handle = tokio::spawn(async move {
            for frame in FRAMES.iter().cycle() {
                let _ = execute!(
                    stderr(),
                    MoveToColumn(0),
                    Clear(ClearType::CurrentLine),
                    Print(format!("{} {}", frame, label))
                );
                tokio::time::sleep(Duration::from_millis(120)).await;
            }
        });
        Self { handle: Some(handle) }
    }

    pub fn stop(mut self) {
        self.clear();
    }

    fn clear(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            let _ = execute!(stderr(), MoveToColumn(0), Clear(ClearType::CurrentLine));
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.clear();
    }
}
