use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode};
use crossterm::terminal;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Blocks until the user presses ESC, Enter, or `q`.
pub fn wait_for_escape() -> io::Result<()> {
    terminal::enable_raw_mode()?;
    let result = loop {
        match event::poll(POLL_INTERVAL) {
            Ok(false) => continue,
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) => match key.code {
                    KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => break Ok(()),
                    _ => {}
                },
                Ok(_) => {}
                Err(err) => break Err(err),
            },
            Err(err) => break Err(err),
        }
    };
    terminal::disable_raw_mode()?;
    result
}
