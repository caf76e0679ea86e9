use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, poll, read};
use std::io;
use std::time::Duration;

/// Providing keyboard input independent of an implementation.
///
/// The status register poll uses the non-blocking pair `check_input_available`
/// and `get_input_character`; the input trap routines use the blocking
/// `read_input_character`. The two families stay separate on purpose: the
/// execution loop must never stall on a status poll.
pub trait KeyboardInputProvider {
    /// Checks if input is available, does not block.
    ///
    /// # Errors
    /// - reading from the underlying event source failed
    fn check_input_available(&mut self) -> io::Result<bool>;
    /// Consumes the pending character if `check_input_available` returned
    /// `true`, panics otherwise.
    fn get_input_character(&mut self) -> char;
    /// Blocks until the next character arrives and consumes it.
    ///
    /// # Errors
    /// - reading from the underlying event source failed
    /// - CTRL-C arrived while waiting (`ErrorKind::Interrupted`)
    fn read_input_character(&mut self) -> io::Result<char>;
    /// True once CTRL-C was seen on the keyboard.
    fn is_interrupted(&self) -> bool;
}

pub struct TerminalInputProvider {
    is_char_available: bool,
    available_char: Option<char>,
    is_interrupted: bool,
}

impl TerminalInputProvider {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            is_char_available: false,
            available_char: None,
            is_interrupted: false,
        }
    }
}

impl Default for TerminalInputProvider {
    fn default() -> Self {
        Self::new()
    }
}

// Raw mode reports the enter key as a dedicated key code, programs expect
// the line feed `getchar` would have delivered.
fn key_event_character(event: &KeyEvent) -> Option<char> {
    match event.code {
        KeyCode::Enter => Some('\n'),
        code => code.as_char(),
    }
}

fn is_ctrl_c(event: &KeyEvent) -> bool {
    event.code.as_char() == Some('c') && event.modifiers == KeyModifiers::CONTROL
}

impl KeyboardInputProvider for TerminalInputProvider {
    fn check_input_available(&mut self) -> io::Result<bool> {
        if self.is_char_available {
            return Ok(true);
        }
        if poll(Duration::from_secs(0))?
            && let Some(event) = read()?.as_key_press_event()
        {
            if is_ctrl_c(&event) {
                self.is_interrupted = true;
            } else if let Some(c) = key_event_character(&event) {
                self.is_char_available = true;
                self.available_char = Some(c);
                return Ok(true);
            }
        }
        Ok(false)
    }
    fn get_input_character(&mut self) -> char {
        self.is_char_available = false;
        self.available_char
            .take()
            .unwrap_or_else(|| panic!("No input available"))
    }
    fn read_input_character(&mut self) -> io::Result<char> {
        if self.is_char_available {
            return Ok(self.get_input_character());
        }
        loop {
            if let Some(event) = read()?.as_key_press_event() {
                if is_ctrl_c(&event) {
                    self.is_interrupted = true;
                    return Err(io::Error::new(
                        io::ErrorKind::Interrupted,
                        "CTRL-C during keyboard read",
                    ));
                }
                if let Some(c) = key_event_character(&event) {
                    return Ok(c);
                }
            }
        }
    }
    fn is_interrupted(&self) -> bool {
        self.is_interrupted
    }
}
