use crossterm::terminal;
use std::io;
use std::io::Write;

/// Guard for the raw terminal mode, restores the previous mode when dropped.
pub struct RawLock {}

impl Drop for RawLock {
    fn drop(&mut self) {
        // terminal stays in raw mode but no means to repair
        if let Err(e) = terminal::disable_raw_mode() {
            log::error!("Error resetting terminal {e}");
        }
    }
}

/// Set terminal to raw in best-effort mode, only log on failure, so execution
/// in environments without a real terminal (tests, pipes) still works.
pub fn set_terminal_raw() -> RawLock {
    if let Err(e) = terminal::enable_raw_mode() {
        log::error!("Could not set terminal to raw mode: {e}");
    }
    RawLock {}
}

/// Writes program output and flushes it immediately.
///
/// Raw mode does not translate line feeds anymore, so a carriage return is
/// inserted before every line feed here.
///
/// # Errors
/// - writing to or flushing `stdout` failed
pub fn print(stdout: &mut impl Write, data: &str) -> io::Result<()> {
    for (idx, part) in data.split('\n').enumerate() {
        if idx > 0 {
            stdout.write_all(b"\r\n")?;
        }
        stdout.write_all(part.as_bytes())?;
    }
    stdout.flush()
}
