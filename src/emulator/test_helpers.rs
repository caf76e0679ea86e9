//! Shared fakes for the tests: a scripted keyboard and a capturing writer.
use crate::emulator::Emulator;
use crate::hardware::keyboard::KeyboardInputProvider;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::io::Write;
use std::rc::Rc;

pub struct StringWriter {
    vec: Vec<u8>,
}
impl Write for StringWriter {
    fn write(&mut self, data: &[u8]) -> Result<usize, io::Error> {
        self.vec.write(data)
    }
    fn flush(&mut self) -> Result<(), io::Error> {
        Ok(())
    }
}
impl StringWriter {
    pub fn new() -> Self {
        let vec = Vec::<u8>::with_capacity(120);
        Self { vec }
    }
    pub fn get_string(&self) -> String {
        String::from_utf8(self.vec.clone()).unwrap()
    }
}

/// Keyboard fed from a fixed string instead of the terminal.
pub struct FakeKeyboardInputProvider {
    chars: VecDeque<char>,
    interrupted: bool,
}
impl FakeKeyboardInputProvider {
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            interrupted: false,
        }
    }
    /// Keyboard on which CTRL-C was already seen.
    pub fn new_interrupted() -> Self {
        Self {
            chars: VecDeque::new(),
            interrupted: true,
        }
    }
}
impl KeyboardInputProvider for FakeKeyboardInputProvider {
    fn check_input_available(&mut self) -> io::Result<bool> {
        Ok(!self.chars.is_empty())
    }
    fn get_input_character(&mut self) -> char {
        self.chars
            .pop_front()
            .unwrap_or_else(|| panic!("No input available"))
    }
    fn read_input_character(&mut self) -> io::Result<char> {
        self.chars.pop_front().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted input available")
        })
    }
    fn is_interrupted(&self) -> bool {
        self.interrupted
    }
}

/// Emulator with `words` loaded at the start address, fed by scripted
/// keyboard input.
pub fn fake_emulator(words: &[u16], input: &str) -> Emulator {
    let keyboard = Rc::new(RefCell::new(FakeKeyboardInputProvider::new(input)));
    let mut emu = Emulator::with_keyboard(keyboard);
    emu.load_words(0x3000, words);
    emu
}
