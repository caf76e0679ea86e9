//! The public facing virtual machine used to run LC-3 programs.
pub mod instruction;
pub mod opcodes;
#[cfg(test)]
pub mod test_helpers;
pub mod trap_routines;

use crate::errors::{ExecutionError, LoadImageError};
use crate::hardware::keyboard::{KeyboardInputProvider, TerminalInputProvider};
use crate::hardware::memory::Memory;
use crate::hardware::registers::Registers;
use crate::terminal;
use self::instruction::{Instruction, Opcode};
use std::cell::RefCell;
use std::io;
use std::io::Write;
use std::ops::ControlFlow;
use std::path::Path;
use std::rc::Rc;

/// The machine state owned by the caller: register file, word memory and the
/// keyboard device shared with the memory mapped registers.
pub struct Emulator {
    registers: Registers,
    memory: Memory,
    keyboard: Rc<RefCell<dyn KeyboardInputProvider>>,
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates an emulator with the image loaded from `path`.
///
/// # Errors
/// - image file missing or unreadable
/// - image shorter than its two byte origin header
pub fn from_image(path: impl AsRef<Path>) -> Result<Emulator, LoadImageError> {
    let mut emu = Emulator::new();
    emu.load_image(path)?;
    Ok(emu)
}

/// Creates an emulator with the image parsed from `bytes`.
///
/// # Errors
/// - image shorter than its two byte origin header
pub fn from_image_bytes(bytes: &[u8]) -> Result<Emulator, LoadImageError> {
    let mut emu = Emulator::new();
    emu.load_image_bytes(bytes)?;
    Ok(emu)
}

impl Emulator {
    /// Constructor method with the terminal as the keyboard device.
    #[must_use]
    pub fn new() -> Self {
        Self::with_keyboard(Rc::new(RefCell::new(TerminalInputProvider::new())))
    }

    /// Constructor method with an alternative keyboard device, used to
    /// script input.
    #[must_use]
    pub fn with_keyboard(keyboard: Rc<RefCell<dyn KeyboardInputProvider>>) -> Self {
        Self {
            registers: Registers::new(),
            memory: Memory::new(Rc::clone(&keyboard)),
            keyboard,
        }
    }

    /// Loads a program image file into memory.
    ///
    /// The first two bytes are the big-endian origin address, every
    /// following big-endian word is placed into memory sequentially from
    /// there. Images loaded later overwrite overlapping address ranges.
    ///
    /// # Errors
    /// - image file missing or unreadable
    /// - image shorter than its two byte origin header
    pub fn load_image(&mut self, path: impl AsRef<Path>) -> Result<(), LoadImageError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| LoadImageError::Io {
            path: path.display().to_string(),
            source,
        })?;
        self.load_image_bytes(&bytes)
    }

    /// Loads a program image given as raw bytes, same format as
    /// [`Emulator::load_image`]. A trailing odd byte is ignored.
    ///
    /// # Errors
    /// - image shorter than its two byte origin header
    pub fn load_image_bytes(&mut self, bytes: &[u8]) -> Result<(), LoadImageError> {
        if bytes.len() < 2 {
            return Err(LoadImageError::MissingOrigin);
        }
        let origin = u16::from_be_bytes([bytes[0], bytes[1]]);
        let words: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        log::debug!("loading {} words at origin {origin:#06X}", words.len());
        self.memory.load_image_words(origin, &words);
        Ok(())
    }

    /// Copies `words` directly into memory starting at `origin`, bypassing
    /// the image byte format.
    pub fn load_words(&mut self, origin: u16, words: &[u16]) {
        self.memory.load_image_words(origin, words);
    }

    /// Puts the register file back into its power-on state, so the same
    /// loaded image can be executed again.
    pub fn reset_registers(&mut self) {
        self.registers = Registers::new();
    }

    #[must_use]
    pub const fn registers(&self) -> &Registers {
        &self.registers
    }

    /// Runs the fetch-decode-execute loop on the process console.
    ///
    /// The terminal is switched to raw mode for the duration of the run and
    /// restored on every exit path, the guard drops even when an error is
    /// returned.
    ///
    /// # Errors
    /// - the program executed a reserved opcode or an unknown trap vector
    /// - reading the keyboard or writing the console failed
    /// - CTRL-C interrupted execution
    pub fn execute(&mut self) -> Result<(), ExecutionError> {
        let _raw_lock = terminal::set_terminal_raw();
        self.run(&mut io::stdout())
    }

    /// Like [`Emulator::execute`] but writes console output to `stdout` and
    /// leaves the terminal mode alone.
    ///
    /// # Errors
    /// See [`Emulator::execute`].
    pub fn run(&mut self, stdout: &mut impl Write) -> Result<(), ExecutionError> {
        loop {
            if self.keyboard.borrow().is_interrupted() {
                return Err(ExecutionError::Interrupted);
            }
            match self.step(stdout) {
                ControlFlow::Continue(()) => {}
                ControlFlow::Break(Ok(())) => return Ok(()),
                ControlFlow::Break(Err(e)) => {
                    // a blocking keyboard read cut short by CTRL-C surfaces
                    // as an IO error, report it as the interruption it is
                    return Err(if self.keyboard.borrow().is_interrupted() {
                        ExecutionError::Interrupted
                    } else {
                        e
                    });
                }
            }
        }
    }

    /// One fetch-decode-execute cycle. PC is incremented directly after the
    /// fetch, before the instruction executes.
    fn step(&mut self, stdout: &mut impl Write) -> ControlFlow<Result<(), ExecutionError>> {
        let pc = self.registers.pc();
        let instr = Instruction::from(self.memory.read(pc));
        self.registers.set_pc(pc.wrapping_add(1));
        log::trace!("{instr:?} at {pc:#06X}");
        match instr.opcode() {
            Opcode::Add => opcodes::add(instr, &mut self.registers),
            Opcode::And => opcodes::and(instr, &mut self.registers),
            Opcode::Not => opcodes::not(instr, &mut self.registers),
            Opcode::Br => opcodes::br(instr, &mut self.registers),
            Opcode::Jmp => opcodes::jmp_or_ret(instr, &mut self.registers),
            Opcode::Jsr => opcodes::jsr(instr, &mut self.registers),
            Opcode::Ld => opcodes::ld(instr, &mut self.registers, &mut self.memory),
            Opcode::Ldi => opcodes::ldi(instr, &mut self.registers, &mut self.memory),
            Opcode::Ldr => opcodes::ldr(instr, &mut self.registers, &mut self.memory),
            Opcode::Lea => opcodes::lea(instr, &mut self.registers),
            Opcode::St => opcodes::st(instr, &self.registers, &mut self.memory),
            Opcode::Sti => opcodes::sti(instr, &self.registers, &mut self.memory),
            Opcode::Str => opcodes::str(instr, &self.registers, &mut self.memory),
            Opcode::Trap => {
                return trap_routines::dispatch(
                    instr,
                    &mut self.registers,
                    &self.memory,
                    &self.keyboard,
                    stdout,
                );
            }
            Opcode::Rti | Opcode::Res => {
                return ControlFlow::Break(Err(ExecutionError::ReservedInstruction {
                    instruction: instr.bits(),
                    address: pc,
                }));
            }
        }
        ControlFlow::Continue(())
    }
}
