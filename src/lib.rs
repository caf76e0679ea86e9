//! # LC-3 virtual machine.
//!
//! `lc3-vm` loads LC-3 program images into a simulated 16 bit address space
//! and executes them instruction by instruction, console input and output
//! included. Usage starts with loading one or more images via
//! [`emulator::Emulator::load_image`], execution via
//! [`emulator::Emulator::execute`] runs until the program halts.
//!
//!  # Example
//! ```
//! use lc3_vm::emulator::Emulator;
//! let mut emu = Emulator::new();
//! // origin 0x3000 followed by a single TRAP HALT word
//! emu.load_image_bytes(&[0x30, 0x00, 0xF0, 0x25]).unwrap();
//! assert_eq!(emu.registers().pc(), 0x3000);
//! ```
//! # Errors
//! - Image file is missing or unreadable
//! - Image is shorter than its two byte origin header
//! - Program executes a reserved opcode (RTI/RES) or an unknown trap vector

pub mod emulator;
pub mod errors;
pub mod hardware;
pub(crate) mod terminal;
