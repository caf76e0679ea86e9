//! The simulated LC-3 hardware: word memory, register file and the keyboard device.

pub mod keyboard;
pub mod memory;
pub mod registers;
