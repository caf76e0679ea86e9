//! The built-in IO service routines reached through the TRAP instruction.
use crate::emulator::instruction::Instruction;
use crate::errors::ExecutionError;
use crate::hardware::keyboard::KeyboardInputProvider;
use crate::hardware::memory::Memory;
use crate::hardware::registers::Registers;
use crate::terminal;
use std::cell::RefCell;
use std::io;
use std::io::Write;
use std::ops::ControlFlow;

/// Trap vectors of the built-in IO service routines.
#[repr(u8)]
#[derive(enumn::N, Copy, Clone, Debug, PartialEq, Eq)]
pub enum TrapVector {
    /// Read one character from the keyboard without echoing it
    GetC = 0x20,
    /// Write the character in R0 to the console
    Out = 0x21,
    /// Write the zero terminated string at the address in R0, one character per word
    PutS = 0x22,
    /// Prompt for one character and echo it
    In = 0x23,
    /// Write the zero terminated string at the address in R0, two characters per word
    PutSp = 0x24,
    /// Stop execution
    Halt = 0x25,
}

/// Selects and runs the IO service routine for the vector in the low byte
/// of `i`. A vector outside the table stops execution with an error.
pub fn dispatch(
    i: Instruction,
    regs: &mut Registers,
    mem: &Memory,
    keyboard: &RefCell<dyn KeyboardInputProvider>,
    stdout: &mut impl Write,
) -> ControlFlow<Result<(), ExecutionError>> {
    match TrapVector::n(i.trap_vector()) {
        Some(TrapVector::GetC) => get_c(regs, keyboard),
        Some(TrapVector::Out) => out(regs, stdout),
        Some(TrapVector::PutS) => put_s(regs, mem, stdout),
        Some(TrapVector::In) => in_trap(regs, keyboard, stdout),
        Some(TrapVector::PutSp) => put_sp(regs, mem, stdout),
        Some(TrapVector::Halt) => halt(stdout),
        None => ControlFlow::Break(Err(ExecutionError::UnknownTrapVector {
            vector: i.trap_vector(),
        })),
    }
}

fn read_character_from_console(
    regs: &mut Registers,
    keyboard: &RefCell<dyn KeyboardInputProvider>,
) -> ControlFlow<Result<(), ExecutionError>> {
    match keyboard.borrow_mut().read_input_character() {
        Ok(c) => {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "R0 receives the character code zero extended from one byte"
            )]
            regs.set(0, u16::from(c as u8));
            ControlFlow::Continue(())
        }
        Err(e) => wrap_io_error_in_cf(&e),
    }
}

/// GETC: Read a single character from the keyboard. The character is not
/// echoed onto the console.
///
/// Its ASCII code is copied into R0. The high eight bits of R0 are cleared.
pub fn get_c(
    regs: &mut Registers,
    keyboard: &RefCell<dyn KeyboardInputProvider>,
) -> ControlFlow<Result<(), ExecutionError>> {
    read_character_from_console(regs, keyboard)
}

/// IN: Print a prompt on the screen, read a single character from the
/// keyboard and echo it back. Otherwise like 0x20 GETC.
pub fn in_trap(
    regs: &mut Registers,
    keyboard: &RefCell<dyn KeyboardInputProvider>,
    stdout: &mut impl Write,
) -> ControlFlow<Result<(), ExecutionError>> {
    write_str_out("Enter a character: ", stdout)?;
    read_character_from_console(regs, keyboard)?;
    let echo = char::from(u8::try_from(regs.get(0) & 0xFF).expect("masked to one byte"));
    write_str_out(&String::from(echo), stdout)
}

/// OUT: Write the character in R0[7:0] to the console display.
pub fn out(regs: &Registers, stdout: &mut impl Write) -> ControlFlow<Result<(), ExecutionError>> {
    let c = char::from(u8::try_from(regs.get(0) & 0xFF).expect("masked to one byte"));
    write_str_out(&String::from(c), stdout)
}

fn put_one_char_per_u16(input: u16, append_to: &mut String) {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "only the low byte of each word is defined as used"
    )]
    let c = (input as u8) as char;
    append_to.push(c);
}

fn put_two_chars_per_u16(input: u16, append_to: &mut String) {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "each word packs two bytes, emitted low byte first"
    )]
    let c = (input as u8) as char;
    append_to.push(c);
    let c = ((input >> 8) as u8) as char;
    if c != '\0' {
        append_to.push(c);
    }
}

fn put(
    regs: &Registers,
    mem: &Memory,
    stdout: &mut impl Write,
    handle_char: fn(u16, &mut String),
) -> ControlFlow<Result<(), ExecutionError>> {
    let mut address = regs.get(0);
    let mut s = String::with_capacity(120);
    while mem[address] != 0 {
        handle_char(mem[address], &mut s);
        address = address.wrapping_add(1);
    }
    write_str_out(s.as_str(), stdout)
}

/// PUTS: print the zero word terminated string starting at the address in
/// R0, one character per word.
pub fn put_s(
    regs: &Registers,
    mem: &Memory,
    stdout: &mut impl Write,
) -> ControlFlow<Result<(), ExecutionError>> {
    put(regs, mem, stdout, put_one_char_per_u16)
}

/// PUTSP: Packed version of PUTS.
///
/// The ASCII code contained in bits [7:0] of a memory location is written to
/// the console first, the one in bits [15:8] second. The second character of
/// the last memory location can be 0x00. Writing terminates with a zero word.
pub fn put_sp(
    regs: &Registers,
    mem: &Memory,
    stdout: &mut impl Write,
) -> ControlFlow<Result<(), ExecutionError>> {
    put(regs, mem, stdout, put_two_chars_per_u16)
}

/// HALT: End the program with a notice on the console.
pub fn halt(stdout: &mut impl Write) -> ControlFlow<Result<(), ExecutionError>> {
    write_str_out("\nProgram halted\n", stdout)?;
    ControlFlow::Break(Ok(()))
}

fn write_str_out(
    message: &str,
    stdout: &mut impl Write,
) -> ControlFlow<Result<(), ExecutionError>> {
    match terminal::print(stdout, message) {
        Ok(()) => ControlFlow::Continue(()),
        Err(e) => wrap_io_error_in_cf(&e),
    }
}

fn wrap_io_error_in_cf(error: &io::Error) -> ControlFlow<Result<(), ExecutionError>, ()> {
    ControlFlow::Break(Err(ExecutionError::IOInputOutputError(error.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::test_helpers::{FakeKeyboardInputProvider, StringWriter};
    use googletest::prelude::*;
    use std::rc::Rc;

    fn keyboard(input: &str) -> Rc<RefCell<FakeKeyboardInputProvider>> {
        Rc::new(RefCell::new(FakeKeyboardInputProvider::new(input)))
    }

    fn memory_with(origin: u16, data: &[u16]) -> Memory {
        let mut mem = Memory::new(keyboard(""));
        mem.load_image_words(origin, data);
        mem
    }

    #[gtest]
    fn get_c_stores_character_without_echo() {
        let kb = keyboard("a");
        let mut regs = Registers::new();
        let res = get_c(&mut regs, kb.as_ref());
        assert_eq!(res, ControlFlow::Continue(()));
        expect_that!(regs.get(0), eq(u16::from(b'a')));
    }

    #[gtest]
    fn get_c_read_error() {
        let kb = keyboard("");
        let mut regs = Registers::new();
        let res = get_c(&mut regs, kb.as_ref());
        assert!(res.is_break());
        let execution_error = res.break_value().unwrap().unwrap_err();
        assert_that!(
            execution_error.to_string(),
            eq("Error during reading Stdin or writing program output to Stdout: \
                no scripted input available")
        );
    }

    #[gtest]
    fn out_writes_low_byte_of_r0() {
        let mut regs = Registers::new();
        let mut writer = StringWriter::new();
        regs.set(0, u16::from(b'k'));
        let res = out(&regs, &mut writer);
        assert!(res.is_continue());
        assert_that!(writer.get_string(), eq("k"));
    }

    #[gtest]
    fn put_s_stops_at_the_zero_word() {
        let mem = memory_with(0x3005, &[0x0048, 0x0069, 0x0000, 0x0041]);
        let mut regs = Registers::new();
        let mut writer = StringWriter::new();
        regs.set(0, 0x3005);
        let res = put_s(&regs, &mem, &mut writer);
        assert!(res.is_continue());
        assert_that!(writer.get_string(), eq("Hi"));
    }

    #[gtest]
    fn put_sp_unpacks_low_byte_first() {
        let mem = memory_with(0x3005, &[0x6948, 0x0000]);
        let mut regs = Registers::new();
        let mut writer = StringWriter::new();
        regs.set(0, 0x3005);
        let res = put_sp(&regs, &mem, &mut writer);
        assert!(res.is_continue());
        assert_that!(writer.get_string(), eq("Hi"));
    }

    #[gtest]
    fn put_sp_longer_text() {
        let data = [
            0xFFFF, 0xFFFF, 0xFFFF, 0xFFFF, 0xFFFF, 0x6548u16, 0x6c6c, 0x206f, 0x6f57, 0x6c72,
            0x2164, 0x0000,
        ];
        let mem = memory_with(0x3000, &data);
        let mut regs = Registers::new();
        let mut writer = StringWriter::new();
        regs.set(0, 0x3005);
        let res = put_sp(&regs, &mem, &mut writer);
        assert!(res.is_continue());
        assert_that!(writer.get_string(), eq("Hello World!"));
    }

    #[gtest]
    fn in_trap_prompts_and_echoes() {
        let kb = keyboard("abc");
        let mut regs = Registers::new();
        let mut writer = StringWriter::new();
        let res = in_trap(&mut regs, kb.as_ref(), &mut writer);
        assert!(res.is_continue());
        assert_that!(writer.get_string(), eq("Enter a character: a"));
        expect_that!(regs.get(0), eq(u16::from(b'a')));
    }

    #[gtest]
    fn halt_breaks_with_success() {
        let mut writer = StringWriter::new();
        let res = halt(&mut writer);
        assert_eq!(res, ControlFlow::Break(Ok(())));
        assert_that!(writer.get_string(), eq("\r\nProgram halted\r\n"));
    }

    #[gtest]
    fn dispatch_rejects_unknown_vector() {
        let kb = keyboard("");
        let mem = memory_with(0x3000, &[]);
        let mut regs = Registers::new();
        let mut writer = StringWriter::new();
        let res = dispatch(0xF026.into(), &mut regs, &mem, kb.as_ref(), &mut writer);
        assert!(res.is_break());
        let execution_error = res.break_value().unwrap().unwrap_err();
        assert_that!(execution_error.to_string(), eq("Unknown trap vector 0x26"));
    }
}
