use std::error::Error;
use std::io;

/// Errors from loading a program image.
#[derive(Debug, displaydoc::Display)]
pub enum LoadImageError {
    /// Could not read image file {path}: {source}
    Io { path: String, source: io::Error },
    /// Image is shorter than its two byte big-endian origin header
    MissingOrigin,
}

impl Error for LoadImageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::MissingOrigin => None,
        }
    }
}

/// Errors that stop the fetch-decode-execute loop.
#[derive(Debug, displaydoc::Display, PartialEq, Eq)]
pub enum ExecutionError {
    /// Error during reading Stdin or writing program output to Stdout: {0}
    IOInputOutputError(String),
    /// Instruction {instruction:#06X} at {address:#06X} uses a reserved opcode
    ReservedInstruction { instruction: u16, address: u16 },
    /// Unknown trap vector {vector:#04X}
    UnknownTrapVector { vector: u8 },
    /// Execution was interrupted from the keyboard
    Interrupted,
}

impl Error for ExecutionError {}
