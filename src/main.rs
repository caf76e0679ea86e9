use clap::Parser;
use lc3_vm::emulator::Emulator;
use lc3_vm::errors::ExecutionError;
use std::path::PathBuf;
use std::process::ExitCode;

/// Virtual machine for the Little Computer 3 (LC-3)
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Program images to load in order, later images overwrite overlapping
    /// address ranges
    #[arg(required = true, value_name = "IMAGE-FILE")]
    images: Vec<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let mut emu = Emulator::new();
    for path in &args.images {
        if let Err(e) = emu.load_image(path) {
            eprintln!("failed to load image: {e}");
            return ExitCode::from(1);
        }
    }
    match emu.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(ExecutionError::Interrupted) => {
            println!();
            ExitCode::from(130)
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(3)
        }
    }
}
