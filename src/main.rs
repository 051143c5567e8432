use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};

use clap::Parser;
use ifj23c::compile;

/// ifj23c compiles IFJ23 source code into IFJcode23.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Source file to compile. Standard input is read when omitted.
    input: Option<PathBuf>,

    /// Writes the generated code to this file instead of standard output.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only checks the program, no code is written.
    #[arg(long)]
    check: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let source = match &args.input {
        Some(path) => fs::read_to_string(path).unwrap_or_else(|_| {
                                                  eprintln!("Failed to read the input file '{}'. Perhaps this file does not exist?",
                                                            path.display());
                                                  std::process::exit(99);
                                              }),
        None => {
            let mut buffer = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut buffer) {
                eprintln!("Failed to read standard input: {e}");
                std::process::exit(99);
            }
            buffer
        },
    };

    let program = match compile(&source) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(e.exit_code());
        },
    };

    if args.check {
        return;
    }

    match &args.output {
        Some(path) => {
            if let Err(e) = fs::write(path, program.to_string()) {
                eprintln!("Failed to write '{}': {e}", path.display());
                std::process::exit(99);
            }
        },
        None => print!("{program}"),
    }
}
