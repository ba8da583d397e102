//! # c_llvm
//!
//! This binary is the compiler driver: it reads a single C source file, lowers it
//! to LLVM textual IR, and writes the result next to the input.
extern crate pest;

use std::{fs, path::PathBuf, process::ExitCode};

use clap::{Parser, ValueEnum};
use log::{error, warn};

use c_llvm::compile;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// The C source file to compile.
    file: PathBuf,

    /// Where to write the emitted LLVM IR. Defaults to the input file with a `.ll` extension.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Specify the log level of the compiler.
    #[arg(value_enum, short, long, default_value_t = LogLevel::default())]
    verbosity: LogLevel,
}

/// Mirrors `why`'s log-level selector: a numeric alias doubles as a verbosity dial.
#[derive(ValueEnum, Clone, Default, Debug)]
enum LogLevel {
    #[default]
    #[value(alias("0"))]
    Error,
    #[value(alias("1"))]
    Warn,
    #[value(alias("2"))]
    Info,
    #[value(alias("3"))]
    Debug,
    #[value(alias("4"))]
    Trace,
}

impl From<&LogLevel> for log::Level {
    fn from(value: &LogLevel) -> Self {
        match value {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

fn main() -> ExitCode {
    let args = Cli::parse();
    simple_logger::init_with_level((&args.verbosity).into()).unwrap();

    let file_name = args.file.to_string_lossy().into_owned();
    let source = match fs::read_to_string(&args.file) {
        Ok(source) => source,
        Err(err) => {
            error!("could not read file '{file_name}': {err}");
            return ExitCode::FAILURE;
        }
    };

    let output = match compile(&source, &file_name) {
        Ok(output) => output,
        Err(failure) => {
            for err in &failure.errors {
                error!("{err}");
            }
            return ExitCode::FAILURE;
        }
    };

    for warning in &output.warnings {
        warn!("{warning}");
    }

    let dest = args.output.unwrap_or_else(|| args.file.with_extension("ll"));
    if let Err(err) = fs::write(&dest, output.ir) {
        error!("could not write output file '{}': {err}", dest.to_string_lossy());
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
