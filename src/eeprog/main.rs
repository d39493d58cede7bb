use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use eeprog::{
    ProgrammerOptions,
    constants::{DEFAULT_BAUD_RATE, DEFAULT_SERIAL_TIMEOUT_MS, SETTLE_DELAY_MS},
    error::EepromResult,
};
use dump::{DumpOptions, handle_dump};
use erase::{EraseOptions, handle_erase};
use program::{ProgramOptions, handle_programming};

mod dump;
mod erase;
mod program;

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Program, dump and erase an EEPROM through an Arduino")]
struct Cli {
    #[command(flatten)]
    connection: ConnectionOptions,

    #[command(subcommand)]
    operation: Operation,
}

#[derive(Subcommand, Debug, Clone)]
enum Operation {
    /// Program the EEPROM with a binary or Intel HEX file
    #[command(name = "program", alias = "p")]
    Program(ProgramOptions),

    /// Dump a memory range into a file
    #[command(name = "dump", alias = "d")]
    Dump(DumpOptions),

    /// Erase the whole EEPROM
    #[command(name = "erase", alias = "e")]
    Erase(EraseOptions),
}

#[derive(Args, Debug, Clone)]
pub(crate) struct ConnectionOptions {
    /// Baud rate
    #[clap(long, global = true, default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,

    /// Serial read timeout in milliseconds
    #[clap(long, global = true, default_value_t = DEFAULT_SERIAL_TIMEOUT_MS)]
    timeout_ms: u64,

    /// Time to wait for the board to reset after opening the port
    #[clap(long, global = true, default_value_t = SETTLE_DELAY_MS)]
    settle_ms: u64,

    /// Hide the progress bar
    #[clap(long, global = true, default_value_t = false)]
    no_progress: bool,

    /// More logging, repeat for per-byte traffic
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl ConnectionOptions {
    pub(crate) fn programmer_options(&self) -> ProgrammerOptions {
        ProgrammerOptions {
            baud: self.baud,
            timeout: Duration::from_millis(self.timeout_ms),
            settle: Duration::from_millis(self.settle_ms),
            ..ProgrammerOptions::default()
        }
    }

    pub(crate) fn progress(&self) -> bool {
        !self.no_progress
    }
}

fn main() -> EepromResult<()> {
    let cli = Cli::parse();

    let level = match cli.connection.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    match cli.operation {
        Operation::Program(opts) => handle_programming(&cli.connection, opts)?,
        Operation::Dump(opts) => handle_dump(&cli.connection, opts)?,
        Operation::Erase(opts) => handle_erase(&cli.connection, opts)?,
    }

    Ok(())
}
