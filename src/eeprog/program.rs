use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use eeprog::{
    ProgramMode, Programmer, constants::POST_WRITE_DELAY_MICROS, error::EepromResult,
    image::Image,
};
use tracing::info;

use crate::ConnectionOptions;

#[derive(Parser, Debug, Clone)]
pub(crate) struct ProgramOptions {
    /// Binary file containing the program
    #[clap(short, long)]
    file: PathBuf,

    /// Serial port where the programmer is located
    #[clap(short, long)]
    port: String,

    /// Wait for the board to echo every byte instead of pausing between writes
    #[clap(long, default_value_t = false)]
    ack: bool,

    /// Pause after every byte in microseconds
    #[clap(long, default_value_t = POST_WRITE_DELAY_MICROS)]
    write_delay_us: u64,
}

pub(crate) fn handle_programming(
    connection: &ConnectionOptions,
    opts: ProgramOptions,
) -> EepromResult<()> {
    let mut options = connection.programmer_options();
    options.mode = if opts.ack {
        ProgramMode::Ack
    } else {
        ProgramMode::Delay
    };
    options.write_delay = Duration::from_micros(opts.write_delay_us);

    // Reject a bad file before opening the port resets the board
    let image = Image::from_file(&opts.file)?;

    info!("Waiting for the arduino to reset...");
    let mut programmer = Programmer::connect(&opts.port, options)?;
    programmer.progress_bar(connection.progress());

    let report = programmer.program_image(&image)?;
    info!("Programmed {} bytes from {}", report.bytes_sent, opts.file.display());

    Ok(())
}
