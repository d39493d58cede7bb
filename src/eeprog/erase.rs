use clap::Parser;
use eeprog::{Programmer, error::EepromResult};
use tracing::info;

use crate::ConnectionOptions;

#[derive(Parser, Debug, Clone)]
pub(crate) struct EraseOptions {
    /// Serial port where the programmer is located
    #[clap(short, long)]
    port: String,
}

pub(crate) fn handle_erase(connection: &ConnectionOptions, opts: EraseOptions) -> EepromResult<()> {
    info!("Waiting for the arduino to reset...");
    let programmer = Programmer::connect(&opts.port, connection.programmer_options())?;
    programmer.erase()?;

    info!("EEPROM erased");
    Ok(())
}
