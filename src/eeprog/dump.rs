use std::path::PathBuf;

use clap::Parser;
use eeprog::{Programmer, error::EepromResult, util::hex_dump};
use tracing::info;

use crate::ConnectionOptions;

#[derive(Parser, Debug, Clone)]
pub(crate) struct DumpOptions {
    /// The file where the binary dump will be stored
    #[clap(short, long)]
    file: PathBuf,

    /// Serial port where the programmer is located
    #[clap(short, long)]
    port: String,

    /// The address where to start dumping (decimal or 0x hex)
    #[clap(short, long, value_parser = parse_u16)]
    start: u16,

    /// The amount of bytes to dump (decimal or 0x hex)
    #[clap(short = 'c', long, value_parser = parse_u16)]
    byte_count: u16,

    /// Print the dump to the screen after storing it to the file
    #[clap(long, default_value_t = false)]
    display: bool,
}

fn parse_u16(s: &str) -> Result<u16, std::num::ParseIntError> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(stripped) => u16::from_str_radix(stripped, 16),
        None => s.parse(),
    }
}

pub(crate) fn handle_dump(connection: &ConnectionOptions, opts: DumpOptions) -> EepromResult<()> {
    info!("Waiting for the arduino to reset...");
    let mut programmer = Programmer::connect(&opts.port, connection.programmer_options())?;
    programmer.progress_bar(connection.progress());

    let bytes = programmer.dump_to_file(&opts.file, opts.start, opts.byte_count)?;
    info!("Stored {} bytes in {}", bytes.len(), opts.file.display());

    if opts.display {
        print!("{}", hex_dump(&bytes, opts.start));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::parse_u16;

    #[test]
    fn numbers_in_decimal_or_hex() {
        assert_eq!(parse_u16("4660"), Ok(0x1234));
        assert_eq!(parse_u16("0x1234"), Ok(0x1234));
        assert_eq!(parse_u16("0XFFFF"), Ok(0xFFFF));
        assert!(parse_u16("65536").is_err());
        assert!(parse_u16("-1").is_err());
    }
}
