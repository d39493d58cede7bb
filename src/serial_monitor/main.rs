use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Parser;
use eeprog::{
    constants::DEFAULT_BAUD_RATE,
    error::{EepromError, EepromResult},
    interface::serialport::SerialPortDevice,
    monitor::Monitor,
    ports::{PortChoice, available_ports, prompt_for_port, select_port},
};
use tracing::info;

/// Timeouts only bound how quickly Ctrl-C is noticed
const MONITOR_READ_TIMEOUT_MS: u64 = 100;

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Print whatever the programmer board writes to its serial port")]
struct MonitorOptions {
    /// Serial port to listen on; prompts with a list of ports when omitted
    #[clap(short, long)]
    port: Option<String>,

    /// Baud rate
    #[clap(short, long, default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,

    /// Only list ports whose name starts with this prefix
    #[clap(long)]
    filter: Option<String>,
}

fn main() -> EepromResult<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(io::stderr)
        .init();

    let opts = MonitorOptions::parse();

    let port = match opts.port {
        Some(port) => select_port(&[], &PortChoice::Explicit(port))?,
        None => {
            let ports = available_ports(opts.filter.as_deref())?;
            prompt_for_port(&ports, io::stdin().lock(), io::stdout())?
        }
    };

    let stop = Arc::new(AtomicBool::new(false));
    let handler_stop = Arc::clone(&stop);
    ctrlc::set_handler(move || handler_stop.store(true, Ordering::SeqCst))
        .map_err(|e| EepromError::Configuration(format!("Failed to set Ctrl-C handler: {}", e)))?;

    info!("Listening on {}", port);
    let device = SerialPortDevice::open(
        &port,
        opts.baud,
        Duration::from_millis(MONITOR_READ_TIMEOUT_MS),
    )?;

    let mut monitor = Monitor::new(Box::new(device), stop);
    let stats = monitor.run(&mut io::stdout())?;
    info!(
        "Read {} bytes, {} could not be decoded",
        stats.bytes_read, stats.decode_errors
    );

    Ok(())
}
