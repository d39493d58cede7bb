use std::io::{BufRead, Write};

use crate::error::{EepromError, EepromResult};
use crate::interface::ComPort;

/// How the operator picked a port
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortChoice {
    /// Port named on the command line, used as is
    Explicit(ComPort),

    /// Index into the listed ports
    Index(usize),
}

/// Names of the serial ports on this machine whose name starts with `prefix`
pub fn available_ports(prefix: Option<&str>) -> EepromResult<Vec<ComPort>> {
    let ports = serialport::available_ports().map_err(|e| {
        EepromError::Configuration(format!("Could not get available ports. Err {:?}", e))
    })?;

    let mut names: Vec<ComPort> = ports
        .into_iter()
        .map(|port| port.port_name)
        .filter(|name| prefix.is_none_or(|p| name.starts_with(p)))
        .collect();
    names.sort();

    Ok(names)
}

/// Resolve a choice against the listed ports
pub fn select_port(available: &[ComPort], choice: &PortChoice) -> EepromResult<ComPort> {
    match choice {
        PortChoice::Explicit(port) => Ok(port.clone()),
        PortChoice::Index(index) => available.get(*index).cloned().ok_or_else(|| {
            EepromError::Configuration(format!(
                "Port number {} does not exist, {} ports available",
                index,
                available.len()
            ))
        }),
    }
}

/// Parse one line typed at the port prompt
pub fn parse_port_index(input: &str, port_count: usize) -> Result<usize, String> {
    let index: usize = input
        .trim()
        .parse()
        .map_err(|_| "The typed input is not valid, please enter a valid number.".to_string())?;

    if index >= port_count {
        return Err("The port number you provided does not exist.".to_string());
    }

    Ok(index)
}

/// List the ports on `output` and keep asking on `input` until a valid index is typed
pub fn prompt_for_port<R: BufRead, W: Write>(
    available: &[ComPort],
    mut input: R,
    mut output: W,
) -> EepromResult<ComPort> {
    if available.is_empty() {
        return Err(EepromError::Configuration(
            "No serial ports found. Try specifying one with --port?".to_string(),
        ));
    }

    let io_err = |e: std::io::Error| EepromError::Configuration(format!("Prompt failed: {}", e));

    writeln!(output, "Available ports:").map_err(io_err)?;
    for (i, port) in available.iter().enumerate() {
        writeln!(output, "{} - {}", i, port).map_err(io_err)?;
    }

    loop {
        write!(output, "\nType port number to start listening session: ").map_err(io_err)?;
        output.flush().map_err(io_err)?;

        let mut line = String::new();
        if input.read_line(&mut line).map_err(io_err)? == 0 {
            return Err(EepromError::Configuration(
                "Input closed before a port was selected".to_string(),
            ));
        }

        match parse_port_index(&line, available.len()) {
            Ok(index) => return select_port(available, &PortChoice::Index(index)),
            Err(msg) => writeln!(output, "{}", msg).map_err(io_err)?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ports() -> Vec<ComPort> {
        vec!["/dev/cu.usbmodem1".to_string(), "/dev/cu.usbserial2".to_string()]
    }

    #[test]
    fn explicit_port_wins() {
        let choice = PortChoice::Explicit("/dev/ttyACM0".to_string());
        assert_eq!(select_port(&ports(), &choice).unwrap(), "/dev/ttyACM0");
        assert_eq!(select_port(&[], &choice).unwrap(), "/dev/ttyACM0");
    }

    #[test]
    fn index_selects_from_list() {
        assert_eq!(
            select_port(&ports(), &PortChoice::Index(1)).unwrap(),
            "/dev/cu.usbserial2"
        );
        assert!(select_port(&ports(), &PortChoice::Index(2)).is_err());
    }

    #[test]
    fn parse_rejects_garbage_and_out_of_range() {
        assert_eq!(parse_port_index(" 1\n", 2), Ok(1));
        assert!(parse_port_index("two", 2).is_err());
        assert!(parse_port_index("-1", 2).is_err());
        assert!(parse_port_index("2", 2).is_err());
    }

    #[test]
    fn prompt_retries_until_valid() {
        let input = b"abc\n7\n0\n".as_slice();
        let mut output = Vec::new();

        let port = prompt_for_port(&ports(), input, &mut output).unwrap();
        assert_eq!(port, "/dev/cu.usbmodem1");

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("0 - /dev/cu.usbmodem1"));
        assert!(text.contains("not valid"));
        assert!(text.contains("does not exist"));
    }

    #[test]
    fn prompt_gives_up_on_eof() {
        let mut output = Vec::new();
        assert!(prompt_for_port(&ports(), b"".as_slice(), &mut output).is_err());
    }

    #[test]
    fn prompt_without_ports_fails() {
        let mut output = Vec::new();
        assert!(prompt_for_port(&[], b"0\n".as_slice(), &mut output).is_err());
    }
}
