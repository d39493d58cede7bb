use std::fs;
use std::path::Path;

use ihex::{Reader, Record};
use tracing::{debug, warn};

use crate::constants::{ERASED_BYTE, PROGRAM_SIZE};
use crate::error::{EepromError, EepromResult};

/// Exactly one EEPROM worth of bytes, ready to be streamed to the programmer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    bytes: Vec<u8>,
}

impl Image {
    /// Raw binary image. Shorter input is rejected, longer input is cut to size.
    pub fn from_binary(bytes: &[u8]) -> EepromResult<Self> {
        if bytes.len() < PROGRAM_SIZE {
            return Err(EepromError::Input(format!(
                "Image holds {} bytes, the programmer expects {}",
                bytes.len(),
                PROGRAM_SIZE
            )));
        }

        if bytes.len() > PROGRAM_SIZE {
            warn!(
                "Image holds {} bytes, ignoring everything past {}",
                bytes.len(),
                PROGRAM_SIZE
            );
        }

        Ok(Image {
            bytes: bytes[..PROGRAM_SIZE].to_vec(),
        })
    }

    /// Intel HEX image. Data records land at their offsets, gaps stay erased.
    pub fn from_intel_hex(hex_content: &str) -> EepromResult<Self> {
        let mut bytes = vec![ERASED_BYTE; PROGRAM_SIZE];
        let mut base: usize = 0;

        for record in Reader::new(hex_content) {
            let record = record.map_err(|e| {
                EepromError::Input(format!("Failed parsing record in hex file {:?}", e))
            })?;

            match record {
                Record::Data { offset, value } => {
                    let start = base + offset as usize;
                    let end = start + value.len();
                    if end > PROGRAM_SIZE {
                        return Err(EepromError::Input(format!(
                            "Hex data at {:#x}..{:#x} does not fit in {} bytes",
                            start, end, PROGRAM_SIZE
                        )));
                    }
                    bytes[start..end].copy_from_slice(&value);
                }
                Record::ExtendedSegmentAddress(segment) => base = (segment as usize) << 4,
                Record::ExtendedLinearAddress(upper) => base = (upper as usize) << 16,
                Record::EndOfFile => break,
                other => debug!("Ignoring hex record {:?}", other),
            }
        }

        Ok(Image { bytes })
    }

    /// Load from disk; `.hex` and `.ihex` files are parsed as Intel HEX
    pub fn from_file(path: &Path) -> EepromResult<Self> {
        let is_hex = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                ext.eq_ignore_ascii_case("hex") || ext.eq_ignore_ascii_case("ihex")
            });

        if is_hex {
            let content = fs::read_to_string(path).map_err(|e| {
                EepromError::File(format!("Could not read {} as text: {}", path.display(), e))
            })?;
            Self::from_intel_hex(&content)
        } else {
            let content = fs::read(path).map_err(|e| {
                EepromError::File(format!("Failed to read {}: {}", path.display(), e))
            })?;
            Self::from_binary(&content)
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}
