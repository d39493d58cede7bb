pub mod eeprom;

/// Command byte opening every exchange with the programmer
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Program = 0x00,
    Dump = 0x01,
    Erase = 0x02,
}

/// How the program loop paces itself against the EEPROM page write cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgramMode {
    /// Fixed pause after every byte, no reads
    #[default]
    Delay,

    /// Wait for the board to echo every byte
    Ack,
}

/// Split a 16 bit field into wire order, low byte first
pub fn encode_u16(value: u16) -> [u8; 2] {
    let low = (value & 0xFF) as u8;
    let high = ((value >> 8) & 0xFF) as u8;
    [low, high]
}

pub fn decode_u16(bytes: [u8; 2]) -> u16 {
    (bytes[0] as u16) | ((bytes[1] as u16) << 8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_codes() {
        assert_eq!(Command::Program as u8, 0x00);
        assert_eq!(Command::Dump as u8, 0x01);
        assert_eq!(Command::Erase as u8, 0x02);
    }

    #[test]
    fn low_byte_goes_first() {
        assert_eq!(encode_u16(0x1234), [0x34, 0x12]);
        assert_eq!(encode_u16(0x00FF), [0xFF, 0x00]);
        assert_eq!(decode_u16([0x34, 0x12]), 0x1234);
    }

    #[test]
    fn every_u16_survives_the_wire() {
        for value in 0..=u16::MAX {
            assert_eq!(decode_u16(encode_u16(value)), value);
        }
    }

    #[test]
    fn every_byte_pair_survives_the_wire() {
        for low in 0..=u8::MAX {
            for high in 0..=u8::MAX {
                let bytes = [low, high];
                assert_eq!(encode_u16(decode_u16(bytes)), bytes);
            }
        }
    }
}
