/// Number of stop bits for LineCoding
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    /// 1 stop bit
    One = 0,

    /// 1.5 stop bits
    OnePointFive = 1,

    /// 2 stop bits
    Two = 2,
}

impl From<u8> for StopBits {
    fn from(value: u8) -> Self {
        match value {
            1 => StopBits::OnePointFive,
            2 => StopBits::Two,
            _ => StopBits::One,
        }
    }
}

/// Parity for LineCoding
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParityType {
    None = 0,
    Odd = 1,
    Even = 2,
    Mark = 3,
    Space = 4,
}

impl From<u8> for ParityType {
    fn from(value: u8) -> Self {
        match value {
            1 => ParityType::Odd,
            2 => ParityType::Even,
            3 => ParityType::Mark,
            4 => ParityType::Space,
            _ => ParityType::None,
        }
    }
}

/// Line coding parameters of the emulated serial link.
///
/// The host writes this record with SET_LINE_CODING and reads it back with GET_LINE_CODING.
/// Fields are stored raw, so whatever the host wrote is echoed back unchanged. The typed
/// accessors interpret the raw codes and fall back to the CDC defaults for unknown values.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineCoding {
    data_rate: u32,
    stop_bits: u8,
    parity_type: u8,
    data_bits: u8,
}

impl LineCoding {
    /// Size of the packed wire representation in bytes.
    pub const SIZE: usize = 7;

    /// Decodes the packed little-endian wire layout.
    pub fn from_bytes(bytes: &[u8; Self::SIZE]) -> Self {
        LineCoding {
            data_rate: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            stop_bits: bytes[4],
            parity_type: bytes[5],
            data_bits: bytes[6],
        }
    }

    /// Encodes into the packed little-endian wire layout.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let rate = self.data_rate.to_le_bytes();

        [
            rate[0],
            rate[1],
            rate[2],
            rate[3],
            self.stop_bits,
            self.parity_type,
            self.data_bits,
        ]
    }

    /// Gets the number of stop bits for UART communication.
    pub fn stop_bits(&self) -> StopBits {
        self.stop_bits.into()
    }

    /// Gets the number of data bits for UART communication.
    pub fn data_bits(&self) -> u8 {
        self.data_bits
    }

    /// Gets the parity type for UART communication.
    pub fn parity_type(&self) -> ParityType {
        self.parity_type.into()
    }

    /// Gets the data rate in bits per second for UART communication.
    pub fn data_rate(&self) -> u32 {
        self.data_rate
    }
}

impl Default for LineCoding {
    fn default() -> Self {
        LineCoding {
            data_rate: 9600,
            stop_bits: 1,
            parity_type: ParityType::None as u8,
            data_bits: 8,
        }
    }
}
