use usb_device::control::{Recipient, Request, RequestType};
use usb_device::UsbDirection;

/// CDC class request: host writes the line coding.
pub const REQ_SET_LINE_CODING: u8 = 0x20;

/// CDC class request: host reads the line coding.
pub const REQ_GET_LINE_CODING: u8 = 0x21;

/// Standard request: host reads the alternate setting of an interface.
pub const REQ_GET_INTERFACE: u8 = Request::GET_INTERFACE;

/// Decoded 8-byte header of a control transfer.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct SetupPacket {
    /// Direction of the data stage.
    pub direction: UsbDirection,

    /// Standard, class or vendor request.
    pub request_type: RequestType,

    /// Device, interface, endpoint or other.
    pub recipient: Recipient,

    /// Request code (bRequest).
    pub request: u8,

    /// wValue
    pub value: u16,

    /// wIndex
    pub index: u16,

    /// Length of the data stage. Zero means there is no data stage.
    pub length: u16,
}

impl SetupPacket {
    /// Size of a setup packet on the wire.
    pub const SIZE: usize = 8;

    /// Decodes a setup packet as received on the control endpoint.
    pub fn parse(buf: &[u8; Self::SIZE]) -> SetupPacket {
        let rt = buf[0];

        SetupPacket {
            direction: if rt & 0x80 != 0 {
                UsbDirection::In
            } else {
                UsbDirection::Out
            },
            request_type: match (rt >> 5) & 0b11 {
                0 => RequestType::Standard,
                1 => RequestType::Class,
                2 => RequestType::Vendor,
                _ => RequestType::Reserved,
            },
            recipient: match rt & 0b1_1111 {
                0 => Recipient::Device,
                1 => Recipient::Interface,
                2 => Recipient::Endpoint,
                3 => Recipient::Other,
                _ => Recipient::Reserved,
            },
            request: buf[1],
            value: u16::from_le_bytes([buf[2], buf[3]]),
            index: u16::from_le_bytes([buf[4], buf[5]]),
            length: u16::from_le_bytes([buf[6], buf[7]]),
        }
    }

    /// Whether the request carries a data stage.
    pub fn has_data_stage(&self) -> bool {
        self.length != 0
    }
}
