use core::fmt;
use usb_device::UsbError;

/// Errors returned by the CDC-ACM class.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The device binding was given an empty receive buffer.
    InvalidArgument,

    /// A transmit is already in flight. Nothing was handed to the endpoint.
    Busy,

    /// Generic failure, e.g. configuring while no device binding exists.
    Failed,

    /// The endpoint substrate reported an error. Passed through unchanged.
    Endpoint(UsbError),
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

impl From<UsbError> for Error {
    fn from(err: UsbError) -> Self {
        Error::Endpoint(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument => f.write_str("invalid argument"),
            Error::Busy => f.write_str("transmit already in flight"),
            Error::Failed => f.write_str("operation failed"),
            Error::Endpoint(err) => write!(f, "endpoint error: {:?}", err),
        }
    }
}
