use usb_device::UsbError;
use crate::class::CdcAcm;
use crate::endpoint::EndpointIo;
use crate::section::CriticalSection;
use crate::Error;

impl embedded_io::Error for Error {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            Error::InvalidArgument => embedded_io::ErrorKind::InvalidInput,
            Error::Endpoint(UsbError::Unsupported) => embedded_io::ErrorKind::Unsupported,
            Error::Endpoint(UsbError::BufferOverflow)
            | Error::Endpoint(UsbError::EndpointOverflow)
            | Error::Endpoint(UsbError::EndpointMemoryOverflow) => {
                embedded_io::ErrorKind::OutOfMemory
            }
            _ => embedded_io::ErrorKind::Other,
        }
    }
}

impl<E: EndpointIo, C: CriticalSection> embedded_io::ErrorType for CdcAcm<'_, E, C> {
    type Error = Error;
}

impl<E: EndpointIo, C: CriticalSection> embedded_io::WriteReady for CdcAcm<'_, E, C> {
    fn write_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.is_busy())
    }
}

impl<E: EndpointIo, C: CriticalSection> CdcAcm<'_, E, C> {
    /// Non-blocking form of [`submit_transmit`](Self::submit_transmit): a transfer in flight is
    /// reported as `WouldBlock`.
    pub fn try_transmit(&self, data: &[u8]) -> nb::Result<(), Error> {
        match self.submit_transmit(data) {
            Ok(()) => Ok(()),
            Err(Error::Busy) => Err(nb::Error::WouldBlock),
            Err(err) => Err(nb::Error::Other(err)),
        }
    }
}
