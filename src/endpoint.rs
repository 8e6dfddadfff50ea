use usb_device::endpoint::{EndpointAddress, EndpointType};
use usb_device::UsbDirection;

/// Endpoint I/O provided by the device controller core.
///
/// All methods take `&self` because the same substrate is driven both from the application and
/// from the controller's interrupt handler, as with `usb_device::bus::UsbBus`.
pub trait EndpointIo {
    /// Opens an endpoint with the given transfer type and maximum packet size.
    fn open_endpoint(
        &self,
        ep_addr: EndpointAddress,
        ep_type: EndpointType,
        max_packet_size: u16,
    ) -> usb_device::Result<()>;

    /// Closes a previously opened endpoint.
    fn close_endpoint(&self, ep_addr: EndpointAddress) -> usb_device::Result<()>;

    /// Starts an IN transfer of `data`. Completion is reported through
    /// [`CdcAcm::on_transmit_complete`](crate::CdcAcm::on_transmit_complete).
    fn transmit(&self, ep_addr: EndpointAddress, data: &[u8]) -> usb_device::Result<()>;

    /// Arms an OUT endpoint to accept a transfer of up to `buf.len()` bytes. Completion is
    /// reported through [`CdcAcm::on_receive_complete`](crate::CdcAcm::on_receive_complete).
    ///
    /// `buf` is only borrowed for this call. The substrate receives into its own staging memory
    /// (endpoint RAM or a DMA buffer it owns) and hands the bytes over on completion; the class
    /// then copies them into the bound receive buffer.
    fn receive(&self, ep_addr: EndpointAddress, buf: &mut [u8]);

    /// Stages `data` as the IN data stage of the current control transfer.
    fn control_transmit(&self, data: &[u8]);

    /// Copies the OUT data stage of the current control transfer into the front of `buf` and
    /// returns the number of bytes copied, which is less than `buf.len()` when the host sent a
    /// shorter data stage.
    fn control_receive(&self, buf: &mut [u8]) -> usize;
}

impl<T: EndpointIo + ?Sized> EndpointIo for &T {
    fn open_endpoint(
        &self,
        ep_addr: EndpointAddress,
        ep_type: EndpointType,
        max_packet_size: u16,
    ) -> usb_device::Result<()> {
        (**self).open_endpoint(ep_addr, ep_type, max_packet_size)
    }

    fn close_endpoint(&self, ep_addr: EndpointAddress) -> usb_device::Result<()> {
        (**self).close_endpoint(ep_addr)
    }

    fn transmit(&self, ep_addr: EndpointAddress, data: &[u8]) -> usb_device::Result<()> {
        (**self).transmit(ep_addr, data)
    }

    fn receive(&self, ep_addr: EndpointAddress, buf: &mut [u8]) {
        (**self).receive(ep_addr, buf)
    }

    fn control_transmit(&self, data: &[u8]) {
        (**self).control_transmit(data)
    }

    fn control_receive(&self, buf: &mut [u8]) -> usize {
        (**self).control_receive(buf)
    }
}

/// Endpoint layout of the CDC-ACM function.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct EndpointConfig {
    /// Bulk IN endpoint carrying data to the host.
    pub data_in: EndpointAddress,

    /// Bulk OUT endpoint carrying data from the host.
    pub data_out: EndpointAddress,

    /// Interrupt IN endpoint for CDC notifications.
    pub notify: EndpointAddress,

    pub bulk_packet_size: u16,

    pub interrupt_packet_size: u16,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        EndpointConfig {
            data_in: EndpointAddress::from_parts(1, UsbDirection::In),
            data_out: EndpointAddress::from_parts(1, UsbDirection::Out),
            notify: EndpointAddress::from_parts(2, UsbDirection::In),
            bulk_packet_size: 64,
            interrupt_packet_size: 8,
        }
    }
}

impl EndpointConfig {
    /// Endpoints in the order they are opened and closed.
    pub(crate) fn layout(&self) -> [(EndpointAddress, EndpointType, u16); 3] {
        [
            (self.data_in, EndpointType::Bulk, self.bulk_packet_size),
            (self.data_out, EndpointType::Bulk, self.bulk_packet_size),
            (self.notify, EndpointType::Interrupt, self.interrupt_packet_size),
        ]
    }
}
