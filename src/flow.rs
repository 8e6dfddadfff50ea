use core::{cmp, mem};
use core::sync::atomic::Ordering;
use log::{trace, warn};
use usb_device::control::RequestType;
use usb_device::UsbDirection;
use crate::class::{CdcAcm, ClassContext, Transmit};
use crate::endpoint::EndpointIo;
use crate::line_coding::LineCoding;
use crate::section::CriticalSection;
use crate::setup::{SetupPacket, REQ_GET_INTERFACE, REQ_GET_LINE_CODING, REQ_SET_LINE_CODING};
use crate::{Error, Result};

impl<'a, E: EndpointIo, C: CriticalSection> CdcAcm<'a, E, C> {
    /// Starts a bulk IN transfer of `data`.
    ///
    /// Only one transfer may be in flight. While one is, this returns [`Error::Busy`] without
    /// touching the endpoint; it never blocks and never queues. If the endpoint rejects the
    /// transfer its error is returned and the transmit path stays idle.
    pub fn submit_transmit(&self, data: &[u8]) -> Result<()> {
        let ep_addr = self.config.data_in;

        self.section.with(|| {
            if self.tx_busy.load(Ordering::Acquire) {
                return Err(Error::Busy);
            }

            self.endpoints.transmit(ep_addr, data)?;
            self.tx_busy.store(true, Ordering::Release);

            Ok(())
        })
    }

    /// Whether a bulk IN transfer is in flight.
    pub fn is_busy(&self) -> bool {
        self.tx_busy.load(Ordering::Acquire)
    }

    /// Gets the current line coding.
    pub fn line_coding(&self) -> LineCoding {
        self.section.with(|| *self.line_coding.lock())
    }

    /// Called by the controller core when the bulk IN transfer has completed.
    ///
    /// The transmit path is idle before the callback runs, and the callback runs outside the
    /// critical section, so it can start the next transfer.
    pub fn on_transmit_complete(&self, ctx: &ClassContext) {
        let on_tx_complete = self.section.with(|| {
            self.tx_busy.store(false, Ordering::Release);

            if !ctx.is_attached() {
                return None;
            }

            self.binding
                .lock()
                .as_mut()
                .and_then(|binding| binding.on_tx_complete.take())
        });

        if let Some(on_tx_complete) = on_tx_complete {
            on_tx_complete(self);

            self.section.with(|| {
                if let Some(binding) = self.binding.lock().as_mut() {
                    if binding.on_tx_complete.is_none() {
                        binding.on_tx_complete = Some(on_tx_complete);
                    }
                }
            });
        }
    }

    /// Called by the controller core when a bulk OUT transfer has completed with `packet`.
    ///
    /// The packet is copied into the bound receive buffer and handed to the receive callback,
    /// then the OUT endpoint is re-armed with the full buffer whether or not a callback is set.
    /// The buffer and callback are lent out of the binding for the callback, which runs outside
    /// the critical section.
    pub fn on_receive_complete(&self, ctx: &ClassContext, packet: &[u8]) {
        let lent = self.section.with(|| {
            if !ctx.is_attached() {
                return None;
            }

            self.binding.lock().as_mut().map(|binding| {
                (
                    mem::take(&mut binding.rx_buffer),
                    binding.on_rx_complete.take(),
                )
            })
        });

        let (rx_buffer, mut on_rx_complete) = match lent {
            Some(lent) => lent,
            None => return,
        };

        let len = cmp::min(packet.len(), rx_buffer.len());
        if len < packet.len() {
            warn!(
                "cdc: received {} bytes into a {} byte buffer",
                packet.len(),
                rx_buffer.len()
            );
        }

        rx_buffer[..len].copy_from_slice(&packet[..len]);

        if let Some(on_rx_complete) = on_rx_complete.as_mut() {
            on_rx_complete(&rx_buffer[..len]);
        }

        self.section.with(|| {
            // An empty buffer marks the one lent out above; bind() never accepts empty buffers.
            if let Some(binding) = self.binding.lock().as_mut() {
                if binding.rx_buffer.is_empty() {
                    binding.rx_buffer = rx_buffer;
                    if binding.on_rx_complete.is_none() {
                        binding.on_rx_complete = on_rx_complete;
                    }

                    self.endpoints
                        .receive(self.config.data_out, &mut binding.rx_buffer[..]);
                }
            }
        });
    }

    /// Handles a setup packet addressed to the function.
    ///
    /// Stages the data stage for GET_LINE_CODING, SET_LINE_CODING and GET_INTERFACE. Anything
    /// else is left to the controller core. Never rejects a request.
    pub fn handle_setup(&self, ctx: &ClassContext, setup: &SetupPacket) -> Result<()> {
        trace!(
            "cdc: setup {:?} {:#04x} len {} (config {:?})",
            setup.request_type,
            setup.request,
            setup.length,
            ctx.config_index()
        );

        match setup.request_type {
            RequestType::Class if setup.has_data_stage() => {
                if setup.direction == UsbDirection::In && setup.request == REQ_GET_LINE_CODING {
                    let bytes = self.line_coding().to_bytes();
                    self.endpoints.control_transmit(&bytes);
                } else if setup.request == REQ_SET_LINE_CODING {
                    let mut received = [0u8; LineCoding::SIZE];
                    let len = cmp::min(
                        self.endpoints.control_receive(&mut received),
                        LineCoding::SIZE,
                    );
                    if len < LineCoding::SIZE {
                        warn!("cdc: short SET_LINE_CODING data stage ({} bytes)", len);
                    }

                    // Only the bytes the host sent replace the current record.
                    self.section.with(|| {
                        let mut line_coding = self.line_coding.lock();
                        let mut bytes = line_coding.to_bytes();
                        bytes[..len].copy_from_slice(&received[..len]);
                        *line_coding = LineCoding::from_bytes(&bytes);
                    });
                }
            }
            RequestType::Standard if setup.request == REQ_GET_INTERFACE => {
                // No alternate settings.
                self.endpoints.control_transmit(&[0]);
            }
            _ => {}
        }

        Ok(())
    }
}

impl<E: EndpointIo, C: CriticalSection> Transmit for CdcAcm<'_, E, C> {
    fn submit_transmit(&self, data: &[u8]) -> Result<()> {
        CdcAcm::submit_transmit(self, data)
    }
}
