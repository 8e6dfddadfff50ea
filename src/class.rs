use core::fmt;
use core::sync::atomic::AtomicBool;
use log::{debug, warn};
use crate::endpoint::{EndpointConfig, EndpointIo};
use crate::line_coding::LineCoding;
use crate::section::{CriticalSection, SpinSection};
use crate::{Error, Result};

/// Handle for starting a transmit, passed to the transmit-complete callback.
pub trait Transmit {
    /// Starts a bulk IN transfer. Fails with [`Error::Busy`] while another transfer is in flight.
    fn submit_transmit(&self, data: &[u8]) -> Result<()>;
}

/// Application side of the class: the receive buffer and the completion callbacks.
///
/// The receive buffer is exclusively borrowed for as long as the binding exists. Only the class
/// writes to it, and the receive callback only sees it after a transfer has completed.
///
/// Callbacks run in the completion handler's context, so they must be `Send`. They run outside
/// the critical section and may start a transmit.
pub struct DeviceBinding<'a> {
    pub(crate) rx_buffer: &'a mut [u8],
    pub(crate) on_rx_complete: Option<&'a mut (dyn FnMut(&[u8]) + Send)>,
    pub(crate) on_tx_complete: Option<&'a mut (dyn FnMut(&dyn Transmit) + Send)>,
}

impl<'a> DeviceBinding<'a> {
    /// Creates a binding without callbacks. The whole of `rx_buffer` is used for every receive.
    pub fn new(rx_buffer: &'a mut [u8]) -> Self {
        DeviceBinding {
            rx_buffer,
            on_rx_complete: None,
            on_tx_complete: None,
        }
    }

    /// Sets the callback invoked with the received bytes when a bulk OUT transfer completes.
    pub fn on_rx_complete(mut self, f: &'a mut (dyn FnMut(&[u8]) + Send)) -> Self {
        self.on_rx_complete = Some(f);
        self
    }

    /// Sets the callback invoked when a bulk IN transfer completes. The transmit path is already
    /// idle when it runs, so it may start the next transfer right away.
    pub fn on_tx_complete(mut self, f: &'a mut (dyn FnMut(&dyn Transmit) + Send)) -> Self {
        self.on_tx_complete = Some(f);
        self
    }

    /// Capacity of the receive buffer in bytes.
    pub fn capacity(&self) -> usize {
        self.rx_buffer.len()
    }

    /// Gives the receive buffer back to the application.
    pub fn into_buffer(self) -> &'a mut [u8] {
        self.rx_buffer
    }
}

impl fmt::Debug for DeviceBinding<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceBinding")
            .field("capacity", &self.rx_buffer.len())
            .field("on_rx_complete", &self.on_rx_complete.is_some())
            .field("on_tx_complete", &self.on_tx_complete.is_some())
            .finish()
    }
}

/// Per-configuration state owned by the controller core.
///
/// Attached while a configuration is active and the device binding is in use by it.
#[derive(Default, Debug)]
pub struct ClassContext {
    config_index: Option<u8>,
    attached: bool,
}

impl ClassContext {
    pub const fn new() -> Self {
        ClassContext {
            config_index: None,
            attached: false,
        }
    }

    /// Index of the configuration whose endpoints are open, if any.
    pub fn config_index(&self) -> Option<u8> {
        self.config_index
    }

    /// Whether completions on this configuration are delivered to the device binding.
    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

/// CDC-ACM function: bulk IN and OUT data endpoints plus an interrupt notification endpoint.
///
/// Entry points take `&self` so that the application and the controller's interrupt handler can
/// share one instance; with `Sync` endpoints and section the class is `Sync` and can live in a
/// `static`. The transmit path allows one transfer in flight; the receive path re-arms the OUT
/// endpoint after every completion.
///
/// The binding and the line coding are only touched inside `C`'s critical section.
pub struct CdcAcm<'a, E: EndpointIo, C: CriticalSection = SpinSection> {
    pub(crate) endpoints: E,
    pub(crate) section: C,
    pub(crate) config: EndpointConfig,
    pub(crate) tx_busy: AtomicBool,
    pub(crate) line_coding: spin::Mutex<LineCoding>,
    pub(crate) binding: spin::Mutex<Option<DeviceBinding<'a>>>,
}

impl<'a, E: EndpointIo> CdcAcm<'a, E> {
    /// Creates a class with the default endpoint layout, guarded by a [`SpinSection`].
    ///
    /// Host use only: see [`SpinSection`]. Firmware constructs the class with
    /// [`with_section`](CdcAcm::with_section) and an interrupt-masking section.
    pub fn new(endpoints: E) -> Self {
        Self::with_config(endpoints, EndpointConfig::default())
    }

    /// Creates a class with a custom endpoint layout, guarded by a [`SpinSection`]. Host use only.
    pub fn with_config(endpoints: E, config: EndpointConfig) -> Self {
        CdcAcm::with_section(endpoints, SpinSection::new(), config)
    }
}

impl<'a, E: EndpointIo, C: CriticalSection> CdcAcm<'a, E, C> {
    /// Creates a class using `section` to exclude the completion handlers from the transmit
    /// path.
    pub fn with_section(endpoints: E, section: C, config: EndpointConfig) -> Self {
        CdcAcm {
            endpoints,
            section,
            config,
            tx_busy: AtomicBool::new(false),
            line_coding: spin::Mutex::new(LineCoding::default()),
            binding: spin::Mutex::new(None),
        }
    }

    /// Gets the endpoint substrate.
    pub fn endpoints(&self) -> &E {
        &self.endpoints
    }

    /// Gets the endpoint layout.
    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    /// Installs the device binding, replacing any previous one.
    ///
    /// Must not race with in-flight transfers.
    pub fn bind(&self, binding: DeviceBinding<'a>) -> Result<()> {
        if binding.rx_buffer.is_empty() {
            return Err(Error::InvalidArgument);
        }

        debug!("cdc: bound {:?}", binding);
        self.section.with(|| *self.binding.lock() = Some(binding));

        Ok(())
    }

    /// Removes the device binding and returns it to the application.
    pub fn unbind(&self) -> Option<DeviceBinding<'a>> {
        self.section.with(|| self.binding.lock().take())
    }

    /// Whether a device binding is installed.
    pub fn is_bound(&self) -> bool {
        self.section.with(|| self.binding.lock().is_some())
    }

    /// Opens the function's endpoints for configuration `config_index` and arms the OUT endpoint.
    ///
    /// Stops at the first endpoint that fails to open and returns its error; endpoints opened
    /// before it stay open. Returns [`Error::Failed`] if the endpoints opened but no device
    /// binding exists. In either case the controller core is expected to call
    /// [`deconfigure`](Self::deconfigure) when it tears the configuration down.
    pub fn configure(&self, ctx: &mut ClassContext, config_index: u8) -> Result<()> {
        for (ep_addr, ep_type, max_packet_size) in self.config.layout().iter() {
            if let Err(err) = self
                .endpoints
                .open_endpoint(*ep_addr, *ep_type, *max_packet_size)
            {
                warn!("cdc: open {:?} failed: {:?}", ep_addr, err);
                return Err(err.into());
            }
        }

        ctx.config_index = Some(config_index);

        let armed = self.section.with(|| match self.binding.lock().as_mut() {
            Some(binding) => {
                self.endpoints
                    .receive(self.config.data_out, &mut binding.rx_buffer[..]);
                true
            }
            None => false,
        });

        if !armed {
            warn!("cdc: configured {} without a device binding", config_index);
            return Err(Error::Failed);
        }

        ctx.attached = true;

        debug!("cdc: configured {}", config_index);
        Ok(())
    }

    /// Closes the function's endpoints in the order they were opened.
    ///
    /// Stops at the first endpoint that fails to close and returns its error, leaving `ctx`
    /// attached. On success `ctx` is detached from the device binding.
    pub fn deconfigure(&self, ctx: &mut ClassContext, config_index: u8) -> Result<()> {
        for (ep_addr, _, _) in self.config.layout().iter() {
            if let Err(err) = self.endpoints.close_endpoint(*ep_addr) {
                warn!("cdc: close {:?} failed: {:?}", ep_addr, err);
                return Err(err.into());
            }
        }

        ctx.config_index = None;
        ctx.attached = false;

        debug!("cdc: deconfigured {}", config_index);
        Ok(())
    }
}
