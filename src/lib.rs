//! Interrupt-driven CDC-ACM function layer for USB device controllers.
//!
//! CDC-ACM is a USB class that's supported out of the box by most operating systems and used for
//! implementing modems and generic serial ports. [`CdcAcm`] sits between a device controller core
//! and the application: it opens the bulk IN, bulk OUT and interrupt notification endpoints when
//! the host selects a configuration, answers the line coding requests, and relays bulk transfers
//! with one transmit in flight at a time.
//!
//! The controller core provides endpoint I/O through [`EndpointIo`] and forwards configuration
//! changes, setup packets and transfer completions to the class. The application lends the class
//! a receive buffer through a [`DeviceBinding`] and starts transmits with
//! [`CdcAcm::submit_transmit`].
//!
//! Example
//! =======
//!
//! The hardware independent part looks like this. `section` masks the USB interrupt; see
//! [`CriticalSection`].
//!
//! ```no_run
//! # fn dummy(
//! #     endpoints: impl usbd_cdc_acm::EndpointIo,
//! #     section: impl usbd_cdc_acm::CriticalSection,
//! # ) -> usbd_cdc_acm::Result<()> {
//! use usbd_cdc_acm::{CdcAcm, ClassContext, DeviceBinding, EndpointConfig, Error, SetupPacket};
//!
//! let mut rx_buf = [0u8; 64];
//! let mut on_rx = |data: &[u8]| {
//!     // data holds the bytes of one completed OUT transfer
//! };
//!
//! let acm = CdcAcm::with_section(endpoints, section, EndpointConfig::default());
//! acm.bind(DeviceBinding::new(&mut rx_buf).on_rx_complete(&mut on_rx))?;
//!
//! // From the controller core:
//! let mut ctx = ClassContext::new();
//! acm.configure(&mut ctx, 0)?;
//! acm.handle_setup(&ctx, &SetupPacket::parse(&[0xa1, 0x21, 0, 0, 0, 0, 7, 0]))?;
//!
//! // From the application:
//! match acm.submit_transmit(&[0x3a, 0x29]) {
//!     Ok(()) => { /* completion arrives through on_transmit_complete */ },
//!     Err(Error::Busy) => { /* a transfer is still in flight, try again later */ },
//!     Err(err) => return Err(err),
//! }
//! # Ok(())
//! # }
//! ```

#![no_std]

mod class;
mod endpoint;
mod error;
mod flow;
mod io;
mod line_coding;
#[cfg(test)]
mod mock;
mod section;
mod setup;

pub use crate::class::*;
pub use crate::endpoint::*;
pub use crate::error::{Error, Result};
pub use crate::line_coding::*;
pub use crate::section::*;
pub use crate::setup::*;
pub use embedded_io;
pub use usb_device::UsbError;
