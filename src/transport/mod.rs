//! # Printer Transport Layer
//!
//! The driver talks to the printer through a host-provided USB API expressed
//! as two traits:
//!
//! - [`UsbHost`]: enumerates devices the caller may use
//! - [`UsbDevice`]: open / configure / claim / bulk OUT / close
//!
//! A [`TransportSession`] owns one device, claims one interface and drives
//! the connect/disconnect state machine on top of those primitives.
//!
//! ## Available Backends
//!
//! - [`usb`]: libusb via `rusb` (feature `usb`, on by default)
//! - [`mock`]: in-memory device for tests and dry runs
//! - [`traced`]: decorator logging every host call around any backend

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::UsbError;

pub mod mock;
pub mod session;
pub mod traced;
#[cfg(feature = "usb")]
pub mod usb;

pub use session::{DisconnectHandle, SessionOptions, SessionState, TransportSession};
pub use traced::Traced;

/// USB class code of printer-class interfaces.
pub const PRINTER_CLASS: u8 = 0x07;

/// Endpoint direction, seen from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferType {
    Control,
    Isochronous,
    Bulk,
    Interrupt,
}

/// One endpoint of an interface's current alternate setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointDescriptor {
    /// Endpoint address; bit 7 set means IN.
    pub address: u8,
    pub transfer_type: TransferType,
    pub max_packet_size: u16,
}

impl EndpointDescriptor {
    pub fn number(&self) -> u8 {
        self.address & 0x0F
    }

    pub fn direction(&self) -> Direction {
        if self.address & 0x80 != 0 {
            Direction::In
        } else {
            Direction::Out
        }
    }

    pub fn is_bulk_out(&self) -> bool {
        self.transfer_type == TransferType::Bulk && self.direction() == Direction::Out
    }
}

/// The claimed interface and bulk OUT endpoint of a ready session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceEndpoint {
    pub interface: u8,
    pub address: u8,
    pub max_packet_size: u16,
}

/// Identity of a USB device.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceInfo {
    pub vendor_id: u16,
    pub product_id: u16,
    pub device_class: u8,
    /// Class codes of the interfaces of the active (or first) configuration.
    pub interface_classes: Vec<u8>,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub serial_number: Option<String>,
}

impl DeviceInfo {
    /// Human-readable name, e.g. `Manufacturer: "ACME", Product: "POS-58"`.
    pub fn display_name(&self) -> String {
        format!(
            "Manufacturer: \"{}\", Product: \"{}\"",
            self.manufacturer.as_deref().unwrap_or("unknown"),
            self.product.as_deref().unwrap_or("unknown"),
        )
    }

    /// Whether the device itself or any of its interfaces has `class`.
    pub fn has_class(&self, class: u8) -> bool {
        self.device_class == class || self.interface_classes.contains(&class)
    }
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04x}:{:04x} {}",
            self.vendor_id,
            self.product_id,
            self.display_name()
        )
    }
}

/// Selects which device to connect to. Unset fields match anything.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceFilter {
    pub vendor_id: Option<u16>,
    pub product_id: Option<u16>,
    pub class_code: Option<u8>,
}

impl DeviceFilter {
    /// Any device exposing a printer-class interface.
    pub fn printers() -> Self {
        Self {
            class_code: Some(PRINTER_CLASS),
            ..Default::default()
        }
    }

    pub fn matches(&self, info: &DeviceInfo) -> bool {
        self.vendor_id.is_none_or(|v| v == info.vendor_id)
            && self.product_id.is_none_or(|p| p == info.product_id)
            && self.class_code.is_none_or(|c| info.has_class(c))
    }
}

/// Host-side handle to one USB device.
///
/// Mirrors the capability set of browser-style USB APIs: every call that
/// touches the bus is async; descriptor queries are answered from cached
/// state.
#[async_trait]
pub trait UsbDevice: Send {
    fn info(&self) -> &DeviceInfo;

    fn is_open(&self) -> bool;

    async fn open(&mut self) -> Result<(), UsbError>;

    /// Currently selected configuration value, if any.
    fn active_configuration(&self) -> Option<u8>;

    async fn select_configuration(&mut self, value: u8) -> Result<(), UsbError>;

    async fn claim_interface(&mut self, interface: u8) -> Result<(), UsbError>;

    async fn release_interface(&mut self, interface: u8) -> Result<(), UsbError>;

    /// Endpoints of `interface`'s current alternate setting.
    fn endpoints(&self, interface: u8) -> Result<Vec<EndpointDescriptor>, UsbError>;

    /// Bulk/interrupt OUT transfer; returns the number of bytes accepted.
    async fn transfer_out(&mut self, address: u8, data: &[u8]) -> Result<usize, UsbError>;

    async fn close(&mut self) -> Result<(), UsbError>;
}

/// Host-side device enumeration.
#[async_trait]
pub trait UsbHost: Send + Sync {
    type Device: UsbDevice + 'static;

    /// Devices currently attached and usable.
    async fn devices(&self) -> Result<Vec<Self::Device>, UsbError>;

    /// First device matching `filter`.
    async fn request_device(&self, filter: &DeviceFilter) -> Result<Self::Device, UsbError> {
        self.devices()
            .await?
            .into_iter()
            .find(|device| filter.matches(device.info()))
            .ok_or(UsbError::NotFound)
    }
}
