//! libusb host backend (via `rusb`).
//!
//! Every call that touches the bus runs on tokio's blocking pool; the device
//! handle is shared with those tasks through an `Arc`. Descriptors are read
//! once on open (and again after a configuration change) so endpoint lookups
//! never block.
//!
//! On Linux the kernel's `usblp` driver usually owns printer interfaces;
//! the backend asks libusb to detach it automatically when claiming.
//!
//! Endpoints are always taken from alternate setting 0 of the interface,
//! the one active right after a claim; the backend never issues
//! `SET_INTERFACE`, so that is also the current setting.
//!
//! No hotplug callback is registered. An unplugged printer shows up as a
//! failed bulk transfer (`LIBUSB_ERROR_NO_DEVICE` maps to
//! [`UsbError::Disconnected`]), which drops the session to `Unopened`.
//! Callers with their own hotplug source can report earlier through
//! [`DisconnectHandle`](super::DisconnectHandle).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rusb::{Context, Device, DeviceHandle, UsbContext};
use tokio::task;
use tracing::debug;

use super::{DeviceInfo, EndpointDescriptor, TransferType, UsbDevice, UsbHost};
use crate::error::UsbError;

/// Alternate setting whose endpoints are used; never changed after claim.
const ALTERNATE_SETTING: u8 = 0;

/// Enumerates devices through a libusb context.
pub struct RusbHost {
    context: Context,
    timeout: Duration,
}

impl RusbHost {
    pub fn new() -> Result<Self, UsbError> {
        let context =
            Context::new().map_err(|err| map_rusb_error("create libusb context", err))?;
        Ok(Self {
            context,
            timeout: Duration::ZERO,
        })
    }

    /// Timeout for each bulk transfer. Zero (the default) waits forever.
    pub fn with_transfer_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl UsbHost for RusbHost {
    type Device = RusbDevice;

    async fn devices(&self) -> Result<Vec<RusbDevice>, UsbError> {
        let context = self.context.clone();
        let timeout = self.timeout;
        task::spawn_blocking(move || list_devices(&context, timeout))
            .await
            .map_err(|err| join_error("device discovery", err))?
    }
}

fn list_devices(context: &Context, timeout: Duration) -> Result<Vec<RusbDevice>, UsbError> {
    let devices = context
        .devices()
        .map_err(|err| map_rusb_error("list devices", err))?;

    let mut found = Vec::new();
    for device in devices.iter() {
        let desc = match device.device_descriptor() {
            Ok(desc) => desc,
            Err(err) => {
                debug!(%err, "skipping device without readable descriptor");
                continue;
            }
        };

        let mut interface_classes = Vec::new();
        if let Ok(config) = device
            .active_config_descriptor()
            .or_else(|_| device.config_descriptor(0))
        {
            for interface in config.interfaces() {
                for alt in interface.descriptors() {
                    if !interface_classes.contains(&alt.class_code()) {
                        interface_classes.push(alt.class_code());
                    }
                }
            }
        }

        let info = DeviceInfo {
            vendor_id: desc.vendor_id(),
            product_id: desc.product_id(),
            device_class: desc.class_code(),
            interface_classes,
            manufacturer: None,
            product: None,
            serial_number: None,
        };
        found.push(RusbDevice {
            device,
            info,
            handle: None,
            configuration: None,
            interfaces: Vec::new(),
            timeout,
        });
    }
    Ok(found)
}

/// One libusb device.
pub struct RusbDevice {
    device: Device<Context>,
    info: DeviceInfo,
    handle: Option<Arc<DeviceHandle<Context>>>,
    configuration: Option<u8>,
    /// Endpoints per interface number, for the active configuration.
    interfaces: Vec<(u8, Vec<EndpointDescriptor>)>,
    timeout: Duration,
}

impl RusbDevice {
    fn handle(&self) -> Result<Arc<DeviceHandle<Context>>, UsbError> {
        self.handle.clone().ok_or(UsbError::NotOpen)
    }

    /// Re-read the active configuration and its endpoint layout.
    async fn refresh_descriptors(&mut self) -> Result<(), UsbError> {
        let handle = self.handle()?;
        let device = self.device.clone();
        let (configuration, interfaces) = blocking("read configuration", move || {
            let value = handle.active_configuration()?;
            if value == 0 {
                return Ok((None, Vec::new()));
            }
            let config = device.active_config_descriptor()?;
            Ok((Some(value), read_endpoints(&config)))
        })
        .await?;
        self.configuration = configuration;
        self.interfaces = interfaces;
        Ok(())
    }
}

fn read_endpoints(config: &rusb::ConfigDescriptor) -> Vec<(u8, Vec<EndpointDescriptor>)> {
    let mut interfaces = Vec::new();
    for interface in config.interfaces() {
        for alt in interface.descriptors() {
            if alt.setting_number() != ALTERNATE_SETTING {
                continue;
            }
            let endpoints = alt
                .endpoint_descriptors()
                .map(|ep| EndpointDescriptor {
                    address: ep.address(),
                    transfer_type: map_transfer_type(ep.transfer_type()),
                    max_packet_size: ep.max_packet_size(),
                })
                .collect();
            interfaces.push((interface.number(), endpoints));
        }
    }
    interfaces
}

fn read_strings(handle: &DeviceHandle<Context>, device: &Device<Context>, info: &mut DeviceInfo) {
    let Ok(desc) = device.device_descriptor() else {
        return;
    };
    info.manufacturer = handle.read_manufacturer_string_ascii(&desc).ok();
    info.product = handle.read_product_string_ascii(&desc).ok();
    info.serial_number = handle.read_serial_number_string_ascii(&desc).ok();
}

#[async_trait]
impl UsbDevice for RusbDevice {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    async fn open(&mut self) -> Result<(), UsbError> {
        if self.handle.is_some() {
            return Ok(());
        }
        let device = self.device.clone();
        let mut info = self.info.clone();
        let (handle, info) = blocking("open device", move || {
            let handle = device.open()?;
            if let Err(err) = handle.set_auto_detach_kernel_driver(true) {
                debug!(%err, "kernel driver auto-detach unavailable; continuing");
            }
            read_strings(&handle, &device, &mut info);
            Ok((handle, info))
        })
        .await?;

        self.handle = Some(Arc::new(handle));
        self.info = info;
        self.refresh_descriptors().await
    }

    fn active_configuration(&self) -> Option<u8> {
        self.configuration
    }

    async fn select_configuration(&mut self, value: u8) -> Result<(), UsbError> {
        let handle = self.handle()?;
        blocking("select configuration", move || {
            handle.set_active_configuration(value)
        })
        .await?;
        self.refresh_descriptors().await
    }

    async fn claim_interface(&mut self, interface: u8) -> Result<(), UsbError> {
        let handle = self.handle()?;
        blocking("claim interface", move || handle.claim_interface(interface)).await
    }

    async fn release_interface(&mut self, interface: u8) -> Result<(), UsbError> {
        let handle = self.handle()?;
        blocking("release interface", move || {
            handle.release_interface(interface)
        })
        .await
    }

    fn endpoints(&self, interface: u8) -> Result<Vec<EndpointDescriptor>, UsbError> {
        if self.handle.is_none() {
            return Err(UsbError::NotOpen);
        }
        self.interfaces
            .iter()
            .find(|(number, _)| *number == interface)
            .map(|(_, endpoints)| endpoints.clone())
            .ok_or(UsbError::NotFound)
    }

    async fn transfer_out(&mut self, address: u8, data: &[u8]) -> Result<usize, UsbError> {
        let handle = self.handle()?;
        let data = data.to_vec();
        let timeout = self.timeout;
        blocking("bulk transfer", move || {
            handle.write_bulk(address, &data, timeout)
        })
        .await
    }

    async fn close(&mut self) -> Result<(), UsbError> {
        self.configuration = None;
        self.interfaces.clear();
        if let Some(handle) = self.handle.take() {
            // Dropping the last handle calls libusb_close.
            blocking("close device", move || {
                drop(handle);
                Ok(())
            })
            .await?;
        }
        Ok(())
    }
}

async fn blocking<T, F>(operation: &'static str, f: F) -> Result<T, UsbError>
where
    T: Send + 'static,
    F: FnOnce() -> rusb::Result<T> + Send + 'static,
{
    task::spawn_blocking(f)
        .await
        .map_err(|err| join_error(operation, err))?
        .map_err(|err| map_rusb_error(operation, err))
}

fn map_transfer_type(transfer_type: rusb::TransferType) -> TransferType {
    match transfer_type {
        rusb::TransferType::Control => TransferType::Control,
        rusb::TransferType::Isochronous => TransferType::Isochronous,
        rusb::TransferType::Bulk => TransferType::Bulk,
        rusb::TransferType::Interrupt => TransferType::Interrupt,
    }
}

fn map_rusb_error(operation: &'static str, err: rusb::Error) -> UsbError {
    match err {
        rusb::Error::NoDevice => UsbError::Disconnected,
        rusb::Error::NotFound => UsbError::NotFound,
        rusb::Error::Access => UsbError::AccessDenied,
        rusb::Error::Busy => UsbError::Busy,
        rusb::Error::Timeout => UsbError::Timeout,
        other => UsbError::other(operation, other.to_string()),
    }
}

fn join_error(operation: &'static str, err: task::JoinError) -> UsbError {
    UsbError::other(operation, format!("task join failed: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        assert_eq!(
            map_rusb_error("open", rusb::Error::NoDevice),
            UsbError::Disconnected
        );
        assert_eq!(
            map_rusb_error("open", rusb::Error::Access),
            UsbError::AccessDenied
        );
        assert!(matches!(
            map_rusb_error("bulk transfer", rusb::Error::Pipe),
            UsbError::Other {
                operation: "bulk transfer",
                ..
            }
        ));
    }

    #[test]
    fn test_transfer_type_mapping() {
        assert_eq!(
            map_transfer_type(rusb::TransferType::Bulk),
            TransferType::Bulk
        );
        assert_eq!(
            map_transfer_type(rusb::TransferType::Interrupt),
            TransferType::Interrupt
        );
    }
}
