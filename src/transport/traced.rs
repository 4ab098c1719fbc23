//! Logging decorator for [`UsbDevice`] backends.
//!
//! Wraps any device and emits a `debug` event before and after each host
//! call, and a `trace` event with the payload size of every transfer.
//! Enable with `RUST_LOG=recibo::usb=debug`.

use std::future::Future;

use async_trait::async_trait;
use tracing::{debug, trace};

use super::{DeviceInfo, EndpointDescriptor, UsbDevice};
use crate::error::UsbError;

/// A device whose host calls are logged.
#[derive(Debug, Clone)]
pub struct Traced<D> {
    inner: D,
    label: String,
}

impl<D: UsbDevice> Traced<D> {
    pub fn new(inner: D) -> Self {
        let info = inner.info();
        let label = format!("{:04x}:{:04x}", info.vendor_id, info.product_id);
        Self { inner, label }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    pub fn into_inner(self) -> D {
        self.inner
    }
}

async fn logged<T, F>(device: &str, call: &'static str, fut: F) -> Result<T, UsbError>
where
    T: std::fmt::Debug,
    F: Future<Output = Result<T, UsbError>>,
{
    debug!(target: "recibo::usb", device, call, "->");
    let result = fut.await;
    match &result {
        Ok(value) => debug!(target: "recibo::usb", device, call, ?value, "<- ok"),
        Err(err) => debug!(target: "recibo::usb", device, call, %err, "<- error"),
    }
    result
}

#[async_trait]
impl<D: UsbDevice> UsbDevice for Traced<D> {
    fn info(&self) -> &DeviceInfo {
        self.inner.info()
    }

    fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    async fn open(&mut self) -> Result<(), UsbError> {
        logged(&self.label, "open", self.inner.open()).await
    }

    fn active_configuration(&self) -> Option<u8> {
        self.inner.active_configuration()
    }

    async fn select_configuration(&mut self, value: u8) -> Result<(), UsbError> {
        debug!(target: "recibo::usb", device = %self.label, value, "selecting configuration");
        logged(
            &self.label,
            "select_configuration",
            self.inner.select_configuration(value),
        )
        .await
    }

    async fn claim_interface(&mut self, interface: u8) -> Result<(), UsbError> {
        debug!(target: "recibo::usb", device = %self.label, interface, "claiming interface");
        logged(
            &self.label,
            "claim_interface",
            self.inner.claim_interface(interface),
        )
        .await
    }

    async fn release_interface(&mut self, interface: u8) -> Result<(), UsbError> {
        logged(
            &self.label,
            "release_interface",
            self.inner.release_interface(interface),
        )
        .await
    }

    fn endpoints(&self, interface: u8) -> Result<Vec<EndpointDescriptor>, UsbError> {
        let endpoints = self.inner.endpoints(interface);
        debug!(target: "recibo::usb", device = %self.label, interface, ?endpoints, "endpoints");
        endpoints
    }

    async fn transfer_out(&mut self, address: u8, data: &[u8]) -> Result<usize, UsbError> {
        trace!(target: "recibo::usb", device = %self.label, address, len = data.len(), "bulk out");
        logged(
            &self.label,
            "transfer_out",
            self.inner.transfer_out(address, data),
        )
        .await
    }

    async fn close(&mut self) -> Result<(), UsbError> {
        logged(&self.label, "close", self.inner.close()).await
    }
}
