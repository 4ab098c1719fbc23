//! In-memory USB printer.
//!
//! Clones of a [`MockDevice`] share one state, so a test can hand a clone to
//! a session and keep another to inspect calls and written bytes, or to
//! inject faults while the session is running.
//!
//! ```
//! use recibo::transport::mock::MockDevice;
//! use recibo::transport::{SessionOptions, TransportSession};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let device = MockDevice::printer();
//! let mut session = TransportSession::new(device.clone(), SessionOptions::default());
//! session.open().await.unwrap();
//! session.write(b"hi").await.unwrap();
//! assert_eq!(device.written(), b"hi");
//! # });
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::{Notify, Semaphore};

use super::{DeviceInfo, EndpointDescriptor, PRINTER_CLASS, TransferType, UsbDevice, UsbHost};
use crate::error::UsbError;

/// A host call recorded by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Open,
    SelectConfiguration(u8),
    ClaimInterface(u8),
    ReleaseInterface(u8),
    TransferOut { address: u8, len: usize },
    Close,
}

#[derive(Debug, Default)]
struct MockState {
    open: bool,
    configuration: Option<u8>,
    interface: u8,
    claimed: bool,
    endpoints: Vec<EndpointDescriptor>,

    calls: Vec<MockCall>,
    written: Vec<u8>,
    transfer_sizes: Vec<usize>,
    transfers: usize,

    fail_open: Option<UsbError>,
    fail_claim: Option<UsbError>,
    fail_release: Option<UsbError>,
    fail_transfer_at: Option<(usize, UsbError)>,
    max_transfer: Option<usize>,
}

/// Holds transfers until the test lets them through.
#[derive(Debug)]
struct Gate {
    permits: Semaphore,
    entered: Notify,
}

/// Scripted USB printer.
#[derive(Debug, Clone)]
pub struct MockDevice {
    info: DeviceInfo,
    state: Arc<Mutex<MockState>>,
    gate: Option<Arc<Gate>>,
}

impl MockDevice {
    /// A printer-class device on interface 0 with a bulk IN and a bulk OUT
    /// endpoint and no active configuration.
    pub fn printer() -> Self {
        Self::with_info(DeviceInfo {
            vendor_id: 0x0416,
            product_id: 0x5011,
            device_class: 0,
            interface_classes: vec![PRINTER_CLASS],
            manufacturer: Some("Mock".into()),
            product: Some("POS-58".into()),
            serial_number: None,
        })
    }

    pub fn with_info(info: DeviceInfo) -> Self {
        let state = MockState {
            endpoints: vec![
                EndpointDescriptor {
                    address: 0x81,
                    transfer_type: TransferType::Bulk,
                    max_packet_size: 64,
                },
                EndpointDescriptor {
                    address: 0x02,
                    transfer_type: TransferType::Bulk,
                    max_packet_size: 64,
                },
            ],
            ..Default::default()
        };
        Self {
            info,
            state: Arc::new(Mutex::new(state)),
            gate: None,
        }
    }

    pub fn with_endpoints(self, endpoints: Vec<EndpointDescriptor>) -> Self {
        self.lock().endpoints = endpoints;
        self
    }

    /// Only IN and interrupt endpoints.
    pub fn without_bulk_out(self) -> Self {
        self.with_endpoints(vec![
            EndpointDescriptor {
                address: 0x81,
                transfer_type: TransferType::Bulk,
                max_packet_size: 64,
            },
            EndpointDescriptor {
                address: 0x03,
                transfer_type: TransferType::Interrupt,
                max_packet_size: 8,
            },
        ])
    }

    /// Start with `value` already selected.
    pub fn with_configuration(self, value: u8) -> Self {
        self.lock().configuration = Some(value);
        self
    }

    pub fn fail_open(self, err: UsbError) -> Self {
        self.set_fail_open(Some(err));
        self
    }

    pub fn fail_claim(self, err: UsbError) -> Self {
        self.lock().fail_claim = Some(err);
        self
    }

    pub fn fail_release(self, err: UsbError) -> Self {
        self.lock().fail_release = Some(err);
        self
    }

    /// Fail the `index`th transfer (counted from 0 over the device's life).
    pub fn fail_transfer_at(self, index: usize, err: UsbError) -> Self {
        self.lock().fail_transfer_at = Some((index, err));
        self
    }

    /// Accept at most `limit` bytes per transfer.
    pub fn max_transfer(self, limit: usize) -> Self {
        self.lock().max_transfer = Some(limit);
        self
    }

    /// Block every transfer until [`release_transfers`](Self::release_transfers)
    /// or [`ungate`](Self::ungate).
    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Gate {
            permits: Semaphore::new(0),
            entered: Notify::new(),
        }));
        self
    }

    pub fn set_fail_open(&self, err: Option<UsbError>) {
        self.lock().fail_open = err;
    }

    pub fn fail_next_transfer(&self, err: UsbError) {
        let mut state = self.lock();
        state.fail_transfer_at = Some((state.transfers, err));
    }

    /// Let `count` blocked or future transfers through.
    pub fn release_transfers(&self, count: usize) {
        if let Some(gate) = &self.gate {
            gate.permits.add_permits(count);
        }
    }

    /// Stop gating; all pending and future transfers proceed.
    pub fn ungate(&self) {
        if let Some(gate) = &self.gate {
            gate.permits.close();
        }
    }

    /// Wait until a transfer reaches the gate.
    pub async fn transfer_started(&self) {
        if let Some(gate) = &self.gate {
            gate.entered.notified().await;
        }
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    pub fn written(&self) -> Vec<u8> {
        self.lock().written.clone()
    }

    /// Bytes accepted by each successful transfer.
    pub fn transfer_sizes(&self) -> Vec<usize> {
        self.lock().transfer_sizes.clone()
    }

    pub fn is_claimed(&self) -> bool {
        self.lock().claimed
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl UsbDevice for MockDevice {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn is_open(&self) -> bool {
        self.lock().open
    }

    async fn open(&mut self) -> Result<(), UsbError> {
        let mut state = self.lock();
        state.calls.push(MockCall::Open);
        if let Some(err) = state.fail_open.clone() {
            return Err(err);
        }
        state.open = true;
        Ok(())
    }

    fn active_configuration(&self) -> Option<u8> {
        self.lock().configuration
    }

    async fn select_configuration(&mut self, value: u8) -> Result<(), UsbError> {
        let mut state = self.lock();
        state.calls.push(MockCall::SelectConfiguration(value));
        if !state.open {
            return Err(UsbError::NotOpen);
        }
        state.configuration = Some(value);
        Ok(())
    }

    async fn claim_interface(&mut self, interface: u8) -> Result<(), UsbError> {
        let mut state = self.lock();
        state.calls.push(MockCall::ClaimInterface(interface));
        if !state.open {
            return Err(UsbError::NotOpen);
        }
        if interface != state.interface {
            return Err(UsbError::NotFound);
        }
        if let Some(err) = state.fail_claim.clone() {
            return Err(err);
        }
        state.claimed = true;
        Ok(())
    }

    async fn release_interface(&mut self, interface: u8) -> Result<(), UsbError> {
        let mut state = self.lock();
        state.calls.push(MockCall::ReleaseInterface(interface));
        if let Some(err) = state.fail_release.clone() {
            return Err(err);
        }
        state.claimed = false;
        Ok(())
    }

    fn endpoints(&self, interface: u8) -> Result<Vec<EndpointDescriptor>, UsbError> {
        let state = self.lock();
        if interface != state.interface {
            return Err(UsbError::NotFound);
        }
        Ok(state.endpoints.clone())
    }

    async fn transfer_out(&mut self, address: u8, data: &[u8]) -> Result<usize, UsbError> {
        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            // A closed gate lets everything through.
            if let Ok(permit) = gate.permits.acquire().await {
                permit.forget();
            }
        }

        let mut state = self.lock();
        state.calls.push(MockCall::TransferOut {
            address,
            len: data.len(),
        });
        if !state.open {
            return Err(UsbError::NotOpen);
        }
        if !state.claimed {
            return Err(UsbError::other("bulk transfer", "interface not claimed"));
        }

        let index = state.transfers;
        state.transfers += 1;
        if state.fail_transfer_at.as_ref().is_some_and(|(at, _)| *at == index) {
            if let Some((_, err)) = state.fail_transfer_at.take() {
                return Err(err);
            }
        }

        let accepted = state.max_transfer.map_or(data.len(), |limit| limit.min(data.len()));
        state.written.extend_from_slice(&data[..accepted]);
        state.transfer_sizes.push(accepted);
        Ok(accepted)
    }

    async fn close(&mut self) -> Result<(), UsbError> {
        let mut state = self.lock();
        state.calls.push(MockCall::Close);
        state.open = false;
        state.claimed = false;
        Ok(())
    }
}

/// Host listing a fixed set of mock devices.
#[derive(Debug, Clone, Default)]
pub struct MockHost {
    devices: Vec<MockDevice>,
}

impl MockHost {
    pub fn new(devices: Vec<MockDevice>) -> Self {
        Self { devices }
    }
}

#[async_trait]
impl UsbHost for MockHost {
    type Device = MockDevice;

    async fn devices(&self) -> Result<Vec<MockDevice>, UsbError> {
        Ok(self.devices.clone())
    }
}
