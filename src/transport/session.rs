//! # Transport Session
//!
//! Owns one [`UsbDevice`], its interface claim and the bulk OUT endpoint.
//!
//! ## State Machine
//!
//! ```text
//!             open()                 ok
//! Unopened ──────────► Opening ─────────────► Ready ──┐ write() ok
//!    ▲                    │ error                │ ▲  │
//!    │  release + close   │                      │ └──┘
//!    └────────────────────┘                      │
//!    ▲        transfer error / link lost         │
//!    └───────────────────────────────────────────┘
//!
//! Ready / Opening / Unopened ── close() ──► Closing ──► Closed
//! ```
//!
//! Cleanup during a failed open, a failed transfer or `close()` is
//! best-effort: failures are logged and the triggering error is the one
//! reported.
//!
//! The device is kept after a failure so the session can be reopened
//! against the last-known device. A `Closed` session is final.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{DeviceEndpoint, DeviceFilter, DeviceInfo, UsbDevice, UsbHost};
use crate::error::{TransportError, UsbError};

/// Lifecycle of a [`TransportSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unopened,
    Opening,
    Ready,
    Closing,
    Closed,
}

/// Which configuration and interface to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    /// Interface number to claim.
    pub interface: u8,
    /// Configuration value selected when the device has none active.
    pub configuration: u8,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            interface: 0,
            configuration: 1,
        }
    }
}

/// Reports an external disconnect (device unplugged) to a session.
///
/// Clone it out of the session and call [`notify`](Self::notify) from any
/// thread, e.g. the caller's own hotplug watcher. Backends do not call it;
/// without a notification an unplug surfaces as a failed transfer.
#[derive(Debug, Clone, Default)]
pub struct DisconnectHandle {
    lost: Arc<AtomicBool>,
}

impl DisconnectHandle {
    pub fn notify(&self) {
        self.lost.store(true, Ordering::SeqCst);
    }

    fn is_lost(&self) -> bool {
        self.lost.load(Ordering::SeqCst)
    }

    fn take(&self) -> bool {
        self.lost.swap(false, Ordering::SeqCst)
    }
}

/// An exclusive session on one USB printer.
pub struct TransportSession<D: UsbDevice> {
    device: D,
    options: SessionOptions,
    state: SessionState,
    endpoint: Option<DeviceEndpoint>,
    claimed: bool,
    link: DisconnectHandle,
}

impl<D: UsbDevice> TransportSession<D> {
    /// Wrap a device without touching it.
    pub fn new(device: D, options: SessionOptions) -> Self {
        Self {
            device,
            options,
            state: SessionState::Unopened,
            endpoint: None,
            claimed: false,
            link: DisconnectHandle::default(),
        }
    }

    /// Request the first device matching `filter` and open a session on it.
    pub async fn connect<H>(
        host: &H,
        filter: &DeviceFilter,
        options: SessionOptions,
    ) -> Result<Self, TransportError>
    where
        H: UsbHost<Device = D>,
    {
        let device = host
            .request_device(filter)
            .await
            .map_err(TransportError::OpenFailed)?;
        let mut session = Self::new(device, options);
        session.open().await?;
        Ok(session)
    }

    /// Current state. A reported disconnect shows up as `Unopened`
    /// immediately, before the session itself has reacted to it.
    pub fn state(&self) -> SessionState {
        if self.state == SessionState::Ready && self.link.is_lost() {
            SessionState::Unopened
        } else {
            self.state
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == SessionState::Ready
    }

    /// The claimed endpoint, while `Ready`.
    pub fn endpoint(&self) -> Option<DeviceEndpoint> {
        if self.is_ready() { self.endpoint } else { None }
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_info(&self) -> &DeviceInfo {
        self.device.info()
    }

    pub fn disconnect_handle(&self) -> DisconnectHandle {
        self.link.clone()
    }

    pub fn into_device(self) -> D {
        self.device
    }

    /// Open the device, claim the interface and find the bulk OUT endpoint.
    ///
    /// Returns the current endpoint when already `Ready`, and
    /// `NotConnected` for a closed session.
    pub async fn open(&mut self) -> Result<DeviceEndpoint, TransportError> {
        self.observe_disconnect();

        match self.state {
            SessionState::Ready => return self.endpoint.ok_or(TransportError::NotConnected),
            SessionState::Closing | SessionState::Closed => {
                return Err(TransportError::NotConnected);
            }
            SessionState::Unopened | SessionState::Opening => {}
        }

        // A notification that arrives while unopened refers to the old link.
        self.link.take();
        self.transition(SessionState::Opening);

        match self.claim().await {
            Ok(endpoint) => {
                self.endpoint = Some(endpoint);
                self.transition(SessionState::Ready);
                info!(
                    device = %self.device.info(),
                    interface = endpoint.interface,
                    endpoint = endpoint.address,
                    "printer connected"
                );
                Ok(endpoint)
            }
            Err(err) => {
                warn!(device = %self.device.info(), %err, "failed to open printer");
                self.release().await;
                self.transition(SessionState::Unopened);
                Err(err)
            }
        }
    }

    /// Send `bytes` to the bulk OUT endpoint.
    ///
    /// Short transfers are continued until everything is accepted. Any
    /// failure drops the session back to `Unopened`.
    pub async fn write(&mut self, bytes: &[u8]) -> Result<usize, TransportError> {
        if self.observe_disconnect() || self.state != SessionState::Ready {
            return Err(TransportError::NotConnected);
        }
        let endpoint = self.endpoint.ok_or(TransportError::NotConnected)?;

        let mut written = 0;
        while written < bytes.len() {
            let remaining = &bytes[written..];
            match self.device.transfer_out(endpoint.address, remaining).await {
                Ok(0) => {
                    let err = UsbError::other("bulk transfer", "device accepted no data");
                    return Err(self.fail_transfer(err).await);
                }
                Ok(n) => {
                    if n < remaining.len() {
                        debug!(accepted = n, requested = remaining.len(), "short bulk transfer");
                    }
                    written += n.min(remaining.len());
                }
                Err(err) => return Err(self.fail_transfer(err).await),
            }
        }
        Ok(written)
    }

    /// Release the interface and close the device. Never fails; the session
    /// ends up `Closed` either way.
    pub async fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.observe_disconnect();
        self.transition(SessionState::Closing);
        self.release().await;
        self.transition(SessionState::Closed);
    }

    async fn claim(&mut self) -> Result<DeviceEndpoint, TransportError> {
        let interface = self.options.interface;

        if self.device.is_open() {
            // Stale handle left behind by a lost link.
            if let Err(err) = self.device.close().await {
                debug!(%err, "closing stale handle failed");
            }
        }

        self.device
            .open()
            .await
            .map_err(TransportError::OpenFailed)?;

        if self.device.active_configuration().is_none() {
            self.device
                .select_configuration(self.options.configuration)
                .await
                .map_err(TransportError::OpenFailed)?;
        }

        self.device
            .claim_interface(interface)
            .await
            .map_err(TransportError::OpenFailed)?;
        self.claimed = true;

        let endpoints = self
            .device
            .endpoints(interface)
            .map_err(TransportError::OpenFailed)?;

        let Some(out) = endpoints.iter().find(|ep| ep.is_bulk_out()) else {
            debug!(interface, ?endpoints, "available endpoints");
            return Err(TransportError::NoEndpoint { interface });
        };

        Ok(DeviceEndpoint {
            interface,
            address: out.address,
            max_packet_size: out.max_packet_size,
        })
    }

    async fn fail_transfer(&mut self, err: UsbError) -> TransportError {
        warn!(device = %self.device.info(), %err, "bulk transfer failed; session invalidated");
        self.release().await;
        self.transition(SessionState::Unopened);
        TransportError::TransferFailed(err)
    }

    /// Best-effort release of the interface and close of the device.
    async fn release(&mut self) {
        self.endpoint = None;

        if self.claimed {
            self.claimed = false;
            let interface = self.options.interface;
            match self.device.release_interface(interface).await {
                Ok(()) => debug!(interface, "interface released"),
                Err(err) => warn!(interface, %err, "error releasing interface during cleanup"),
            }
        }

        if self.device.is_open() {
            match self.device.close().await {
                Ok(()) => debug!("device closed"),
                Err(err) => warn!(%err, "error closing device during cleanup"),
            }
        }
    }

    /// Fold a pending disconnect notification into the state. The device is
    /// gone, so nothing is sent to it.
    fn observe_disconnect(&mut self) -> bool {
        if self.state == SessionState::Ready && self.link.take() {
            warn!(device = %self.device.info(), "printer disconnected");
            self.endpoint = None;
            self.claimed = false;
            self.transition(SessionState::Unopened);
            return true;
        }
        false
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            debug!(from = ?self.state, to = ?next, "session state");
            self.state = next;
        }
    }
}
