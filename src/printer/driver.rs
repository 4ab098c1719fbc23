//! # Printer Driver
//!
//! [`Printer`] ties an [`Encoder`] to a [`TransportSession`]: it compiles a
//! receipt, makes sure the session is usable, and streams the job.
//!
//! ```text
//! print(receipt)
//!   │
//!   ├─ session held by another print? ──► Busy
//!   ├─ encode ─────────────────────────► Encoding error
//!   ├─ not Ready? reopen once ─────────► NotConnected
//!   └─ write header + body in chunks ──► Transport error (session now Unopened)
//! ```
//!
//! Only one job runs at a time. A second `print` while one is in flight
//! returns [`DriverError::Busy`] right away instead of queueing.

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::PrinterConfig;
use crate::encoder::Encoder;
use crate::error::{DriverError, TransportError};
use crate::receipt::Receipt;
use crate::transport::{DeviceInfo, SessionState, TransportSession, UsbDevice};

/// A receipt printer reachable through one transport session.
pub struct Printer<D: UsbDevice> {
    session: Mutex<TransportSession<D>>,
    encoder: Encoder,
    chunk_size: usize,
}

impl<D: UsbDevice> Printer<D> {
    pub fn new(session: TransportSession<D>, config: &PrinterConfig) -> Self {
        Self {
            session: Mutex::new(session),
            encoder: Encoder::new(config.encoder_config()),
            chunk_size: config.chunk_size.max(1),
        }
    }

    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Encode `receipt` and send it to the printer.
    pub async fn print(&self, receipt: &Receipt) -> Result<(), DriverError> {
        let mut session = self.session.try_lock().map_err(|_| DriverError::Busy)?;

        let body = self.encoder.encode(receipt)?;
        Self::ensure_ready(&mut session).await?;

        let mut job = self.encoder.job_header();
        job.extend_from_slice(body.as_bytes());

        let chunks = job.len().div_ceil(self.chunk_size);
        for (index, chunk) in job.chunks(self.chunk_size).enumerate() {
            debug!(chunk = index + 1, of = chunks, len = chunk.len(), "writing");
            if let Err(err) = session.write(chunk).await {
                warn!(chunk = index + 1, of = chunks, %err, "print aborted");
                return Err(match err {
                    TransportError::NotConnected => DriverError::NotConnected,
                    other => DriverError::Transport(other),
                });
            }
        }

        info!(
            bytes = job.len(),
            instructions = receipt.len(),
            "receipt printed"
        );
        Ok(())
    }

    /// Whether the session is ready to print. Waits for a running job.
    pub async fn is_connected(&self) -> bool {
        self.session.lock().await.state() == SessionState::Ready
    }

    /// Identity of the current device. Waits for a running job.
    pub async fn device_info(&self) -> DeviceInfo {
        self.session.lock().await.device_info().clone()
    }

    /// Close the current session and use `session` from now on.
    pub async fn replace_session(&self, session: TransportSession<D>) -> Result<(), DriverError> {
        let mut current = self.session.try_lock().map_err(|_| DriverError::Busy)?;
        current.close().await;
        info!(device = %session.device_info(), "printer replaced");
        *current = session;
        Ok(())
    }

    /// Close the session and give up the device.
    pub async fn disconnect(self) {
        let mut session = self.session.into_inner();
        session.close().await;
    }

    async fn ensure_ready(session: &mut TransportSession<D>) -> Result<(), DriverError> {
        match session.state() {
            SessionState::Ready => Ok(()),
            SessionState::Closing | SessionState::Closed => Err(DriverError::NotConnected),
            SessionState::Unopened | SessionState::Opening => {
                info!(device = %session.device_info(), "reconnecting");
                match session.open().await {
                    Ok(_) => Ok(()),
                    Err(err) => {
                        warn!(%err, "reconnect failed");
                        Err(DriverError::NotConnected)
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UsbError;
    use crate::transport::SessionOptions;
    use crate::transport::mock::MockDevice;
    use pretty_assertions::assert_eq;

    fn printer(device: &MockDevice, config: &PrinterConfig) -> Printer<MockDevice> {
        Printer::new(
            TransportSession::new(device.clone(), SessionOptions::default()),
            config,
        )
    }

    #[tokio::test]
    async fn test_print_opens_unopened_session() {
        let device = MockDevice::printer();
        let printer = printer(&device, &PrinterConfig::default());

        printer
            .print(&Receipt::builder().println("hi").build())
            .await
            .unwrap();

        assert!(printer.is_connected().await);
        assert_eq!(device.written(), b"\x1B@\x1Bt\x12hi\n");
    }

    #[tokio::test]
    async fn test_print_chunks_job() {
        let device = MockDevice::printer();
        let config = PrinterConfig {
            chunk_size: 4,
            ..Default::default()
        };
        let printer = printer(&device, &config);

        printer
            .print(&Receipt::builder().println("abcd").build())
            .await
            .unwrap();

        // 5 header bytes + "abcd\n"
        assert_eq!(device.transfer_sizes(), vec![4, 4, 2]);
    }

    #[tokio::test]
    async fn test_encoding_error_skips_transport() {
        let device = MockDevice::printer();
        let config = PrinterConfig {
            charset: crate::protocol::charset::Charset::Ascii,
            unmapped: crate::protocol::charset::UnmappedPolicy::Strict,
            ..Default::default()
        };
        let printer = printer(&device, &config);

        let err = printer
            .print(&Receipt::builder().println("Łódź").build())
            .await
            .unwrap_err();

        assert!(matches!(err, DriverError::Encoding(_)));
        assert!(device.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_reconnect_is_not_connected() {
        let device = MockDevice::printer().fail_open(UsbError::Disconnected);
        let printer = printer(&device, &PrinterConfig::default());

        let err = printer
            .print(&Receipt::builder().println("x").build())
            .await
            .unwrap_err();

        assert_eq!(err, DriverError::NotConnected);
        assert!(device.written().is_empty());
    }

    #[tokio::test]
    async fn test_transfer_failure_aborts() {
        let device = MockDevice::printer().fail_transfer_at(1, UsbError::Timeout);
        let config = PrinterConfig {
            chunk_size: 4,
            ..Default::default()
        };
        let printer = printer(&device, &config);

        let err = printer
            .print(&Receipt::builder().println("abcdefgh").build())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            DriverError::Transport(TransportError::TransferFailed(UsbError::Timeout))
        );
        assert_eq!(device.transfer_sizes(), vec![4]);
        assert!(!printer.is_connected().await);
    }

    #[tokio::test]
    async fn test_disconnect_closes() {
        let device = MockDevice::printer();
        let printer = printer(&device, &PrinterConfig::default());
        printer
            .print(&Receipt::builder().println("x").build())
            .await
            .unwrap();

        printer.disconnect().await;

        assert!(!device.is_open());
        assert!(!device.is_claimed());
    }

    #[tokio::test]
    async fn test_replace_session_closes_old() {
        let old = MockDevice::printer();
        let new = MockDevice::printer();
        let printer = printer(&old, &PrinterConfig::default());
        printer
            .print(&Receipt::builder().println("a").build())
            .await
            .unwrap();

        printer
            .replace_session(TransportSession::new(new.clone(), SessionOptions::default()))
            .await
            .unwrap();
        printer
            .print(&Receipt::builder().println("b").build())
            .await
            .unwrap();

        assert!(!old.is_open());
        assert!(new.written().ends_with(b"b\n"));
    }
}
