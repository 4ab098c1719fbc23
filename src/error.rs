//! # Error Types
//!
//! This module defines the error taxonomy used throughout the recibo library.
//!
//! ```text
//! UsbError ──► TransportError ──┐
//!                               ├──► DriverError ──► ReciboError (CLI)
//!              EncodingError ───┘
//! ```
//!
//! Host backends report [`UsbError`]. The transport session wraps those into
//! [`TransportError`], and the printer driver maps every failure into a
//! [`DriverError`] variant. Nothing is swallowed on the way up.

use thiserror::Error;

/// Errors reported by a host USB backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsbError {
    /// No device matched the request.
    #[error("no matching USB device found")]
    NotFound,

    /// The device went away (unplugged or reset).
    #[error("USB device disconnected")]
    Disconnected,

    /// The host refused access to the device or interface.
    #[error("access to USB device denied")]
    AccessDenied,

    /// The interface is claimed by someone else.
    #[error("USB interface is busy")]
    Busy,

    /// A transfer did not complete in time.
    #[error("USB transfer timed out")]
    Timeout,

    /// The operation needs an open device.
    #[error("USB device is not open")]
    NotOpen,

    /// Anything else, with the operation that failed.
    #[error("{operation} failed: {message}")]
    Other {
        operation: &'static str,
        message: String,
    },
}

impl UsbError {
    pub fn other(operation: &'static str, message: impl Into<String>) -> Self {
        UsbError::Other {
            operation,
            message: message.into(),
        }
    }
}

/// Errors surfaced by a [`TransportSession`](crate::transport::TransportSession).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Opening, configuring or claiming the device failed.
    #[error("failed to open printer: {0}")]
    OpenFailed(#[source] UsbError),

    /// The claimed interface has no bulk OUT endpoint.
    #[error("interface {interface} has no bulk OUT endpoint")]
    NoEndpoint { interface: u8 },

    /// A bulk transfer failed; the session is no longer usable.
    #[error("bulk transfer failed: {0}")]
    TransferFailed(#[source] UsbError),

    /// The session is not ready (never opened, closed, or unplugged).
    #[error("printer is not connected")]
    NotConnected,
}

/// Errors raised while encoding a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// A character has no representation in the configured character set.
    #[error("character {ch:?} (U+{code:04X}) is not supported by {charset}")]
    UnsupportedCharacter {
        ch: char,
        code: u32,
        charset: &'static str,
    },
}

/// Errors returned by [`Printer::print`](crate::printer::Printer::print).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// The printer could not be reached, even after one reconnect attempt.
    #[error("printer is not connected")]
    NotConnected,

    /// Another print job is still in flight on this driver.
    #[error("printer is busy with another job")]
    Busy,

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

/// Errors loading or validating a printer configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level error for the command-line front end.
#[derive(Debug, Error)]
pub enum ReciboError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Usb(#[from] UsbError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// Unknown sample name, bad receipt file, etc.
    #[error("{0}")]
    Input(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
