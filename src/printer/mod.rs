//! # Printer Module
//!
//! The high-level printing API.
//!
//! ## Modules
//!
//! - [`config`]: Per-printer settings, presets and JSON loading
//! - [`driver`]: [`Printer`], which encodes receipts and streams them

pub mod config;
pub mod driver;

pub use config::PrinterConfig;
pub use driver::Printer;
