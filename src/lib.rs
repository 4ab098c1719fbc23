//! # Recibo - USB Receipt Printer Driver
//!
//! Recibo prints receipts on generic ESC/POS thermal printers attached over
//! USB. It provides:
//!
//! - **Receipt builder**: a chainable API producing an immutable instruction list
//! - **Encoder**: receipt to ESC/POS bytes, with code page conversion and
//!   fixed-width layout
//! - **Transport**: the USB printer-class session (configure, claim, bulk OUT)
//! - **Driver**: one-job-at-a-time printing with automatic reconnect
//!
//! ## Quick Start
//!
//! ```no_run
//! use recibo::{
//!     printer::{Printer, PrinterConfig},
//!     receipt::Receipt,
//!     transport::{TransportSession, usb::RusbHost},
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PrinterConfig::pos58();
//! let host = RusbHost::new()?;
//!
//! // Find the first printer-class device and claim it
//! let session = TransportSession::connect(&host, &config.filter, config.session).await?;
//! let printer = Printer::new(session, &config);
//!
//! let receipt = Receipt::builder()
//!     .align_center()
//!     .println("Store Name")
//!     .draw_line()
//!     .left_right("Total", "12.50")
//!     .new_line()
//!     .build();
//!
//! printer.print(&receipt).await?;
//! printer.disconnect().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`receipt`] | Print instructions and the receipt builder |
//! | [`encoder`] | Receipt to ESC/POS compiler |
//! | [`protocol`] | ESC/POS command builders and code pages |
//! | [`transport`] | USB host traits, session state machine, backends |
//! | [`printer`] | Printer configuration and driver |
//! | [`templates`] | Sample receipts |
//! | [`error`] | Error types |

pub mod encoder;
pub mod error;
pub mod printer;
pub mod protocol;
pub mod receipt;
pub mod templates;
pub mod transport;

// Re-exports for convenience
pub use encoder::{Encoder, EncoderConfig};
pub use error::{DriverError, ReciboError, TransportError};
pub use printer::{Printer, PrinterConfig};
pub use receipt::Receipt;
pub use transport::TransportSession;
