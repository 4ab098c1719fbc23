//! # ESC/POS Protocol Implementation
//!
//! Low-level command builders for the ESC/POS dialect spoken by generic USB
//! thermal receipt printers.
//!
//! ## Module Structure
//!
//! - [`commands`]: Printer control (init, feed, cut)
//! - [`text`]: Text styling (alignment, emphasis, code table)
//! - [`charset`]: Unicode to single-byte code table conversion
//!
//! ## Usage Example
//!
//! ```
//! use recibo::protocol::{commands, text};
//!
//! let mut data = Vec::new();
//! data.extend(commands::init());
//! data.extend(text::align(text::Alignment::Center));
//! data.extend(text::bold(true));
//! data.extend(b"RECEIPT\n");
//! data.extend(text::bold(false));
//! data.extend(commands::feed(3));
//! data.extend(commands::cut(false));
//! ```

pub mod charset;
pub mod commands;
pub mod text;
