//! # Printer Configuration
//!
//! Everything the driver needs to know about one printer: line width,
//! character set, which USB device and interface to use, and how large the
//! bulk transfers may be.
//!
//! ## Presets
//!
//! | Preset | Paper | Columns |
//! |--------|-------|---------|
//! | [`PrinterConfig::pos58`] | 58mm | 32 |
//! | [`PrinterConfig::pos80`] | 80mm | 48 |
//!
//! ## JSON
//!
//! Every field is optional; missing fields take the 58mm defaults.
//!
//! ```
//! use recibo::printer::PrinterConfig;
//!
//! let config = PrinterConfig::from_json(r#"{ "columns": 48, "charset": "pc437" }"#).unwrap();
//! assert_eq!(config.columns, 48);
//! assert_eq!(config.chunk_size, 4096);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::encoder::{DEFAULT_COLUMNS, EncoderConfig};
use crate::error::ConfigError;
use crate::protocol::charset::{Charset, UnmappedPolicy};
use crate::transport::{DeviceFilter, SessionOptions};

/// Default size of one bulk write.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterConfig {
    /// Display name, only used in logs.
    pub name: String,

    /// Characters per line.
    pub columns: u16,

    pub charset: Charset,

    /// What to do with characters the charset cannot print.
    pub unmapped: UnmappedPolicy,

    /// Which device to pick when connecting.
    pub filter: DeviceFilter,

    /// Interface and configuration to use on the device.
    pub session: SessionOptions,

    /// Largest single bulk write, in bytes.
    pub chunk_size: usize,

    /// Per-transfer timeout in milliseconds; 0 waits forever.
    pub transfer_timeout_ms: u64,
}

impl PrinterConfig {
    /// Generic 58mm ESC/POS printer.
    pub fn pos58() -> Self {
        Self {
            name: "POS-58".into(),
            columns: DEFAULT_COLUMNS,
            charset: Charset::Pc852,
            unmapped: UnmappedPolicy::Replace,
            filter: DeviceFilter::printers(),
            session: SessionOptions::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            transfer_timeout_ms: 0,
        }
    }

    /// Generic 80mm ESC/POS printer.
    pub fn pos80() -> Self {
        Self {
            name: "POS-80".into(),
            columns: 48,
            ..Self::pos58()
        }
    }

    /// Look up a preset by name.
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "pos58" | "pos-58" | "58mm" => Some(Self::pos58()),
            "pos80" | "pos-80" | "80mm" => Some(Self::pos80()),
            _ => None,
        }
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns == 0 {
            return Err(ConfigError::Invalid("columns must be at least 1".into()));
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::Invalid("chunk_size must be at least 1".into()));
        }
        Ok(())
    }

    pub fn encoder_config(&self) -> EncoderConfig {
        EncoderConfig {
            columns: self.columns,
            charset: self.charset,
            unmapped: self.unmapped,
        }
    }

    pub fn transfer_timeout(&self) -> Duration {
        Duration::from_millis(self.transfer_timeout_ms)
    }
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self::pos58()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_match_58mm() {
        let config = PrinterConfig::default();
        assert_eq!(config.columns, 32);
        assert_eq!(config.charset, Charset::Pc852);
        assert_eq!(config.filter, DeviceFilter::printers());
        assert_eq!(config.session.interface, 0);
        assert_eq!(config.session.configuration, 1);
        assert_eq!(config.transfer_timeout(), Duration::ZERO);
    }

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(PrinterConfig::from_json("{}").unwrap(), PrinterConfig::default());
    }

    #[test]
    fn test_json_overrides() {
        let config = PrinterConfig::from_json(
            r#"{
                "name": "Counter",
                "columns": 48,
                "charset": "ascii",
                "unmapped": "strict",
                "filter": { "vendor_id": 1046 },
                "session": { "interface": 1 },
                "chunk_size": 512
            }"#,
        )
        .unwrap();

        assert_eq!(config.name, "Counter");
        assert_eq!(config.charset, Charset::Ascii);
        assert_eq!(config.unmapped, UnmappedPolicy::Strict);
        assert_eq!(config.filter.vendor_id, Some(0x0416));
        assert_eq!(config.filter.class_code, None);
        assert_eq!(config.session.interface, 1);
        assert_eq!(config.session.configuration, 1);
        assert_eq!(config.chunk_size, 512);
    }

    #[test]
    fn test_round_trip() {
        let config = PrinterConfig::pos80();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(PrinterConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_rejects_zero_columns() {
        let err = PrinterConfig::from_json(r#"{ "columns": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_zero_chunk_size() {
        let err = PrinterConfig::from_json(r#"{ "chunk_size": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_unknown_charset_is_parse_error() {
        let err = PrinterConfig::from_json(r#"{ "charset": "klingon" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_presets() {
        assert_eq!(PrinterConfig::preset("80mm").unwrap().columns, 48);
        assert_eq!(PrinterConfig::preset("POS58").unwrap().columns, 32);
        assert!(PrinterConfig::preset("tsp650").is_none());
    }

    #[test]
    fn test_encoder_config() {
        let encoder = PrinterConfig::pos80().encoder_config();
        assert_eq!(encoder.columns, 48);
        assert_eq!(encoder.charset, Charset::Pc852);
    }
}
