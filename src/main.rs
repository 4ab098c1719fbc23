//! # Recibo CLI
//!
//! Command-line interface for USB receipt printing.
//!
//! ## Usage
//!
//! ```bash
//! # List sample receipts and attached printers
//! recibo list
//!
//! # Print the store receipt on the first USB printer
//! recibo print store
//!
//! # Print a receipt described in JSON on a specific device
//! recibo --vendor-id 0416 --product-id 5011 print --receipt receipt.json
//!
//! # Show the bytes that would be sent, without a printer
//! recibo --columns 48 preview test-page
//!
//! # Verbose USB logging
//! RUST_LOG=recibo=debug recibo print store
//! ```

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use recibo::{
    Encoder, Printer, PrinterConfig, Receipt, ReciboError, TransportSession,
    protocol::charset::{Charset, UnmappedPolicy},
    templates,
    transport::{Traced, UsbDevice, UsbHost, usb::RusbHost},
};

/// Recibo - USB receipt printer utility
#[derive(Parser, Debug)]
#[command(name = "recibo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    options: PrinterOptions,

    #[command(subcommand)]
    command: Commands,
}

/// Settings that override the configuration file.
#[derive(Args, Debug)]
struct PrinterOptions {
    /// JSON printer configuration
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Start from a built-in preset (pos58, pos80)
    #[arg(long, global = true)]
    preset: Option<String>,

    /// USB vendor id, hex (e.g. 0416)
    #[arg(long, global = true, value_parser = parse_hex_u16)]
    vendor_id: Option<u16>,

    /// USB product id, hex (e.g. 5011)
    #[arg(long, global = true, value_parser = parse_hex_u16)]
    product_id: Option<u16>,

    /// Interface number to claim
    #[arg(long, global = true)]
    interface: Option<u8>,

    /// Characters per line
    #[arg(long, global = true)]
    columns: Option<u16>,

    /// Character set (pc852, pc437, ascii)
    #[arg(long, global = true)]
    charset: Option<Charset>,

    /// Fail on characters the charset cannot print instead of printing '?'
    #[arg(long, global = true)]
    strict: bool,

    /// Largest single USB write in bytes
    #[arg(long, global = true)]
    chunk_size: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List sample receipts and attached printers
    List,

    /// Print a receipt
    Print {
        /// Sample receipt to print (default: store)
        sample: Option<String>,

        /// JSON instruction list to print instead of a sample
        #[arg(long, value_name = "FILE", conflicts_with = "sample")]
        receipt: Option<PathBuf>,
    },

    /// Encode a receipt without printing
    Preview {
        /// Sample receipt to encode (default: store)
        sample: Option<String>,

        /// JSON instruction list to encode instead of a sample
        #[arg(long, value_name = "FILE", conflicts_with = "sample")]
        receipt: Option<PathBuf>,

        /// Write the raw job to FILE instead of a hex dump on stdout
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), ReciboError> {
    let cli = Cli::parse();
    let config = load_config(&cli.options)?;
    debug!(?config, "configuration");

    match cli.command {
        Commands::List => list(&config).await,
        Commands::Print { sample, receipt } => {
            let receipt = load_receipt(sample.as_deref(), receipt.as_deref())?;
            print(&config, &receipt).await
        }
        Commands::Preview {
            sample,
            receipt,
            output,
        } => {
            let receipt = load_receipt(sample.as_deref(), receipt.as_deref())?;
            preview(&config, &receipt, output.as_deref())
        }
    }
}

fn load_config(options: &PrinterOptions) -> Result<PrinterConfig, ReciboError> {
    let mut config = match (&options.config, &options.preset) {
        (Some(path), _) => PrinterConfig::from_json_file(path)?,
        (None, Some(preset)) => PrinterConfig::preset(preset)
            .ok_or_else(|| ReciboError::Input(format!("Unknown preset '{}'", preset)))?,
        (None, None) => PrinterConfig::default(),
    };

    if let Some(vendor_id) = options.vendor_id {
        config.filter.vendor_id = Some(vendor_id);
    }
    if let Some(product_id) = options.product_id {
        config.filter.product_id = Some(product_id);
    }
    if let Some(interface) = options.interface {
        config.session.interface = interface;
    }
    if let Some(columns) = options.columns {
        config.columns = columns;
    }
    if let Some(charset) = options.charset {
        config.charset = charset;
    }
    if options.strict {
        config.unmapped = UnmappedPolicy::Strict;
    }
    if let Some(chunk_size) = options.chunk_size {
        config.chunk_size = chunk_size;
    }

    config.validate()?;
    Ok(config)
}

fn load_receipt(sample: Option<&str>, file: Option<&Path>) -> Result<Receipt, ReciboError> {
    if let Some(path) = file {
        let json = std::fs::read_to_string(path)?;
        return Receipt::from_json(&json).map_err(|e| {
            ReciboError::Input(format!("Invalid receipt file {}: {}", path.display(), e))
        });
    }

    let name = sample.unwrap_or("store");
    templates::by_name(name).ok_or_else(|| {
        ReciboError::Input(format!(
            "Unknown sample '{}'. Run `recibo list` to see available samples.",
            name
        ))
    })
}

async fn list(config: &PrinterConfig) -> Result<(), ReciboError> {
    println!("Available samples:");
    for name in templates::list_samples() {
        println!("  {}", name);
    }

    println!("\nMatching printers:");
    let host = RusbHost::new()?;
    let mut found = 0;
    for mut device in host.devices().await? {
        if !config.filter.matches(device.info()) {
            continue;
        }
        // Strings are only readable once the device is open.
        if device.open().await.is_ok() {
            if let Err(err) = device.close().await {
                debug!(%err, "closing device after reading strings");
            }
        }
        println!("  {}", device.info());
        found += 1;
    }
    if found == 0 {
        println!("  (none)");
    }
    Ok(())
}

async fn print(config: &PrinterConfig, receipt: &Receipt) -> Result<(), ReciboError> {
    let host = RusbHost::new()?.with_transfer_timeout(config.transfer_timeout());
    let device = host.request_device(&config.filter).await?;
    info!(printer = %config.name, device = %device.info(), "connecting");

    let mut session = TransportSession::new(Traced::new(device), config.session);
    session.open().await?;

    let printer = Printer::new(session, config);
    let result = printer.print(receipt).await;
    printer.disconnect().await;
    result?;

    println!("Printed successfully!");
    Ok(())
}

fn preview(
    config: &PrinterConfig,
    receipt: &Receipt,
    output: Option<&Path>,
) -> Result<(), ReciboError> {
    let encoder = Encoder::new(config.encoder_config());
    let mut job = encoder.job_header();
    job.extend_from_slice(encoder.encode(receipt)?.as_bytes());

    match output {
        Some(path) => {
            std::fs::write(path, &job)?;
            println!("Wrote {} bytes to {}", job.len(), path.display());
        }
        None => {
            if job.is_empty() {
                warn!("receipt encodes to nothing");
            }
            print!("{}", hex_dump(&job));
        }
    }
    Ok(())
}

/// Offset, hex bytes and printable ASCII, 16 bytes per row.
fn hex_dump(data: &[u8]) -> String {
    let mut out = String::new();
    for (row, chunk) in data.chunks(16).enumerate() {
        let hex: Vec<String> = chunk.iter().map(|b| format!("{:02x}", b)).collect();
        let ascii: String = chunk
            .iter()
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
            .collect();
        out.push_str(&format!("{:08x}  {:<47}  |{}|\n", row * 16, hex.join(" "), ascii));
    }
    out
}

fn parse_hex_u16(s: &str) -> Result<u16, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid hex id '{}': {}", s, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_u16() {
        assert_eq!(parse_hex_u16("0416"), Ok(0x0416));
        assert_eq!(parse_hex_u16("0x5011"), Ok(0x5011));
        assert!(parse_hex_u16("zz").is_err());
        assert!(parse_hex_u16("10000").is_err());
    }

    #[test]
    fn test_hex_dump() {
        assert_eq!(
            hex_dump(b"\x1b@Hi"),
            format!("00000000  {:<47}  |.@Hi|\n", "1b 40 48 69")
        );
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::try_parse_from([
            "recibo",
            "--columns",
            "48",
            "--charset",
            "pc437",
            "--strict",
            "--vendor-id",
            "0x0416",
            "preview",
            "test-page",
        ])
        .unwrap();
        let config = load_config(&cli.options).unwrap();
        assert_eq!(config.columns, 48);
        assert_eq!(config.charset, Charset::Pc437);
        assert_eq!(config.unmapped, UnmappedPolicy::Strict);
        assert_eq!(config.filter.vendor_id, Some(0x0416));
        assert_eq!(config.filter.class_code, Some(0x07));
    }

    #[test]
    fn test_zero_columns_rejected() {
        let cli = Cli::try_parse_from(["recibo", "--columns", "0", "list"]).unwrap();
        assert!(matches!(
            load_config(&cli.options),
            Err(ReciboError::Config(_))
        ));
    }

    #[test]
    fn test_unknown_sample() {
        assert!(matches!(
            load_receipt(Some("ripple"), None),
            Err(ReciboError::Input(_))
        ));
        assert!(load_receipt(None, None).is_ok());
    }
}
