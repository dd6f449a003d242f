use bluetti_rs::reader::ReaderConfig;
use bluetti_rs::recognizer::{self, RecognizerConfig};
use bluetti_rs::schema::catalogue;
use bluetti_rs::{init_logger, log_info, DeviceReader, ReaderError};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bluetti-cli")]
#[command(about = "CLI tool for Bluetti-style BLE MODBUS-RTU power stations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan for nearby devices and print their recognized model/protocol version.
    Scan {
        address: String,
        #[arg(short, long, default_value_t = 8)]
        encrypted_timeout: u64,
        #[arg(short, long, default_value_t = 3)]
        plain_timeout: u64,
    },
    /// Read every field a named model's schema declares.
    Read {
        address: String,
        #[arg(short, long, default_value = "AC300")]
        model: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), ReaderError> {
    init_logger();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan { address, encrypted_timeout, plain_timeout } => {
            let transport = connect(&address).await?;
            let config = RecognizerConfig {
                encrypted_timeout: std::time::Duration::from_secs(encrypted_timeout),
                plain_timeout: std::time::Duration::from_secs(plain_timeout),
            };
            let (_transport, result) = recognizer::recognize(transport, config).await;
            match result {
                Some(device) => log_info(&format!(
                    "{address}: {} ({:?}, encrypted={})",
                    device.device_type, device.iot_version, device.encrypted
                )),
                None => log_info(&format!("{address}: no response from any known schema")),
            }
        }
        Commands::Read { address, model } => {
            let transport = connect(&address).await?;
            let schema = catalogue::lookup(&model).unwrap_or_else(catalogue::base_device_v1);
            let mut reader = DeviceReader::new(schema, transport, ReaderConfig::default());
            match reader.read(None).await {
                Some(values) => {
                    for (name, value) in values {
                        log_info(&format!("{name}: {value:?}"));
                    }
                }
                None => log_info("read failed"),
            }
        }
    }

    Ok(())
}

#[cfg(feature = "btleplug-transport")]
async fn connect(address: &str) -> Result<Box<dyn bluetti_rs::Transport>, ReaderError> {
    use bluetti_rs::transport::btleplug_transport::BtleplugTransport;
    Ok(Box::new(BtleplugTransport::connect_to(address).await?))
}

#[cfg(not(feature = "btleplug-transport"))]
async fn connect(_address: &str) -> Result<Box<dyn bluetti_rs::Transport>, ReaderError> {
    Err(ReaderError::Other(
        "built without the btleplug-transport feature; rebuild with --features btleplug-transport".into(),
    ))
}

