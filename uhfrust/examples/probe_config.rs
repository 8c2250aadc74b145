//! Probe an undocumented module for its address and checksum policy, then
//! run one power round-trip under the winning configuration.

use uhfrust::probe::{DEFAULT_ADDRESSES, DEFAULT_POLICIES};
use uhfrust::{probe_config, PowerExchange, Reader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let port = std::env::var("RFID_PORT").unwrap_or_else(|_| "/dev/ttyUSB0".to_string());

    let mut reader = Reader::new(&port, 115_200);
    reader.connect().await?;

    match probe_config(&mut reader, &DEFAULT_ADDRESSES, &DEFAULT_POLICIES).await? {
        Some(found) => {
            println!(
                "Device answers at addr=0x{:02X} policy={} (currently {:.2} dBm)",
                found.address, found.policy, found.power_dbm
            );

            // The reader is already on the winning configuration
            let mut exchange = PowerExchange::new(&mut reader);
            let report = exchange.set_and_verify(26.0).await?;
            println!(
                "Set 26.00 dBm: {:.2} -> {:.2}",
                report.before, report.after
            );
        }
        None => println!("No configuration answered on {port}"),
    }

    reader.disconnect().await?;
    Ok(())
}
