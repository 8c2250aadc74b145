//! Set transmit power to 26 dBm and read it back.

use uhfrust::{PowerExchange, Reader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let port = std::env::var("RFID_PORT").unwrap_or_else(|_| "/dev/ttyUSB0".to_string());
    let target: f64 = std::env::var("RFID_DBM")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(26.0);

    let mut reader = Reader::new(&port, 115_200);
    reader.connect().await?;

    let mut exchange = PowerExchange::new(&mut reader);
    let report = exchange.set_and_verify(target).await?;

    println!("Power before: {:.2} dBm", report.before);
    println!("Power after:  {:.2} dBm", report.after);
    println!(
        "Set to {:.2} dBm: {}",
        report.requested,
        if report.applied() { "applied" } else { "NOT applied" }
    );

    reader.disconnect().await?;
    Ok(())
}
