//! Continuous multi-tag scanning: one inventory round per loop, printing
//! the deduplicated EPC set each time. Ctrl+C to stop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use uhfrust::Reader;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let port = std::env::var("RFID_PORT").unwrap_or_else(|_| "/dev/ttyUSB0".to_string());
    let baud: u32 = std::env::var("RFID_BAUD")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(115_200);

    println!("Scanning on {port} @ {baud} (Ctrl+C to stop)...");

    let mut reader = Reader::new(&port, baud);
    reader.connect().await?;

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        ctrl_c_to(stop);
    }

    reader
        .run_polling(
            Duration::from_millis(400),
            Duration::from_millis(200),
            &stop,
            |round, tags| {
                if tags.is_empty() {
                    println!("[Round {round}] no tags");
                } else {
                    let list: Vec<&str> = tags.iter().map(String::as_str).collect();
                    println!("[Round {round}] {} tag(s): {}", tags.len(), list.join(", "));
                }
            },
        )
        .await?;

    reader.disconnect().await?;
    println!("Port closed");
    Ok(())
}

fn ctrl_c_to(stop: Arc<AtomicBool>) {
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        stop.store(true, Ordering::Relaxed);
    });
}
