use tokio::sync::mpsc;
use tracing::info;

use hatchery_ledsync::pins::{DEFAULT_PINS, LedBank, gpio};
use hatchery_ledsync::watch::{self, WatchConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hatchery_ledsync=debug".into()),
        )
        .init();

    // Config
    let url = std::env::var("HATCHERY_LEDSYNC_URL")
        .unwrap_or_else(|_| "ws://127.0.0.1:8090/listen".into());
    let pin_numbers = match std::env::var("HATCHERY_GPIO_PINS") {
        Ok(raw) => raw
            .split(',')
            .map(|p| p.trim().parse::<u8>())
            .collect::<Result<Vec<_>, _>>()?,
        Err(_) => DEFAULT_PINS.to_vec(),
    };
    let reconnect_interval: u64 = std::env::var("HATCHERY_RECONNECT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(5);

    // Claim the outputs before subscribing
    let outputs = gpio::open_outputs(&pin_numbers)?;
    let mut bank = LedBank::new(outputs);
    info!("Driving {} GPIO outputs: {:?}", pin_numbers.len(), pin_numbers);

    let (tx, mut rx) = mpsc::channel(16);
    tokio::spawn(watch::run(
        WatchConfig {
            url,
            reconnect_interval,
        },
        tx,
    ));

    // Single dispatch loop: each snapshot is applied to completion
    // before the next one is taken off the channel.
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            maybe = rx.recv() => match maybe {
                Some(snapshot) => {
                    info!("Updating LEDs: {:?}, All On: {}", snapshot.leds, snapshot.all_on);
                    bank.apply(&snapshot)?;
                    info!("LEDs updated successfully.");
                }
                None => break,
            },
        }
    }

    bank.shutdown()?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
