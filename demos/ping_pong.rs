//! Two components bouncing events until a round limit is reached.
//!
//! Run with: `RUST_LOG=debug cargo run --example ping_pong --features logging`

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use circuits::{Component, Config, Event, HandlerError, LogWriter};
use tracing_subscriber::EnvFilter;

const ROUNDS: usize = 3;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let root = Component::new(Config {
        queue_capacity: 16,
        workers: 1,
    });
    let pinger = Component::default();
    let ponger = Component::default();

    let weak = root.downgrade();
    pinger.on("game", "ping", move |_ev: Event| {
        let weak = weak.clone();
        async move {
            let Some(root) = weak.upgrade() else {
                return Ok(());
            };
            root.fire(Event::new("game", "pong").with_notify_complete(true))
                .await
                .map_err(|e| HandlerError::fail(e.to_string()))
        }
    });

    let rounds = Arc::new(AtomicUsize::new(0));
    let weak = root.downgrade();
    ponger.on("game", "pong_complete", move |_ev: Event| {
        let weak = weak.clone();
        let rounds = Arc::clone(&rounds);
        async move {
            let Some(root) = weak.upgrade() else {
                return Ok(());
            };
            let next = if rounds.fetch_add(1, Ordering::SeqCst) + 1 >= ROUNDS {
                Event::exit()
            } else {
                Event::new("game", "ping")
            };
            root.fire(next)
                .await
                .map_err(|e| HandlerError::fail(e.to_string()))
        }
    });

    root.register_handler(LogWriter::binding());
    root.register_component(&pinger)?;
    root.register_component(&ponger)?;

    root.fire(Event::new("game", "ping")).await?;
    root.start().await;
    Ok(())
}
