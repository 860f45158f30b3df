//! # Keyed backpressure demo
//!
//! Two tenants share one [`KeyedDispatcher`]. Tenant `bulk` floods its queue and
//! gets shed (lifo eviction plus staleness expiry), while tenant `interactive`
//! keeps completing on its own slot.
//!
//! Events are rendered by the built-in `LogWriter` and aggregated by a
//! `StatsRecorder`.
//!
//! ## Run
//! ```bash
//! RUST_LOG=queuevisor=debug cargo run --example keyed_backpressure --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use queuevisor::{
    DispatchError, DispatcherOptions, KeyedDispatcher, LogWriter, StatsRecorder, Subscribe,
};
use tracing_subscriber::EnvFilter;

const OPTIONS: &str = r#"
concurrency = 1
max_size = 4
max_age_ms = 300
order = "lifo"
"#;

async fn render(tenant: &str, n: u32) -> Result<String, std::io::Error> {
    tokio::time::sleep(Duration::from_millis(100)).await;
    Ok(format!("{tenant}#{n}"))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "queuevisor=debug".into()))
        .init();

    let stats = Arc::new(StatsRecorder::new());
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new()), stats.clone()];

    let opts = DispatcherOptions::from_toml_str(OPTIONS)?;
    let keyed = KeyedDispatcher::from_options(opts)?.with_subscribers(subs);

    let mut bulk = Vec::new();
    for n in 0..12 {
        bulk.push(keyed.submit("bulk", move || render("bulk", n)));
    }
    let mut interactive = Vec::new();
    for n in 0..3 {
        interactive.push(keyed.submit("interactive", move || render("interactive", n)));
    }

    for h in interactive {
        println!("interactive: {}", h.await?);
    }
    for h in bulk {
        match h.await {
            Ok(v) => println!("bulk:        {v}"),
            Err(e @ (DispatchError::MaxSizeExceeded | DispatchError::Expired { .. })) => {
                println!("bulk:        shed ({})", e.as_label());
            }
            Err(e) => return Err(e.into()),
        }
    }

    // Let the subscriber workers catch up before reading the recorder.
    tokio::time::sleep(Duration::from_millis(50)).await;
    for key in keyed.keys() {
        if let Some(s) = stats.snapshot_for(&key) {
            println!();
            println!("{key}:");
            println!(" ├─► Completed: {}", s.completed);
            println!(" ├─► Evicted:   {}", s.evicted);
            println!(" ├─► Expired:   {}", s.expired);
            println!(" └─► Peak queue {}", s.peak_queue_length);
        }
    }
    Ok(())
}
