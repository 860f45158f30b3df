#![allow(dead_code)]

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::oneshot;

/// Boxed work future used by the helpers below.
pub type BoxedWork = Pin<Box<dyn Future<Output = Result<u32, ()>> + Send>>;

/// Shared, ordered record of which tasks ran.
#[derive(Clone, Default)]
pub struct RunLog(Arc<Mutex<Vec<u32>>>);

impl RunLog {
    pub fn record(&self, n: u32) {
        self.0.lock().unwrap().push(n);
    }

    pub fn snapshot(&self) -> Vec<u32> {
        self.0.lock().unwrap().clone()
    }
}

/// Work that records `n` and finishes immediately.
pub fn recorded(
    log: &RunLog,
    n: u32,
) -> impl FnOnce() -> BoxedWork + Send + 'static {
    let log = log.clone();
    move || -> BoxedWork {
        Box::pin(async move {
            log.record(n);
            Ok(n)
        })
    }
}

/// Work that records `n` and then waits until the returned sender fires (or is dropped).
pub fn blocking(
    log: &RunLog,
    n: u32,
) -> (
    oneshot::Sender<()>,
    impl FnOnce() -> BoxedWork + Send + 'static,
) {
    let (release, gate) = oneshot::channel::<()>();
    let log = log.clone();
    let work = move || -> BoxedWork {
        Box::pin(async move {
            log.record(n);
            let _ = gate.await;
            Ok(n)
        })
    };
    (release, work)
}

/// Polls `cond` until it holds or roughly a second has passed.
pub async fn eventually(mut cond: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    cond()
}

/// Installs a test tracing subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
