mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use common::{RunLog, blocking, init_tracing, recorded};
use queuevisor::{
    DispatchError, Dispatcher, DispatcherConfig, DispatcherOptions, DispatcherStatus, EventKind,
    Order,
};
use tokio::sync::Barrier;

fn config(concurrency: usize, max_size: usize, order: Order) -> DispatcherConfig {
    DispatcherConfig {
        concurrency,
        max_size,
        order,
        ..DispatcherConfig::default()
    }
}

#[tokio::test]
async fn fifo_single_slot_runs_in_submission_order() {
    init_tracing();
    let d = Dispatcher::new(config(1, 0, Order::Fifo));
    let log = RunLog::default();

    let handles: Vec<_> = (1..=6).map(|n| d.submit(recorded(&log, n))).collect();
    for (n, h) in (1..=6).zip(handles) {
        assert_eq!(h.await.unwrap(), n);
    }
    assert_eq!(log.snapshot(), vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(d.status(), DispatcherStatus::Idle);
}

#[tokio::test]
async fn lifo_single_slot_runs_newest_pending_first() {
    let d = Dispatcher::new(config(1, 0, Order::Lifo));
    let log = RunLog::default();

    let (release, first) = blocking(&log, 1);
    let t1 = d.submit(first);
    let t2 = d.submit(recorded(&log, 2));
    let t3 = d.submit(recorded(&log, 3));
    assert_eq!(d.status(), DispatcherStatus::Saturated);
    assert_eq!(d.pending(), 2);

    release.send(()).unwrap();
    assert_eq!(t1.await.unwrap(), 1);
    assert_eq!(t2.await.unwrap(), 2);
    assert_eq!(t3.await.unwrap(), 3);
    assert_eq!(log.snapshot(), vec![1, 3, 2]);
}

#[tokio::test]
async fn fifo_overflow_rejects_newcomer_only() {
    let d = Dispatcher::new(config(1, 1, Order::Fifo));
    let log = RunLog::default();

    let (release, first) = blocking(&log, 1);
    let t1 = d.submit(first);
    let t2 = d.submit(recorded(&log, 2));
    let t3 = d.submit(recorded(&log, 3));

    let err = t3.await.unwrap_err();
    assert!(matches!(err, DispatchError::MaxSizeExceeded));
    assert!(err.is_backpressure());
    assert_eq!(d.pending(), 1);

    release.send(()).unwrap();
    assert_eq!(t1.await.unwrap(), 1);
    assert_eq!(t2.await.unwrap(), 2);
    assert_eq!(log.snapshot(), vec![1, 2]);
}

#[tokio::test]
async fn lifo_overflow_evicts_oldest_pending() {
    let d = Dispatcher::new(config(1, 1, Order::Lifo));
    let log = RunLog::default();
    let mut events = d.subscribe();

    let (release, first) = blocking(&log, 1);
    let t1 = d.submit(first);
    let t2 = d.submit(recorded(&log, 2));
    let t3 = d.submit(recorded(&log, 3));

    assert!(matches!(t2.await, Err(DispatchError::MaxSizeExceeded)));
    assert_eq!(d.pending(), 1);

    release.send(()).unwrap();
    assert_eq!(t1.await.unwrap(), 1);
    assert_eq!(t3.await.unwrap(), 3);
    assert_eq!(log.snapshot(), vec![1, 3]);

    let mut evicted = Vec::new();
    while let Ok(ev) = events.try_recv() {
        if ev.kind == EventKind::Evicted {
            evicted.push(ev.task_id);
        }
    }
    assert_eq!(evicted, vec![Some(2)]);
}

#[tokio::test(start_paused = true)]
async fn stale_task_expires_behind_busy_slot() {
    let d = Dispatcher::new(DispatcherConfig {
        max_age: Duration::from_millis(50),
        ..config(1, 0, Order::Fifo)
    });
    let log = RunLog::default();
    let mut events = d.subscribe();

    let (_release, first) = blocking(&log, 1);
    let _t1 = d.submit(first);
    let t2 = d.submit(recorded(&log, 2));

    match t2.await {
        Err(DispatchError::Expired { max_age }) => {
            assert_eq!(max_age, Duration::from_millis(50));
        }
        other => panic!("expected expiry, got {other:?}"),
    }
    assert_eq!(d.pending(), 0);
    assert_eq!(log.snapshot(), vec![1]);

    let mut after_expiry = None;
    let mut seen_expired = false;
    while let Ok(ev) = events.try_recv() {
        match ev.kind {
            EventKind::Expired => seen_expired = true,
            EventKind::QueueLength if seen_expired => after_expiry = ev.count,
            _ => {}
        }
    }
    assert_eq!(after_expiry, Some(0));
}

#[tokio::test]
async fn unbounded_queue_never_rejects() {
    let d = Dispatcher::new(config(1, 0, Order::Fifo));
    let log = RunLog::default();

    let (release, first) = blocking(&log, 0);
    let head = d.submit(first);
    let rest: Vec<_> = (1..=200).map(|n| d.submit(recorded(&log, n))).collect();
    assert_eq!(d.pending(), 200);

    release.send(()).unwrap();
    head.await.unwrap();
    for h in rest {
        h.await.unwrap();
    }
    assert_eq!(log.snapshot().len(), 201);
}

#[tokio::test]
async fn unlimited_concurrency_dispatches_everything_at_once() {
    let d = Dispatcher::new(config(0, 0, Order::Fifo));
    let barrier = Arc::new(Barrier::new(10));

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            d.submit(move || async move {
                barrier.wait().await;
                Ok::<_, ()>(())
            })
        })
        .collect();

    assert_eq!(d.pending(), 0);
    assert_eq!(d.in_flight(), 10);
    assert_eq!(d.status(), DispatcherStatus::Draining);
    for h in handles {
        h.await.unwrap();
    }
}

#[tokio::test]
async fn task_errors_and_panics_resolve_their_own_handle() {
    let d = Dispatcher::new(config(1, 0, Order::Fifo));
    let ran = Arc::new(AtomicUsize::new(0));

    let failing = d.submit(|| async { Err::<(), _>("disk full") });
    let panicking = d.submit(|| async {
        if true {
            panic!("worker exploded");
        }
        Ok::<(), &str>(())
    });
    let counter = Arc::clone(&ran);
    let healthy = d.submit(move || async move {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok::<_, &str>("ok")
    });

    let err = failing.await.unwrap_err();
    assert_eq!(err.as_label(), "task_failed");
    assert_eq!(err.into_task_error(), Some("disk full"));

    match panicking.await {
        Err(DispatchError::Panicked { info }) => assert!(info.contains("worker exploded")),
        other => panic!("expected panic, got {other:?}"),
    }

    assert_eq!(healthy.await.unwrap(), "ok");
    assert_eq!(ran.load(Ordering::SeqCst), 1);
    assert_eq!(d.in_flight(), 0);
}

#[tokio::test]
async fn dropped_handle_does_not_stall_the_queue() {
    let d = Dispatcher::new(config(1, 0, Order::Fifo));
    let log = RunLog::default();

    drop(d.submit(recorded(&log, 1)));
    let second = d.submit(recorded(&log, 2));
    assert_eq!(second.await.unwrap(), 2);
    assert_eq!(log.snapshot(), vec![1, 2]);
}

#[tokio::test]
async fn options_are_validated_before_construction() {
    let err = Dispatcher::from_options(DispatcherOptions::default().max_size(-1)).unwrap_err();
    assert_eq!(err.as_label(), "config_invalid");

    let err = Dispatcher::from_options(DispatcherOptions::default().order("random")).unwrap_err();
    assert!(err.to_string().contains("random"));

    let opts = DispatcherOptions::from_toml_str(
        r#"
        concurrency = 2
        max_size = 8
        max_age_ms = -5
        order = "lifo"
        "#,
    )
    .unwrap();
    let d = Dispatcher::from_options(opts).unwrap();
    assert_eq!(d.config().concurrency, 2);
    assert_eq!(d.config().max_size, 8);
    assert_eq!(d.config().expiry(), None);
    assert_eq!(d.config().order, Order::Lifo);
}
