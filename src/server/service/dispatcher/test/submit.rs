use super::*;

/// Tests queue positions returned before the worker is started.
///
/// Verifies that each submission lands at the tail and reports its 1-based
/// position among waiting jobs.
///
/// Expected: positions 1, 2, 3 and a queue length of 3
#[tokio::test]
async fn returns_increasing_positions() {
    let dispatcher = Dispatcher::new();
    let log = StartLog::default();

    assert_eq!(dispatcher.submit(logging_job(&log, "J1")), 1);
    assert_eq!(dispatcher.submit(logging_job(&log, "J2")), 2);
    assert_eq!(dispatcher.submit(logging_job(&log, "J3")), 3);

    let status = dispatcher.status();
    assert_eq!(status.queue_length, 3);
    assert!(status.current_job.is_none());
    assert!(log.lock().unwrap().is_empty());
}

/// Tests concurrent submission from many tasks.
///
/// Verifies that no submission is lost and every caller receives a distinct
/// position when the queue is not being drained.
///
/// Expected: positions are exactly 1..=64
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_submissions_get_distinct_positions() {
    let dispatcher = Dispatcher::new();
    let log = StartLog::default();

    let mut handles = Vec::new();
    for i in 0..64 {
        let dispatcher = dispatcher.clone();
        let job = logging_job(&log, &format!("J{}", i));
        handles.push(tokio::spawn(async move { dispatcher.submit(job) }));
    }

    let mut positions = Vec::new();
    for handle in handles {
        positions.push(handle.await.unwrap());
    }
    positions.sort_unstable();

    assert_eq!(positions, (1..=64).collect::<Vec<_>>());
    assert_eq!(dispatcher.stats().submitted, 64);
}

/// Tests that submission does not require a running worker.
///
/// Expected: job waits in the queue until `start` is called, then runs
#[tokio::test]
async fn queued_jobs_run_once_started() {
    let dispatcher = Dispatcher::new();
    let log = StartLog::default();

    dispatcher.submit(logging_job(&log, "J1"));
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(log.lock().unwrap().is_empty());

    dispatcher.start();
    wait_for_idle(&dispatcher).await;

    assert_eq!(*log.lock().unwrap(), vec!["J1".to_string()]);
}
