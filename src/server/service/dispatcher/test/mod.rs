use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::server::error::AppError;
use crate::server::model::job::{Job, JobKind};
use crate::server::service::dispatcher::Dispatcher;

mod submit;

/// Records the order in which job actions begin.
type StartLog = Arc<Mutex<Vec<String>>>;

/// Builds a job that appends `name` to `log` when it starts.
fn logging_job(log: &StartLog, name: &str) -> Job {
    let log = log.clone();
    let label = name.to_string();
    Job::new(JobKind::MemberAddition, name, move || async move {
        log.lock().unwrap().push(label);
        Ok::<(), AppError>(())
    })
}

/// Polls until the dispatcher has drained its queue and finished its last job.
async fn wait_for_idle(dispatcher: &Dispatcher) {
    tokio::time::timeout(Duration::from_secs(10), async {
        while !dispatcher.is_idle() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("dispatcher did not drain in time");
}

/// Tracks how many job actions run at once and the highest value observed.
#[derive(Clone, Default)]
struct ConcurrencyProbe {
    running: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl ConcurrencyProbe {
    fn job(&self, kind: JobKind, description: String) -> Job {
        let probe = self.clone();
        Job::new(kind, description, move || async move {
            let now = probe.running.fetch_add(1, Ordering::SeqCst) + 1;
            probe.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(1)).await;
            probe.running.fetch_sub(1, Ordering::SeqCst);
            Ok::<(), AppError>(())
        })
    }

    fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}
