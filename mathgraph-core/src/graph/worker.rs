use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, trace};

use super::intersect::find_intersections_cancellable;
use super::{PlotFunction, Point};

/// Quiet period before a requested computation actually starts.
const DEBOUNCE: Duration = Duration::from_millis(50);

struct Job {
    funcs: Vec<PlotFunction>,
    start: f64,
    end: f64,
}

/// Runs intersection scans off the interactive path.
///
/// Requests carry an owned snapshot of the function list, so the session is
/// free to replace its own list while a scan is in flight. Requests are
/// debounced, and a newer request supersedes the pending one as well as an
/// in-flight scan; only a scan that ran to completion without being
/// superseded publishes its result, so readers observe last-request-wins and
/// never a stale or partial set of points.
pub struct IntersectionWorker {
    tx: Option<Sender<Job>>,
    latest: Arc<Mutex<Vec<Point>>>,
    handle: Option<JoinHandle<()>>,
}

impl IntersectionWorker {
    pub fn new() -> IntersectionWorker {
        let (tx, rx) = mpsc::channel();
        let latest = Arc::new(Mutex::new(Vec::new()));
        let out = Arc::clone(&latest);
        let handle = thread::spawn(move || run(rx, out));
        IntersectionWorker {
            tx: Some(tx),
            latest,
            handle: Some(handle),
        }
    }

    /// Queues a scan over `[start, end]` for the given snapshot.
    pub fn submit(&self, funcs: Vec<PlotFunction>, start: f64, end: f64) {
        if let Some(tx) = &self.tx {
            // the worker only goes away when the sender is dropped
            let _ = tx.send(Job { funcs, start, end });
        }
    }

    /// The most recently published result.
    pub fn latest(&self) -> Vec<Point> {
        self.latest
            .lock()
            .map(|points| points.clone())
            .unwrap_or_default()
    }
}

impl Default for IntersectionWorker {
    fn default() -> IntersectionWorker {
        IntersectionWorker::new()
    }
}

impl Drop for IntersectionWorker {
    fn drop(&mut self) {
        // closing the channel ends the worker loop
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run(rx: Receiver<Job>, out: Arc<Mutex<Vec<Point>>>) {
    let mut next = match rx.recv() {
        Ok(job) => job,
        Err(_) => return,
    };

    loop {
        // debounce: let a burst of requests settle, keeping only the newest
        loop {
            match rx.recv_timeout(DEBOUNCE) {
                Ok(job) => {
                    trace!("pending intersection job superseded");
                    next = job;
                }
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => return,
            }
        }

        let mut superseding: Option<Job> = None;
        let result = find_intersections_cancellable(&next.funcs, next.start, next.end, &mut || {
            match rx.try_recv() {
                Ok(job) => {
                    superseding = Some(job);
                    true
                }
                Err(TryRecvError::Empty) => false,
                // finish the scan; the final publish is harmless
                Err(TryRecvError::Disconnected) => false,
            }
        });

        match result {
            Some(points) => {
                debug!(count = points.len(), "publishing intersection results");
                if let Ok(mut latest) = out.lock() {
                    *latest = points;
                }
                next = match rx.recv() {
                    Ok(job) => job,
                    Err(_) => return,
                };
            }
            None => {
                debug!("in-flight intersection scan superseded");
                next = match superseding {
                    Some(job) => job,
                    None => return,
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::plot;
    use std::time::Instant;

    fn wait_for<F: Fn(&[Point]) -> bool>(worker: &IntersectionWorker, pred: F) -> Vec<Point> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let points = worker.latest();
            if pred(&points) {
                return points;
            }
            assert!(Instant::now() < deadline, "worker did not publish in time");
            thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn it_publishes_results_in_the_background() {
        let worker = IntersectionWorker::new();
        worker.submit(vec![plot("x"), plot("0 - x")], -5.0, 5.0);

        let points = wait_for(&worker, |points| !points.is_empty());
        assert_eq!(points.len(), 1);
        assert!(points[0].x.abs() < 1e-3);
        assert!(points[0].y.abs() < 1e-3);
    }

    #[test]
    fn it_keeps_only_the_most_recent_request() {
        let worker = IntersectionWorker::new();
        // the first job is superseded during the debounce window; only the
        // second one's crossing at (2, 2) may ever be published
        worker.submit(vec![plot("x"), plot("0 - x")], -5.0, 5.0);
        worker.submit(vec![plot("x"), plot("4 - x")], -5.0, 5.0);

        let points = wait_for(&worker, |points| {
            points.iter().any(|p| (p.x - 2.0).abs() < 1e-3)
        });
        assert_eq!(points.len(), 1);
        assert!((points[0].y - 2.0).abs() < 1e-3);
    }

    #[test]
    fn it_shuts_down_cleanly_on_drop() {
        let worker = IntersectionWorker::new();
        worker.submit(vec![plot("x"), plot("0 - x")], -5.0, 5.0);
        drop(worker);
    }
}
