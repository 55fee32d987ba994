// Background job worker -- runs one job off the caller's thread.
//
// Interactive front ends must not block while a database is copied or cleaned.
// The worker runs the whole backup/mutate/restore sequence on its own thread and
// reports only through the channel: zero or more Event messages followed by
// exactly one Finished. There is no cancellation once a job has started.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::JoinHandle;

use serde::Serialize;

use super::{run_job, Job};
use crate::constants::JOB_THREAD_NAME;
use crate::error::Result;
use crate::events::{EventSink, StatusEvent, StatusLevel};
use crate::paths::PathLocator;
use crate::process::EditorProcess;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum JobMessage {
    Event(StatusEvent),
    Finished { success: bool },
}

/// Forwards events into the job channel. A dropped receiver is not an error.
struct ChannelSink {
    tx: Sender<JobMessage>,
}

impl EventSink for ChannelSink {
    fn emit(&self, event: StatusEvent) {
        let _ = self.tx.send(JobMessage::Event(event));
    }
}

/// Receiving end of a running job.
pub struct JobHandle {
    receiver: Receiver<JobMessage>,
    thread: JoinHandle<()>,
}

impl JobHandle {
    /// Non-blocking poll, for UI event loops. `Empty` means nothing yet;
    /// `Disconnected` means the worker has exited and every message was drained.
    pub fn try_recv(&self) -> std::result::Result<JobMessage, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Blocking iterator over messages until the worker hangs up.
    pub fn messages(&self) -> impl Iterator<Item = JobMessage> + '_ {
        self.receiver.iter()
    }

    /// Block until the job finishes. Returns the events and the success flag.
    pub fn wait(self) -> (Vec<StatusEvent>, bool) {
        let mut events = Vec::new();
        let mut success = false;
        for message in self.receiver.iter() {
            match message {
                JobMessage::Event(e) => events.push(e),
                JobMessage::Finished { success: s } => {
                    success = s;
                    break;
                }
            }
        }
        if self.thread.join().is_err() {
            log::error!("Job worker thread panicked after finishing");
        }
        (events, success)
    }
}

/// Spawn `job` on a named background thread.
pub fn spawn_job<L, P>(job: Job, locator: L, process: P) -> Result<JobHandle>
where
    L: PathLocator + Send + 'static,
    P: EditorProcess + Send + 'static,
{
    let (tx, receiver) = mpsc::channel();

    let thread = std::thread::Builder::new()
        .name(JOB_THREAD_NAME.into())
        .spawn(move || {
            let sink = ChannelSink { tx: tx.clone() };

            // Catch panics so a Finished message is always sent.
            let result = catch_unwind(AssertUnwindSafe(|| run_job(&job, &locator, &process, &sink)));

            let success = match result {
                Ok(success) => success,
                Err(_) => {
                    log::error!("Job worker: job {} panicked (recovered)", job.name());
                    sink.emit(StatusEvent::new(
                        StatusLevel::Error,
                        format!("Unexpected failure while running {}", job.name()),
                    ));
                    false
                }
            };

            let _ = tx.send(JobMessage::Finished { success });
        })?;

    Ok(JobHandle { receiver, thread })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MaintenanceError;
    use crate::paths::EditorPaths;
    use std::fs;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    struct FakeEditor {
        running: Arc<AtomicBool>,
    }

    impl EditorProcess for FakeEditor {
        fn is_running(&self) -> bool {
            self.running.load(Ordering::SeqCst)
        }

        fn terminate(&self) -> Result<bool> {
            Ok(self.running.swap(false, Ordering::SeqCst))
        }
    }

    struct PanickingLocator;

    impl PathLocator for PanickingLocator {
        fn locate(&self) -> Result<EditorPaths> {
            panic!("locator blew up");
        }
    }

    struct Unlocatable;

    impl PathLocator for Unlocatable {
        fn locate(&self) -> Result<EditorPaths> {
            Err(MaintenanceError::PathDiscovery("no home".into()))
        }
    }

    fn idle_editor() -> FakeEditor {
        FakeEditor {
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    #[test]
    fn test_modify_ids_in_background() {
        let dir = tempfile::tempdir().unwrap();
        let paths = EditorPaths::in_global_storage(dir.path());
        fs::write(&paths.storage_json, r#"{"telemetry": {"devDeviceId": "old"}}"#).unwrap();

        let handle = spawn_job(Job::ModifyIds { force: false }, paths.clone(), idle_editor()).unwrap();
        let (events, success) = handle.wait();

        assert!(success);
        assert!(!events.is_empty());
        let data: serde_json::Value =
            serde_json::from_slice(&fs::read(&paths.storage_json).unwrap()).unwrap();
        assert_ne!(data["telemetry"]["devDeviceId"], "old");
    }

    #[test]
    fn test_finished_is_last_and_unique() {
        let handle = spawn_job(
            Job::CleanDatabase {
                keyword: "augment".into(),
                force: false,
            },
            Unlocatable,
            idle_editor(),
        )
        .unwrap();

        let messages: Vec<JobMessage> = handle.messages().collect();
        let finished: Vec<_> = messages
            .iter()
            .filter(|m| matches!(m, JobMessage::Finished { .. }))
            .collect();
        assert_eq!(finished.len(), 1);
        assert!(matches!(messages.last(), Some(JobMessage::Finished { success: false })));
    }

    #[test]
    fn test_panic_reports_failure() {
        let handle = spawn_job(Job::ModifyIds { force: false }, PanickingLocator, idle_editor()).unwrap();
        let (events, success) = handle.wait();

        assert!(!success);
        assert!(events.last().unwrap().is_error());
    }

    #[test]
    fn test_poll_distinguishes_empty_from_disconnected() {
        let dir = tempfile::tempdir().unwrap();
        let paths = EditorPaths::in_global_storage(dir.path());
        let handle = spawn_job(Job::CloseEditor, paths, idle_editor()).unwrap();

        let mut messages = Vec::new();
        loop {
            match handle.try_recv() {
                Ok(message) => messages.push(message),
                Err(TryRecvError::Empty) => std::thread::sleep(std::time::Duration::from_millis(1)),
                Err(TryRecvError::Disconnected) => break,
            }
        }

        assert!(matches!(messages.last(), Some(JobMessage::Finished { success: true })));
        assert_eq!(handle.try_recv().unwrap_err(), TryRecvError::Disconnected);
    }

    #[test]
    fn test_close_editor_job() {
        let running = Arc::new(AtomicBool::new(true));
        let editor = FakeEditor {
            running: Arc::clone(&running),
        };

        let dir = tempfile::tempdir().unwrap();
        let paths = EditorPaths::in_global_storage(dir.path());
        let (_, success) = spawn_job(Job::CloseEditor, paths, editor).unwrap().wait();

        assert!(success);
        assert!(!running.load(Ordering::SeqCst));
    }
}
