//! Single-value slots whose producers can be replaced mid-flight.
//!
//! An [`Agent`] holds the latest published value of one kind (a grid layer, a
//! field, an animation run). Submitting new work cancels the task in flight, and a
//! task only publishes if it is still the newest one when it finishes. Every
//! lifecycle step is broadcast as an [`AgentEvent`] and mirrored to the shared
//! [`Status`].

use crate::status::Status;
use earth_common::{CancelFlag, EarthResult};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

const EVENT_CAPACITY: usize = 64;

/// Lifecycle of one submitted task, tagged with the epoch `submit` returned.
#[derive(Debug)]
pub enum AgentEvent<T> {
    Started { epoch: u64 },
    Progress { epoch: u64, fraction: f64 },
    Completed { epoch: u64, value: Arc<T> },
    Cancelled { epoch: u64 },
    Failed { epoch: u64, message: String },
}

impl<T> AgentEvent<T> {
    pub fn epoch(&self) -> u64 {
        match self {
            AgentEvent::Started { epoch }
            | AgentEvent::Progress { epoch, .. }
            | AgentEvent::Completed { epoch, .. }
            | AgentEvent::Cancelled { epoch }
            | AgentEvent::Failed { epoch, .. } => *epoch,
        }
    }
}

impl<T> Clone for AgentEvent<T> {
    fn clone(&self) -> Self {
        match self {
            AgentEvent::Started { epoch } => AgentEvent::Started { epoch: *epoch },
            AgentEvent::Progress { epoch, fraction } => AgentEvent::Progress {
                epoch: *epoch,
                fraction: *fraction,
            },
            AgentEvent::Completed { epoch, value } => AgentEvent::Completed {
                epoch: *epoch,
                value: Arc::clone(value),
            },
            AgentEvent::Cancelled { epoch } => AgentEvent::Cancelled { epoch: *epoch },
            AgentEvent::Failed { epoch, message } => AgentEvent::Failed {
                epoch: *epoch,
                message: message.clone(),
            },
        }
    }
}

struct Slot<T> {
    value: Option<Arc<T>>,
    epoch: u64,
    /// Cancel flag of the task started at `epoch`, while it runs.
    current: Option<CancelFlag>,
    tasks: Vec<JoinHandle<()>>,
}

struct Shared<T> {
    name: &'static str,
    activity: &'static str,
    slot: Mutex<Slot<T>>,
    events: broadcast::Sender<AgentEvent<T>>,
    status: Status,
}

impl<T> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn emit(&self, event: AgentEvent<T>) {
        match &event {
            AgentEvent::Started { epoch } => {
                debug!(agent = self.name, epoch, "Task started");
                self.status.working(self.name, format!("{}...", self.activity));
            }
            AgentEvent::Progress { fraction, .. } => {
                self.status.working(
                    self.name,
                    format!("{}... {:.0}%", self.activity, fraction * 100.0),
                );
            }
            AgentEvent::Completed { epoch, .. } => {
                info!(agent = self.name, epoch, "Published");
                self.status.complete(self.name);
            }
            AgentEvent::Cancelled { epoch } => {
                debug!(agent = self.name, epoch, "Task cancelled");
            }
            AgentEvent::Failed { epoch, message } => {
                self.status.error(self.name, message.clone());
                error!(agent = self.name, epoch, message = %message, "Task failed");
            }
        }
        // No receivers is fine.
        let _ = self.events.send(event);
    }

    fn finish(&self, epoch: u64, cancel: &CancelFlag, result: EarthResult<Option<T>>) {
        let event = {
            let mut slot = self.lock();
            let newest = slot.epoch == epoch && !cancel.is_cancelled();
            if newest {
                slot.current = None;
            }
            match result {
                _ if !newest => AgentEvent::Cancelled { epoch },
                Ok(None) => AgentEvent::Cancelled { epoch },
                Ok(Some(value)) => {
                    let value = Arc::new(value);
                    slot.value = Some(Arc::clone(&value));
                    AgentEvent::Completed { epoch, value }
                }
                Err(e) => AgentEvent::Failed {
                    epoch,
                    message: e.status_message(),
                },
            }
        };
        self.emit(event);
    }
}

/// Handle given to a submitted task.
pub struct TaskContext<T> {
    epoch: u64,
    cancel: CancelFlag,
    shared: Arc<Shared<T>>,
}

impl<T> TaskContext<T> {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Set when a newer task replaces this one. Check it at suspension points.
    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Report a fraction done. Dropped once the task is cancelled.
    pub fn progress(&self, fraction: f64) {
        if !self.cancel.is_cancelled() {
            self.shared.emit(AgentEvent::Progress {
                epoch: self.epoch,
                fraction,
            });
        }
    }
}

pub struct Agent<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Agent<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Send + Sync + 'static> Agent<T> {
    /// `activity` is shown in the status line while a task runs, e.g. "Loading grid".
    pub fn new(name: &'static str, activity: &'static str, status: Status) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                name,
                activity,
                slot: Mutex::new(Slot {
                    value: None,
                    epoch: 0,
                    current: None,
                    tasks: Vec::new(),
                }),
                events,
                status,
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.shared.name
    }

    /// Cancel whatever is running and start `work`. Returns the new epoch.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit<F, Fut>(&self, work: F) -> u64
    where
        F: FnOnce(TaskContext<T>) -> Fut,
        Fut: Future<Output = EarthResult<Option<T>>> + Send + 'static,
    {
        let cancel = CancelFlag::new();
        let epoch = {
            let mut slot = self.shared.lock();
            if let Some(previous) = slot.current.take() {
                previous.cancel();
            }
            slot.epoch += 1;
            slot.current = Some(cancel.clone());
            slot.tasks.retain(|task| !task.is_finished());
            slot.epoch
        };
        self.shared.emit(AgentEvent::Started { epoch });

        let future = work(TaskContext {
            epoch,
            cancel: cancel.clone(),
            shared: Arc::clone(&self.shared),
        });
        let shared = Arc::clone(&self.shared);
        let handle = tokio::spawn(async move {
            let result = future.await;
            shared.finish(epoch, &cancel, result);
        });
        self.shared.lock().tasks.push(handle);
        epoch
    }

    /// Cancel the running task, if any. The published value is kept.
    pub fn cancel(&self) -> bool {
        let running = self.shared.lock().current.take();
        match running {
            Some(flag) => {
                flag.cancel();
                self.shared.status.idle(self.shared.name);
                true
            }
            None => false,
        }
    }

    /// Cancel the running task and drop the published value.
    pub fn clear(&self) {
        self.cancel();
        self.shared.lock().value = None;
    }

    pub fn value(&self) -> Option<Arc<T>> {
        self.shared.lock().value.clone()
    }

    /// Epoch of the most recent submission; 0 before the first.
    pub fn epoch(&self) -> u64 {
        self.shared.lock().epoch
    }

    pub fn is_running(&self) -> bool {
        self.shared.lock().current.is_some()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AgentEvent<T>> {
        self.shared.events.subscribe()
    }

    /// Wait until every submitted task, cancelled ones included, has finished.
    pub async fn settle(&self) {
        loop {
            let tasks = std::mem::take(&mut self.shared.lock().tasks);
            if tasks.is_empty() {
                return;
            }
            for result in futures::future::join_all(tasks).await {
                if let Err(e) = result {
                    error!(agent = self.shared.name, error = %e, "Task panicked");
                }
            }
        }
    }
}

impl<T> std::fmt::Debug for Agent<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slot = self.shared.lock();
        f.debug_struct("Agent")
            .field("name", &self.shared.name)
            .field("epoch", &slot.epoch)
            .field("running", &slot.current.is_some())
            .field("has_value", &slot.value.is_some())
            .finish()
    }
}
