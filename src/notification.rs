//! Per-algorithm notification bus
//!
//! Lifecycle events are a tagged enum delivered synchronously to observers in
//! subscription order, on whichever thread is running the algorithm. The
//! observer list is snapshotted per event, so callbacks may subscribe or
//! unsubscribe without deadlocking.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;

use crate::manager::AlgorithmId;

/// Read-only description of the algorithm that emitted a notification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Source {
    pub name: String,
    pub version: u32,
    /// Present for managed instances only
    pub id: Option<AlgorithmId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationKind {
    Started,
    Progress { fraction: f64, message: String },
    Finished { success: bool },
    Error { message: String },
}

/// One event on the bus
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub source: Arc<Source>,
    pub kind: NotificationKind,
}

impl Notification {
    pub fn is_started(&self) -> bool {
        matches!(self.kind, NotificationKind::Started)
    }

    pub fn progress(&self) -> Option<f64> {
        match self.kind {
            NotificationKind::Progress { fraction, .. } => Some(fraction),
            _ => None,
        }
    }

    pub fn finished(&self) -> Option<bool> {
        match self.kind {
            NotificationKind::Finished { success } => Some(success),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.kind {
            NotificationKind::Error { message } => Some(message),
            _ => None,
        }
    }
}

/// Receives notifications; closures implement it directly
pub trait Observer: Send + Sync {
    fn notify(&self, notification: &Notification);
}

impl<F> Observer for F
where
    F: Fn(&Notification) + Send + Sync,
{
    fn notify(&self, notification: &Notification) {
        self(notification)
    }
}

/// Handle returned by `subscribe`, used to detach
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Publish/subscribe channel owned by one algorithm instance
pub struct NotificationBus {
    source: Arc<Source>,
    observers: RwLock<Vec<(ObserverId, Arc<dyn Observer>)>>,
    next_id: AtomicU64,
}

impl NotificationBus {
    pub fn new(source: Source) -> Self {
        Self {
            source: Arc::new(source),
            observers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    pub fn source(&self) -> &Arc<Source> {
        &self.source
    }

    pub fn subscribe(&self, observer: impl Observer + 'static) -> ObserverId {
        self.subscribe_arc(Arc::new(observer))
    }

    pub fn subscribe_arc(&self, observer: Arc<dyn Observer>) -> ObserverId {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.observers.write().push((id, observer));
        id
    }

    /// Detach an observer; returns false when it was not subscribed
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.write();
        let before = observers.len();
        observers.retain(|(oid, _)| *oid != id);
        observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.read().len()
    }

    /// Deliver one notification to every current observer
    pub fn emit(&self, kind: NotificationKind) {
        let notification = Notification {
            source: Arc::clone(&self.source),
            kind,
        };
        let snapshot: Vec<Arc<dyn Observer>> = self
            .observers
            .read()
            .iter()
            .map(|(_, o)| Arc::clone(o))
            .collect();
        for observer in snapshot {
            observer.notify(&notification);
        }
    }

    pub fn started(&self) {
        self.emit(NotificationKind::Started);
    }

    /// Progress is clamped to [0, 1]
    pub fn progress(&self, fraction: f64, message: impl Into<String>) {
        let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
        self.emit(NotificationKind::Progress {
            fraction,
            message: message.into(),
        });
    }

    pub fn finished(&self, success: bool) {
        self.emit(NotificationKind::Finished { success });
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(NotificationKind::Error {
            message: message.into(),
        });
    }
}

impl fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationBus")
            .field("source", &self.source.name)
            .field("observers", &self.observer_count())
            .finish()
    }
}

/// Observer that keeps every notification it sees
#[derive(Clone, Default)]
pub struct NotificationRecorder {
    seen: Arc<Mutex<Vec<Notification>>>,
}

impl NotificationRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.seen.lock().clone()
    }

    pub fn kinds(&self) -> Vec<NotificationKind> {
        self.seen.lock().iter().map(|n| n.kind.clone()).collect()
    }

    pub fn progress_values(&self) -> Vec<f64> {
        self.seen.lock().iter().filter_map(Notification::progress).collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.seen
            .lock()
            .iter()
            .filter_map(|n| n.error().map(str::to_string))
            .collect()
    }

    pub fn saw_started(&self) -> bool {
        self.seen.lock().iter().any(Notification::is_started)
    }

    /// Success flag of the last Finished notification
    pub fn finished(&self) -> Option<bool> {
        self.seen.lock().iter().rev().find_map(Notification::finished)
    }

    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Observer for NotificationRecorder {
    fn notify(&self, notification: &Notification) {
        self.seen.lock().push(notification.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bus() -> NotificationBus {
        NotificationBus::new(Source {
            name: "T".into(),
            version: 1,
            id: None,
        })
    }

    #[test]
    fn observers_receive_in_subscription_order() {
        let bus = bus();
        let order = Arc::new(Mutex::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            bus.subscribe(move |_: &Notification| order.lock().push(tag));
        }
        bus.started();
        assert_eq!(*order.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn unsubscribe_stops_delivery_without_replay() {
        let bus = bus();
        let rec = NotificationRecorder::new();
        bus.started();
        let id = bus.subscribe(rec.clone());
        bus.progress(0.5, "half");
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.finished(true);

        assert_eq!(
            rec.kinds(),
            vec![NotificationKind::Progress {
                fraction: 0.5,
                message: "half".into()
            }]
        );
    }

    #[test]
    fn progress_is_clamped() {
        let bus = bus();
        let rec = NotificationRecorder::new();
        bus.subscribe(rec.clone());
        bus.progress(1.5, "");
        bus.progress(-0.1, "");
        bus.progress(f64::NAN, "");
        assert_eq!(rec.progress_values(), vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn observer_may_subscribe_from_callback() {
        let bus = Arc::new(bus());
        let late = NotificationRecorder::new();
        {
            let bus_ref = Arc::clone(&bus);
            let late = late.clone();
            bus.subscribe(move |n: &Notification| {
                if n.is_started() {
                    bus_ref.subscribe(late.clone());
                }
            });
        }
        bus.started();
        bus.finished(true);
        assert_eq!(late.finished(), Some(true));
        assert!(!late.saw_started());
    }

    #[test]
    fn notification_carries_source_and_serializes_with_tag() {
        let bus = bus();
        let rec = NotificationRecorder::new();
        bus.subscribe(rec.clone());
        bus.error("boom");

        let n = &rec.notifications()[0];
        assert_eq!(n.source.name, "T");
        let json = serde_json::to_value(&n.kind).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["message"], "boom");
    }
}
