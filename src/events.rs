//! Notifications sent to a host while a circuit simulates.
//!
//! The kernel never requires a sink. A [Circuit](crate::Circuit) without one simply skips building events.
use crate::bits::Value;
use crate::error::{Component, ErrorCode, SimError};
use crate::graph::PortName;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use strum_macros::{Display, IntoStaticStr};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
pub enum Severity {
    #[strum(serialize = "warning")]
    Warning,
    #[strum(serialize = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
pub enum EventKind {
    #[strum(serialize = "outputChanged")]
    OutputChanged,
    #[strum(serialize = "wireChanged")]
    WireChanged,
    #[strum(serialize = "fault")]
    Fault,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A top level output settled on a new value.
    OutputChanged {
        component: Option<String>,
        label: String,
        value: Value,
    },
    /// An edge created with an external id changed value.
    WireChanged { wire: String, value: Value },
    Fault {
        component: Option<Component>,
        severity: Severity,
        code: ErrorCode,
        port: Option<PortName>,
        message: String,
    },
}

impl Event {
    pub(crate) fn fault(error: &SimError, severity: Severity) -> Self {
        Event::Fault {
            component: error.component().cloned(),
            severity,
            code: error.code(),
            port: error.port().cloned(),
            message: error.to_string(),
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Event::OutputChanged { .. } => EventKind::OutputChanged,
            Event::WireChanged { .. } => EventKind::WireChanged,
            Event::Fault { .. } => EventKind::Fault,
        }
    }

    /// External id of the component or wire the event is about.
    pub fn component(&self) -> Option<&str> {
        match self {
            Event::OutputChanged { component, .. } => component.as_deref(),
            Event::WireChanged { wire, .. } => Some(wire),
            Event::Fault { component, .. } => {
                component.as_ref().and_then(|c| c.external_id.as_deref())
            }
        }
    }
}

/// Receives [Event]s. Implementations must not block for long, they run inside propagation.
pub trait EventSink: Send + Sync {
    fn notify(&self, event: &Event);
}

/// Keeps every event it receives, mostly useful in tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<Event>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns every event received so far.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    /// Removes and returns every event received so far.
    pub fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl EventSink for RecordingSink {
    fn notify(&self, event: &Event) {
        self.events.lock().push(event.clone());
    }
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn notify(&self, event: &Event) {
        match event {
            Event::Fault {
                severity, message, ..
            } => warn!(%severity, "{}", message),
            Event::OutputChanged { label, value, .. } => info!(%label, value, "output changed"),
            Event::WireChanged { wire, value } => info!(%wire, value, "wire changed"),
        }
    }
}

/// Everything a [Circuit](crate::Circuit) needs from its host: settings and an optional event sink.
#[derive(Clone, Default)]
pub struct SimContext {
    pub config: crate::config::SimConfig,
    sink: Option<Arc<dyn EventSink>>,
}

impl SimContext {
    pub fn new(config: crate::config::SimConfig) -> Self {
        Self { config, sink: None }
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn set_sink(&mut self, sink: Option<Arc<dyn EventSink>>) {
        self.sink = sink;
    }

    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    /// Builds and sends an event, only if a sink is registered.
    pub(crate) fn notify<F: FnOnce() -> Event>(&self, event: F) {
        if let Some(sink) = &self.sink {
            sink.notify(&event());
        }
    }
}

impl fmt::Debug for SimContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimContext")
            .field("config", &self.config)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}
