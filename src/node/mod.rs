// src/node/mod.rs
//! Node-graph plugin shims.
//!
//! These mirror the extension's node classes: thin passthrough values that
//! the host executes inline with the dataflow. The save node does not
//! persist anything itself; it announces the save over the frontend event
//! bus and the browser drives the HTTP API from there.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::storage::StorageRoot;

/// Event name understood by the frontend listener.
pub const TRIGGER_SAVE_EVENT: &str = "alexandria.trigger_save";

const EVENT_BUS_CAPACITY: usize = 32;

/// Payload of a [`TRIGGER_SAVE_EVENT`] message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerSave {
    pub node_id: Option<String>,
    pub template_name: String,
    pub timestamp: String,
    pub storage_directory: String,
}

/// Fire-and-forget bus toward the frontend.
///
/// Delivery is best-effort: an absent listener is reported, not an error,
/// and senders never block or fail on it.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: broadcast::Sender<TriggerSave>,
}

impl Default for EventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_BUS_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TriggerSave> {
        self.tx.subscribe()
    }

    /// Send `event` to any connected listener. Returns whether anyone was
    /// listening.
    pub fn send(&self, event: TriggerSave) -> bool {
        match self.tx.send(event) {
            Ok(_) => true,
            Err(_) => {
                tracing::warn!(event = TRIGGER_SAVE_EVENT, "no frontend listener connected");
                false
            }
        }
    }
}

/// Save-trigger node: passthrough for the template name that emits a
/// [`TriggerSave`] event every time the workflow executes it.
#[derive(Debug, Clone, Default)]
pub struct SaveNode {
    /// When set, `override_name` replaces the incoming template name.
    pub name_override: bool,
    pub override_name: String,
}

impl SaveNode {
    /// Execute the node: pick the effective name, emit the trigger event,
    /// and return `(template_name, timestamp)` for chaining or display.
    pub fn execute(
        &self,
        template_name: &str,
        node_id: Option<&str>,
        root: &StorageRoot,
        events: &EventSink,
    ) -> (String, String) {
        let actual_name = if self.name_override {
            self.override_name.clone()
        } else {
            template_name.to_string()
        };
        let timestamp = chrono::Utc::now().to_rfc3339();

        events.send(TriggerSave {
            node_id: node_id.map(str::to_string),
            template_name: actual_name.clone(),
            timestamp: timestamp.clone(),
            storage_directory: root.resolve().display().to_string(),
        });

        (actual_name, timestamp)
    }
}

/// Control-panel node: outputs its configured template name so it can be
/// wired into save/load nodes. The buttons live entirely in the frontend.
#[derive(Debug, Clone)]
pub struct ControlNode {
    pub template_name: String,
}

impl ControlNode {
    pub fn execute(&self) -> String {
        self.template_name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_node_emits_trigger_event() {
        let tmp = TempDir::new().unwrap();
        let root = StorageRoot::with_root(tmp.path());
        let events = EventSink::new();
        let mut rx = events.subscribe();

        let node = SaveNode::default();
        let (name, timestamp) = node.execute("My Template", Some("42"), &root, &events);
        assert_eq!(name, "My Template");

        let event = rx.try_recv().unwrap();
        assert_eq!(event.template_name, "My Template");
        assert_eq!(event.node_id.as_deref(), Some("42"));
        assert_eq!(event.timestamp, timestamp);
        assert_eq!(event.storage_directory, tmp.path().display().to_string());
    }

    #[test]
    fn test_save_node_name_override() {
        let root = StorageRoot::new();
        let events = EventSink::new();
        let node = SaveNode {
            name_override: true,
            override_name: "Override".to_string(),
        };
        let (name, _) = node.execute("Ignored", None, &root, &events);
        assert_eq!(name, "Override");
    }

    #[test]
    fn test_send_without_listener_is_not_an_error() {
        let events = EventSink::new();
        let delivered = events.send(TriggerSave {
            node_id: None,
            template_name: "X".to_string(),
            timestamp: "t".to_string(),
            storage_directory: "d".to_string(),
        });
        assert!(!delivered);
    }

    #[test]
    fn test_control_node_passthrough() {
        let node = ControlNode {
            template_name: "Panel".to_string(),
        };
        assert_eq!(node.execute(), "Panel");
    }
}
