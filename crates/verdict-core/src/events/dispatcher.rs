//! EventDispatcher — synchronous event dispatch with zero overhead when empty.

use std::sync::Arc;

use super::handler::DetectionEventHandler;
use super::types::*;

/// Synchronous event dispatcher wrapping a list of handlers.
#[derive(Clone, Default)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn DetectionEventHandler>>,
}

impl EventDispatcher {
    /// Create a new empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an event handler.
    pub fn register(&mut self, handler: Arc<dyn DetectionEventHandler>) {
        self.handlers.push(handler);
    }

    /// Returns the number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Emit an event to all registered handlers.
    /// A panicking handler does not stop later handlers from receiving the event.
    fn emit<F: Fn(&dyn DetectionEventHandler)>(&self, f: F) {
        for handler in &self.handlers {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                f(handler.as_ref());
            }));
            if result.is_err() {
                tracing::warn!("detection event handler panicked; continuing");
            }
        }
    }

    pub fn emit_detection_started(&self, event: &DetectionStartedEvent) {
        self.emit(|h| h.on_detection_started(event));
    }

    pub fn emit_method_failed(&self, event: &MethodFailedEvent) {
        self.emit(|h| h.on_method_failed(event));
    }

    pub fn emit_normality_warning(&self, event: &NormalityWarningEvent) {
        self.emit(|h| h.on_normality_warning(event));
    }

    pub fn emit_high_outlier_rate(&self, event: &HighOutlierRateEvent) {
        self.emit(|h| h.on_high_outlier_rate(event));
    }

    pub fn emit_detection_complete(&self, event: &DetectionCompleteEvent) {
        self.emit(|h| h.on_detection_complete(event));
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
