//! DetectionEventHandler trait, all methods with no-op defaults.

use super::types::*;

/// Trait for observing detection runs.
///
/// Handlers only override the events they care about. The trait requires
/// `Send + Sync` so one engine can serve concurrent runs.
pub trait DetectionEventHandler: Send + Sync {
    fn on_detection_started(&self, _event: &DetectionStartedEvent) {}
    fn on_method_failed(&self, _event: &MethodFailedEvent) {}
    fn on_normality_warning(&self, _event: &NormalityWarningEvent) {}
    fn on_high_outlier_rate(&self, _event: &HighOutlierRateEvent) {}
    fn on_detection_complete(&self, _event: &DetectionCompleteEvent) {}
}
