use crate::models::CallRecord;

/// Optional in-process listener for sensor events.
///
/// Every method has a no-op default so hosts implement only what they need.
/// Callbacks run synchronously on the watcher task that produced the event.
pub trait CallsObserver: Send + Sync {
    /// A call was recorded (received, made or missed).
    fn on_call(&self, _record: &CallRecord) {}

    /// The phone is ringing.
    fn on_ringing(&self, _number: Option<&str>) {}

    /// The user answered and is busy with a call.
    fn on_busy(&self, _number: Option<&str>) {}

    /// The user hung up and is free again.
    fn on_free(&self, _number: Option<&str>) {}
}
