use crate::store::PendingRequest;

/// Side effects the event loop performs on behalf of the handler.
pub enum Action {
    /// Execute a request off the loop and report back with `AppEvent::Completed`.
    Send {
        entity: &'static str,
        pending: PendingRequest,
    },
    SaveConfig,
    Quit,
}
