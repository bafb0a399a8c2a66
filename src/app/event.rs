use crate::store::Completion;

#[derive(Debug)]
pub enum AppEvent {
    /// A line typed at the console
    Input(String),

    /// Stdin reached end of file
    InputClosed,

    /// A spawned request finished
    Completed {
        entity: &'static str,
        completion: Completion,
    },
}
