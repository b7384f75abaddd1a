//! Cue actions and the dispatcher that plays them out.

mod action;
mod dispatcher;
mod job;
mod pool;
mod queue;

pub use action::{ActionId, ActionKind, Cue, CueOscAction, FadeSpec};
pub use dispatcher::{
    CueDispatcher, DispatchError, DispatchEvent, DispatcherConfig, DispatcherState,
    MAX_SIMULTANEOUS_JOBS,
};
pub use job::CancelToken;
