//! Command templating and cue dispatch for OSC-controlled mixing consoles
//! (Behringer/Midas X32 and M32).
//!
//! Templates describe a console control as a path with value slots plus the
//! arguments it takes. The compiler fills them into OSC messages, the sender
//! puts them on the wire, and the cue dispatcher schedules many of them,
//! including multi-step fades, from a single FIFO.

pub mod config;
pub mod cue;
pub mod mapping;
pub mod osc;
pub mod template;

pub use config::{Config, ConfigError};
pub use cue::{
    Cue, CueDispatcher, CueOscAction, DispatchError, DispatchEvent, DispatcherConfig,
    DispatcherState, FadeSpec,
};
pub use mapping::{MappingError, ValueMapper};
pub use osc::{CompileError, DeviceSender, Endpoint, MessageCompiler, MessageSink, SendError};
pub use template::{CommandTemplate, ParamType, TemplateRegistry, ValueStorer};
