//! Command templates: typed descriptions of console controls.
//!
//! A template pairs an embedded path (literal text plus value slots, e.g. the
//! channel number) with the trailing arguments the console expects. Templates
//! are built once into a [`TemplateRegistry`] and never mutated.

pub mod channel;
mod command;
mod param;
mod registry;

pub use command::{ArgumentSlot, CommandTemplate, PathSegment, TemplateCategory};
pub use param::{
    Bounds, EnumParam, NonIter, OptionParam, ParamType, StoredValue, ValueStorer, WireFormat,
};
pub use registry::{RegistryError, TemplateRegistry};
