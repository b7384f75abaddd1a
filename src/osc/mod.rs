//! OSC message building and delivery.

mod compiler;
mod endpoint;
mod sender;

pub use compiler::{CompileError, MessageCompiler};
pub use endpoint::{
    validate_device_name, validate_ipv4, validate_port, Endpoint, EndpointError, ValidatorOutput,
    DEVICE_NAME_MAX_LEN, X32_PORT,
};
pub use sender::{DeviceSender, MessageSink, SendError};
