use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Default X32 OSC port
pub const X32_PORT: u16 = 10023;

pub const DEVICE_NAME_MAX_LEN: usize = 30;

/// Result of one field validator. The message is meant for the user as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorOutput {
    pub is_valid: bool,
    pub error_message: String,
}

impl ValidatorOutput {
    fn ok() -> Self {
        Self {
            is_valid: true,
            error_message: String::new(),
        }
    }

    fn fail(message: &str) -> Self {
        Self {
            is_valid: false,
            error_message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EndpointError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid port: {0}")]
    InvalidPort(String),

    #[error("Invalid device name: {0}")]
    InvalidDeviceName(String),
}

static DIGITS: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"^[0-9]+$"));
static DEVICE_NAME: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"^[A-Za-z0-9_ ]+$"));

fn compile(pattern: &str) -> Option<Regex> {
    Regex::new(pattern)
        .map_err(|e| log::warn!("Regex error: {}", e))
        .ok()
}

/// Whole-string match; a pattern that failed to compile matches nothing.
fn matches_all(re: &LazyLock<Option<Regex>>, text: &str) -> bool {
    re.as_ref().is_some_and(|re| re.is_match(text))
}

pub fn validate_ipv4(address: &str) -> ValidatorOutput {
    let octets: Vec<&str> = address.split('.').collect();
    if octets.len() != 4 {
        return ValidatorOutput::fail("IPv4 Address Requires 4 Octets");
    }

    for octet in octets {
        if octet.is_empty() {
            return ValidatorOutput::fail("IPv4 Address requires all octets to be filled");
        }
        if !matches_all(&DIGITS, octet) {
            return ValidatorOutput::fail("IPv4 Address only accepts digits");
        }
        if octet.len() > 1 && octet.starts_with('0') {
            return ValidatorOutput::fail("IPv4 Address does not allow leading zeros");
        }
        // Digits only, so a parse failure means it is too large
        match octet.parse::<u32>() {
            Ok(v) if v <= 255 => {}
            _ => return ValidatorOutput::fail("Each octet must be between 0 and 255"),
        }
    }
    ValidatorOutput::ok()
}

pub fn validate_port(port: &str) -> ValidatorOutput {
    if port.is_empty() {
        return ValidatorOutput::fail("Port cannot be empty");
    }
    if !matches_all(&DIGITS, port) {
        return ValidatorOutput::fail("Port only allows digits");
    }
    if port.parse::<u16>().is_err() {
        return ValidatorOutput::fail("Port must be between 0 and 65535");
    }
    ValidatorOutput::ok()
}

pub fn validate_device_name(name: &str) -> ValidatorOutput {
    if name.is_empty() {
        return ValidatorOutput::fail("Device name cannot be empty");
    }
    if name.chars().count() > DEVICE_NAME_MAX_LEN {
        return ValidatorOutput::fail("Device name must be less than 30 characters");
    }
    if !matches_all(&DEVICE_NAME, name) {
        return ValidatorOutput::fail(
            "Device name only allows alphanumeric characters and underscores",
        );
    }
    ValidatorOutput::ok()
}

/// A validated console address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    address: String,
    port: u16,
    name: String,
}

impl Endpoint {
    pub fn new(address: &str, port: &str, name: &str) -> Result<Self, EndpointError> {
        let check = validate_ipv4(address);
        if !check.is_valid {
            return Err(EndpointError::InvalidAddress(check.error_message));
        }
        let check = validate_port(port);
        if !check.is_valid {
            return Err(EndpointError::InvalidPort(check.error_message));
        }
        let check = validate_device_name(name);
        if !check.is_valid {
            return Err(EndpointError::InvalidDeviceName(check.error_message));
        }

        let port = port
            .parse()
            .map_err(|_| EndpointError::InvalidPort("Port must be between 0 and 65535".into()))?;
        Ok(Self {
            address: address.to_string(),
            port,
            name: name.to_string(),
        })
    }

    /// A console on this machine at the default port
    pub fn local() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: X32_PORT,
            name: "LocalX32".to_string(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `address:port`, as `UdpSocket::send_to` takes it
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::local()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.name, self.address, self.port)
    }
}
