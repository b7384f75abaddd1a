use std::net::UdpSocket;
use std::sync::Mutex;

use rosc::{OscMessage, OscPacket};

use super::endpoint::Endpoint;

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("not connected to {0}")]
    NotConnected(String),

    #[error("OSC encode error: {0}")]
    Encode(String),

    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),
}

/// Anything that can take a compiled message off the dispatcher's hands.
pub trait MessageSink: Send + Sync {
    fn send(&self, message: &OscMessage) -> Result<(), SendError>;
}

/// Fire-and-forget OSC sender for one console.
///
/// The socket lives behind a mutex, so concurrent `send` calls go out one
/// at a time.
pub struct DeviceSender {
    endpoint: Endpoint,
    socket: Mutex<Option<UdpSocket>>,
}

impl DeviceSender {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            socket: Mutex::new(None),
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Bind a local socket for sending. Returns true once connected,
    /// including when already connected.
    pub fn connect(&self) -> bool {
        let mut socket = match self.socket.lock() {
            Ok(s) => s,
            Err(_) => return false,
        };
        if socket.is_some() {
            return true;
        }
        match UdpSocket::bind("0.0.0.0:0") {
            Ok(s) => {
                log::info!("Connected to {}", self.endpoint);
                *socket = Some(s);
                true
            }
            Err(e) => {
                log::warn!("Failed to connect to {}: {}", self.endpoint, e);
                false
            }
        }
    }

    /// Release the socket. Returns true once disconnected, including when
    /// there was nothing to release.
    pub fn disconnect(&self) -> bool {
        match self.socket.lock() {
            Ok(mut socket) => {
                if socket.take().is_some() {
                    log::info!("Disconnected from {}", self.endpoint);
                }
                true
            }
            Err(_) => false,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.socket.lock().map(|s| s.is_some()).unwrap_or(false)
    }

    pub fn send(&self, message: &OscMessage) -> Result<(), SendError> {
        let packet = OscPacket::Message(message.clone());
        let buf = rosc::encoder::encode(&packet).map_err(|e| SendError::Encode(e.to_string()))?;

        let socket = self
            .socket
            .lock()
            .map_err(|_| SendError::NotConnected(self.endpoint.to_string()))?;
        let socket = socket
            .as_ref()
            .ok_or_else(|| SendError::NotConnected(self.endpoint.to_string()))?;
        socket.send_to(&buf, self.endpoint.socket_addr())?;
        log::trace!("-> {} {:?}", message.addr, message.args);
        Ok(())
    }
}

impl MessageSink for DeviceSender {
    fn send(&self, message: &OscMessage) -> Result<(), SendError> {
        DeviceSender::send(self, message)
    }
}

impl Drop for DeviceSender {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rosc::OscType;

    fn fader_message() -> OscMessage {
        OscMessage {
            addr: "/ch/01/mix/fader".to_string(),
            args: vec![OscType::Float(0.75)],
        }
    }

    #[test]
    fn test_connect_is_idempotent() {
        let sender = DeviceSender::new(Endpoint::local());
        assert!(!sender.is_connected());
        assert!(sender.connect());
        assert!(sender.connect());
        assert!(sender.is_connected());
        assert!(sender.disconnect());
        assert!(sender.disconnect());
        assert!(!sender.is_connected());
    }

    #[test]
    fn test_send_requires_connection() {
        let sender = DeviceSender::new(Endpoint::local());
        assert!(matches!(
            sender.send(&fader_message()),
            Err(SendError::NotConnected(_))
        ));
    }

    #[test]
    fn test_send_reaches_socket() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver
            .set_read_timeout(Some(std::time::Duration::from_secs(2)))
            .unwrap();
        let port = receiver.local_addr().unwrap().port().to_string();

        let sender = DeviceSender::new(Endpoint::new("127.0.0.1", &port, "Loopback").unwrap());
        assert!(sender.connect());
        sender.send(&fader_message()).unwrap();

        let mut buf = [0u8; 1024];
        let n = receiver.recv(&mut buf).unwrap();
        let (_, packet) = rosc::decoder::decode_udp(&buf[..n]).unwrap();
        match packet {
            OscPacket::Message(msg) => assert_eq!(msg, fader_message()),
            other => panic!("unexpected packet {:?}", other),
        }
    }
}
