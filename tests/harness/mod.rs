//! Shared helpers for the integration tests: a sink that records what the
//! dispatcher sends, and a UDP socket standing in for the console.

#![allow(dead_code)]

use std::net::UdpSocket;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use flume::Receiver;
use mixcue::{DispatchEvent, MessageSink, SendError};
use rosc::{OscMessage, OscPacket};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Keeps every message it is handed, with the time it arrived
#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<(Instant, OscMessage)>>,
}

impl RecordingSink {
    pub fn messages(&self) -> Vec<OscMessage> {
        self.sent.lock().unwrap().iter().map(|(_, m)| m.clone()).collect()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn last_sent_at(&self) -> Option<Instant> {
        self.sent.lock().unwrap().last().map(|(t, _)| *t)
    }
}

impl MessageSink for RecordingSink {
    fn send(&self, message: &OscMessage) -> Result<(), SendError> {
        self.sent.lock().unwrap().push((Instant::now(), message.clone()));
        Ok(())
    }
}

/// Refuses every message
pub struct FailingSink;

impl MessageSink for FailingSink {
    fn send(&self, _message: &OscMessage) -> Result<(), SendError> {
        Err(SendError::NotConnected("nowhere".to_string()))
    }
}

/// A local UDP socket playing the console
pub struct LoopbackConsole {
    socket: UdpSocket,
}

impl LoopbackConsole {
    pub fn new() -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").expect("bind loopback console");
        Self { socket }
    }

    pub fn port(&self) -> String {
        self.socket.local_addr().unwrap().port().to_string()
    }

    /// Next message, or None once `timeout` passes without one
    pub fn recv(&self, timeout: Duration) -> Option<OscMessage> {
        self.socket.set_read_timeout(Some(timeout)).unwrap();
        let mut buf = [0u8; 4096];
        let n = self.socket.recv(&mut buf).ok()?;
        match rosc::decoder::decode_udp(&buf[..n]) {
            Ok((_, OscPacket::Message(msg))) => Some(msg),
            _ => None,
        }
    }
}

/// Collect events until `done` returns true for one of them
pub fn collect_until(
    events: &Receiver<DispatchEvent>,
    timeout: Duration,
    mut done: impl FnMut(&DispatchEvent) -> bool,
) -> Vec<DispatchEvent> {
    let deadline = Instant::now() + timeout;
    let mut seen = Vec::new();
    while let Some(left) = deadline.checked_duration_since(Instant::now()) {
        match events.recv_timeout(left) {
            Ok(event) => {
                let stop = done(&event);
                seen.push(event);
                if stop {
                    break;
                }
            }
            Err(_) => break,
        }
    }
    seen
}
