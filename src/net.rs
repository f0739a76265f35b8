// Non-blocking TCP command ports, one per channel
//
// Each port accepts at most one client (the most recently connected wins)
// and consumes at most one 8-byte command per poll. Fewer than 8 buffered
// bytes are left queued in the kernel until a later poll, so a command is
// only ever decoded whole.

use std::io::{self, ErrorKind, Read};
use std::net::{SocketAddr, TcpListener, TcpStream};
use tracing::{debug, info, warn};

use crate::channel::decode_command;
use crate::config::RuntimeConfig;

/// One listening socket plus the currently attached client, if any.
pub struct CommandPort {
    name: &'static str,
    listener: TcpListener,
    client: Option<TcpStream>,
}

impl CommandPort {
    pub fn bind(name: &'static str, addr: &str, port: u16) -> io::Result<Self> {
        let listener = TcpListener::bind((addr, port))?;
        listener.set_nonblocking(true)?;
        info!("{} port listening on {}", name, listener.local_addr()?);
        Ok(Self {
            name,
            listener,
            client: None,
        })
    }

    /// The actual bound address (ports may be OS-assigned in tests).
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept any pending connections, keeping only the newest client.
    fn accept_pending(&mut self) {
        loop {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    if let Err(e) = stream.set_nonblocking(true) {
                        warn!("{}: failed to configure client {}: {}", self.name, peer, e);
                        continue;
                    }
                    if self.client.is_some() {
                        info!("{}: replacing client with {}", self.name, peer);
                    } else {
                        info!("{}: client connected from {}", self.name, peer);
                    }
                    self.client = Some(stream);
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) => {
                    warn!("{}: accept failed: {}", self.name, e);
                    break;
                }
            }
        }
    }

    /// Poll for one complete command.
    ///
    /// Returns the decoded value only when a client is attached and a full
    /// 8-byte command is already buffered. Excess queued commands wait for
    /// the next iteration. Read errors and EOF detach the client; they are
    /// logged, never propagated.
    pub fn poll(&mut self) -> Option<f64> {
        self.accept_pending();

        let stream = self.client.as_mut()?;
        let mut buf = [0u8; 8];
        match stream.peek(&mut buf) {
            Ok(0) => {
                info!("{}: client disconnected", self.name);
                self.client = None;
                None
            }
            Ok(n) if n < 8 => {
                // Partial command - leave the bytes queued at the transport layer
                debug!("{}: {} bytes buffered, waiting for full command", self.name, n);
                None
            }
            Ok(_) => {
                if let Err(e) = stream.read_exact(&mut buf) {
                    warn!("{}: read failed: {}", self.name, e);
                    self.client = None;
                    return None;
                }
                let value = decode_command(buf);
                info!("{} command: {}", self.name, value);
                Some(value)
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => None,
            Err(e) => {
                warn!("{}: poll failed: {}", self.name, e);
                self.client = None;
                None
            }
        }
    }
}

/// The three command channels of the rover, bound before the loop starts.
/// A bind failure here is fatal; the runtime never retries.
pub struct CommandPorts {
    pub vel: CommandPort,
    pub fork: CommandPort,
    pub theta: CommandPort,
}

impl CommandPorts {
    pub fn bind(config: &RuntimeConfig) -> io::Result<Self> {
        let addr = config.listen_addr.as_str();
        Ok(Self {
            vel: CommandPort::bind("vel", addr, config.vel_port)?,
            fork: CommandPort::bind("fork", addr, config.fork_port)?,
            theta: CommandPort::bind("theta", addr, config.theta_port)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::thread::sleep;
    use std::time::Duration;

    fn loopback_port(name: &'static str) -> (CommandPort, SocketAddr) {
        let port = CommandPort::bind(name, "127.0.0.1", 0).unwrap();
        let addr = port.local_addr().unwrap();
        (port, addr)
    }

    // Loopback delivery is fast but not instant
    fn settle() {
        sleep(Duration::from_millis(50));
    }

    #[test]
    fn no_client_polls_nothing() {
        let (mut port, _) = loopback_port("vel");
        assert_eq!(port.poll(), None);
    }

    #[test]
    fn connected_but_silent_client_polls_nothing() {
        let (mut port, addr) = loopback_port("vel");
        let _client = TcpStream::connect(addr).unwrap();
        settle();
        assert_eq!(port.poll(), None);
    }

    #[test]
    fn whole_command_is_decoded() {
        let (mut port, addr) = loopback_port("vel");
        let mut client = TcpStream::connect(addr).unwrap();
        client.write_all(&8.0f64.to_le_bytes()).unwrap();
        settle();
        assert_eq!(port.poll(), Some(8.0));
        assert_eq!(port.poll(), None);
    }

    #[test]
    fn partial_command_stays_queued() {
        let (mut port, addr) = loopback_port("fork");
        let mut client = TcpStream::connect(addr).unwrap();
        let bytes = 150.0f64.to_le_bytes();
        client.write_all(&bytes[..4]).unwrap();
        settle();
        assert_eq!(port.poll(), None);
        client.write_all(&bytes[4..]).unwrap();
        settle();
        assert_eq!(port.poll(), Some(150.0));
    }

    #[test]
    fn one_command_per_poll() {
        let (mut port, addr) = loopback_port("theta");
        let mut client = TcpStream::connect(addr).unwrap();
        client.write_all(&2.0f64.to_le_bytes()).unwrap();
        client.write_all(&(-2.0f64).to_le_bytes()).unwrap();
        settle();
        // Queued commands drain one per iteration, oldest first
        assert_eq!(port.poll(), Some(2.0));
        assert_eq!(port.poll(), Some(-2.0));
        assert_eq!(port.poll(), None);
    }

    #[test]
    fn newest_client_wins() {
        let (mut port, addr) = loopback_port("vel");
        let mut first = TcpStream::connect(addr).unwrap();
        settle();
        let mut second = TcpStream::connect(addr).unwrap();
        settle();
        first.write_all(&1.0f64.to_le_bytes()).unwrap();
        second.write_all(&2.0f64.to_le_bytes()).unwrap();
        settle();
        assert_eq!(port.poll(), Some(2.0));
    }

    #[test]
    fn disconnect_detaches_client() {
        let (mut port, addr) = loopback_port("vel");
        {
            let mut client = TcpStream::connect(addr).unwrap();
            client.write_all(&3.0f64.to_le_bytes()).unwrap();
            settle();
            assert_eq!(port.poll(), Some(3.0));
        }
        settle();
        assert_eq!(port.poll(), None); // EOF observed, client dropped
        assert!(port.client.is_none());
    }
}
