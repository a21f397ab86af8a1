//! vmc-osc/src/transport.rs
//!
//! UDP transport for OSC packets. Encoding is done by `rosc`; each call
//! produces exactly one datagram and nothing is buffered or retried.

use crate::{Result, VmcError};
use rosc::{OscBundle, OscMessage, OscPacket, OscTime, OscType};
use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::SystemTime;
use tracing::{debug, error, info};

/// Where encoded OSC goes. [`OscClient`] is the UDP implementation; the
/// seam exists so the VMC layer can be driven against other sinks.
pub trait OscTransport {
    /// Send one message with the given arguments.
    fn send(&mut self, address: &str, args: Vec<OscType>) -> Result<()>;

    /// Send one bundle, timetagged now, holding one message per entry of
    /// `items`, all at `address`.
    fn send_bundle(&mut self, address: &str, items: Vec<Vec<OscType>>) -> Result<()>;

    /// Release the transport. Calling it again is a no-op.
    fn close(&mut self) -> Result<()>;
}

/// Builds a bundle of messages sharing one address.
pub fn build_bundle(address: &str, items: Vec<Vec<OscType>>, timetag: OscTime) -> OscPacket {
    let content = items
        .into_iter()
        .map(|args| {
            OscPacket::Message(OscMessage {
                addr: address.to_string(),
                args,
            })
        })
        .collect();
    OscPacket::Bundle(OscBundle { timetag, content })
}

/// The current wall-clock time as an OSC timetag (seconds since 1900).
pub fn timetag_now() -> Result<OscTime> {
    OscTime::try_from(SystemTime::now())
        .map_err(|e| VmcError::Timetag(format!("{e:?}")))
}

/// A named OSC client bound to one UDP destination.
///
/// The socket is released by [`OscClient::close`] or, failing that, when
/// the client is dropped.
pub struct OscClient {
    name: String,
    destination: SocketAddr,
    socket: Option<UdpSocket>,
}

impl OscClient {
    /// Resolve `host:port` and bind an ephemeral local socket for it.
    ///
    /// A resolution failure is reported as [`VmcError::HostUnreachable`]
    /// carrying the underlying error. It usually means bad configuration,
    /// so it is not retried.
    pub fn open(host: &str, port: u16, name: &str) -> Result<Self> {
        let host_unreachable = |source: io::Error| VmcError::HostUnreachable {
            host: host.to_string(),
            port,
            source,
        };

        let destination = (host, port)
            .to_socket_addrs()
            .map_err(host_unreachable)?
            .next()
            .ok_or_else(|| {
                host_unreachable(io::Error::new(
                    io::ErrorKind::NotFound,
                    "no addresses resolved",
                ))
            })?;

        let bind_addr = if destination.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(bind_addr).map_err(|e| {
            error!("OSC client '{name}' failed to bind {bind_addr}: {e}");
            VmcError::Io(e)
        })?;

        info!("OSC client '{name}' ready => {destination}");
        Ok(Self {
            name: name.to_string(),
            destination,
            socket: Some(socket),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn destination(&self) -> SocketAddr {
        self.destination
    }

    pub fn is_open(&self) -> bool {
        self.socket.is_some()
    }

    /// Local address of the bound socket, if still open.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().and_then(|s| s.local_addr().ok())
    }

    fn send_packet(&mut self, packet: &OscPacket) -> Result<()> {
        let socket = self
            .socket
            .as_ref()
            .ok_or_else(|| VmcError::ClientClosed(self.name.clone()))?;

        let buf = rosc::encoder::encode(packet)
            .map_err(|e| VmcError::Encode(format!("{e:?}")))?;

        socket.send_to(&buf, self.destination).map_err(|e| {
            error!("OSC client '{}' failed to send to {}: {e}", self.name, self.destination);
            VmcError::Io(e)
        })?;
        Ok(())
    }
}

impl OscTransport for OscClient {
    fn send(&mut self, address: &str, args: Vec<OscType>) -> Result<()> {
        let argc = args.len();
        let packet = OscPacket::Message(OscMessage {
            addr: address.to_string(),
            args,
        });
        self.send_packet(&packet)?;
        debug!("Sent OSC message => {address} ({argc} args) to {}", self.destination);
        Ok(())
    }

    fn send_bundle(&mut self, address: &str, items: Vec<Vec<OscType>>) -> Result<()> {
        let count = items.len();
        let packet = build_bundle(address, items, timetag_now()?);
        self.send_packet(&packet)?;
        debug!("Sent OSC bundle => {address} ({count} messages) to {}", self.destination);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.socket.take().is_some() {
            info!("OSC client '{}' down.", self.name);
        }
        Ok(())
    }
}

impl Drop for OscClient {
    fn drop(&mut self) {
        if self.is_open() {
            debug!("OSC client '{}' dropped while open; closing", self.name);
            let _ = self.close();
        }
    }
}
