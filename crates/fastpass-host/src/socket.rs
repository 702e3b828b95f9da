use std::{
    io,
    net::{SocketAddr, UdpSocket},
};

use socket2::Socket as Socket2;

use fastpass_core::{config::Config, error::Result, transport::DatagramTransport};

/// Applies socket options from configuration to a UdpSocket.
fn apply_socket_options(socket: &UdpSocket, config: &Config) -> io::Result<()> {
    let socket2 = Socket2::from(socket.try_clone()?);

    if let Some(size) = config.socket_recv_buffer_size {
        socket2.set_recv_buffer_size(size)?;
    }

    if let Some(size) = config.socket_send_buffer_size {
        socket2.set_send_buffer_size(size)?;
    }

    if let Some(ttl) = config.socket_ttl {
        socket.set_ttl(ttl)?;
    }

    Ok(())
}

/// The sending half of a peer socket. Cloneable from the receive side so
/// the engine can own its transport while the host keeps receiving.
#[derive(Debug)]
pub struct UdpSender {
    socket: UdpSocket,
}

impl DatagramTransport for UdpSender {
    fn send_datagram(&mut self, payload: &[u8]) -> io::Result<usize> {
        self.socket.send(payload)
    }
}

/// A UDP socket connected to the single configured peer.
///
/// Connecting fixes the destination and lets the kernel filter inbound
/// traffic down to that peer; everything else arriving on the port is
/// dropped before the engine sees it.
#[derive(Debug)]
pub struct PeerSocket {
    socket: UdpSocket,
}

impl PeerSocket {
    /// Binds the local address from `config`, applies the socket options,
    /// and connects to the configured peer.
    pub fn connect(config: &Config) -> Result<Self> {
        let socket = UdpSocket::bind(config.local_address)?;
        apply_socket_options(&socket, config)?;
        socket.connect(config.peer_address)?;

        if config.blocking_mode {
            socket.set_nonblocking(false)?;
            socket.set_read_timeout(config.socket_polling_timeout)?;
        } else {
            socket.set_nonblocking(true)?;
        }

        Ok(PeerSocket { socket })
    }

    /// Clones the sending half for the engine to own.
    pub fn sender(&self) -> Result<UdpSender> {
        Ok(UdpSender { socket: self.socket.try_clone()? })
    }

    /// Receives a single datagram from the peer.
    pub fn receive<'a>(&self, buffer: &'a mut [u8]) -> io::Result<&'a [u8]> {
        self.socket.recv(buffer).map(move |recv_len| &buffer[..recv_len])
    }

    /// The address the socket is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }
}
