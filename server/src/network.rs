//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//


//! TCP network endpoint.
//!
//! On unix the socket is switched to `SO_OOBINLINE` so the urgent byte stays
//! in the data stream (the session finds the `IAC DM` itself) and urgent data
//! is detected with a zero-timeout `poll(POLLPRI)`. Elsewhere the endpoint
//! reports no urgent support and the session falls back to in-band SYNCH.

use async_trait::async_trait;
use std::io;
use std::net::SocketAddr;
use telnetd_session::NetworkEndpoint;
use tokio::io::{AsyncWriteExt, Interest, Ready};
use tokio::net::TcpStream;
use tracing::debug;

/// A session's view of an accepted TCP connection.
#[derive(Debug)]
pub struct TcpNetwork {
    stream: TcpStream,
    peer_addr: SocketAddr,
}

impl TcpNetwork {
    /// Wraps an accepted stream and prepares the socket for TELNET.
    pub fn new(stream: TcpStream) -> io::Result<Self> {
        let peer_addr = stream.peer_addr()?;
        stream.set_nodelay(true)?;
        #[cfg(unix)]
        sys::set_flag(&stream, libc::SO_OOBINLINE, true)?;
        Ok(Self { stream, peer_addr })
    }

    /// Turns TCP keepalive on or off.
    pub fn set_keepalive(&self, enabled: bool) -> io::Result<()> {
        #[cfg(unix)]
        sys::set_flag(&self.stream, libc::SO_KEEPALIVE, enabled)?;
        #[cfg(not(unix))]
        debug!(enabled, "TCP keepalive not configurable on this platform");
        Ok(())
    }

    /// Address of the client
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }
}

#[async_trait]
impl NetworkEndpoint for TcpNetwork {
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.try_read(buf)
    }

    fn send(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.try_write(buf)
    }

    #[cfg(unix)]
    fn has_out_of_band_pending(&self) -> io::Result<bool> {
        sys::urgent_pending(&self.stream)
    }

    #[cfg(not(unix))]
    fn has_out_of_band_pending(&self) -> io::Result<bool> {
        Ok(false)
    }

    #[cfg(unix)]
    fn send_out_of_band(&mut self, byte: u8) -> io::Result<()> {
        let stream = &self.stream;
        stream.try_io(Interest::WRITABLE, || sys::send_urgent(stream, byte))
    }

    #[cfg(not(unix))]
    fn send_out_of_band(&mut self, byte: u8) -> io::Result<()> {
        match self.stream.try_write(&[byte])? {
            0 => Err(io::ErrorKind::WouldBlock.into()),
            _ => Ok(()),
        }
    }

    fn supports_out_of_band(&self) -> bool {
        cfg!(unix)
    }

    async fn ready(&mut self, interest: Interest) -> io::Result<Ready> {
        self.stream.ready(interest).await
    }

    async fn shutdown(&mut self) -> io::Result<()> {
        debug!(peer = %self.peer_addr, "Shutting down write half");
        match self.stream.shutdown().await {
            Err(error) if error.kind() == io::ErrorKind::NotConnected => Ok(()),
            result => result,
        }
    }
}

#[cfg(unix)]
mod sys {
    use std::io;
    use std::mem;
    use std::os::fd::AsRawFd;

    pub(super) fn set_flag(
        socket: &impl AsRawFd,
        name: libc::c_int,
        enabled: bool,
    ) -> io::Result<()> {
        let value = libc::c_int::from(enabled);
        // SAFETY: the fd is open for the lifetime of `socket` and `value`
        // outlives the call.
        let rc = unsafe {
            libc::setsockopt(
                socket.as_raw_fd(),
                libc::SOL_SOCKET,
                name,
                (&value as *const libc::c_int).cast(),
                mem::size_of::<libc::c_int>() as libc::socklen_t,
            )
        };
        if rc == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }

    /// Zero-timeout poll for a pending urgent mark.
    pub(super) fn urgent_pending(socket: &impl AsRawFd) -> io::Result<bool> {
        let mut fds = libc::pollfd {
            fd: socket.as_raw_fd(),
            events: libc::POLLPRI,
            revents: 0,
        };
        // SAFETY: `fds` is a single valid pollfd.
        let rc = unsafe { libc::poll(&mut fds, 1, 0) };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(fds.revents & libc::POLLPRI != 0)
    }

    pub(super) fn send_urgent(socket: &impl AsRawFd, byte: u8) -> io::Result<()> {
        // SAFETY: the buffer is one valid byte.
        let rc = unsafe {
            libc::send(
                socket.as_raw_fd(),
                (&byte as *const u8).cast(),
                1,
                libc::MSG_OOB,
            )
        };
        match rc {
            rc if rc < 0 => Err(io::Error::last_os_error()),
            0 => Err(io::ErrorKind::WouldBlock.into()),
            _ => Ok(()),
        }
    }
}
