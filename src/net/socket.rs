// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! UDP socket each worker owns exclusively.
//!
//! All worker sockets bind the same external address through
//! `SO_REUSEPORT`, letting the kernel fan incoming datagrams out across
//! them. Receive is either non-blocking or blocking with a short
//! timeout; send is fire-and-forget. Transient errors are logged at
//! most once per second so a flapping peer cannot flood the log.

use std::{
    io::ErrorKind,
    sync::atomic::{AtomicU64, Ordering},
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use socket2::{Domain, Protocol, Socket, Type};
use tracing::warn;

use crate::{core::packet::Packet, net::address::Address};

pub const DEFAULT_SOCKET_BUFFER_BYTES: usize = 64 * 1024;

pub const DEFAULT_RECV_TIMEOUT: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy)]
pub enum SocketMode {
    NonBlocking,
    Timeout(Duration),
}

pub struct RelaySocket {
    inner: std::net::UdpSocket,
}

impl RelaySocket {
    pub fn bind(
        address: Address,
        mode: SocketMode,
        send_buffer: usize,
        recv_buffer: usize,
    ) -> Result<Self> {
        let sock_addr = address
            .to_socket_addr()
            .with_context(|| format!("cannot bind to {address}"))?;
        let domain = match sock_addr {
            std::net::SocketAddr::V4(_) => Domain::IPV4,
            std::net::SocketAddr::V6(_) => Domain::IPV6,
        };
        let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))
            .context("failed to create udp socket")?;
        #[cfg(unix)]
        socket
            .set_reuse_port(true)
            .context("failed to set SO_REUSEPORT")?;
        socket
            .set_send_buffer_size(send_buffer)
            .context("failed to set send buffer size")?;
        socket
            .set_recv_buffer_size(recv_buffer)
            .context("failed to set recv buffer size")?;
        match mode {
            SocketMode::NonBlocking => socket
                .set_nonblocking(true)
                .context("failed to set non-blocking")?,
            SocketMode::Timeout(timeout) => socket
                .set_read_timeout(Some(timeout))
                .context("failed to set read timeout")?,
        }
        socket
            .bind(&sock_addr.into())
            .with_context(|| format!("failed to bind udp socket to {address}"))?;
        Ok(Self { inner: socket.into() })
    }

    pub fn local_addr(&self) -> Result<Address> {
        Ok(Address::from(self.inner.local_addr()?))
    }

    /// Receive one datagram into `packet`. False on timeout / no data.
    pub fn recv(&self, packet: &mut Packet) -> bool {
        match self.inner.recv_from(&mut packet.buffer) {
            Ok((len, from)) => {
                packet.len = len;
                packet.addr = Address::from(from);
                true
            },
            Err(e)
                if e.kind() == ErrorKind::WouldBlock
                    || e.kind() == ErrorKind::TimedOut =>
            {
                false
            },
            Err(e) => {
                if log_gate() {
                    warn!("udp recv failed: {e}");
                }
                false
            },
        }
    }

    /// Send `data` to `address`. No partial sends, no retry.
    pub fn send(&self, address: Address, data: &[u8]) -> bool {
        let Some(sock_addr) = address.to_socket_addr() else {
            return false;
        };
        match self.inner.send_to(data, sock_addr) {
            Ok(_) => true,
            Err(e) => {
                if log_gate() {
                    warn!("udp send to {address} failed: {e}");
                }
                false
            },
        }
    }
}

static LOG_EPOCH: Lazy<Instant> = Lazy::new(Instant::now);
static NEXT_LOG_SECOND: AtomicU64 = AtomicU64::new(0);

/// At most one transient-socket-error log line per second, process
/// wide.
fn log_gate() -> bool {
    let now = LOG_EPOCH.elapsed().as_secs();
    let next = NEXT_LOG_SECOND.load(Ordering::Relaxed);
    if now < next {
        return false;
    }
    NEXT_LOG_SECOND
        .compare_exchange(next, now + 1, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
}
