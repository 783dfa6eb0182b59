// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{
    fmt,
    net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6},
    str::FromStr,
};

use thiserror::Error;

/// Size of an address on the wire: 1 type byte, 16 address bytes
/// (IPv4 zero-padded), a little-endian port and 1 pad byte.
pub const ADDRESS_BYTES: usize = 20;

pub const ADDRESS_NONE: u8 = 0;
pub const ADDRESS_IPV4: u8 = 1;
pub const ADDRESS_IPV6: u8 = 2;

/// A relay endpoint address.
///
/// `None` is a valid value: tokens and reports carry it when a hop is
/// absent, and encoding an unparseable address produces it. Two
/// addresses compare equal iff the kind, the address bytes of that kind
/// and the port all agree.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Address {
    #[default]
    None,
    Ipv4(Ipv4Addr, u16),
    Ipv6(Ipv6Addr, u16),
}

#[derive(Debug, Error)]
#[error("invalid address: {0}")]
pub struct AddressParseError(String);

impl Address {
    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Address::None)
    }

    pub fn port(&self) -> u16 {
        match self {
            Address::None => 0,
            Address::Ipv4(_, port) | Address::Ipv6(_, port) => *port,
        }
    }

    /// Convert to a `SocketAddr` usable with the OS socket layer.
    /// `None` has no socket form.
    pub fn to_socket_addr(&self) -> Option<SocketAddr> {
        match self {
            Address::None => None,
            Address::Ipv4(ip, port) => {
                Some(SocketAddr::V4(SocketAddrV4::new(*ip, *port)))
            },
            Address::Ipv6(ip, port) => {
                Some(SocketAddr::V6(SocketAddrV6::new(*ip, *port, 0, 0)))
            },
        }
    }
}

impl From<SocketAddr> for Address {
    fn from(addr: SocketAddr) -> Self {
        match addr {
            SocketAddr::V4(v4) => Address::Ipv4(*v4.ip(), v4.port()),
            SocketAddr::V6(v6) => Address::Ipv6(*v6.ip(), v6.port()),
        }
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    /// Accepts `ip:port`, `[ip6]:port` or a bare IP (port 0).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(sock) = s.parse::<SocketAddr>() {
            return Ok(Address::from(sock));
        }
        match s.parse::<IpAddr>() {
            Ok(IpAddr::V4(ip)) => Ok(Address::Ipv4(ip, 0)),
            Ok(IpAddr::V6(ip)) => Ok(Address::Ipv6(ip, 0)),
            Err(_) => Err(AddressParseError(s.to_string())),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::None => write!(f, "NONE"),
            Address::Ipv4(ip, port) => write!(f, "{ip}:{port}"),
            Address::Ipv6(ip, port) => write!(f, "[{ip}]:{port}"),
        }
    }
}
