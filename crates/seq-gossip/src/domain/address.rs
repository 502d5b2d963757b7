//! # Peer Addresses
//!
//! Multiaddr-style peer addresses:
//!
//! ```text
//! /ip4/10.0.0.5/tcp/30303
//! /ip6/::1/tcp/30303/p2p/<64 hex chars>
//! ```
//!
//! The optional `/p2p/` suffix pins the peer's identity; a handshake with
//! any other key is refused.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::str::FromStr;

use crate::domain::identity::PeerId;
use crate::errors::AddressError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerAddr {
    pub socket: SocketAddr,
    pub peer_id: Option<PeerId>,
}

impl FromStr for PeerAddr {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let addr = s.trim();
        if addr.is_empty() {
            return Err(AddressError::Empty);
        }
        let malformed = || AddressError::Malformed(addr.to_string());

        let segments: Vec<&str> = addr.strip_prefix('/').ok_or_else(malformed)?.split('/').collect();
        let [protocol, host, transport, port, rest @ ..] = segments.as_slice() else {
            return Err(malformed());
        };
        if *transport != "tcp" {
            return Err(AddressError::UnsupportedProtocol {
                protocol: transport.to_string(),
                addr: addr.to_string(),
            });
        }

        let invalid_ip = || AddressError::InvalidIp {
            ip: host.to_string(),
            addr: addr.to_string(),
        };
        let ip = match *protocol {
            "ip4" => IpAddr::V4(host.parse::<Ipv4Addr>().map_err(|_| invalid_ip())?),
            "ip6" => IpAddr::V6(host.parse::<Ipv6Addr>().map_err(|_| invalid_ip())?),
            other => {
                return Err(AddressError::UnsupportedProtocol {
                    protocol: other.to_string(),
                    addr: addr.to_string(),
                })
            }
        };

        let port = port
            .parse::<u16>()
            .ok()
            .filter(|p| *p != 0)
            .ok_or_else(|| AddressError::InvalidPort {
                port: port.to_string(),
                addr: addr.to_string(),
            })?;

        let peer_id = match rest {
            [] => None,
            ["p2p", id] => Some(id.parse::<PeerId>().map_err(|e| AddressError::InvalidPeerId {
                addr: addr.to_string(),
                reason: e.to_string(),
            })?),
            _ => return Err(malformed()),
        };

        Ok(Self {
            socket: SocketAddr::new(ip, port),
            peer_id,
        })
    }
}

impl fmt::Display for PeerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let protocol = if self.socket.is_ipv4() { "ip4" } else { "ip6" };
        write!(f, "/{}/{}/tcp/{}", protocol, self.socket.ip(), self.socket.port())?;
        if let Some(peer_id) = &self.peer_id {
            write!(f, "/p2p/{}", peer_id.to_hex())?;
        }
        Ok(())
    }
}

/// Parse a comma-separated bootstrap list.
///
/// Empty or whitespace-only input means no bootstrap peers. Otherwise every
/// entry must parse; an empty entry such as the middle of `"a,,b"` fails.
pub fn parse_bootstrap_list(input: &str) -> Result<Vec<PeerAddr>, AddressError> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }
    input.split(',').map(str::parse).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PEER_HEX: &str = "8a88e3dd7409f195fd52db2d3cba5d72ca6709bf1d94121bf3748801b40f6f5c";

    #[test]
    fn test_parse_ip4() {
        let addr: PeerAddr = "/ip4/127.0.0.1/tcp/30303".parse().unwrap();
        assert_eq!(addr.socket, "127.0.0.1:30303".parse().unwrap());
        assert!(addr.peer_id.is_none());
    }

    #[test]
    fn test_parse_ip6_with_peer_id() {
        let raw = format!("/ip6/::1/tcp/9000/p2p/{}", PEER_HEX);
        let addr: PeerAddr = raw.parse().unwrap();
        assert_eq!(addr.socket, "[::1]:9000".parse().unwrap());
        assert_eq!(addr.peer_id.unwrap().to_hex(), PEER_HEX);
        assert_eq!(addr.to_string(), raw);
    }

    #[test]
    fn test_malformed_entries() {
        assert_eq!("".parse::<PeerAddr>(), Err(AddressError::Empty));
        assert!(matches!(
            "127.0.0.1:30303".parse::<PeerAddr>(),
            Err(AddressError::Malformed(_))
        ));
        assert!(matches!(
            "/dns4/example.com/tcp/1".parse::<PeerAddr>(),
            Err(AddressError::UnsupportedProtocol { .. })
        ));
        assert!(matches!(
            "/ip4/1.2.3.4/udp/1".parse::<PeerAddr>(),
            Err(AddressError::UnsupportedProtocol { .. })
        ));
        assert!(matches!(
            "/ip4/300.1.1.1/tcp/1".parse::<PeerAddr>(),
            Err(AddressError::InvalidIp { .. })
        ));
        assert!(matches!(
            "/ip4/1.1.1.1/tcp/0".parse::<PeerAddr>(),
            Err(AddressError::InvalidPort { .. })
        ));
        assert!(matches!(
            "/ip4/1.1.1.1/tcp/70000".parse::<PeerAddr>(),
            Err(AddressError::InvalidPort { .. })
        ));
        assert!(matches!(
            "/ip4/1.1.1.1/tcp/1/p2p/abc".parse::<PeerAddr>(),
            Err(AddressError::InvalidPeerId { .. })
        ));
        assert!(matches!(
            "/ip4/1.1.1.1/tcp/1/extra".parse::<PeerAddr>(),
            Err(AddressError::Malformed(_))
        ));
    }

    #[test]
    fn test_bootstrap_list_empty_means_no_peers() {
        assert!(parse_bootstrap_list("").unwrap().is_empty());
        assert!(parse_bootstrap_list("   ").unwrap().is_empty());
    }

    #[test]
    fn test_bootstrap_list_multiple_entries() {
        let peers =
            parse_bootstrap_list("/ip4/10.0.0.1/tcp/1000, /ip4/10.0.0.2/tcp/2000").unwrap();
        assert_eq!(peers.len(), 2);
        assert_eq!(peers[1].socket.port(), 2000);
    }

    #[test]
    fn test_bootstrap_list_any_bad_entry_fails() {
        assert!(parse_bootstrap_list("/ip4/10.0.0.1/tcp/1000,garbage").is_err());
        assert_eq!(
            parse_bootstrap_list("/ip4/10.0.0.1/tcp/1000,,/ip4/10.0.0.2/tcp/2000"),
            Err(AddressError::Empty)
        );
        assert!(parse_bootstrap_list(",").is_err());
    }
}
