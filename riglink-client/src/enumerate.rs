//! Candidate enumeration: sweep the /24 of every local interface, loopback last.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Ordered candidate endpoints for one probe round. Recomputed on every
/// call so interface changes are picked up between rounds. Never empty:
/// with no qualifying interfaces the list is just loopback.
pub fn candidates(port: u16) -> Vec<SocketAddr> {
    let mut locals = Vec::new();
    match local_ip_address::list_afinet_netifas() {
        Ok(netifas) => {
            for (_name, ip) in netifas {
                if let IpAddr::V4(v4) = ip {
                    if !v4.is_loopback() {
                        locals.push(v4);
                    }
                }
            }
        }
        Err(e) => log::debug!("interface enumeration failed: {e}"),
    }
    subnet_candidates(&locals, port)
}

/// The /24 sweep for a fixed set of interface addresses: host octets
/// 1..=254 ascending per interface, then loopback.
pub fn subnet_candidates(interfaces: &[Ipv4Addr], port: u16) -> Vec<SocketAddr> {
    let mut out = Vec::with_capacity(interfaces.len() * 254 + 1);
    for addr in interfaces {
        let [a, b, c, _] = addr.octets();
        for host in 1..=254u8 {
            out.push(SocketAddr::new(IpAddr::V4(Ipv4Addr::new(a, b, c, host)), port));
        }
    }
    out.push(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_interfaces_yields_loopback_only() {
        let out = subnet_candidates(&[], 8765);
        assert_eq!(out, vec!["127.0.0.1:8765".parse().unwrap()]);
    }

    #[test]
    fn sweeps_full_subnet_ascending() {
        let out = subnet_candidates(&[Ipv4Addr::new(192, 168, 1, 42)], 8765);
        assert_eq!(out.len(), 255);
        for (i, addr) in out[..254].iter().enumerate() {
            assert_eq!(addr.port(), 8765);
            match addr.ip() {
                IpAddr::V4(v4) => {
                    let [a, b, c, d] = v4.octets();
                    assert_eq!((a, b, c), (192, 168, 1));
                    assert_eq!(d as usize, i + 1);
                }
                IpAddr::V6(_) => panic!("expected v4 candidate"),
            }
        }
    }

    #[test]
    fn loopback_is_always_last() {
        let out = subnet_candidates(&[Ipv4Addr::new(10, 0, 0, 5)], 9000);
        assert_eq!(*out.last().unwrap(), "127.0.0.1:9000".parse().unwrap());
        // Loopback appears exactly once.
        let loopbacks = out
            .iter()
            .filter(|a| a.ip() == IpAddr::V4(Ipv4Addr::LOCALHOST))
            .count();
        assert_eq!(loopbacks, 1);
    }

    #[test]
    fn multiple_interfaces_sweep_each_prefix() {
        let out = subnet_candidates(
            &[Ipv4Addr::new(10, 0, 0, 5), Ipv4Addr::new(192, 168, 7, 9)],
            8765,
        );
        assert_eq!(out.len(), 2 * 254 + 1);
        assert_eq!(out[0], "10.0.0.1:8765".parse().unwrap());
        assert_eq!(out[254], "192.168.7.1:8765".parse().unwrap());
    }

    #[test]
    fn live_enumeration_is_never_empty() {
        let out = candidates(8765);
        assert!(!out.is_empty());
        assert_eq!(*out.last().unwrap(), "127.0.0.1:8765".parse().unwrap());
    }
}
