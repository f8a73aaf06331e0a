//! Resolution of the address shown in status text.

use std::net::{IpAddr, Ipv4Addr, UdpSocket};

// TEST-NET-1; connecting a UDP socket only consults the routing table.
const ROUTE_PROBE_TARGET: (Ipv4Addr, u16) = (Ipv4Addr::new(192, 0, 2, 1), 9);

pub trait AddressResolver: Send + Sync {
    fn local_address(&self) -> IpAddr;
}

/// First non-loopback IPv4 address of this host, else 127.0.0.1.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalAddressResolver;

impl AddressResolver for LocalAddressResolver {
    fn local_address(&self) -> IpAddr {
        match probe_route() {
            Some(ip) => ip,
            None => IpAddr::V4(Ipv4Addr::LOCALHOST),
        }
    }
}

fn probe_route() -> Option<IpAddr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect(ROUTE_PROBE_TARGET).ok()?;
    let ip = socket.local_addr().ok()?.ip();

    (ip.is_ipv4() && !ip.is_loopback() && !ip.is_unspecified()).then_some(ip)
}

/// Always reports the same address.
#[derive(Debug, Clone, Copy)]
pub struct FixedAddressResolver(pub IpAddr);

impl AddressResolver for FixedAddressResolver {
    fn local_address(&self) -> IpAddr {
        self.0
    }
}
