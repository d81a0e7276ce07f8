use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Decides whether an address belongs to a range that is not publicly routable.
///
/// Addresses reported as non-routable are passed through untouched by
/// [crate::Masquerade::mask_public_routable_only]. Any `Fn(IpAddr) -> bool` can be used.
///
/// ```rust
/// use bauta::MasqueradeConfig;
/// use std::net::IpAddr;
///
/// // treat nothing as local: every address gets masked
/// let masquerade = MasqueradeConfig::ipv4()
///     .build_with(|_: IpAddr| false)
///     .unwrap();
///
/// let addr: IpAddr = "192.168.1.1".parse().unwrap();
/// assert_eq!("192.168.0.0", masquerade.mask_public_routable_only(addr).unwrap().to_string());
/// ```
pub trait Routability {
    fn is_non_routable(&self, addr: IpAddr) -> bool;
}

impl<F> Routability for F
where
    F: Fn(IpAddr) -> bool,
{
    fn is_non_routable(&self, addr: IpAddr) -> bool {
        self(addr)
    }
}

/// The default classifier, backed by the range checks of [std::net].
///
/// Non-routable: unspecified, loopback, link-local and private/site-local addresses.
/// IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`) are classified by their IPv4 range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalRanges;

impl Routability for LocalRanges {
    fn is_non_routable(&self, addr: IpAddr) -> bool {
        match addr {
            IpAddr::V4(addr) => is_local_v4(addr),
            IpAddr::V6(addr) => match addr.to_ipv4_mapped() {
                Some(mapped) => is_local_v4(mapped),
                None => is_local_v6(addr),
            },
        }
    }
}

fn is_local_v4(addr: Ipv4Addr) -> bool {
    addr.is_unspecified() || addr.is_loopback() || addr.is_link_local() || addr.is_private()
}

fn is_local_v6(addr: Ipv6Addr) -> bool {
    let first = addr.segments()[0];

    addr.is_unspecified()
        || addr.is_loopback()
        // fe80::/10 link-local, fec0::/10 site-local
        || (first & 0xffc0) == 0xfe80
        || (first & 0xffc0) == 0xfec0
        // fc00::/7 unique-local
        || (first & 0xfe00) == 0xfc00
}
