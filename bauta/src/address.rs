use std::{
    fmt,
    net::{IpAddr, Ipv4Addr, Ipv6Addr},
};

use crate::error::{Error, Result};

/// An IP address family. The family of an address or a bitmask is derived from its width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    V4,
    V6,
}

impl Family {
    /// Width in bytes of an address of this family
    pub const fn width(self) -> usize {
        match self {
            Family::V4 => 4,
            Family::V6 => 16,
        }
    }

    /// Largest valid CIDR prefix length for this family
    pub const fn max_prefix_len(self) -> u8 {
        match self {
            Family::V4 => 32,
            Family::V6 => 128,
        }
    }

    /// The family of a 4 or 16 byte address, [Error::InvalidArgument] for any other width
    pub fn from_width(width: usize) -> Result<Self> {
        match width {
            4 => Ok(Family::V4),
            16 => Ok(Family::V6),
            0 => Err(Error::invalid_argument("missing address bytes")),
            n => Err(Error::invalid_argument(format!(
                "expected 4 or 16 bytes, got {n}"
            ))),
        }
    }

    /// The family of `addr`. IPv4-mapped IPv6 addresses are IPv6.
    pub fn of(addr: IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => Family::V4,
            IpAddr::V6(_) => Family::V6,
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::V4 => f.write_str("IPv4"),
            Family::V6 => f.write_str("IPv6"),
        }
    }
}

/// Builds an address from its raw network-order bytes.
///
/// ```rust
/// use std::net::{IpAddr, Ipv4Addr};
///
/// let addr = bauta::address::from_octets(&[192, 0, 2, 1]).unwrap();
/// assert_eq!(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)), addr);
///
/// assert!(bauta::address::from_octets(&[192, 0, 2]).is_err());
/// ```
pub fn from_octets(octets: &[u8]) -> Result<IpAddr> {
    match Family::from_width(octets.len())? {
        Family::V4 => {
            let mut buf = [0u8; 4];
            buf.copy_from_slice(octets);
            Ok(IpAddr::from(buf))
        }
        Family::V6 => {
            let mut buf = [0u8; 16];
            buf.copy_from_slice(octets);
            Ok(IpAddr::from(buf))
        }
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for std::net::IpAddr {}
    impl Sealed for std::net::Ipv4Addr {}
    impl Sealed for std::net::Ipv6Addr {}
}

/// Address types a [crate::Masquerade] can mask. Masking hands back the same type it was given.
pub trait Address: sealed::Sealed + Copy {
    fn into_ip(self) -> IpAddr;

    /// Narrows an address back to `Self`, `None` if the family does not fit
    fn from_ip(addr: IpAddr) -> Option<Self>;
}

impl Address for IpAddr {
    fn into_ip(self) -> IpAddr {
        self
    }

    fn from_ip(addr: IpAddr) -> Option<Self> {
        Some(addr)
    }
}

impl Address for Ipv4Addr {
    fn into_ip(self) -> IpAddr {
        IpAddr::V4(self)
    }

    fn from_ip(addr: IpAddr) -> Option<Self> {
        match addr {
            IpAddr::V4(addr) => Some(addr),
            IpAddr::V6(_) => None,
        }
    }
}

impl Address for Ipv6Addr {
    fn into_ip(self) -> IpAddr {
        IpAddr::V6(self)
    }

    fn from_ip(addr: IpAddr) -> Option<Self> {
        match addr {
            IpAddr::V6(addr) => Some(addr),
            IpAddr::V4(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_from_width() {
        assert_eq!(Family::V4, Family::from_width(4).unwrap());
        assert_eq!(Family::V6, Family::from_width(16).unwrap());
        for width in [0, 1, 3, 5, 8, 15, 17, 32] {
            assert!(
                matches!(Family::from_width(width), Err(Error::InvalidArgument(_))),
                "width {width} should be rejected"
            );
        }
    }

    #[test]
    fn from_octets_v6() {
        let octets = [
            0x20, 0x01, 0x0d, 0xb8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1,
        ];
        assert_eq!(
            "2001:db8::1".parse::<IpAddr>().unwrap(),
            from_octets(&octets).unwrap()
        );
    }

    #[test]
    fn from_octets_rejects_empty() {
        assert_eq!(
            Err(Error::invalid_argument("missing address bytes")),
            from_octets(&[])
        );
    }

    #[test]
    fn narrowing() {
        let v4: IpAddr = "198.51.100.7".parse().unwrap();
        assert_eq!(Some(Ipv4Addr::new(198, 51, 100, 7)), Ipv4Addr::from_ip(v4));
        assert_eq!(None, Ipv6Addr::from_ip(v4));
    }
}
