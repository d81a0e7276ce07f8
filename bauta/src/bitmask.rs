use std::{
    fmt,
    net::{IpAddr, Ipv4Addr, Ipv6Addr},
};

use crate::{
    address::Family,
    error::{Error, Result},
};

/// A bitmask for one address family. Bits set to 1 are kept, bits set to 0 are zeroed.
///
/// The width always matches the family: 4 bytes for IPv4, 16 bytes for IPv6.
///
/// ### Usage
///
/// ```rust
/// use bauta::{Bitmask, Family};
///
/// let mask = Bitmask::from_prefix_len(12, Family::V4).unwrap();
/// assert_eq!("255.240.0.0", mask.to_string());
///
/// // any bit pattern is accepted when given as raw bytes
/// let mask = Bitmask::from_octets(&[0xFF, 0x00, 0xFF, 0x00]).unwrap();
/// assert_eq!(None, mask.prefix_len());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bitmask {
    V4([u8; 4]),
    V6([u8; 16]),
}

impl Bitmask {
    /// `255.255.240.0`, a /20
    pub const DEFAULT_V4: Bitmask = Bitmask::V4([0xFF, 0xFF, 0xF0, 0x00]);

    /// `ffff:ffff::`, a /32
    pub const DEFAULT_V6: Bitmask = Bitmask::V6([
        0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, //
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    ]);

    pub const fn default_for(family: Family) -> Self {
        match family {
            Family::V4 => Self::DEFAULT_V4,
            Family::V6 => Self::DEFAULT_V6,
        }
    }

    /// Builds a standard CIDR mask with the first `prefix_len` bits set.
    ///
    /// Fails with [Error::InvalidArgument] when `prefix_len` is larger than 32 for IPv4 or
    /// 128 for IPv6.
    pub fn from_prefix_len(prefix_len: u8, family: Family) -> Result<Self> {
        if prefix_len > family.max_prefix_len() {
            return Err(Error::invalid_argument(format!(
                "{family} prefix length must be between 0 and {}, got {prefix_len}",
                family.max_prefix_len()
            )));
        }

        Ok(match family {
            Family::V4 => Bitmask::V4(leading_ones(prefix_len)),
            Family::V6 => Bitmask::V6(leading_ones(prefix_len)),
        })
    }

    /// Builds a mask from raw bytes. The length selects the family and must be 4 or 16.
    pub fn from_octets(octets: &[u8]) -> Result<Self> {
        match Family::from_width(octets.len())? {
            Family::V4 => {
                let mut mask = [0u8; 4];
                mask.copy_from_slice(octets);
                Ok(Bitmask::V4(mask))
            }
            Family::V6 => {
                let mut mask = [0u8; 16];
                mask.copy_from_slice(octets);
                Ok(Bitmask::V6(mask))
            }
        }
    }

    pub fn family(&self) -> Family {
        match self {
            Bitmask::V4(_) => Family::V4,
            Bitmask::V6(_) => Family::V6,
        }
    }

    pub fn octets(&self) -> &[u8] {
        match self {
            Bitmask::V4(mask) => &mask[..],
            Bitmask::V6(mask) => &mask[..],
        }
    }

    /// The CIDR prefix length, if this mask is a contiguous run of leading ones
    pub fn prefix_len(&self) -> Option<u8> {
        let mut len = 0;
        for octet in self.octets() {
            len += octet.leading_ones();
            if *octet != 0xFF {
                break;
            }
        }
        let len = u8::try_from(len).ok()?;

        let canonical = Bitmask::from_prefix_len(len, self.family()).ok()?;
        (canonical == *self).then_some(len)
    }

    /// ANDs every byte of `addr` with this mask. Returns `None` if the families differ.
    pub fn apply(&self, addr: IpAddr) -> Option<IpAddr> {
        match (self, addr) {
            (Bitmask::V4(mask), IpAddr::V4(addr)) => {
                Some(IpAddr::V4(Ipv4Addr::from(and(addr.octets(), mask))))
            }
            (Bitmask::V6(mask), IpAddr::V6(addr)) => {
                Some(IpAddr::V6(Ipv6Addr::from(and(addr.octets(), mask))))
            }
            _ => None,
        }
    }
}

fn leading_ones<const N: usize>(prefix_len: u8) -> [u8; N] {
    let mut octets = [0u8; N];
    let full = usize::from(prefix_len / 8);
    let partial = prefix_len % 8;

    octets[..full].fill(0xFF);
    if partial > 0 {
        octets[full] = 0xFF << (8 - partial);
    }
    octets
}

fn and<const N: usize>(mut octets: [u8; N], mask: &[u8; N]) -> [u8; N] {
    for (octet, mask) in octets.iter_mut().zip(mask) {
        *octet &= mask;
    }
    octets
}

impl From<Ipv4Addr> for Bitmask {
    fn from(mask: Ipv4Addr) -> Self {
        Bitmask::V4(mask.octets())
    }
}

impl From<Ipv6Addr> for Bitmask {
    fn from(mask: Ipv6Addr) -> Self {
        Bitmask::V6(mask.octets())
    }
}

impl From<IpAddr> for Bitmask {
    fn from(mask: IpAddr) -> Self {
        match mask {
            IpAddr::V4(mask) => mask.into(),
            IpAddr::V6(mask) => mask.into(),
        }
    }
}

impl From<Bitmask> for IpAddr {
    fn from(mask: Bitmask) -> Self {
        match mask {
            Bitmask::V4(mask) => IpAddr::from(mask),
            Bitmask::V6(mask) => IpAddr::from(mask),
        }
    }
}

impl fmt::Display for Bitmask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&IpAddr::from(*self), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_octet() {
        assert_eq!(
            Bitmask::V4([0xFF, 0xFF, 0xFE, 0x00]),
            Bitmask::from_prefix_len(23, Family::V4).unwrap()
        );
        assert_eq!(
            Bitmask::V4([0x80, 0x00, 0x00, 0x00]),
            Bitmask::from_prefix_len(1, Family::V4).unwrap()
        );
    }

    #[test]
    fn boundaries() {
        assert_eq!(
            Bitmask::V4([0; 4]),
            Bitmask::from_prefix_len(0, Family::V4).unwrap()
        );
        assert_eq!(
            Bitmask::V4([0xFF; 4]),
            Bitmask::from_prefix_len(32, Family::V4).unwrap()
        );
        assert_eq!(
            Bitmask::V6([0; 16]),
            Bitmask::from_prefix_len(0, Family::V6).unwrap()
        );
        assert_eq!(
            Bitmask::V6([0xFF; 16]),
            Bitmask::from_prefix_len(128, Family::V6).unwrap()
        );
    }

    #[test]
    fn defaults_are_cidr_masks() {
        assert_eq!(
            Bitmask::DEFAULT_V4,
            Bitmask::from_prefix_len(20, Family::V4).unwrap()
        );
        assert_eq!(
            Bitmask::DEFAULT_V6,
            Bitmask::from_prefix_len(32, Family::V6).unwrap()
        );
    }

    #[test]
    fn prefix_len_of_every_cidr_mask() {
        for family in [Family::V4, Family::V6] {
            for len in 0..=family.max_prefix_len() {
                let mask = Bitmask::from_prefix_len(len, family).unwrap();
                assert_eq!(Some(len), mask.prefix_len(), "{family} /{len}");
            }
        }
    }

    #[test]
    fn prefix_len_of_non_contiguous_mask() {
        let mask = Bitmask::from_octets(&[0xFF, 0x00, 0x0F, 0x00]).unwrap();
        assert_eq!(None, mask.prefix_len());

        let mask = Bitmask::from_octets(&[0xFF, 0xFF, 0xF7, 0x00]).unwrap();
        assert_eq!(None, mask.prefix_len());
    }

    #[test]
    fn apply_rejects_foreign_family() {
        let addr: IpAddr = "2001:db8::1".parse().unwrap();
        assert_eq!(None, Bitmask::DEFAULT_V4.apply(addr));
    }

    #[test]
    fn display() {
        assert_eq!("255.255.240.0", Bitmask::DEFAULT_V4.to_string());
        assert_eq!("ffff:ffff::", Bitmask::DEFAULT_V6.to_string());
    }
}
