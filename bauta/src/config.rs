use std::net::IpAddr;

use crate::{
    address::Family,
    bitmask::Bitmask,
    error::{Error, Result},
    masquerade::{FamilyMismatch, Masquerade},
    routability::{LocalRanges, Routability},
};

/// Where the mask of one address family comes from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MaskSource {
    /// [Bitmask::DEFAULT_V4] or [Bitmask::DEFAULT_V6]
    #[default]
    Default,
    /// A CIDR prefix length
    PrefixLen(u8),
    /// Raw mask bytes, any bit pattern
    Octets(Vec<u8>),
    /// A mask in address notation, e.g. `255.255.255.0`
    Address(IpAddr),
}

impl MaskSource {
    fn resolve(&self, family: Family) -> Result<Bitmask> {
        let mask = match self {
            MaskSource::Default => Bitmask::default_for(family),
            MaskSource::PrefixLen(len) => Bitmask::from_prefix_len(*len, family)?,
            MaskSource::Octets(octets) => Bitmask::from_octets(octets)?,
            MaskSource::Address(addr) => Bitmask::from(*addr),
        };

        if mask.family() != family {
            return Err(Error::invalid_argument(format!(
                "{} mask {mask} configured for {family} addresses",
                mask.family()
            )));
        }
        Ok(mask)
    }
}

impl From<u8> for MaskSource {
    fn from(prefix_len: u8) -> Self {
        MaskSource::PrefixLen(prefix_len)
    }
}

impl From<Bitmask> for MaskSource {
    fn from(mask: Bitmask) -> Self {
        MaskSource::Octets(mask.octets().to_vec())
    }
}

/// Builder and configuration for a [Masquerade].
///
/// Leaving a family as `None` builds a single family masquerade; addresses of that family are
/// then handled according to `family_mismatch`.
///
/// ### Usage
///
/// ```rust
/// use bauta::{FamilyMismatch, MasqueradeConfig};
/// use std::net::IpAddr;
///
/// let masquerade = MasqueradeConfig::ipv4()
///     .ipv4_prefix_len(24)
///     .family_mismatch(FamilyMismatch::Passthrough)
///     .build()
///     .unwrap();
///
/// let v4: IpAddr = "198.51.100.23".parse().unwrap();
/// let v6: IpAddr = "2001:db8::1".parse().unwrap();
/// assert_eq!("198.51.100.0", masquerade.mask_any(v4).unwrap().to_string());
/// assert_eq!(v6, masquerade.mask_any(v6).unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MasqueradeConfig {
    pub ipv4: Option<MaskSource>,
    pub ipv6: Option<MaskSource>,
    pub family_mismatch: FamilyMismatch,
    /// Mask loopback, link-local and private addresses too
    pub mask_non_routable: bool,
}

impl Default for MasqueradeConfig {
    fn default() -> Self {
        Self::dual_stack()
    }
}

impl MasqueradeConfig {
    /// IPv4 only, with the default /20 mask
    pub fn ipv4() -> Self {
        MasqueradeConfig {
            ipv4: Some(MaskSource::Default),
            ipv6: None,
            family_mismatch: FamilyMismatch::default(),
            mask_non_routable: false,
        }
    }

    /// IPv6 only, with the default /32 mask
    pub fn ipv6() -> Self {
        MasqueradeConfig {
            ipv4: None,
            ipv6: Some(MaskSource::Default),
            family_mismatch: FamilyMismatch::default(),
            mask_non_routable: false,
        }
    }

    /// Both families with their default masks
    pub fn dual_stack() -> Self {
        MasqueradeConfig {
            ipv4: Some(MaskSource::Default),
            ipv6: Some(MaskSource::Default),
            family_mismatch: FamilyMismatch::default(),
            mask_non_routable: false,
        }
    }

    pub fn ipv4_mask(mut self, source: impl Into<MaskSource>) -> Self {
        self.ipv4 = Some(source.into());
        self
    }

    pub fn ipv6_mask(mut self, source: impl Into<MaskSource>) -> Self {
        self.ipv6 = Some(source.into());
        self
    }

    pub fn ipv4_prefix_len(self, prefix_len: u8) -> Self {
        self.ipv4_mask(MaskSource::PrefixLen(prefix_len))
    }

    pub fn ipv6_prefix_len(self, prefix_len: u8) -> Self {
        self.ipv6_mask(MaskSource::PrefixLen(prefix_len))
    }

    pub fn ipv4_octets(self, octets: impl Into<Vec<u8>>) -> Self {
        self.ipv4_mask(MaskSource::Octets(octets.into()))
    }

    pub fn ipv6_octets(self, octets: impl Into<Vec<u8>>) -> Self {
        self.ipv6_mask(MaskSource::Octets(octets.into()))
    }

    pub fn family_mismatch(mut self, policy: FamilyMismatch) -> Self {
        self.family_mismatch = policy;
        self
    }

    pub fn mask_non_routable(mut self, enabled: bool) -> Self {
        self.mask_non_routable = enabled;
        self
    }

    /// Validates the configuration and builds a masquerade using [LocalRanges]
    pub fn build(&self) -> Result<Masquerade> {
        self.build_with(LocalRanges)
    }

    /// Validates the configuration and builds a masquerade using a custom classifier
    pub fn build_with<C: Routability>(&self, classifier: C) -> Result<Masquerade<C>> {
        let v4 = self
            .ipv4
            .as_ref()
            .map(|source| source.resolve(Family::V4))
            .transpose()?;
        let v6 = self
            .ipv6
            .as_ref()
            .map(|source| source.resolve(Family::V6))
            .transpose()?;

        Masquerade::build(
            v4,
            v6,
            self.family_mismatch,
            self.mask_non_routable,
            classifier,
        )
    }
}
