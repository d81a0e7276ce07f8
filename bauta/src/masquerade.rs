use std::{net::IpAddr, ops::Deref};

use crate::{
    address::{Address, Family},
    bitmask::Bitmask,
    error::{Error, Result},
    routability::{LocalRanges, Routability},
};

/// What to do with an address whose family has no mask configured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FamilyMismatch {
    /// Fail with [Error::UnsupportedAddressFamily]
    #[default]
    Reject,
    /// Hand the address back unchanged
    Passthrough,
}

/// The address families a [Masquerade] holds masks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stack {
    V4,
    V6,
    DualStack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Masks {
    Single(Bitmask),
    DualStack { v4: Bitmask, v6: Bitmask },
}

/// Masks addresses by ANDing them with a fixed [Bitmask] per address family.
///
/// A masquerade is immutable once built and can be shared freely between threads. Build one
/// with [crate::MasqueradeConfig], [Masquerade::new] or [Masquerade::dual_stack].
///
/// ### Usage
///
/// ```rust
/// use bauta::Masquerade;
/// use std::net::{IpAddr, Ipv4Addr};
///
/// let masquerade = Masquerade::default();
///
/// let addr = Ipv4Addr::new(203, 0, 113, 42);
/// assert_eq!(Ipv4Addr::new(203, 0, 112, 0), masquerade.mask_any(addr).unwrap());
///
/// // local addresses are left alone
/// let addr: IpAddr = "fe80::1".parse().unwrap();
/// assert_eq!(addr, masquerade.mask_public_routable_only(addr).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct Masquerade<C = LocalRanges> {
    masks: Masks,
    family_mismatch: FamilyMismatch,
    mask_non_routable: bool,
    classifier: C,
}

impl Masquerade {
    /// A single family masquerade that rejects addresses of the other family
    pub fn new(bitmask: Bitmask) -> Self {
        Self::from_parts(
            Masks::Single(bitmask),
            FamilyMismatch::Reject,
            false,
            LocalRanges,
        )
    }

    /// A masquerade serving both families. `v4` must be an IPv4 mask and `v6` an IPv6 mask.
    pub fn dual_stack(v4: Bitmask, v6: Bitmask) -> Result<Self> {
        let masks = dual_stack_masks(v4, v6)?;
        Ok(Self::from_parts(
            masks,
            FamilyMismatch::Reject,
            false,
            LocalRanges,
        ))
    }
}

impl Default for Masquerade {
    /// Dual stack with the default masks: /20 for IPv4 and /32 for IPv6
    fn default() -> Self {
        Self::from_parts(
            Masks::DualStack {
                v4: Bitmask::DEFAULT_V4,
                v6: Bitmask::DEFAULT_V6,
            },
            FamilyMismatch::Reject,
            false,
            LocalRanges,
        )
    }
}

fn dual_stack_masks(v4: Bitmask, v6: Bitmask) -> Result<Masks> {
    if v4.family() != Family::V4 {
        return Err(Error::invalid_argument(format!(
            "expected an IPv4 mask, got {v4}"
        )));
    }
    if v6.family() != Family::V6 {
        return Err(Error::invalid_argument(format!(
            "expected an IPv6 mask, got {v6}"
        )));
    }
    Ok(Masks::DualStack { v4, v6 })
}

impl<C> Masquerade<C> {
    fn from_parts(
        masks: Masks,
        family_mismatch: FamilyMismatch,
        mask_non_routable: bool,
        classifier: C,
    ) -> Self {
        Masquerade {
            masks,
            family_mismatch,
            mask_non_routable,
            classifier,
        }
    }

    pub(crate) fn build(
        v4: Option<Bitmask>,
        v6: Option<Bitmask>,
        family_mismatch: FamilyMismatch,
        mask_non_routable: bool,
        classifier: C,
    ) -> Result<Self> {
        let masks = match (v4, v6) {
            (Some(v4), Some(v6)) => dual_stack_masks(v4, v6)?,
            (Some(mask), None) | (None, Some(mask)) => Masks::Single(mask),
            (None, None) => {
                return Err(Error::invalid_argument(
                    "at least one address family must be configured",
                ))
            }
        };
        Ok(Self::from_parts(
            masks,
            family_mismatch,
            mask_non_routable,
            classifier,
        ))
    }

    pub fn stack(&self) -> Stack {
        match self.masks {
            Masks::Single(Bitmask::V4(_)) => Stack::V4,
            Masks::Single(Bitmask::V6(_)) => Stack::V6,
            Masks::DualStack { .. } => Stack::DualStack,
        }
    }

    /// The mask applied to addresses of `family`, if any
    pub fn bitmask(&self, family: Family) -> Option<&Bitmask> {
        match &self.masks {
            Masks::Single(mask) => (mask.family() == family).then_some(mask),
            Masks::DualStack { v4, v6 } => match family {
                Family::V4 => Some(v4),
                Family::V6 => Some(v6),
            },
        }
    }

    pub fn family_mismatch(&self) -> FamilyMismatch {
        self.family_mismatch
    }

    /// Whether [Masquerade::mask] also masks non-routable addresses
    pub fn masks_non_routable(&self) -> bool {
        self.mask_non_routable
    }

    /// The classifier deciding which addresses are non-routable
    pub fn classifier(&self) -> &C {
        &self.classifier
    }
}

impl<C> Masquerade<C>
where
    C: Routability,
{
    /// ANDs `addr` with the mask of its family, failing if there is none
    fn apply<A: Address>(&self, addr: A) -> Result<A> {
        let ip = addr.into_ip();
        let family = Family::of(ip);

        let mask = match &self.masks {
            Masks::DualStack { v4, v6 } => match family {
                Family::V4 => v4,
                Family::V6 => v6,
            },
            Masks::Single(mask) => mask,
        };

        mask.apply(ip)
            .and_then(A::from_ip)
            .ok_or(Error::UnsupportedAddressFamily {
                address: ip,
                configured: mask.family(),
            })
    }

    /// Masks `addr` regardless of the range it belongs to.
    ///
    /// Addresses of a family without a configured mask are rejected or passed through depending
    /// on [FamilyMismatch].
    pub fn mask_any<A: Address>(&self, addr: A) -> Result<A> {
        match self.apply(addr) {
            Err(Error::UnsupportedAddressFamily { .. })
                if self.family_mismatch == FamilyMismatch::Passthrough =>
            {
                Ok(addr)
            }
            masked => masked,
        }
    }

    /// Masks `addr` unless the classifier reports it as non-routable, in which case it is
    /// returned as is.
    pub fn mask_public_routable_only<A: Address>(&self, addr: A) -> Result<A> {
        if self.classifier.is_non_routable(addr.into_ip()) {
            return Ok(addr);
        }
        self.mask_any(addr)
    }

    /// Masks `addr` the way this masquerade was configured to: every address when
    /// `mask_non_routable` is set, publicly routable addresses only otherwise.
    pub fn mask<A: Address>(&self, addr: A) -> Result<A> {
        if self.mask_non_routable {
            self.mask_any(addr)
        } else {
            self.mask_public_routable_only(addr)
        }
    }

    /// Like [Masquerade::mask], but an address of a family without a mask always fails with
    /// [Error::UnsupportedAddressFamily], whatever the [FamilyMismatch] policy.
    pub(crate) fn mask_strict<A: Address>(&self, addr: A) -> Result<A> {
        if !self.mask_non_routable && self.classifier.is_non_routable(addr.into_ip()) {
            return Ok(addr);
        }
        self.apply(addr)
    }

    /// Same as [Masquerade::mask], wrapped in a [Masked] guard.
    ///
    /// Addresses of a family without a configured mask are always rejected here, even with
    /// [FamilyMismatch::Passthrough].
    pub fn masked<A: Address>(&self, addr: A) -> Result<Masked<A>> {
        self.mask_strict(addr).map(Masked)
    }

    /// Masks raw address bytes, 4 for IPv4 and 16 for IPv6, with [Masquerade::mask_any]
    pub fn mask_octets(&self, octets: &[u8]) -> Result<Vec<u8>> {
        let addr = crate::address::from_octets(octets)?;
        Ok(match self.mask_any(addr)? {
            IpAddr::V4(addr) => addr.octets().to_vec(),
            IpAddr::V6(addr) => addr.octets().to_vec(),
        })
    }
}

/// [Masked] is a type guard that can be used to ensure that addresses have been through a
/// [Masquerade]. It can only be obtained from [Masquerade::masked], so it holds either a masked
/// address or one the masquerade's classifier deemed non-routable. It never holds an address of a
/// family the masquerade has no mask for.
///
/// ### Usage
///
/// ```rust
/// use bauta::{Masked, Masquerade};
/// use std::net::IpAddr;
///
/// let masquerade = Masquerade::default();
/// let peer: IpAddr = "2001:db8:85a3::8a2e:370:7334".parse().unwrap();
///
/// record_visit(masquerade.masked(peer).unwrap());
///
/// fn record_visit(peer: Masked<IpAddr>) {
///     assert_eq!("2001:db8::", peer.to_string());
/// }
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Masked<A>(A);

impl<A> Masked<A> {
    pub fn into_inner(self) -> A {
        self.0
    }
}

impl<A> Deref for Masked<A> {
    type Target = A;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<A> std::fmt::Display for Masked<A>
where
    A: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl<A> std::fmt::Debug for Masked<A>
where
    A: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.0, f)
    }
}

#[cfg(feature = "serde")]
impl<A> serde::Serialize for Masked<A>
where
    A: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}
