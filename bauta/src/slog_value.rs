use std::fmt::Display;

use crate::{
    address::Address,
    masquerade::{Masked, Masquerade},
    routability::Routability,
};

/// Emitted in place of an address that could not be masked
pub const UNMASKABLE: &str = "<unmaskable>";

impl<A> slog::Value for Masked<A>
where
    A: Display,
{
    fn serialize(
        &self,
        _record: &slog::Record,
        key: slog::Key,
        serializer: &mut dyn slog::Serializer,
    ) -> slog::Result {
        serializer.emit_arguments(key, &format_args!("{}", &**self))
    }
}

/// An address that is masked only when it gets logged. See [Masquerade::log_value].
pub struct MaskedValue<'a, A, C> {
    masquerade: &'a Masquerade<C>,
    addr: A,
}

impl<A, C> slog::Value for MaskedValue<'_, A, C>
where
    A: Address + Display,
    C: Routability,
{
    fn serialize(
        &self,
        _record: &slog::Record,
        key: slog::Key,
        serializer: &mut dyn slog::Serializer,
    ) -> slog::Result {
        match self.masquerade.mask_strict(self.addr) {
            Ok(addr) => serializer.emit_arguments(key, &format_args!("{addr}")),
            Err(_) => serializer.emit_str(key, UNMASKABLE),
        }
    }
}

impl<C> Masquerade<C>
where
    C: Routability,
{
    /// Wraps `addr` so that it is masked with [Masquerade::mask] when serialized by slog.
    ///
    /// Non-routable addresses are logged as is unless the masquerade masks them too. An address of
    /// a family without a mask is never written, whatever the [crate::FamilyMismatch] policy:
    /// [UNMASKABLE] is logged instead.
    pub fn log_value<A>(&self, addr: A) -> MaskedValue<'_, A, C>
    where
        A: Address + Display,
    {
        MaskedValue {
            masquerade: self,
            addr,
        }
    }
}
