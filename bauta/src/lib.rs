#![doc = include_str!("../../README.md")]

pub mod address;
mod bitmask;
mod config;
mod error;
mod masquerade;
mod routability;

#[cfg(feature = "slog")]
mod slog_value;

pub use address::{Address, Family};
pub use bitmask::Bitmask;
pub use config::{MaskSource, MasqueradeConfig};
pub use error::{Error, Result};
pub use masquerade::{FamilyMismatch, Masked, Masquerade, Stack};
pub use routability::{LocalRanges, Routability};

#[cfg(feature = "slog")]
pub use slog_value::{MaskedValue, UNMASKABLE};

#[cfg(feature = "serde")]
#[doc(hidden)]
pub use ::serde;

#[cfg(feature = "slog")]
#[doc(hidden)]
pub use ::slog;
