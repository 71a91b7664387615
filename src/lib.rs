//! tz-smmu - TrustZone SMMU secure-call shim
//!
//! Lets an SMMU driver on Qualcomm-style ARM64 platforms ask secure
//! firmware to open and close ATOS windows on a context bank, and to
//! switch a secure context bank to the AArch64 page-table format.
//!
//! # Flow
//! ```text
//! SMMU driver ──► resolve (device ──► TzDeviceId) ──► ScmDesc ──► SecureCall
//!      ▲                                                              │
//!      └────────────────────── status (0 / errno / firmware code) ◄───┘
//! ```
//!
//! # Security Properties
//! - Firmware is never called for a device without a known TZ id
//! - Firmware status codes reach the caller unchanged
//! - The device name table is immutable and validated on first use
//! - No state is kept between calls

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod device_id;
pub mod error;
pub mod of;
pub mod resolve;
pub mod scm;
pub mod tz_smmu;

#[cfg(test)]
mod testing;

pub use device_id::{name_table, TzDeviceId, TZ_DEVICE_MAX, TZ_DEVICE_START};
pub use error::{tz_status, Errno, ResolveError, TzError};
pub use of::{Device, FdtDevice};
pub use resolve::{resolve_device_identifier, try_resolve_device_identifier};
pub use scm::{ArgInfo, ScmDesc, SecureCall, SmcTrampoline};
pub use tz_smmu::TzSmmu;
