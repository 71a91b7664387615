//! Error Types
//!
//! Secure-call failures are reported to callers as raw kernel-style
//! status codes (0 on success, negative errno or an opaque firmware code
//! otherwise). Internally they travel as [`TzError`] so the cause of a
//! failure is never lost before it reaches the contract boundary.

use core::fmt;

/// Kernel errno values produced by this crate
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Errno {
    /// I/O error (generic firmware failure)
    Eio = -5,
    /// Out of memory
    Enomem = -12,
    /// Device or resource busy
    Ebusy = -16,
    /// No such device
    Enodev = -19,
    /// Invalid argument
    Einval = -22,
    /// Operation not supported
    Eopnotsupp = -95,
}

impl Errno {
    /// Get the raw (negative) status value.
    #[inline]
    pub const fn as_status(self) -> i32 {
        self as i32
    }
}

/// Why a device could not be mapped to a TrustZone device id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveError {
    /// The device node has no `qcom,tz-device-id` string.
    MissingProperty,
    /// The property is present but names no known device.
    UnknownName,
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingProperty => f.write_str("missing qcom,tz-device-id property"),
            Self::UnknownName => f.write_str("unknown TZ device id name"),
        }
    }
}

/// Failure of a TZ SMMU operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TzError {
    /// Device resolution failed; firmware was not called.
    NoDevice(ResolveError),
    /// Secure call returned a non-zero status, kept verbatim.
    Firmware(i32),
}

impl TzError {
    /// Raw status code for this error.
    ///
    /// `NoDevice` is always `-ENODEV`; firmware codes are returned as-is.
    #[inline]
    pub const fn errno(self) -> i32 {
        match self {
            Self::NoDevice(_) => Errno::Enodev.as_status(),
            Self::Firmware(code) => code,
        }
    }
}

impl From<TzError> for i32 {
    fn from(err: TzError) -> i32 {
        err.errno()
    }
}

impl fmt::Display for TzError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDevice(cause) => write!(f, "no such device ({})", cause),
            Self::Firmware(code) => write!(f, "secure call failed, ret = {}", code),
        }
    }
}

/// Interpret a raw secure-call status.
#[inline]
pub fn check_status(ret: i32) -> Result<(), TzError> {
    if ret == 0 {
        Ok(())
    } else {
        Err(TzError::Firmware(ret))
    }
}

/// Fold an operation result back into a raw status (0 on success).
#[inline]
pub fn tz_status(result: Result<(), TzError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => e.errno(),
    }
}
