//! SMC transport for SCM calls
//!
//! Issues the SCM call from EL1 with `smc #0` using the ARMv8 SCM
//! register convention:
//!
//! | Register | In                         | Out            |
//! |----------|----------------------------|----------------|
//! | x0       | SMCCC function id          | status         |
//! | x1       | `arginfo`                  | result 1       |
//! | x2..x4   | `args[0..3]`               | result 2, 3    |
//! | x5       | 0 (no indirect arguments)  | -              |
//!
//! Negative firmware codes are remapped to kernel errno values before
//! they reach callers.

use bitflags::bitflags;
use log::debug;

use super::{ScmDesc, SecureCall};
use crate::error::Errno;

bitflags! {
    /// Call-type flags of an SMCCC function id.
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct SmcccFlags: u32 {
        /// Fast (atomic) call; cleared for yielding standard calls.
        const FAST_CALL = 1 << 31;
        /// SMC64 calling convention.
        const SMC64 = 1 << 30;
    }
}

/// An SMCCC function identifier.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(transparent)]
pub struct FunctionId(u32);

impl FunctionId {
    const OWNER_SHIFT: u32 = 24;
    const OWNER_MASK: u32 = 0x3F;
    const FUNC_MASK: u32 = 0xFFFF;

    /// Compose a function id from its fields.
    pub const fn new(flags: SmcccFlags, owner: u8, func: u16) -> Self {
        Self(
            flags.bits()
                | ((owner as u32 & Self::OWNER_MASK) << Self::OWNER_SHIFT)
                | (func as u32 & Self::FUNC_MASK),
        )
    }

    /// Standard (yielding) SMC64 call for an SCM service/command pair.
    pub const fn std_call64(owner: u8, svc: u8, cmd: u8) -> Self {
        Self::new(SmcccFlags::SMC64, owner, ((svc as u16) << 8) | cmd as u16)
    }

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn flags(self) -> SmcccFlags {
        SmcccFlags::from_bits_truncate(self.0)
    }

    #[inline]
    pub const fn owner(self) -> u8 {
        ((self.0 >> Self::OWNER_SHIFT) & Self::OWNER_MASK) as u8
    }

    #[inline]
    pub const fn service(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn command(self) -> u8 {
        self.0 as u8
    }
}

/// Firmware status codes
mod fw {
    pub const ERROR: i64 = -1;
    pub const EINVAL_ARG: i64 = -2;
    pub const EINVAL_ADDR: i64 = -3;
    pub const EOPNOTSUPP: i64 = -4;
    pub const ENOMEM: i64 = -5;
    pub const V2_EBUSY: i64 = -12;
}

/// Map a raw x0 status to the value callers see.
///
/// Zero and positive values pass through, saturating at `i32::MAX`;
/// negative firmware codes become errno values, unknown ones `-EINVAL`.
pub const fn remap_error(ret: i64) -> i32 {
    if ret > i32::MAX as i64 {
        return i32::MAX;
    }
    if ret >= 0 {
        return ret as i32;
    }
    let errno = match ret {
        fw::ERROR => Errno::Eio,
        fw::EINVAL_ARG | fw::EINVAL_ADDR => Errno::Einval,
        fw::EOPNOTSUPP => Errno::Eopnotsupp,
        fw::ENOMEM => Errno::Enomem,
        fw::V2_EBUSY => Errno::Ebusy,
        _ => Errno::Einval,
    };
    errno.as_status()
}

/// Real secure-call transport: traps to EL3 with `smc #0`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SmcTrampoline;

impl SmcTrampoline {
    pub const fn new() -> Self {
        Self
    }
}

impl SecureCall for SmcTrampoline {
    fn invoke(&self, desc: &ScmDesc) -> i32 {
        let fn_id = desc.function_id();
        debug!(
            "[TZ-SMMU] scm call {:#010x} arginfo {:#x} args {:?}",
            fn_id.bits(),
            desc.arginfo.bits(),
            desc.args()
        );
        remap_error(smc_call(
            fn_id.bits() as u64,
            desc.arginfo.bits() as u64,
            desc.args[0],
            desc.args[1],
            desc.args[2],
        ))
    }
}

/// Issue the SMC and return x0.
#[cfg(target_arch = "aarch64")]
#[inline(never)]
fn smc_call(x0: u64, x1: u64, x2: u64, x3: u64, x4: u64) -> i64 {
    let r0: u64;
    // SAFETY: The SMC traps to EL3 firmware, which preserves all
    // registers other than x0-x17 per SMCCC. Arguments are plain values;
    // no memory is shared with firmware for these calls.
    unsafe {
        core::arch::asm!(
            "smc #0",
            inout("x0") x0 => r0,
            inout("x1") x1 => _,
            inout("x2") x2 => _,
            inout("x3") x3 => _,
            inout("x4") x4 => _,
            inout("x5") 0u64 => _,
            lateout("x6") _,
            lateout("x7") _,
            lateout("x8") _,
            lateout("x9") _,
            lateout("x10") _,
            lateout("x11") _,
            lateout("x12") _,
            lateout("x13") _,
            lateout("x14") _,
            lateout("x15") _,
            lateout("x16") _,
            lateout("x17") _,
            options(nostack),
        );
    }
    r0 as i64
}

/// No secure monitor to call on this architecture.
#[cfg(not(target_arch = "aarch64"))]
fn smc_call(_x0: u64, _x1: u64, _x2: u64, _x3: u64, _x4: u64) -> i64 {
    fw::EOPNOTSUPP
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scm::{owner, svc};

    #[test]
    fn test_function_id_layout() {
        let id = FunctionId::std_call64(owner::SIP, svc::MP, 0x21);
        assert_eq!(id.bits(), 0x4200_0C21);
        assert_eq!(id.flags(), SmcccFlags::SMC64);
        assert_eq!(id.owner(), owner::SIP);
        assert_eq!(id.service(), svc::MP);
        assert_eq!(id.command(), 0x21);

        let id = FunctionId::std_call64(owner::SIP, svc::SMMU_PROGRAM, 0x01);
        assert_eq!(id.bits(), 0x4200_1501);
    }

    #[test]
    fn test_fast_call_flag() {
        let id = FunctionId::new(SmcccFlags::FAST_CALL | SmcccFlags::SMC64, owner::STANDARD, 0);
        assert_eq!(id.bits(), 0xC400_0000);
        assert!(id.flags().contains(SmcccFlags::FAST_CALL));
    }

    #[test]
    fn test_remap_error() {
        assert_eq!(remap_error(0), 0);
        assert_eq!(remap_error(1), 1);
        assert_eq!(remap_error(-1), -5);
        assert_eq!(remap_error(-2), -22);
        assert_eq!(remap_error(-3), -22);
        assert_eq!(remap_error(-4), -95);
        assert_eq!(remap_error(-5), -12);
        assert_eq!(remap_error(-12), -16);
        assert_eq!(remap_error(-100), -22);
    }

    #[test]
    fn test_remap_large_positive_saturates() {
        assert_eq!(remap_error(i32::MAX as i64), i32::MAX);
        assert_eq!(remap_error(0x1_0000_0001), i32::MAX);
        assert_eq!(remap_error(i64::MAX), i32::MAX);
    }

    #[cfg(not(target_arch = "aarch64"))]
    #[test]
    fn test_trampoline_unsupported_off_target() {
        let desc = ScmDesc::sip(svc::MP, 0x21).with_vals(0, 0, 1);
        assert_eq!(SmcTrampoline::new().invoke(&desc), -95);
    }
}
