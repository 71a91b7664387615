//! Secure Channel Manager (SCM) calls
//!
//! An SCM call names a firmware service and a command within it, and
//! carries a handful of register-sized arguments. Every argument is
//! tagged in `arginfo` so firmware knows whether it is a plain value or
//! a buffer it has to map.
//!
//! # Call Descriptor
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        ScmDesc                           │
//! ├──────────────────────────────────────────────────────────┤
//! │  svc: u8          - Firmware service (MP, SMMU_PROGRAM)  │
//! │  cmd: u8          - Command within the service           │
//! │  owner: u8        - SMCCC owning entity (SIP)            │
//! │  args: [u64; 3]   - Register arguments                   │
//! │  arginfo: ArgInfo - Count [3:0], 2-bit type per arg [..4]│
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The transport itself is behind [`SecureCall`]; [`SmcTrampoline`] is
//! the real one.

mod smccc;

pub use smccc::{remap_error, FunctionId, SmcTrampoline, SmcccFlags};

/// Firmware service ids
pub mod svc {
    /// Memory protection service
    pub const MP: u8 = 0x0C;
    /// SMMU programming service
    pub const SMMU_PROGRAM: u8 = 0x15;
}

/// SMCCC owning entity numbers
pub mod owner {
    /// SiP service calls (vendor firmware)
    pub const SIP: u8 = 2;
    /// Standard secure service calls
    pub const STANDARD: u8 = 4;
}

/// Maximum number of register arguments carried by a descriptor.
pub const SCM_MAX_ARGS: usize = 3;

/// How firmware should treat an argument.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u32)]
pub enum ScmArgType {
    /// Plain scalar value
    Val = 0,
    /// Read-only buffer address
    Ro = 1,
    /// Read-write buffer address
    Rw = 2,
    /// Buffer passed by value
    BufVal = 3,
}

impl ScmArgType {
    const fn from_bits(bits: u32) -> Self {
        match bits & 0x3 {
            0 => Self::Val,
            1 => Self::Ro,
            2 => Self::Rw,
            _ => Self::BufVal,
        }
    }
}

/// Argument count and per-argument types, as firmware expects in x1.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[repr(transparent)]
pub struct ArgInfo(u32);

impl ArgInfo {
    const COUNT_MASK: u32 = 0xF;
    const TYPE_SHIFT: u32 = 4;
    const TYPE_BITS: u32 = 2;

    /// Encode the given argument types.
    ///
    /// Types past `SCM_MAX_ARGS` are ignored.
    pub const fn new(types: &[ScmArgType]) -> Self {
        let count = if types.len() > SCM_MAX_ARGS {
            SCM_MAX_ARGS
        } else {
            types.len()
        };
        let mut bits = count as u32 & Self::COUNT_MASK;
        let mut i = 0;
        while i < count {
            bits |= (types[i] as u32) << (Self::TYPE_SHIFT + Self::TYPE_BITS * i as u32);
            i += 1;
        }
        Self(bits)
    }

    /// `count` plain scalar arguments.
    pub const fn vals(count: usize) -> Self {
        // VAL encodes as 0, so only the count is set.
        let count = if count > SCM_MAX_ARGS {
            SCM_MAX_ARGS
        } else {
            count
        };
        Self(count as u32 & Self::COUNT_MASK)
    }

    /// Raw encoding.
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Number of arguments present.
    #[inline]
    pub const fn count(self) -> usize {
        (self.0 & Self::COUNT_MASK) as usize
    }

    /// Type of argument `idx`, if present.
    pub const fn arg_type(self, idx: usize) -> Option<ScmArgType> {
        if idx >= self.count() {
            return None;
        }
        let shift = Self::TYPE_SHIFT + Self::TYPE_BITS * idx as u32;
        Some(ScmArgType::from_bits(self.0 >> shift))
    }
}

/// One secure call, built per request and dropped after it returns.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ScmDesc {
    pub svc: u8,
    pub cmd: u8,
    pub owner: u8,
    pub args: [u64; SCM_MAX_ARGS],
    pub arginfo: ArgInfo,
}

impl ScmDesc {
    /// A SiP-owned call with no arguments.
    pub const fn sip(svc: u8, cmd: u8) -> Self {
        Self {
            svc,
            cmd,
            owner: owner::SIP,
            args: [0; SCM_MAX_ARGS],
            arginfo: ArgInfo::vals(0),
        }
    }

    /// Set three scalar arguments.
    pub const fn with_vals(mut self, a0: u64, a1: u64, a2: u64) -> Self {
        self.args = [a0, a1, a2];
        self.arginfo = ArgInfo::vals(3);
        self
    }

    /// Function id this descriptor is dispatched under.
    #[inline]
    pub const fn function_id(&self) -> FunctionId {
        FunctionId::std_call64(self.owner, self.svc, self.cmd)
    }

    /// The arguments actually carried, per `arginfo`.
    pub fn args(&self) -> &[u64] {
        &self.args[..self.arginfo.count()]
    }
}

/// Something that can deliver an SCM call to secure firmware.
///
/// Returns 0 on success; any other value is an opaque failure code that
/// callers pass on unchanged.
pub trait SecureCall {
    fn invoke(&self, desc: &ScmDesc) -> i32;
}

impl<C: SecureCall + ?Sized> SecureCall for &C {
    fn invoke(&self, desc: &ScmDesc) -> i32 {
        (**self).invoke(desc)
    }
}
