//! TrustZone SMMU operations
//!
//! Secure firmware owns parts of the SMMU configuration. The kernel SMMU
//! driver asks it to:
//! - open or close an ATOS (address translation operation) window on a
//!   context bank, so the driver can run hardware translations;
//! - switch a secure context bank to the AArch64 page-table format.
//!
//! Every operation is a single synchronous secure call. No session state
//! is kept here: pairing `atos_start` with `atos_end` and ordering format
//! changes against ATOS windows is up to the caller.

use log::{info, warn};

use crate::device_id::TzDeviceId;
use crate::error::{check_status, TzError};
use crate::of::Device;
use crate::resolve::try_resolve_device_identifier;
use crate::scm::{svc, ScmDesc, SecureCall};

/// SCM command ids
pub mod cmd {
    /// Prepare an ATOS window (MP service)
    pub const TZ_SMMU_PREPARE_ATOS_ID: u8 = 0x21;
    /// Change the page-table format of a context bank (SMMU_PROGRAM service)
    pub const SMMU_CHANGE_PAGETABLE_FORMAT: u8 = 0x01;
}

/// ATOS operation codes
#[repr(u64)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AtosOp {
    End = 0,
    Start = 1,
}

impl AtosOp {
    fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
        }
    }
}

/// Page-table format change: enable flag passed to firmware.
const CB_FORMAT_ENABLE: u64 = 1;

/// Front end for TZ SMMU secure calls.
///
/// # Type Parameters
/// * `C` - Transport delivering the calls (`SmcTrampoline` on hardware)
pub struct TzSmmu<C> {
    scm: C,
}

impl<C: SecureCall> TzSmmu<C> {
    pub const fn new(scm: C) -> Self {
        Self { scm }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &C {
        &self.scm
    }

    /// Open an ATOS window on context bank `cb_num` of `dev`'s SMMU.
    ///
    /// # Returns
    /// * `Err(TzError::NoDevice)` - `dev` has no known TZ device id;
    ///   firmware is not called
    /// * `Err(TzError::Firmware)` - firmware status, unchanged
    pub fn atos_start<D: Device + ?Sized>(&self, dev: &D, cb_num: u32) -> Result<(), TzError> {
        self.atos(dev, cb_num, AtosOp::Start)
    }

    /// Close the ATOS window opened by [`TzSmmu::atos_start`].
    pub fn atos_end<D: Device + ?Sized>(&self, dev: &D, cb_num: u32) -> Result<(), TzError> {
        self.atos(dev, cb_num, AtosOp::End)
    }

    fn atos<D: Device + ?Sized>(&self, dev: &D, cb_num: u32, op: AtosOp) -> Result<(), TzError> {
        let devid = try_resolve_device_identifier(dev).map_err(TzError::NoDevice)?;

        let desc = ScmDesc::sip(svc::MP, cmd::TZ_SMMU_PREPARE_ATOS_ID).with_vals(
            devid.raw() as u64,
            cb_num as u64,
            op as u64,
        );

        let ret = self.scm.invoke(&desc);
        if ret != 0 {
            info!("[TZ-SMMU] TZ SMMU ATOS {} failed, ret = {}", op.as_str(), ret);
        }
        check_status(ret)
    }

    /// Switch secure context bank `cbndx` of `sec_id` to the AArch64
    /// page-table format.
    ///
    /// `sec_id` is taken as is; no device lookup happens here.
    pub fn set_cb_format(&self, sec_id: TzDeviceId, cbndx: u32) -> Result<(), TzError> {
        let desc = ScmDesc::sip(svc::SMMU_PROGRAM, cmd::SMMU_CHANGE_PAGETABLE_FORMAT).with_vals(
            sec_id.raw() as u64,
            cbndx as u64,
            CB_FORMAT_ENABLE,
        );

        let ret = self.scm.invoke(&desc);
        if ret != 0 {
            warn!(
                "[TZ-SMMU] Format change failed for CB {} with ret {}",
                cbndx, ret
            );
        }
        check_status(ret)
    }
}
