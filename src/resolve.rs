//! Device Identifier Resolver
//!
//! Maps a platform device to the id secure firmware uses for it, by
//! reading the `qcom,tz-device-id` string from the device's node and
//! matching it against the device name table.

use log::{debug, error};

use crate::device_id::{name_table, TzDeviceId};
use crate::error::ResolveError;
use crate::of::Device;

/// Device-tree property holding the canonical device name.
pub const TZ_DEVICE_ID_PROPERTY: &str = "qcom,tz-device-id";

/// Resolve `dev`, keeping the reason for a failure.
pub fn try_resolve_device_identifier<D: Device + ?Sized>(
    dev: &D,
) -> Result<TzDeviceId, ResolveError> {
    let Some(device_id) = dev.read_string_property(TZ_DEVICE_ID_PROPERTY) else {
        error!("[TZ-SMMU] {}: no {} property", dev.name(), TZ_DEVICE_ID_PROPERTY);
        return Err(ResolveError::MissingProperty);
    };

    name_table().lookup(device_id).ok_or_else(|| {
        debug!("[TZ-SMMU] {}: unknown device id {:?}", dev.name(), device_id);
        ResolveError::UnknownName
    })
}

/// Resolve `dev` to its TrustZone device id.
///
/// `None` is the "unknown device" sentinel (`TZ_DEVICE_MAX` on the wire)
/// and covers both a missing property and an unmatched name.
pub fn resolve_device_identifier<D: Device + ?Sized>(dev: &D) -> Option<TzDeviceId> {
    try_resolve_device_identifier(dev).ok()
}
