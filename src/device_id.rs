//! TrustZone Device Identifiers
//!
//! Secure firmware knows every SMMU-attached peripheral by a small
//! integer. The kernel only knows the device-tree name of that
//! peripheral, so this module carries the fixed mapping between the two.
//!
//! # Layout
//! ```text
//! TZ_DEVICE_START (0)                      TZ_DEVICE_MAX (28)
//! ├─ VIDEO ─ MDSS ─ LPASS ─ ... ─ CPP ─ JPEG ─┤ sentinel, no name
//! ```
//!
//! The numeric values are part of the firmware ABI and must not change.

use spin::Once;

/// First valid device id.
pub const TZ_DEVICE_START: u32 = 0;

/// Exclusive upper bound; also the raw "unknown device" sentinel.
pub const TZ_DEVICE_MAX: u32 = 28;

/// Number of known devices.
pub const TZ_DEVICE_COUNT: usize = (TZ_DEVICE_MAX - TZ_DEVICE_START) as usize;

/// Longest canonical name firmware tables carry.
pub const MAX_DEVICE_ID_NAME_LEN: usize = 20;

/// A peripheral known to the secure firmware.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(u32)]
pub enum TzDeviceId {
    Video = 0,
    Mdss = 1,
    Lpass = 2,
    MdssBoot = 3,
    Usb1Hs = 4,
    Ocmem = 5,
    LpassCore = 6,
    Vpu = 7,
    CopssSmmu = 8,
    Usb3_0 = 9,
    Usb3_1 = 10,
    Pcie0 = 11,
    Pcie1 = 12,
    Bcss = 13,
    Vcap = 14,
    Pcie20 = 15,
    Ipa = 16,
    Apps = 17,
    Gpu = 18,
    Ufs = 19,
    Ice = 20,
    Rot = 21,
    Vfe = 22,
    Anoc0 = 23,
    Anoc1 = 24,
    Anoc2 = 25,
    Cpp = 26,
    Jpeg = 27,
}

impl TzDeviceId {
    /// Every device id, in ascending numeric order.
    pub const ALL: [TzDeviceId; TZ_DEVICE_COUNT] = [
        Self::Video,
        Self::Mdss,
        Self::Lpass,
        Self::MdssBoot,
        Self::Usb1Hs,
        Self::Ocmem,
        Self::LpassCore,
        Self::Vpu,
        Self::CopssSmmu,
        Self::Usb3_0,
        Self::Usb3_1,
        Self::Pcie0,
        Self::Pcie1,
        Self::Bcss,
        Self::Vcap,
        Self::Pcie20,
        Self::Ipa,
        Self::Apps,
        Self::Gpu,
        Self::Ufs,
        Self::Ice,
        Self::Rot,
        Self::Vfe,
        Self::Anoc0,
        Self::Anoc1,
        Self::Anoc2,
        Self::Cpp,
        Self::Jpeg,
    ];

    /// Canonical device-tree name of this device.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Video => "VIDEO",
            Self::Mdss => "MDSS",
            Self::Lpass => "LPASS",
            Self::MdssBoot => "MDSS_BOOT",
            Self::Usb1Hs => "USB1_HS",
            Self::Ocmem => "OCMEM",
            Self::LpassCore => "LPASS_CORE",
            Self::Vpu => "VPU",
            Self::CopssSmmu => "COPSS_SMMU",
            Self::Usb3_0 => "USB3_0",
            Self::Usb3_1 => "USB3_1",
            Self::Pcie0 => "PCIE_0",
            Self::Pcie1 => "PCIE_1",
            Self::Bcss => "BCSS",
            Self::Vcap => "VCAP",
            Self::Pcie20 => "PCIE20",
            Self::Ipa => "IPA",
            Self::Apps => "APPS",
            Self::Gpu => "GPU",
            Self::Ufs => "UFS",
            Self::Ice => "ICE",
            Self::Rot => "ROT",
            Self::Vfe => "VFE",
            Self::Anoc0 => "ANOC0",
            Self::Anoc1 => "ANOC1",
            Self::Anoc2 => "ANOC2",
            Self::Cpp => "CPP",
            Self::Jpeg => "JPEG",
        }
    }

    /// Raw firmware value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self as u32
    }

    /// Convert a raw firmware value. The sentinel and anything above it
    /// yield `None`.
    #[inline]
    pub const fn from_raw(raw: u32) -> Option<Self> {
        if raw >= TZ_DEVICE_MAX {
            return None;
        }
        Some(Self::ALL[(raw - TZ_DEVICE_START) as usize])
    }

    /// Look up a device by its canonical name (exact, case-sensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        name_table().lookup(name)
    }

    /// Iterate over all device ids in ascending order.
    pub fn iter() -> impl Iterator<Item = TzDeviceId> {
        Self::ALL.into_iter()
    }
}

/// Problems a name table can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableError {
    /// Entry is not at the index of its own id.
    Misordered(u32),
    /// Entry has an empty name.
    Empty(u32),
    /// Entry name is longer than `MAX_DEVICE_ID_NAME_LEN`.
    TooLong(u32),
    /// Entry name has characters outside `[A-Z0-9_]`.
    NotCanonical(u32),
    /// Two entries share a name; carries the higher id.
    Duplicate(u32),
}

/// Immutable `TzDeviceId -> name` mapping.
pub struct NameTable {
    names: [&'static str; TZ_DEVICE_COUNT],
}

impl NameTable {
    /// Build the table from `TzDeviceId::name`.
    ///
    /// Validation runs in debug builds; `test_table_is_valid` covers the
    /// built-in table.
    pub fn build() -> Self {
        let mut names = [""; TZ_DEVICE_COUNT];
        for id in TzDeviceId::iter() {
            names[(id.raw() - TZ_DEVICE_START) as usize] = id.name();
        }
        let table = Self { names };
        debug_assert_eq!(table.validate(), Ok(()), "[TZ-SMMU] invalid device id table");
        table
    }

    /// Check completeness, naming, and uniqueness of every entry.
    pub fn validate(&self) -> Result<(), TableError> {
        for (idx, id) in TzDeviceId::ALL.iter().enumerate() {
            let raw = id.raw();
            if raw != TZ_DEVICE_START + idx as u32 {
                return Err(TableError::Misordered(raw));
            }

            let name = self.names[idx];
            if name.is_empty() {
                return Err(TableError::Empty(raw));
            }
            if name.len() > MAX_DEVICE_ID_NAME_LEN {
                return Err(TableError::TooLong(raw));
            }
            let canonical = name
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_');
            if !canonical {
                return Err(TableError::NotCanonical(raw));
            }
            if self.names[..idx].contains(&name) {
                return Err(TableError::Duplicate(raw));
            }
        }
        Ok(())
    }

    /// Name registered for `id`.
    #[inline]
    pub fn name(&self, id: TzDeviceId) -> &'static str {
        self.names[(id.raw() - TZ_DEVICE_START) as usize]
    }

    /// Linear scan over [start, max); first exact match wins.
    pub fn lookup(&self, name: &str) -> Option<TzDeviceId> {
        self.names
            .iter()
            .position(|&entry| entry == name)
            .and_then(|idx| TzDeviceId::from_raw(TZ_DEVICE_START + idx as u32))
    }
}

static NAME_TABLE: Once<NameTable> = Once::new();

/// The process-wide name table, built on first use.
pub fn name_table() -> &'static NameTable {
    NAME_TABLE.call_once(NameTable::build)
}
