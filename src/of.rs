//! Device-tree access for platform devices
//!
//! The resolver only ever needs one thing from a device: a named string
//! property of its firmware node. [`Device`] captures exactly that, and
//! [`FdtDevice`] provides it for a node of a flattened device tree.

use fdt::node::{FdtNode, NodeProperty};
use fdt::Fdt;

/// A platform device with an associated firmware node.
pub trait Device {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Read a string-valued property of the device's node.
    ///
    /// Returns `None` if the property is absent or not a valid string.
    fn read_string_property(&self, key: &str) -> Option<&str>;
}

impl<D: Device + ?Sized> Device for &D {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn read_string_property(&self, key: &str) -> Option<&str> {
        (**self).read_string_property(key)
    }
}

/// Decode a device-tree string property.
///
/// The value must carry a NUL terminator within its length and be valid
/// UTF-8; the string ends at the first NUL. An empty string (`"\0"`) is
/// readable and decodes to `""`.
pub fn property_str<'a>(prop: &NodeProperty<'a>) -> Option<&'a str> {
    if !prop.value.contains(&0) {
        return None;
    }
    prop.as_str()?.split('\0').next()
}

/// A device backed by a node of a flattened device tree.
#[derive(Clone, Copy)]
pub struct FdtDevice<'b, 'a: 'b> {
    node: FdtNode<'b, 'a>,
}

impl<'b, 'a: 'b> FdtDevice<'b, 'a> {
    /// Wrap an already located node.
    pub const fn new(node: FdtNode<'b, 'a>) -> Self {
        Self { node }
    }

    /// Look up a node by its full path, e.g. `/soc/mdss@900000`.
    pub fn find(fdt: &'b Fdt<'a>, path: &str) -> Option<Self> {
        fdt.find_node(path).map(Self::new)
    }

    /// The wrapped node.
    pub fn node(&self) -> FdtNode<'b, 'a> {
        self.node
    }
}

impl Device for FdtDevice<'_, '_> {
    fn name(&self) -> &str {
        self.node.name
    }

    fn read_string_property(&self, key: &str) -> Option<&str> {
        self.node.property(key).as_ref().and_then(property_str)
    }
}
