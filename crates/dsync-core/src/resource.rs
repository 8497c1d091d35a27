//! Resource kinds, identity keys and the record trait shared by all tables

use crate::audio::{AudioDestination, AudioSource};
use crate::gpio::{GpioInput, GpioOutput};
use crate::node::NetworkNode;
use crate::store::ResourceStore;
use crate::table::ResourceTable;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The five classes of resource mirrored from the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Node,
    Source,
    Destination,
    GpioInput,
    GpioOutput,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Node,
        ResourceKind::Source,
        ResourceKind::Destination,
        ResourceKind::GpioInput,
        ResourceKind::GpioOutput,
    ];

    /// Short tag used by the controller's frame vocabulary
    pub fn tag(&self) -> &'static str {
        match self {
            ResourceKind::Node => "NODE",
            ResourceKind::Source => "SRC",
            ResourceKind::Destination => "DST",
            ResourceKind::GpioInput => "GPI",
            ResourceKind::GpioOutput => "GPO",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Node => write!(f, "node"),
            ResourceKind::Source => write!(f, "source"),
            ResourceKind::Destination => write!(f, "destination"),
            ResourceKind::GpioInput => write!(f, "gpio input"),
            ResourceKind::GpioOutput => write!(f, "gpio output"),
        }
    }
}

impl std::str::FromStr for ResourceKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NODE" | "NODES" => Ok(ResourceKind::Node),
            "SRC" | "SOURCE" | "SOURCES" => Ok(ResourceKind::Source),
            "DST" | "DESTINATION" | "DESTINATIONS" => Ok(ResourceKind::Destination),
            "GPI" | "GPIS" => Ok(ResourceKind::GpioInput),
            "GPO" | "GPOS" => Ok(ResourceKind::GpioOutput),
            _ => Err(crate::Error::invalid_field("resource kind", s)),
        }
    }
}

/// Identity key for slot-addressed resources: (host address, zero-based slot)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotKey {
    pub host_address: String,
    pub slot: u32,
}

impl SlotKey {
    pub fn new(host_address: impl Into<String>, slot: u32) -> Self {
        Self {
            host_address: host_address.into(),
            slot,
        }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.host_address, self.slot)
    }
}

/// An immutable snapshot held in one of the store's tables.
///
/// Each record type knows its identity key and which table of the
/// [`ResourceStore`] it lives in, so table operations can be written once
/// and instantiated per kind.
pub trait Record: Clone + PartialEq + fmt::Debug + Sized {
    type Key: Ord + Clone + fmt::Display + fmt::Debug;

    const KIND: ResourceKind;

    fn key(&self) -> Self::Key;

    fn table(store: &ResourceStore) -> &ResourceTable<Self>;

    fn table_mut(store: &mut ResourceStore) -> &mut ResourceTable<Self>;

    fn as_resource(&self) -> ResourceRef<'_>;
}

/// Borrowed view of a record of any kind, handed to notification handlers
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "record", rename_all = "kebab-case")]
pub enum ResourceRef<'a> {
    Node(&'a NetworkNode),
    Source(&'a AudioSource),
    Destination(&'a AudioDestination),
    GpioInput(&'a GpioInput),
    GpioOutput(&'a GpioOutput),
}

impl<'a> ResourceRef<'a> {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceRef::Node(_) => ResourceKind::Node,
            ResourceRef::Source(_) => ResourceKind::Source,
            ResourceRef::Destination(_) => ResourceKind::Destination,
            ResourceRef::GpioInput(_) => ResourceKind::GpioInput,
            ResourceRef::GpioOutput(_) => ResourceKind::GpioOutput,
        }
    }

    pub fn host_address(&self) -> &'a str {
        match self {
            ResourceRef::Node(r) => r.host_address(),
            ResourceRef::Source(r) => r.host_address(),
            ResourceRef::Destination(r) => r.host_address(),
            ResourceRef::GpioInput(r) => r.host_address(),
            ResourceRef::GpioOutput(r) => r.host_address(),
        }
    }

    /// Slot number, or `None` for nodes
    pub fn slot(&self) -> Option<u32> {
        match self {
            ResourceRef::Node(_) => None,
            ResourceRef::Source(r) => Some(r.slot_number()),
            ResourceRef::Destination(r) => Some(r.slot_number()),
            ResourceRef::GpioInput(r) => Some(r.slot_number()),
            ResourceRef::GpioOutput(r) => Some(r.slot_number()),
        }
    }
}

impl fmt::Display for ResourceRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceRef::Node(r) => r.fmt(f),
            ResourceRef::Source(r) => r.fmt(f),
            ResourceRef::Destination(r) => r.fmt(f),
            ResourceRef::GpioInput(r) => r.fmt(f),
            ResourceRef::GpioOutput(r) => r.fmt(f),
        }
    }
}
