//! Network node records

use crate::resource::{Record, ResourceKind, ResourceRef};
use crate::store::ResourceStore;
use crate::table::ResourceTable;
use serde::Serialize;
use std::fmt;

/// A device on the fabric, keyed by host address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkNode {
    host_address: String,
    host_name: String,
    device_name: String,
    source_slots: u32,
    destination_slots: u32,
    gpi_slots: u32,
    gpo_slots: u32,
}

impl NetworkNode {
    pub fn new(
        host_address: impl Into<String>,
        host_name: impl Into<String>,
        device_name: impl Into<String>,
        source_slots: u32,
        destination_slots: u32,
        gpi_slots: u32,
        gpo_slots: u32,
    ) -> Self {
        Self {
            host_address: host_address.into(),
            host_name: host_name.into(),
            device_name: device_name.into(),
            source_slots,
            destination_slots,
            gpi_slots,
            gpo_slots,
        }
    }

    pub fn host_address(&self) -> &str {
        &self.host_address
    }

    pub fn host_name(&self) -> &str {
        &self.host_name
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn source_slots(&self) -> u32 {
        self.source_slots
    }

    pub fn destination_slots(&self) -> u32 {
        self.destination_slots
    }

    pub fn gpi_slots(&self) -> u32 {
        self.gpi_slots
    }

    pub fn gpo_slots(&self) -> u32 {
        self.gpo_slots
    }
}

impl Record for NetworkNode {
    type Key = String;

    const KIND: ResourceKind = ResourceKind::Node;

    fn key(&self) -> String {
        self.host_address.clone()
    }

    fn table(store: &ResourceStore) -> &ResourceTable<Self> {
        store.node_table()
    }

    fn table_mut(store: &mut ResourceStore) -> &mut ResourceTable<Self> {
        store.node_table_mut()
    }

    fn as_resource(&self) -> ResourceRef<'_> {
        ResourceRef::Node(self)
    }
}

impl fmt::Display for NetworkNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) device={} src={} dst={} gpi={} gpo={}",
            self.host_address,
            self.host_name,
            self.device_name,
            self.source_slots,
            self.destination_slots,
            self.gpi_slots,
            self.gpo_slots
        )
    }
}
