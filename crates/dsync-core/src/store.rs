//! Resource store - the five tables mirroring controller state

use crate::audio::{AudioDestination, AudioSource};
use crate::error::Result;
use crate::gpio::{GpioInput, GpioOutput};
use crate::node::NetworkNode;
use crate::resource::{Record, ResourceKind, SlotKey};
use crate::table::ResourceTable;
use serde::Serialize;

/// In-memory mirror of everything the controller has reported.
///
/// Lookups and enumeration are public; mutation goes through the generic
/// [`insert`](Self::insert) / [`replace`](Self::replace) /
/// [`remove`](Self::remove) operations, driven by the frame dispatcher.
#[derive(Debug, Clone, Default)]
pub struct ResourceStore {
    nodes: ResourceTable<NetworkNode>,
    sources: ResourceTable<AudioSource>,
    destinations: ResourceTable<AudioDestination>,
    gpis: ResourceTable<GpioInput>,
    gpos: ResourceTable<GpioOutput>,
}

impl ResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<R: Record>(&mut self, record: R) -> Option<R> {
        R::table_mut(self).insert(record)
    }

    pub fn replace<R: Record>(&mut self, record: R) -> Result<R> {
        R::table_mut(self).replace(record)
    }

    pub fn remove<R: Record>(&mut self, key: &R::Key) -> Result<R> {
        R::table_mut(self).remove(key)
    }

    pub fn get<R: Record>(&self, key: &R::Key) -> Result<&R> {
        R::table(self).get(key)
    }

    pub fn node(&self, host_address: &str) -> Result<&NetworkNode> {
        self.nodes.get(&host_address.to_string())
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NetworkNode> {
        self.nodes.iter()
    }

    pub fn source(&self, host_address: &str, slot: u32) -> Result<&AudioSource> {
        self.sources.get(&SlotKey::new(host_address, slot))
    }

    pub fn sources(&self) -> impl Iterator<Item = &AudioSource> {
        self.sources.iter()
    }

    pub fn destination(&self, host_address: &str, slot: u32) -> Result<&AudioDestination> {
        self.destinations.get(&SlotKey::new(host_address, slot))
    }

    pub fn destinations(&self) -> impl Iterator<Item = &AudioDestination> {
        self.destinations.iter()
    }

    pub fn gpi(&self, host_address: &str, slot: u32) -> Result<&GpioInput> {
        self.gpis.get(&SlotKey::new(host_address, slot))
    }

    pub fn gpis(&self) -> impl Iterator<Item = &GpioInput> {
        self.gpis.iter()
    }

    pub fn gpo(&self, host_address: &str, slot: u32) -> Result<&GpioOutput> {
        self.gpos.get(&SlotKey::new(host_address, slot))
    }

    pub fn gpos(&self) -> impl Iterator<Item = &GpioOutput> {
        self.gpos.iter()
    }

    /// Source whose stream a destination is currently patched to, if any
    pub fn patched_source(&self, destination: &AudioDestination) -> Option<&AudioSource> {
        if !destination.is_patched() {
            return None;
        }
        self.sources
            .iter()
            .find(|src| src.stream_address() == destination.stream_address())
    }

    pub fn len(&self, kind: ResourceKind) -> usize {
        match kind {
            ResourceKind::Node => self.nodes.len(),
            ResourceKind::Source => self.sources.len(),
            ResourceKind::Destination => self.destinations.len(),
            ResourceKind::GpioInput => self.gpis.len(),
            ResourceKind::GpioOutput => self.gpos.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        ResourceKind::ALL.iter().all(|kind| self.len(*kind) == 0)
    }

    /// Get statistics
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            nodes: self.nodes.len(),
            sources: self.sources.len(),
            destinations: self.destinations.len(),
            gpis: self.gpis.len(),
            gpos: self.gpos.len(),
        }
    }

    pub(crate) fn node_table(&self) -> &ResourceTable<NetworkNode> {
        &self.nodes
    }

    pub(crate) fn node_table_mut(&mut self) -> &mut ResourceTable<NetworkNode> {
        &mut self.nodes
    }

    pub(crate) fn source_table(&self) -> &ResourceTable<AudioSource> {
        &self.sources
    }

    pub(crate) fn source_table_mut(&mut self) -> &mut ResourceTable<AudioSource> {
        &mut self.sources
    }

    pub(crate) fn destination_table(&self) -> &ResourceTable<AudioDestination> {
        &self.destinations
    }

    pub(crate) fn destination_table_mut(&mut self) -> &mut ResourceTable<AudioDestination> {
        &mut self.destinations
    }

    pub(crate) fn gpi_table(&self) -> &ResourceTable<GpioInput> {
        &self.gpis
    }

    pub(crate) fn gpi_table_mut(&mut self) -> &mut ResourceTable<GpioInput> {
        &mut self.gpis
    }

    pub(crate) fn gpo_table(&self) -> &ResourceTable<GpioOutput> {
        &self.gpos
    }

    pub(crate) fn gpo_table_mut(&mut self) -> &mut ResourceTable<GpioOutput> {
        &mut self.gpos
    }
}

/// Store statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StoreStats {
    pub nodes: usize,
    pub sources: usize,
    pub destinations: usize,
    pub gpis: usize,
    pub gpos: usize,
}
