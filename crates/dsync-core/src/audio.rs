//! Audio source and destination records

use crate::resource::{Record, ResourceKind, ResourceRef, SlotKey};
use crate::store::ResourceStore;
use crate::table::ResourceTable;
use serde::Serialize;
use std::fmt;

/// Stream number encoded in a dotted-quad multicast address.
///
/// Returns 0 unless the address has exactly four numeric octets and the
/// third octet is at most 127; otherwise `256 * third + fourth`.
pub fn stream_number(stream_address: &str) -> u32 {
    let octets: Vec<&str> = stream_address.split('.').collect();
    if octets.len() != 4 {
        return 0;
    }

    let (third, fourth) = match (octets[2].parse::<u32>(), octets[3].parse::<u32>()) {
        (Ok(third), Ok(fourth)) => (third, fourth),
        _ => return 0,
    };

    if third > 127 {
        return 0;
    }

    256 * third + fourth
}

/// An audio stream published by a node slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioSource {
    host_address: String,
    slot_number: u32,
    host_name: String,
    stream_address: String,
    name: String,
    stream_enabled: bool,
    channel_count: u32,
    block_size: u32,
}

impl AudioSource {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        host_address: impl Into<String>,
        slot_number: u32,
        host_name: impl Into<String>,
        stream_address: impl Into<String>,
        name: impl Into<String>,
        stream_enabled: bool,
        channel_count: u32,
        block_size: u32,
    ) -> Self {
        Self {
            host_address: host_address.into(),
            slot_number,
            host_name: host_name.into(),
            stream_address: stream_address.into(),
            name: name.into(),
            stream_enabled,
            channel_count,
            block_size,
        }
    }

    pub fn host_address(&self) -> &str {
        &self.host_address
    }

    pub fn slot_number(&self) -> u32 {
        self.slot_number
    }

    pub fn host_name(&self) -> &str {
        &self.host_name
    }

    /// Multicast address the stream is published on
    pub fn stream_address(&self) -> &str {
        &self.stream_address
    }

    pub fn stream_number(&self) -> u32 {
        stream_number(&self.stream_address)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stream_enabled(&self) -> bool {
        self.stream_enabled
    }

    pub fn channel_count(&self) -> u32 {
        self.channel_count
    }

    pub fn block_size(&self) -> u32 {
        self.block_size
    }
}

impl Record for AudioSource {
    type Key = SlotKey;

    const KIND: ResourceKind = ResourceKind::Source;

    fn key(&self) -> SlotKey {
        SlotKey::new(self.host_address.clone(), self.slot_number)
    }

    fn table(store: &ResourceStore) -> &ResourceTable<Self> {
        store.source_table()
    }

    fn table_mut(store: &mut ResourceStore) -> &mut ResourceTable<Self> {
        store.source_table_mut()
    }

    fn as_resource(&self) -> ResourceRef<'_> {
        ResourceRef::Source(self)
    }
}

impl fmt::Display for AudioSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} {:?} ({}) stream={} #{} enabled={} channels={} block={}",
            self.host_address,
            self.slot_number,
            self.name,
            self.host_name,
            self.stream_address,
            self.stream_number(),
            self.stream_enabled,
            self.channel_count,
            self.block_size
        )
    }
}

/// An audio receiver slot; its stream address is the currently patched source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioDestination {
    host_address: String,
    slot_number: u32,
    host_name: String,
    stream_address: String,
    name: String,
    channel_count: u32,
}

impl AudioDestination {
    pub fn new(
        host_address: impl Into<String>,
        slot_number: u32,
        host_name: impl Into<String>,
        stream_address: impl Into<String>,
        name: impl Into<String>,
        channel_count: u32,
    ) -> Self {
        Self {
            host_address: host_address.into(),
            slot_number,
            host_name: host_name.into(),
            stream_address: stream_address.into(),
            name: name.into(),
            channel_count,
        }
    }

    pub fn host_address(&self) -> &str {
        &self.host_address
    }

    pub fn slot_number(&self) -> u32 {
        self.slot_number
    }

    pub fn host_name(&self) -> &str {
        &self.host_name
    }

    /// Address of the patched source stream, empty when unpatched
    pub fn stream_address(&self) -> &str {
        &self.stream_address
    }

    pub fn stream_number(&self) -> u32 {
        stream_number(&self.stream_address)
    }

    pub fn is_patched(&self) -> bool {
        !self.stream_address.is_empty()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn channel_count(&self) -> u32 {
        self.channel_count
    }
}

impl Record for AudioDestination {
    type Key = SlotKey;

    const KIND: ResourceKind = ResourceKind::Destination;

    fn key(&self) -> SlotKey {
        SlotKey::new(self.host_address.clone(), self.slot_number)
    }

    fn table(store: &ResourceStore) -> &ResourceTable<Self> {
        store.destination_table()
    }

    fn table_mut(store: &mut ResourceStore) -> &mut ResourceTable<Self> {
        store.destination_table_mut()
    }

    fn as_resource(&self) -> ResourceRef<'_> {
        ResourceRef::Destination(self)
    }
}

impl fmt::Display for AudioDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} {:?} ({}) stream={} #{} channels={}",
            self.host_address,
            self.slot_number,
            self.name,
            self.host_name,
            self.stream_address,
            self.stream_number(),
            self.channel_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_number() {
        assert_eq!(stream_number("0.0.0.1"), 1);
        assert_eq!(stream_number("239.192.1.2"), 258);
        assert_eq!(stream_number("0.0.130.5"), 0);
        assert_eq!(stream_number("239.192.127.255"), 127 * 256 + 255);
    }

    #[test]
    fn test_stream_number_malformed() {
        assert_eq!(stream_number(""), 0);
        assert_eq!(stream_number("239.192.1"), 0);
        assert_eq!(stream_number("239.192.1.2.3"), 0);
        assert_eq!(stream_number("239.192.x.2"), 0);
    }

    #[test]
    fn test_unpatched_destination() {
        let dst = AudioDestination::new("10.0.0.5", 0, "studio-a", "", "PGM", 2);
        assert!(!dst.is_patched());
        assert_eq!(dst.stream_number(), 0);
        assert_eq!(dst.key(), SlotKey::new("10.0.0.5", 0));
    }

    #[test]
    fn test_source_equality_covers_every_field() {
        let a = AudioSource::new("10.0.0.1", 1, "node1", "239.192.0.1", "Mic", true, 2, 240);
        let b = AudioSource::new("10.0.0.1", 1, "node1", "239.192.0.1", "Mic", false, 2, 240);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }
}
