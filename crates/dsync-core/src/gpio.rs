//! GPIO line codes and GPIO input/output records

use crate::error::{Error, Result};
use crate::resource::{Record, ResourceKind, ResourceRef, SlotKey};
use crate::store::ResourceStore;
use crate::table::ResourceTable;
use serde::Serialize;
use std::fmt;

/// Number of lines in a GPIO slot
pub const GPIO_LINES: usize = 5;

/// Five-character line-state word.
///
/// Position 0 is the most significant line, position 4 the least. On the
/// inbound side `l` means asserted and anything else means off; outbound
/// masks use `l` (assert), `h` (deassert) and `x` (leave unchanged).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct GpioCode(String);

impl GpioCode {
    pub fn new(code: impl Into<String>) -> Result<Self> {
        let code = code.into();
        if code.len() != GPIO_LINES || !code.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(Error::InvalidGpioCode(code));
        }
        Ok(Self(code))
    }

    /// Outbound word: every line `l`, `h` or `x`
    pub fn mask(code: impl Into<String>) -> Result<Self> {
        let code = Self::new(code)?;
        if !code.is_mask() {
            return Err(Error::InvalidGpioCode(code.0));
        }
        Ok(code)
    }

    /// Whether this code can be written to a slot as-is
    pub fn is_mask(&self) -> bool {
        self.0.bytes().all(|b| matches!(b, b'l' | b'h' | b'x'))
    }

    /// Mask that drives a single line and leaves the other four untouched
    pub fn bit_mask(bit: usize, state: bool) -> Result<Self> {
        if bit >= GPIO_LINES {
            return Err(Error::InvalidBit(bit));
        }

        let code = (0..GPIO_LINES)
            .map(|i| match (i == bit, state) {
                (false, _) => 'x',
                (true, true) => 'l',
                (true, false) => 'h',
            })
            .collect();
        Ok(Self(code))
    }

    /// Whether a line is asserted. The controller's case is not trusted, so
    /// `L` reads as asserted too.
    pub fn bit_state(&self, bit: usize) -> Result<bool> {
        self.0
            .as_bytes()
            .get(bit)
            .map(|b| b.eq_ignore_ascii_case(&b'l'))
            .ok_or(Error::InvalidBit(bit))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GpioCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for GpioCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        GpioCode::new(s)
    }
}

/// A GPIO input slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GpioInput {
    host_address: String,
    slot_number: u32,
    host_name: String,
    code: GpioCode,
}

impl GpioInput {
    pub fn new(
        host_address: impl Into<String>,
        slot_number: u32,
        host_name: impl Into<String>,
        code: GpioCode,
    ) -> Self {
        Self {
            host_address: host_address.into(),
            slot_number,
            host_name: host_name.into(),
            code,
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

    pub fn code(&self) -> &GpioCode {
        &self.code
    }

    pub fn bit_state(&self, bit: usize) -> Result<bool> {
        self.code.bit_state(bit)
    }
}

impl Record for GpioInput {
    type Key = SlotKey;

    const KIND: ResourceKind = ResourceKind::GpioInput;

    fn key(&self) -> SlotKey {
        SlotKey::new(self.host_address.clone(), self.slot_number)
    }

    fn table(store: &ResourceStore) -> &ResourceTable<Self> {
        store.gpi_table()
    }

    fn table_mut(store: &mut ResourceStore) -> &mut ResourceTable<Self> {
        store.gpi_table_mut()
    }

    fn as_resource(&self) -> ResourceRef<'_> {
        ResourceRef::GpioInput(self)
    }
}

impl fmt::Display for GpioInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} ({}) code={}",
            self.host_address, self.slot_number, self.host_name, self.code
        )
    }
}

/// A GPIO output slot, optionally following a GPIO input
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GpioOutput {
    host_address: String,
    slot_number: u32,
    host_name: String,
    code: GpioCode,
    name: String,
    source_address: String,
    source_slot: Option<u32>,
}

impl GpioOutput {
    pub fn new(
        host_address: impl Into<String>,
        slot_number: u32,
        host_name: impl Into<String>,
        code: GpioCode,
        name: impl Into<String>,
        source_address: impl Into<String>,
        source_slot: Option<u32>,
    ) -> Self {
        Self {
            host_address: host_address.into(),
            slot_number,
            host_name: host_name.into(),
            code,
            name: name.into(),
            source_address: source_address.into(),
            source_slot,
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

    pub fn code(&self) -> &GpioCode {
        &self.code
    }

    pub fn bit_state(&self, bit: usize) -> Result<bool> {
        self.code.bit_state(bit)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Host address of the GPIO input routed to this output
    pub fn source_address(&self) -> &str {
        &self.source_address
    }

    /// Slot of the routed GPIO input, `None` when unassigned
    pub fn source_slot(&self) -> Option<u32> {
        self.source_slot
    }
}

impl Record for GpioOutput {
    type Key = SlotKey;

    const KIND: ResourceKind = ResourceKind::GpioOutput;

    fn key(&self) -> SlotKey {
        SlotKey::new(self.host_address.clone(), self.slot_number)
    }

    fn table(store: &ResourceStore) -> &ResourceTable<Self> {
        store.gpo_table()
    }

    fn table_mut(store: &mut ResourceStore) -> &mut ResourceTable<Self> {
        store.gpo_table_mut()
    }

    fn as_resource(&self) -> ResourceRef<'_> {
        ResourceRef::GpioOutput(self)
    }
}

impl fmt::Display for GpioOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} {:?} ({}) code={} source=",
            self.host_address, self.slot_number, self.name, self.host_name, self.code
        )?;
        match self.source_slot {
            Some(slot) => write!(f, "{}/{}", self.source_address, slot),
            None => write!(f, "none"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_mask() {
        assert_eq!(GpioCode::bit_mask(2, true).unwrap().as_str(), "xxlxx");
        assert_eq!(GpioCode::bit_mask(0, false).unwrap().as_str(), "hxxxx");
        assert_eq!(GpioCode::bit_mask(4, true).unwrap().as_str(), "xxxxl");
        assert_eq!(GpioCode::bit_mask(5, true), Err(Error::InvalidBit(5)));
    }

    #[test]
    fn test_code_length() {
        assert!(GpioCode::new("hhhhh").is_ok());
        assert!(GpioCode::new("hhhh").is_err());
        assert!(GpioCode::new("hhhhhh").is_err());
    }

    #[test]
    fn test_code_rejects_separators() {
        assert!(GpioCode::new("l\r\nPi").is_err());
        assert!(GpioCode::new("l h x").is_err());
        assert!(GpioCode::new("lh\thx").is_err());
        assert!(GpioCode::new("lh\x00hx").is_err());
    }

    #[test]
    fn test_mask() {
        assert!(GpioCode::mask("lhxxh").is_ok());
        assert!(GpioCode::mask("lhxxH").is_err());
        assert!(!GpioCode::new("abcde").unwrap().is_mask());
        assert!(GpioCode::bit_mask(1, false).unwrap().is_mask());
    }

    #[test]
    fn test_bit_state() {
        let gpi = GpioInput::new("10.0.0.1", 0, "node1", GpioCode::new("lhhLh").unwrap());
        assert!(gpi.bit_state(0).unwrap());
        assert!(!gpi.bit_state(1).unwrap());
        assert!(gpi.bit_state(3).unwrap());
        assert!(gpi.bit_state(5).is_err());
    }

    #[test]
    fn test_unassigned_gpo_display() {
        let gpo = GpioOutput::new(
            "10.0.0.1",
            3,
            "node1",
            GpioCode::new("hhhhh").unwrap(),
            "Tally",
            "",
            None,
        );
        assert!(gpo.to_string().ends_with("source=none"));
    }
}
