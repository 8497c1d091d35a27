//! dsync Core - resource records and the resource store
//!
//! This crate holds the in-memory model of a Protocol D fabric:
//! - Immutable record snapshots for nodes, audio sources and destinations,
//!   GPIO inputs and outputs
//! - Transient alarm events
//! - A generic keyed table and the five-table store built from it

pub mod alarm;
pub mod audio;
pub mod error;
pub mod gpio;
pub mod node;
pub mod resource;
pub mod store;
pub mod table;

pub use alarm::{Alarm, AlarmChannel, AlarmKind, AlarmPort};
pub use audio::{stream_number, AudioDestination, AudioSource};
pub use error::{Error, Result};
pub use gpio::{GpioCode, GpioInput, GpioOutput, GPIO_LINES};
pub use node::NetworkNode;
pub use resource::{Record, ResourceKind, ResourceRef, SlotKey};
pub use store::{ResourceStore, StoreStats};
pub use table::ResourceTable;
