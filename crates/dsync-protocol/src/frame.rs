//! Inbound frames and their classification

use crate::error::{ProtocolError, ProtocolResult};
use dsync_core::{AlarmKind, ResourceKind};
use std::fmt;

/// Field separator within a frame
pub const FIELD_SEPARATOR: char = '\t';

/// What a resource frame does to its table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Delete,
    Update,
}

/// Classification of a frame by its first field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    Resource { kind: ResourceKind, op: Operation },
    Alarm(AlarmKind),
    /// `ok` - acknowledges a subscribe or control command
    Ack,
    /// `pong` - reply to `Ping`
    Pong,
    /// `error` - the controller rejected a command
    Error,
    Unknown,
}

const fn resource(kind: ResourceKind, op: Operation) -> FrameType {
    FrameType::Resource { kind, op }
}

/// Inbound vocabulary. Nodes have no bare-update frame.
const FRAME_TYPES: &[(&str, FrameType)] = &[
    ("NODEADD", resource(ResourceKind::Node, Operation::Add)),
    ("NODEDEL", resource(ResourceKind::Node, Operation::Delete)),
    ("SRCADD", resource(ResourceKind::Source, Operation::Add)),
    ("SRCDEL", resource(ResourceKind::Source, Operation::Delete)),
    ("SRC", resource(ResourceKind::Source, Operation::Update)),
    ("DSTADD", resource(ResourceKind::Destination, Operation::Add)),
    ("DSTDEL", resource(ResourceKind::Destination, Operation::Delete)),
    ("DST", resource(ResourceKind::Destination, Operation::Update)),
    ("GPIADD", resource(ResourceKind::GpioInput, Operation::Add)),
    ("GPIDEL", resource(ResourceKind::GpioInput, Operation::Delete)),
    ("GPI", resource(ResourceKind::GpioInput, Operation::Update)),
    ("GPOADD", resource(ResourceKind::GpioOutput, Operation::Add)),
    ("GPODEL", resource(ResourceKind::GpioOutput, Operation::Delete)),
    ("GPO", resource(ResourceKind::GpioOutput, Operation::Update)),
    ("SILENCE", FrameType::Alarm(AlarmKind::Silence)),
    ("CLIP", FrameType::Alarm(AlarmKind::Clip)),
    ("ok", FrameType::Ack),
    ("pong", FrameType::Pong),
    ("error", FrameType::Error),
];

impl FrameType {
    pub fn classify(token: &str) -> FrameType {
        FRAME_TYPES
            .iter()
            .find(|(t, _)| *t == token)
            .map(|(_, frame_type)| *frame_type)
            .unwrap_or(FrameType::Unknown)
    }
}

/// One complete message: the tab-separated fields of a CR-terminated line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    fields: Vec<String>,
}

impl Frame {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// Split a line (without terminator) into fields
    pub fn from_line(line: &str) -> Self {
        Self {
            fields: line.split(FIELD_SEPARATOR).map(str::to_string).collect(),
        }
    }

    /// First field, naming the frame type
    pub fn token(&self) -> &str {
        self.fields.first().map(String::as_str).unwrap_or_default()
    }

    pub fn frame_type(&self) -> FrameType {
        FrameType::classify(self.token())
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> ProtocolResult<&str> {
        self.fields.get(index).map(String::as_str).ok_or_else(|| {
            ProtocolError::ParseError(format!("{}: missing field {}", self.token(), index))
        })
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.iter().all(String::is_empty)
    }

    /// Check the field count for this frame's type (token included)
    pub fn expect_fields(&self, expected: usize) -> ProtocolResult<()> {
        if self.fields.len() != expected {
            return Err(ProtocolError::FieldCount {
                token: self.token().to_string(),
                expected,
                got: self.fields.len(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fields.join(" | "))
    }
}
