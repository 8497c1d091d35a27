//! Audio alarm events (clip and silence detection)

use crate::error::{Error, Result};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlarmKind {
    Clip,
    Silence,
}

impl AlarmKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlarmKind::Clip => "CLIP",
            AlarmKind::Silence => "SILENCE",
        }
    }
}

impl fmt::Display for AlarmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AlarmKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "CLIP" => Ok(AlarmKind::Clip),
            "SILENCE" => Ok(AlarmKind::Silence),
            _ => Err(Error::invalid_field("alarm kind", s)),
        }
    }
}

/// Which side of the slot the level detector watches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlarmPort {
    Input,
    Output,
}

impl fmt::Display for AlarmPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlarmPort::Input => write!(f, "INPUT"),
            AlarmPort::Output => write!(f, "OUTPUT"),
        }
    }
}

impl std::str::FromStr for AlarmPort {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "INPUT" => Ok(AlarmPort::Input),
            "OUTPUT" => Ok(AlarmPort::Output),
            _ => Err(Error::invalid_field("alarm port", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlarmChannel {
    Left,
    Right,
}

impl fmt::Display for AlarmChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlarmChannel::Left => write!(f, "LEFT"),
            AlarmChannel::Right => write!(f, "RIGHT"),
        }
    }
}

impl std::str::FromStr for AlarmChannel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "LEFT" => Ok(AlarmChannel::Left),
            "RIGHT" => Ok(AlarmChannel::Right),
            _ => Err(Error::invalid_field("alarm channel", s)),
        }
    }
}

/// A transient alarm state change. Never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alarm {
    kind: AlarmKind,
    host_address: String,
    slot_number: u32,
    port: AlarmPort,
    channel: AlarmChannel,
    active: bool,
}

impl Alarm {
    pub fn new(
        kind: AlarmKind,
        host_address: impl Into<String>,
        slot_number: u32,
        port: AlarmPort,
        channel: AlarmChannel,
        active: bool,
    ) -> Self {
        Self {
            kind,
            host_address: host_address.into(),
            slot_number,
            port,
            channel,
            active,
        }
    }

    pub fn kind(&self) -> AlarmKind {
        self.kind
    }

    pub fn host_address(&self) -> &str {
        &self.host_address
    }

    pub fn slot_number(&self) -> u32 {
        self.slot_number
    }

    pub fn port(&self) -> AlarmPort {
        self.port
    }

    pub fn channel(&self) -> AlarmChannel {
        self.channel
    }

    /// `true` when the alarm condition started, `false` when it cleared
    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl fmt::Display for Alarm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}/{} {} {} {}",
            self.kind,
            self.host_address,
            self.slot_number,
            self.port,
            self.channel,
            if self.active { "active" } else { "clear" }
        )
    }
}
