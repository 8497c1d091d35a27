//! Outbound commands

use crate::error::ProtocolResult;
use bytes::{BufMut, BytesMut};
use dsync_core::{GpioCode, ResourceKind, SlotKey};

/// A command sent to the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// SubscribeNodes
    SubscribeNodes,

    /// SubscribeSources
    SubscribeSources,

    /// SubscribeDestinations
    SubscribeDestinations,

    /// SubscribeGpis
    SubscribeGpis,

    /// SubscribeGpos
    SubscribeGpos,

    /// SubscribeSilences
    SubscribeSilences,

    /// SubscribeClips
    SubscribeClips,

    /// ClearCrosspoint <dst-addr> <dst-slot>
    ClearCrosspoint { destination: SlotKey },

    /// SetCrosspoint <dst-addr> <dst-slot> <src-addr> <src-slot>
    SetCrosspoint { destination: SlotKey, source: SlotKey },

    /// ClearGpioCrosspoint <gpo-addr> <gpo-slot>
    ClearGpioCrosspoint { output: SlotKey },

    /// SetGpioCrosspoint <gpo-addr> <gpo-slot> <gpi-addr> <gpi-slot>
    SetGpioCrosspoint { output: SlotKey, input: SlotKey },

    /// SetGpoState <addr> <slot> <code>
    SetGpoState { output: SlotKey, code: GpioCode },

    /// SetGpiState <addr> <slot> <code>
    SetGpiState { input: SlotKey, code: GpioCode },

    /// Ping
    Ping,
}

impl Command {
    /// The subscribe command that makes the controller stream `kind`
    pub fn subscribe(kind: ResourceKind) -> Command {
        match kind {
            ResourceKind::Node => Command::SubscribeNodes,
            ResourceKind::Source => Command::SubscribeSources,
            ResourceKind::Destination => Command::SubscribeDestinations,
            ResourceKind::GpioInput => Command::SubscribeGpis,
            ResourceKind::GpioOutput => Command::SubscribeGpos,
        }
    }

    /// Word write to a GPO that drives one line and leaves the others alone
    pub fn set_gpo_bit(output: SlotKey, bit: usize, state: bool) -> ProtocolResult<Command> {
        Ok(Command::SetGpoState {
            output,
            code: GpioCode::bit_mask(bit, state)?,
        })
    }

    /// Word write to a GPI that drives one line and leaves the others alone
    pub fn set_gpi_bit(input: SlotKey, bit: usize, state: bool) -> ProtocolResult<Command> {
        Ok(Command::SetGpiState {
            input,
            code: GpioCode::bit_mask(bit, state)?,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::SubscribeNodes => "SubscribeNodes",
            Command::SubscribeSources => "SubscribeSources",
            Command::SubscribeDestinations => "SubscribeDestinations",
            Command::SubscribeGpis => "SubscribeGpis",
            Command::SubscribeGpos => "SubscribeGpos",
            Command::SubscribeSilences => "SubscribeSilences",
            Command::SubscribeClips => "SubscribeClips",
            Command::ClearCrosspoint { .. } => "ClearCrosspoint",
            Command::SetCrosspoint { .. } => "SetCrosspoint",
            Command::ClearGpioCrosspoint { .. } => "ClearGpioCrosspoint",
            Command::SetGpioCrosspoint { .. } => "SetGpioCrosspoint",
            Command::SetGpoState { .. } => "SetGpoState",
            Command::SetGpiState { .. } => "SetGpiState",
            Command::Ping => "Ping",
        }
    }

    /// Encode the command to bytes
    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::new();
        self.encode_into(&mut buf);
        buf
    }

    /// Encode the command into an existing buffer
    pub fn encode_into(&self, buf: &mut BytesMut) {
        buf.put_slice(self.name().as_bytes());

        match self {
            Command::ClearCrosspoint { destination: key }
            | Command::ClearGpioCrosspoint { output: key } => {
                put_key(buf, key);
            }
            Command::SetCrosspoint { destination, source } => {
                put_key(buf, destination);
                put_key(buf, source);
            }
            Command::SetGpioCrosspoint { output, input } => {
                put_key(buf, output);
                put_key(buf, input);
            }
            Command::SetGpoState { output: key, code } | Command::SetGpiState { input: key, code } => {
                put_key(buf, key);
                put_arg(buf, code.as_str());
            }
            _ => {}
        }

        buf.put_slice(b"\r\n");
    }
}

fn put_arg(buf: &mut BytesMut, arg: &str) {
    buf.put_u8(b' ');
    buf.put_slice(arg.as_bytes());
}

fn put_key(buf: &mut BytesMut, key: &SlotKey) {
    put_arg(buf, &key.host_address);
    put_arg(buf, &key.slot.to_string());
}
