//! Record decoding from inbound frames

use crate::error::{ProtocolError, ProtocolResult};
use crate::frame::Frame;
use dsync_core::{
    Alarm, AlarmKind, AudioDestination, AudioSource, GpioCode, GpioInput, GpioOutput,
    NetworkNode, Record, SlotKey,
};

/// A record that can be built from an ADD or bare-update frame, and whose
/// key can be read from a DEL frame.
pub trait Decode: Record {
    /// Field count of ADD and bare-update frames, token included
    const FIELDS: usize;

    /// Field count of DEL frames, token included
    const KEY_FIELDS: usize;

    fn decode(frame: &Frame) -> ProtocolResult<Self>;

    fn decode_key(frame: &Frame) -> ProtocolResult<Self::Key>;
}

fn parse_u32(frame: &Frame, index: usize, name: &str) -> ProtocolResult<u32> {
    let value = frame.field(index)?;
    value.parse().map_err(|_| {
        ProtocolError::ParseError(format!("{}: invalid {}: {:?}", frame.token(), name, value))
    })
}

fn parse_flag(frame: &Frame, index: usize) -> ProtocolResult<bool> {
    Ok(frame.field(index)? == "1")
}

fn slot_key(frame: &Frame) -> ProtocolResult<SlotKey> {
    Ok(SlotKey::new(frame.field(1)?, parse_u32(frame, 2, "slot")?))
}

impl Decode for NetworkNode {
    const FIELDS: usize = 8;
    const KEY_FIELDS: usize = 2;

    fn decode(frame: &Frame) -> ProtocolResult<Self> {
        frame.expect_fields(Self::FIELDS)?;
        Ok(NetworkNode::new(
            frame.field(1)?,
            frame.field(2)?,
            frame.field(3)?,
            parse_u32(frame, 4, "source slot count")?,
            parse_u32(frame, 5, "destination slot count")?,
            parse_u32(frame, 6, "gpi slot count")?,
            parse_u32(frame, 7, "gpo slot count")?,
        ))
    }

    fn decode_key(frame: &Frame) -> ProtocolResult<String> {
        frame.expect_fields(Self::KEY_FIELDS)?;
        Ok(frame.field(1)?.to_string())
    }
}

impl Decode for AudioSource {
    const FIELDS: usize = 9;
    const KEY_FIELDS: usize = 3;

    fn decode(frame: &Frame) -> ProtocolResult<Self> {
        frame.expect_fields(Self::FIELDS)?;
        Ok(AudioSource::new(
            frame.field(1)?,
            parse_u32(frame, 2, "slot")?,
            frame.field(3)?,
            frame.field(4)?,
            frame.field(5)?,
            parse_flag(frame, 6)?,
            parse_u32(frame, 7, "channel count")?,
            parse_u32(frame, 8, "block size")?,
        ))
    }

    fn decode_key(frame: &Frame) -> ProtocolResult<SlotKey> {
        frame.expect_fields(Self::KEY_FIELDS)?;
        slot_key(frame)
    }
}

impl Decode for AudioDestination {
    const FIELDS: usize = 7;
    const KEY_FIELDS: usize = 3;

    fn decode(frame: &Frame) -> ProtocolResult<Self> {
        frame.expect_fields(Self::FIELDS)?;
        Ok(AudioDestination::new(
            frame.field(1)?,
            parse_u32(frame, 2, "slot")?,
            frame.field(3)?,
            frame.field(4)?,
            frame.field(5)?,
            parse_u32(frame, 6, "channel count")?,
        ))
    }

    fn decode_key(frame: &Frame) -> ProtocolResult<SlotKey> {
        frame.expect_fields(Self::KEY_FIELDS)?;
        slot_key(frame)
    }
}

impl Decode for GpioInput {
    const FIELDS: usize = 5;
    const KEY_FIELDS: usize = 3;

    fn decode(frame: &Frame) -> ProtocolResult<Self> {
        frame.expect_fields(Self::FIELDS)?;
        Ok(GpioInput::new(
            frame.field(1)?,
            parse_u32(frame, 2, "slot")?,
            frame.field(3)?,
            GpioCode::new(frame.field(4)?)?,
        ))
    }

    fn decode_key(frame: &Frame) -> ProtocolResult<SlotKey> {
        frame.expect_fields(Self::KEY_FIELDS)?;
        slot_key(frame)
    }
}

impl Decode for GpioOutput {
    const FIELDS: usize = 8;
    const KEY_FIELDS: usize = 3;

    fn decode(frame: &Frame) -> ProtocolResult<Self> {
        frame.expect_fields(Self::FIELDS)?;

        let source_slot = match frame.field(7)? {
            "-1" => None,
            _ => Some(parse_u32(frame, 7, "source slot")?),
        };

        Ok(GpioOutput::new(
            frame.field(1)?,
            parse_u32(frame, 2, "slot")?,
            frame.field(3)?,
            GpioCode::new(frame.field(4)?)?,
            frame.field(5)?,
            frame.field(6)?,
            source_slot,
        ))
    }

    fn decode_key(frame: &Frame) -> ProtocolResult<SlotKey> {
        frame.expect_fields(Self::KEY_FIELDS)?;
        slot_key(frame)
    }
}

/// Field count of SILENCE and CLIP frames
pub const ALARM_FIELDS: usize = 6;

/// Build an alarm event from a SILENCE or CLIP frame
pub fn decode_alarm(frame: &Frame) -> ProtocolResult<Alarm> {
    frame.expect_fields(ALARM_FIELDS)?;
    let kind: AlarmKind = frame.token().parse()?;

    Ok(Alarm::new(
        kind,
        frame.field(1)?,
        parse_u32(frame, 2, "slot")?,
        frame.field(3)?.parse()?,
        frame.field(4)?.parse()?,
        parse_flag(frame, 5)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsync_core::{AlarmChannel, AlarmPort};

    #[test]
    fn test_decode_node() {
        let frame = Frame::from_line("NODEADD\t10.0.0.1\tnode1\tdev1\t4\t4\t5\t5");
        let node = NetworkNode::decode(&frame).unwrap();

        assert_eq!(node, NetworkNode::new("10.0.0.1", "node1", "dev1", 4, 4, 5, 5));
        assert_eq!(node.key(), "10.0.0.1");
    }

    #[test]
    fn test_decode_source() {
        let frame = Frame::from_line("SRCADD\t10.0.0.1\t3\tnode1\t239.192.0.4\tMic 4\t1\t2\t240");
        let src = AudioSource::decode(&frame).unwrap();

        assert_eq!(src.slot_number(), 3);
        assert_eq!(src.name(), "Mic 4");
        assert!(src.stream_enabled());
        assert_eq!(src.stream_number(), 4);
        assert_eq!(src.block_size(), 240);
    }

    #[test]
    fn test_decode_unpatched_destination() {
        let frame = Frame::from_line("DST\t10.0.0.2\t0\tnode2\t\tPGM\t2");
        let dst = AudioDestination::decode(&frame).unwrap();

        assert!(!dst.is_patched());
        assert_eq!(dst.channel_count(), 2);
    }

    #[test]
    fn test_decode_gpo_source_slot() {
        let routed = Frame::from_line("GPOADD\t10.0.0.1\t0\tnode1\thhhhh\tTally\t10.0.0.2\t4");
        let unrouted = Frame::from_line("GPOADD\t10.0.0.1\t1\tnode1\thhhhh\tTally\t\t-1");

        assert_eq!(GpioOutput::decode(&routed).unwrap().source_slot(), Some(4));
        assert_eq!(GpioOutput::decode(&unrouted).unwrap().source_slot(), None);
    }

    #[test]
    fn test_decode_key_from_delete() {
        let frame = Frame::from_line("GPIDEL\t10.0.0.1\t2");
        assert_eq!(GpioInput::decode_key(&frame).unwrap(), SlotKey::new("10.0.0.1", 2));

        let frame = Frame::from_line("NODEDEL\t10.0.0.1");
        assert_eq!(NetworkNode::decode_key(&frame).unwrap(), "10.0.0.1");
    }

    #[test]
    fn test_field_count_mismatch() {
        let frame = Frame::from_line("NODEADD\t10.0.0.1\tnode1\tdev1\t4\t4\t5");
        let err = NetworkNode::decode(&frame).unwrap_err();

        assert!(matches!(err, ProtocolError::FieldCount { expected: 8, got: 7, .. }));
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_bad_number_and_code() {
        let frame = Frame::from_line("SRC\t10.0.0.1\tx\tnode1\t239.192.0.1\tMic\t1\t2\t240");
        assert!(AudioSource::decode(&frame).unwrap_err().is_parse_error());

        let frame = Frame::from_line("GPI\t10.0.0.1\t0\tnode1\thhh");
        assert!(GpioInput::decode(&frame).unwrap_err().is_parse_error());
    }

    #[test]
    fn test_decode_alarm() {
        let frame = Frame::from_line("CLIP\t10.0.0.1\t1\tOUTPUT\tRIGHT\t0");
        let alarm = decode_alarm(&frame).unwrap();

        assert_eq!(alarm.kind(), AlarmKind::Clip);
        assert_eq!(alarm.port(), AlarmPort::Output);
        assert_eq!(alarm.channel(), AlarmChannel::Right);
        assert!(!alarm.is_active());

        let frame = Frame::from_line("SILENCE\t10.0.0.1\t1\tSIDEWAYS\tLEFT\t1");
        assert!(decode_alarm(&frame).unwrap_err().is_parse_error());
    }
}
