//! Subscription handshake
//!
//! The session subscribes to one stream at a time and moves to the next
//! stream when the controller acknowledges the previous subscribe with `ok`.
//! After the seventh acknowledgment the mirror is loaded.

use dsync_core::{AlarmKind, ResourceKind};
use dsync_protocol::{Command, FrameType, ProtocolError, ProtocolResult};

/// Subscribe commands in the order they are sent
pub const SUBSCRIPTIONS: [Command; 7] = [
    Command::SubscribeNodes,
    Command::SubscribeSources,
    Command::SubscribeDestinations,
    Command::SubscribeGpis,
    Command::SubscribeGpos,
    Command::SubscribeSilences,
    Command::SubscribeClips,
];

/// What an acknowledgment leads to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Send the next subscribe command
    Next(Command),
    /// The last subscribe was acknowledged
    Ready,
    /// Already loaded; the `ok` answers a control command
    Absorbed,
}

#[derive(Debug, Default)]
pub struct Handshake {
    started: bool,
    acks: usize,
}

impl Handshake {
    pub fn new() -> Self {
        Self::default()
    }

    /// First subscribe command of the session
    pub fn start(&mut self) -> Command {
        self.started = true;
        self.acks = 0;
        SUBSCRIPTIONS[0].clone()
    }

    pub fn acknowledge(&mut self) -> ProtocolResult<Step> {
        if !self.started {
            return Err(ProtocolError::Handshake("ok received before any subscribe".into()));
        }
        if self.is_loaded() {
            return Ok(Step::Absorbed);
        }

        self.acks += 1;
        match SUBSCRIPTIONS.get(self.acks) {
            Some(next) => Ok(Step::Next(next.clone())),
            None => Ok(Step::Ready),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.acks >= SUBSCRIPTIONS.len()
    }

    /// Number of acknowledged subscribes
    pub fn stage(&self) -> usize {
        self.acks
    }

    /// Reject frames for a stream whose subscribe has not been sent yet
    pub fn check(&self, frame_type: FrameType) -> ProtocolResult<()> {
        let Some(index) = subscription_index(frame_type) else {
            return Ok(());
        };

        if !self.started || index > self.acks {
            return Err(ProtocolError::Handshake(format!(
                "{:?} frame before {} was sent",
                frame_type,
                SUBSCRIPTIONS[index].name()
            )));
        }
        Ok(())
    }
}

fn subscription_index(frame_type: FrameType) -> Option<usize> {
    match frame_type {
        FrameType::Resource { kind, .. } => Some(match kind {
            ResourceKind::Node => 0,
            ResourceKind::Source => 1,
            ResourceKind::Destination => 2,
            ResourceKind::GpioInput => 3,
            ResourceKind::GpioOutput => 4,
        }),
        FrameType::Alarm(AlarmKind::Silence) => Some(5),
        FrameType::Alarm(AlarmKind::Clip) => Some(6),
        _ => None,
    }
}
