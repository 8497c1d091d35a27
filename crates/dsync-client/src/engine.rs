//! State engine: frame dispatch, store mutation and notifications

use crate::commands::CommandIssuer;
use crate::error::{ClientError, ClientResult};
use crate::handshake::{Handshake, Step};
use crate::notify::{Handler, Handlers};
use dsync_core::{
    Alarm, AudioDestination, AudioSource, GpioInput, GpioOutput, NetworkNode, Record,
    ResourceKind, ResourceRef, ResourceStore,
};
use dsync_protocol::{
    decode_alarm, Decode, Frame, FrameStream, FrameType, Operation, ProtocolError, MAX_FRAME_LEN,
};
use futures_util::{pin_mut, TryStreamExt};
use tokio::io::AsyncRead;
use tracing::{debug, info, trace, warn};

/// Mirror of one controller connection.
///
/// Frames are applied one at a time, in arrival order, and every callback
/// runs before the next frame is read. Add, delete, change and alarm
/// callbacks stay silent until the handshake has loaded the mirror; the
/// ready callback then fires once and callers enumerate the store directly.
pub struct StateEngine {
    store: ResourceStore,
    handlers: Handlers,
    handshake: Handshake,
    commands: CommandIssuer,
    max_frame_len: usize,
}

impl StateEngine {
    pub fn new(commands: CommandIssuer) -> Self {
        Self {
            store: ResourceStore::new(),
            handlers: Handlers::new(),
            handshake: Handshake::new(),
            commands,
            max_frame_len: MAX_FRAME_LEN,
        }
    }

    pub fn with_max_frame_len(mut self, max_frame_len: usize) -> Self {
        self.max_frame_len = max_frame_len;
        self
    }

    pub fn store(&self) -> &ResourceStore {
        &self.store
    }

    pub fn commands(&self) -> &CommandIssuer {
        &self.commands
    }

    pub fn is_ready(&self) -> bool {
        self.handshake.is_loaded()
    }

    /// Replace the handler for one event category
    pub fn set_handler(&mut self, handler: Handler) {
        self.handlers.set(handler);
    }

    pub fn on_ready<F>(&mut self, f: F)
    where
        F: FnMut(&ResourceStore) + Send + 'static,
    {
        self.handlers.set(Handler::ready(f));
    }

    pub fn on_add<F>(&mut self, f: F)
    where
        F: FnMut(&ResourceStore, ResourceRef<'_>) + Send + 'static,
    {
        self.handlers.set(Handler::add(f));
    }

    pub fn on_delete<F>(&mut self, f: F)
    where
        F: FnMut(&ResourceStore, ResourceRef<'_>) + Send + 'static,
    {
        self.handlers.set(Handler::delete(f));
    }

    pub fn on_change<F>(&mut self, f: F)
    where
        F: FnMut(&ResourceStore, ResourceRef<'_>, ResourceRef<'_>) + Send + 'static,
    {
        self.handlers.set(Handler::change(f));
    }

    pub fn on_alarm<F>(&mut self, f: F)
    where
        F: FnMut(&ResourceStore, &Alarm) + Send + 'static,
    {
        self.handlers.set(Handler::alarm(f));
    }

    /// Send the first subscribe command
    pub fn start(&mut self) -> ClientResult<()> {
        let command = self.handshake.start();
        debug!(command = command.name(), "Starting subscription handshake");
        self.commands.send(command)
    }

    /// Start the handshake and apply frames from `reader` until it fails.
    ///
    /// A clean end of stream is reported as [`ClientError::ConnectionClosed`];
    /// the mirror is not usable after any error.
    pub async fn run<R>(&mut self, reader: R) -> ClientResult<()>
    where
        R: AsyncRead + Unpin,
    {
        self.start()?;

        let frames = FrameStream::with_max_len(reader, self.max_frame_len).into_stream();
        pin_mut!(frames);

        while let Some(frame) = frames.try_next().await? {
            self.dispatch(&frame)?;
        }

        info!("Controller closed the connection");
        Err(ClientError::ConnectionClosed)
    }

    /// Apply one frame
    pub fn dispatch(&mut self, frame: &Frame) -> ClientResult<()> {
        let frame_type = frame.frame_type();
        self.handshake.check(frame_type)?;

        match frame_type {
            FrameType::Resource { kind, op } => match kind {
                ResourceKind::Node => self.apply::<NetworkNode>(op, frame),
                ResourceKind::Source => self.apply::<AudioSource>(op, frame),
                ResourceKind::Destination => self.apply::<AudioDestination>(op, frame),
                ResourceKind::GpioInput => self.apply::<GpioInput>(op, frame),
                ResourceKind::GpioOutput => self.apply::<GpioOutput>(op, frame),
            },
            FrameType::Alarm(_) => {
                let alarm = decode_alarm(frame)?;
                if self.is_ready() {
                    self.handlers.alarm(&self.store, &alarm);
                }
                Ok(())
            }
            FrameType::Ack => self.acknowledge(),
            FrameType::Pong => {
                trace!("Pong");
                Ok(())
            }
            FrameType::Error => {
                if !self.is_ready() {
                    return Err(ProtocolError::Handshake(format!(
                        "controller rejected subscribe at stage {}",
                        self.handshake.stage()
                    ))
                    .into());
                }
                warn!(frame = %frame, "Controller rejected a command");
                Ok(())
            }
            FrameType::Unknown => {
                trace!(token = frame.token(), "Ignoring unknown frame");
                Ok(())
            }
        }
    }

    fn acknowledge(&mut self) -> ClientResult<()> {
        match self.handshake.acknowledge()? {
            Step::Next(command) => {
                debug!(stage = self.handshake.stage(), command = command.name(), "Subscription acknowledged");
                self.commands.send(command)
            }
            Step::Ready => {
                let stats = self.store.stats();
                info!(
                    nodes = stats.nodes,
                    sources = stats.sources,
                    destinations = stats.destinations,
                    gpis = stats.gpis,
                    gpos = stats.gpos,
                    "Fabric loaded"
                );
                self.handlers.ready(&self.store);
                Ok(())
            }
            Step::Absorbed => {
                trace!("Command acknowledged");
                Ok(())
            }
        }
    }

    /// Table operation shared by all five record kinds
    fn apply<R: Decode>(&mut self, op: Operation, frame: &Frame) -> ClientResult<()> {
        let ready = self.is_ready();

        match op {
            Operation::Add => {
                let record = R::decode(frame)?;
                let key = record.key();
                self.store.insert(record);

                if ready {
                    let record = self.store.get::<R>(&key)?;
                    self.handlers.added(&self.store, record.as_resource());
                } else {
                    debug!(kind = %R::KIND, key = %key, "Loaded");
                }
            }
            Operation::Delete => {
                let key = R::decode_key(frame)?;
                let record = self.store.get::<R>(&key)?;

                if ready {
                    self.handlers.deleted(&self.store, record.as_resource());
                }
                self.store.remove::<R>(&key)?;
            }
            Operation::Update => {
                let record = R::decode(frame)?;
                let key = record.key();
                let old = self.store.replace(record)?;

                if ready {
                    let new = self.store.get::<R>(&key)?;
                    if *new != old {
                        self.handlers.changed(&self.store, old.as_resource(), new.as_resource());
                    } else {
                        trace!(kind = %R::KIND, key = %key, "Unchanged");
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handshake::SUBSCRIPTIONS;
    use dsync_core::{GpioCode, SlotKey};
    use dsync_protocol::Command;
    use std::sync::{Arc, Mutex};
    use tokio::sync::mpsc::UnboundedReceiver;

    type Log = Arc<Mutex<Vec<String>>>;

    const NODE: &str = "NODEADD\t10.0.0.1\tnode1\tdev1\t4\t4\t5\t5";
    const SRC: &str = "SRCADD\t10.0.0.1\t0\tnode1\t239.192.0.1\tMic 1\t1\t2\t240";
    const DST: &str = "DSTADD\t10.0.0.1\t0\tnode1\t\tPGM\t2";
    const GPI: &str = "GPIADD\t10.0.0.1\t0\tnode1\thhhhh";
    const GPO: &str = "GPOADD\t10.0.0.1\t1\tnode1\thhhhh\tTally\t10.0.0.2\t4";

    fn engine() -> (StateEngine, UnboundedReceiver<Command>, Log) {
        let (issuer, rx) = CommandIssuer::channel();
        let mut engine = StateEngine::new(issuer);
        let log: Log = Arc::new(Mutex::new(Vec::new()));

        let l = log.clone();
        engine.on_ready(move |store| l.lock().unwrap().push(format!("ready nodes={}", store.nodes().count())));
        let l = log.clone();
        engine.on_add(move |_, r| l.lock().unwrap().push(format!("add {} {}", r.kind(), r)));
        let l = log.clone();
        engine.on_delete(move |store, r| {
            let still_stored = store.len(r.kind());
            l.lock().unwrap().push(format!("delete {} {} stored={}", r.kind(), r.host_address(), still_stored))
        });
        let l = log.clone();
        engine.on_change(move |_, old, new| l.lock().unwrap().push(format!("change {} -> {}", old, new)));
        let l = log.clone();
        engine.on_alarm(move |_, alarm| l.lock().unwrap().push(format!("alarm {}", alarm)));

        (engine, rx, log)
    }

    fn feed(engine: &mut StateEngine, line: &str) -> ClientResult<()> {
        engine.dispatch(&Frame::from_line(line))
    }

    /// Start and acknowledge every subscribe, feeding each of `bulk` once
    /// the subscribe for its stream has been sent. Lines must be ordered by
    /// subscription.
    fn load(engine: &mut StateEngine, bulk: &[&str]) {
        engine.start().unwrap();
        for line in bulk {
            let frame = Frame::from_line(line);
            while engine.handshake.check(frame.frame_type()).is_err() {
                feed(engine, "ok").unwrap();
            }
            engine.dispatch(&frame).unwrap();
        }
        while !engine.is_ready() {
            feed(engine, "ok").unwrap();
        }
    }

    fn drain(rx: &mut UnboundedReceiver<Command>) -> Vec<Command> {
        let mut out = Vec::new();
        while let Ok(cmd) = rx.try_recv() {
            out.push(cmd);
        }
        out
    }

    #[test]
    fn test_bulk_load_is_silent() {
        let (mut engine, mut rx, log) = engine();

        engine.start().unwrap();
        feed(&mut engine, NODE).unwrap();
        for _ in 0..SUBSCRIPTIONS.len() {
            assert!(log.lock().unwrap().is_empty());
            feed(&mut engine, "ok").unwrap();
        }

        assert!(engine.is_ready());
        assert_eq!(
            engine.store().node("10.0.0.1").unwrap(),
            &NetworkNode::new("10.0.0.1", "node1", "dev1", 4, 4, 5, 5)
        );
        assert_eq!(*log.lock().unwrap(), vec!["ready nodes=1".to_string()]);
        assert_eq!(drain(&mut rx), SUBSCRIPTIONS.to_vec());
    }

    #[test]
    fn test_one_stage_per_ok() {
        let (mut engine, mut rx, _log) = engine();

        engine.start().unwrap();
        assert_eq!(drain(&mut rx), vec![Command::SubscribeNodes]);

        feed(&mut engine, NODE).unwrap();
        feed(&mut engine, "ok").unwrap();
        assert_eq!(drain(&mut rx), vec![Command::SubscribeSources]);

        feed(&mut engine, SRC).unwrap();
        feed(&mut engine, SRC).unwrap();
        assert!(drain(&mut rx).is_empty());

        feed(&mut engine, "ok").unwrap();
        assert_eq!(drain(&mut rx), vec![Command::SubscribeDestinations]);
    }

    #[test]
    fn test_ready_fires_once() {
        let (mut engine, _rx, log) = engine();
        load(&mut engine, &[]);

        feed(&mut engine, "ok").unwrap();
        feed(&mut engine, "pong").unwrap();

        let ready = log.lock().unwrap().iter().filter(|e| e.starts_with("ready")).count();
        assert_eq!(ready, 1);
    }

    #[test]
    fn test_add_after_ready() {
        let (mut engine, _rx, log) = engine();
        load(&mut engine, &[]);

        feed(&mut engine, SRC).unwrap();
        assert_eq!(
            engine.store().source("10.0.0.1", 0).unwrap().name(),
            "Mic 1"
        );
        assert_eq!(log.lock().unwrap().len(), 2);
        assert!(log.lock().unwrap()[1].starts_with("add source"));
    }

    #[test]
    fn test_delete_notifies_before_removal() {
        let (mut engine, _rx, log) = engine();
        load(&mut engine, &[NODE]);

        feed(&mut engine, "NODEDEL\t10.0.0.1").unwrap();

        assert_eq!(log.lock().unwrap()[1], "delete node 10.0.0.1 stored=1");
        assert!(matches!(
            engine.store().node("10.0.0.1"),
            Err(dsync_core::Error::KeyNotFound { .. })
        ));
    }

    #[test]
    fn test_delete_absent_key() {
        let (mut engine, _rx, _log) = engine();
        load(&mut engine, &[]);

        let err = feed(&mut engine, "GPODEL\t10.0.0.1\t3").unwrap_err();
        assert!(matches!(err, ClientError::Core(dsync_core::Error::KeyNotFound { .. })));
    }

    #[test]
    fn test_equal_update_is_absorbed() {
        let (mut engine, _rx, log) = engine();
        load(&mut engine, &[DST]);

        feed(&mut engine, "DST\t10.0.0.1\t0\tnode1\t\tPGM\t2").unwrap();
        assert_eq!(log.lock().unwrap().len(), 1);

        feed(&mut engine, "DST\t10.0.0.1\t0\tnode1\t239.192.0.1\tPGM\t2").unwrap();
        let log = log.lock().unwrap();
        assert_eq!(log.len(), 2);
        assert!(log[1].starts_with("change "));

        let dst = engine.store().destination("10.0.0.1", 0).unwrap();
        assert_eq!(dst.stream_number(), 1);
    }

    #[test]
    fn test_change_carries_old_and_new() {
        let (issuer, _rx) = CommandIssuer::channel();
        let mut engine = StateEngine::new(issuer);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let s = seen.clone();
        engine.on_change(move |_, old, new| {
            if let (ResourceRef::GpioInput(old), ResourceRef::GpioInput(new)) = (old, new) {
                s.lock().unwrap().push((old.code().to_string(), new.code().to_string()));
            }
        });
        load(&mut engine, &[GPI]);

        feed(&mut engine, "GPI\t10.0.0.1\t0\tnode1\thhlhh").unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![("hhhhh".to_string(), "hhlhh".to_string())]);
        assert!(engine.store().gpi("10.0.0.1", 0).unwrap().bit_state(2).unwrap());
    }

    #[test]
    fn test_load_helper_follows_handshake() {
        let (mut engine, mut rx, log) = engine();
        load(&mut engine, &[NODE, SRC, DST, GPI, GPO]);

        assert!(engine.is_ready());
        assert_eq!(drain(&mut rx), SUBSCRIPTIONS.to_vec());
        assert_eq!(*log.lock().unwrap(), vec!["ready nodes=1".to_string()]);
    }

    #[test]
    fn test_add_then_lookup_every_kind() {
        let (mut engine, _rx, log) = engine();
        load(&mut engine, &[NODE, SRC, DST, GPI]);
        feed(&mut engine, GPO).unwrap();

        let store = engine.store();
        assert_eq!(
            store.node("10.0.0.1").unwrap(),
            &NetworkNode::new("10.0.0.1", "node1", "dev1", 4, 4, 5, 5)
        );
        assert_eq!(
            store.source("10.0.0.1", 0).unwrap(),
            &AudioSource::new("10.0.0.1", 0, "node1", "239.192.0.1", "Mic 1", true, 2, 240)
        );
        assert_eq!(
            store.destination("10.0.0.1", 0).unwrap(),
            &AudioDestination::new("10.0.0.1", 0, "node1", "", "PGM", 2)
        );
        assert_eq!(
            store.gpi("10.0.0.1", 0).unwrap(),
            &GpioInput::new("10.0.0.1", 0, "node1", GpioCode::new("hhhhh").unwrap())
        );
        assert_eq!(
            store.gpo("10.0.0.1", 1).unwrap(),
            &GpioOutput::new(
                "10.0.0.1",
                1,
                "node1",
                GpioCode::new("hhhhh").unwrap(),
                "Tally",
                "10.0.0.2",
                Some(4)
            )
        );

        let log = log.lock().unwrap();
        assert_eq!(log.len(), 2);
        assert!(log[1].starts_with("add gpio output"));
    }

    #[test]
    fn test_gpo_name_change_detected() {
        let (mut engine, _rx, log) = engine();
        load(&mut engine, &[GPO]);

        feed(&mut engine, "GPO\t10.0.0.1\t1\tnode1\thhhhh\tTally\t10.0.0.2\t4").unwrap();
        assert_eq!(log.lock().unwrap().len(), 1);

        feed(&mut engine, "GPO\t10.0.0.1\t1\tnode1\thhhhh\tCue\t10.0.0.2\t4").unwrap();
        let changes = log.lock().unwrap().iter().filter(|e| e.starts_with("change ")).count();
        assert_eq!(changes, 1);
        assert_eq!(engine.store().gpo("10.0.0.1", 1).unwrap().name(), "Cue");
    }

    #[test]
    fn test_update_absent_key() {
        let (mut engine, _rx, log) = engine();
        load(&mut engine, &[]);

        let err = feed(&mut engine, "GPI\t10.0.0.1\t0\tnode1\thhlhh").unwrap_err();
        assert!(matches!(err, ClientError::Core(dsync_core::Error::KeyNotFound { .. })));
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_alarms_suppressed_until_ready() {
        let (mut engine, _rx, log) = engine();
        let silence = "SILENCE\t10.0.0.1\t0\tINPUT\tLEFT\t1";

        engine.start().unwrap();
        for _ in 0..5 {
            feed(&mut engine, "ok").unwrap();
        }
        feed(&mut engine, silence).unwrap();
        feed(&mut engine, "ok").unwrap();
        feed(&mut engine, "ok").unwrap();
        assert_eq!(log.lock().unwrap().len(), 1);

        feed(&mut engine, silence).unwrap();
        assert_eq!(log.lock().unwrap()[1], "alarm SILENCE 10.0.0.1/0 INPUT LEFT active");
    }

    #[test]
    fn test_frame_for_unsubscribed_kind() {
        let (mut engine, _rx, _log) = engine();
        engine.start().unwrap();

        let err = feed(&mut engine, SRC).unwrap_err();
        assert!(matches!(err, ClientError::Protocol(ProtocolError::Handshake(_))));
    }

    #[test]
    fn test_error_reply() {
        let (mut engine, _rx, _log) = engine();
        engine.start().unwrap();
        assert!(feed(&mut engine, "error").is_err());

        let (mut engine, _rx, _log) = self::engine();
        load(&mut engine, &[]);
        assert!(feed(&mut engine, "error").is_ok());
    }

    #[test]
    fn test_malformed_frame() {
        let (mut engine, _rx, _log) = engine();
        engine.start().unwrap();

        let err = feed(&mut engine, "NODEADD\t10.0.0.1\tnode1").unwrap_err();
        assert!(matches!(err, ClientError::Protocol(ref e) if e.is_parse_error()));
        assert!(engine.store().is_empty());
    }

    #[test]
    fn test_unknown_frame_ignored() {
        let (mut engine, _rx, log) = engine();
        load(&mut engine, &[]);

        feed(&mut engine, "TETHER\t1").unwrap();
        feed(&mut engine, "").unwrap();
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_issuer_shares_connection() {
        let (mut engine, mut rx, _log) = engine();
        load(&mut engine, &[]);
        drain(&mut rx);

        engine
            .commands()
            .set_gpo_bit(SlotKey::new("10.0.0.1", 0), 2, true)
            .unwrap();
        assert_eq!(&drain(&mut rx)[0].encode()[..], b"SetGpoState 10.0.0.1 0 xxlxx\r\n");
    }

    #[tokio::test]
    async fn test_run_end_to_end() {
        let (mut engine, mut rx, log) = engine();
        let mut input = format!("{}\r\n", NODE);
        for _ in 0..7 {
            input.push_str("ok\r\n");
        }

        let result = engine.run(input.as_bytes()).await;

        assert!(matches!(result, Err(ClientError::ConnectionClosed)));
        assert_eq!(engine.store().nodes().count(), 1);
        assert_eq!(*log.lock().unwrap(), vec!["ready nodes=1".to_string()]);
        assert_eq!(drain(&mut rx).len(), 7);
    }

    #[tokio::test]
    async fn test_run_frame_too_large() {
        let (issuer, _rx) = CommandIssuer::channel();
        let mut engine = StateEngine::new(issuer).with_max_frame_len(8);

        let result = engine.run(&b"NODEADD\t10.0.0.1\r"[..]).await;
        assert!(matches!(
            result,
            Err(ClientError::Protocol(ProtocolError::MessageTooLarge { .. }))
        ));
    }
}
