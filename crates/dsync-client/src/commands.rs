//! Command issuer and the connection's write half

use crate::error::{ClientError, ClientResult};
use bytes::BytesMut;
use dsync_core::{GpioCode, SlotKey};
use dsync_protocol::Command;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, error, trace};

/// Queue end of the command writer.
///
/// Commands are fire-and-forget: each call formats one command and hands it
/// to the writer task without waiting for the controller's reply. Cloning is
/// cheap and every clone feeds the same connection.
#[derive(Debug, Clone)]
pub struct CommandIssuer {
    tx: mpsc::UnboundedSender<Command>,
}

impl CommandIssuer {
    /// Create an issuer and the receiving end a writer drains
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Command>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn send(&self, command: Command) -> ClientResult<()> {
        trace!(command = command.name(), "Queueing command");
        self.tx.send(command).map_err(|_| ClientError::Disconnected)
    }

    /// Route a destination to receive from a source
    pub fn set_crosspoint(&self, destination: SlotKey, source: SlotKey) -> ClientResult<()> {
        self.send(Command::SetCrosspoint { destination, source })
    }

    pub fn clear_crosspoint(&self, destination: SlotKey) -> ClientResult<()> {
        self.send(Command::ClearCrosspoint { destination })
    }

    /// Drive a GPIO output from a GPIO input
    pub fn set_gpio_crosspoint(&self, output: SlotKey, input: SlotKey) -> ClientResult<()> {
        self.send(Command::SetGpioCrosspoint { output, input })
    }

    pub fn clear_gpio_crosspoint(&self, output: SlotKey) -> ClientResult<()> {
        self.send(Command::ClearGpioCrosspoint { output })
    }

    /// Write all five lines of a GPO. Each line must be `l`, `h` or `x`.
    pub fn set_gpo_code(&self, output: SlotKey, code: GpioCode) -> ClientResult<()> {
        let code = writable(code)?;
        self.send(Command::SetGpoState { output, code })
    }

    /// Write one GPO line; bit 0 is the first character of the code
    pub fn set_gpo_bit(&self, output: SlotKey, bit: usize, state: bool) -> ClientResult<()> {
        self.set_gpo_code(output, GpioCode::bit_mask(bit, state)?)
    }

    /// Write all five lines of a GPI. Only software-emulated inputs accept this.
    pub fn set_gpi_code(&self, input: SlotKey, code: GpioCode) -> ClientResult<()> {
        let code = writable(code)?;
        self.send(Command::SetGpiState { input, code })
    }

    pub fn set_gpi_bit(&self, input: SlotKey, bit: usize, state: bool) -> ClientResult<()> {
        self.set_gpi_code(input, GpioCode::bit_mask(bit, state)?)
    }

    pub fn ping(&self) -> ClientResult<()> {
        self.send(Command::Ping)
    }
}

fn writable(code: GpioCode) -> ClientResult<GpioCode> {
    if !code.is_mask() {
        return Err(dsync_core::Error::InvalidGpioCode(code.to_string()).into());
    }
    Ok(code)
}

/// Drain queued commands onto the write half until every issuer is dropped
/// or a write fails.
pub async fn write_commands<W>(mut writer: W, mut rx: mpsc::UnboundedReceiver<Command>)
where
    W: AsyncWrite + Unpin,
{
    let mut buf = BytesMut::with_capacity(128);

    while let Some(command) = rx.recv().await {
        command.encode_into(&mut buf);
        trace!(command = command.name(), len = buf.len(), "Sending command");

        let res = writer.write_all(&buf).await;
        buf.clear();
        if let Err(e) = res {
            error!(error = %e, command = command.name(), "Command write failed");
            return;
        }
    }

    if let Err(e) = writer.shutdown().await {
        debug!(error = %e, "Command writer shutdown failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issuer_queues_commands() {
        let (issuer, mut rx) = CommandIssuer::channel();

        issuer.clear_crosspoint(SlotKey::new("10.0.0.2", 1)).unwrap();
        issuer.set_gpo_bit(SlotKey::new("10.0.0.1", 0), 2, true).unwrap();

        assert_eq!(
            rx.try_recv().unwrap(),
            Command::ClearCrosspoint { destination: SlotKey::new("10.0.0.2", 1) }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            Command::SetGpoState {
                output: SlotKey::new("10.0.0.1", 0),
                code: GpioCode::new("xxlxx").unwrap(),
            }
        );
    }

    #[test]
    fn test_issuer_rejects_bad_bit() {
        let (issuer, mut rx) = CommandIssuer::channel();

        assert!(matches!(
            issuer.set_gpi_bit(SlotKey::new("10.0.0.1", 0), 7, true),
            Err(ClientError::Core(dsync_core::Error::InvalidBit(7)))
        ));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_issuer_writes_only_masks() {
        let (issuer, mut rx) = CommandIssuer::channel();
        let gpo = SlotKey::new("10.0.0.1", 0);

        assert!(matches!(
            issuer.set_gpo_code(gpo.clone(), GpioCode::new("lhLHa").unwrap()),
            Err(ClientError::Core(dsync_core::Error::InvalidGpioCode(_)))
        ));
        assert!(rx.try_recv().is_err());

        issuer.set_gpo_code(gpo, GpioCode::mask("lhxxh").unwrap()).unwrap();
        assert_eq!(&rx.try_recv().unwrap().encode()[..], b"SetGpoState 10.0.0.1 0 lhxxh\r\n");
    }

    #[test]
    fn test_issuer_disconnected() {
        let (issuer, rx) = CommandIssuer::channel();
        drop(rx);

        assert!(matches!(issuer.ping(), Err(ClientError::Disconnected)));
    }

    #[tokio::test]
    async fn test_write_commands() {
        let (issuer, rx) = CommandIssuer::channel();
        let mut out = Vec::new();

        issuer.set_crosspoint(SlotKey::new("10.0.0.2", 0), SlotKey::new("10.0.0.1", 1)).unwrap();
        issuer.ping().unwrap();
        drop(issuer);

        write_commands(&mut out, rx).await;
        assert_eq!(out, b"SetCrosspoint 10.0.0.2 0 10.0.0.1 1\r\nPing\r\n");
    }

    /// Accepts every write, fails on shutdown
    struct NoShutdown(Vec<u8>);

    impl AsyncWrite for NoShutdown {
        fn poll_write(
            mut self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            buf: &[u8],
        ) -> std::task::Poll<std::io::Result<usize>> {
            self.0.extend_from_slice(buf);
            std::task::Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Ok(()))
        }

        fn poll_shutdown(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Err(std::io::ErrorKind::NotConnected.into()))
        }
    }

    #[tokio::test]
    async fn test_write_commands_survives_shutdown_error() {
        let (issuer, rx) = CommandIssuer::channel();
        let mut out = NoShutdown(Vec::new());

        issuer.ping().unwrap();
        drop(issuer);

        write_commands(&mut out, rx).await;
        assert_eq!(out.0, b"Ping\r\n");
    }
}
