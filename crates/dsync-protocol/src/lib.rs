//! Protocol D - the controller's tab-separated control channel
//!
//! ## Inbound frames
//! ```text
//! <TOKEN>\t<field>\t<field>...\r      # line feeds are ignored anywhere
//! ```
//!
//! ## Outbound commands
//! ```text
//! <Command> <arg> <arg>...\r\n
//! ```

pub mod command;
pub mod decode;
pub mod error;
pub mod frame;
pub mod reader;

pub use command::Command;
pub use decode::{decode_alarm, Decode, ALARM_FIELDS};
pub use error::{ProtocolError, ProtocolResult};
pub use frame::{Frame, FrameType, Operation, FIELD_SEPARATOR};
pub use reader::{FrameReader, FrameStream, FRAME_TERMINATOR, MAX_FRAME_LEN};

/// Well-known controller port
pub const DEFAULT_PORT: u16 = 23883;
