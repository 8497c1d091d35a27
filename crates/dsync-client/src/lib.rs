//! dsync Client - keeps an in-memory mirror of a Protocol D fabric
//!
//! A [`Client`] connects to the controller, subscribes to every resource
//! stream in turn and applies the frames it receives to a
//! [`ResourceStore`](dsync_core::ResourceStore). Once the last subscribe is
//! acknowledged the ready handler fires, and from then on every add, delete,
//! change and alarm is reported through the registered handlers.
//!
//! ```no_run
//! use dsync_client::{Client, ClientConfig};
//!
//! # async fn example() -> dsync_client::ClientResult<()> {
//! let mut client = Client::connect(&ClientConfig::new("192.168.10.2")).await?;
//! client.engine_mut().on_ready(|store| println!("{} nodes", store.nodes().count()));
//! client.engine_mut().on_change(|_, old, new| println!("{} -> {}", old, new));
//!
//! let (_engine, result) = client.run().await;
//! result
//! # }
//! ```

pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod handshake;
pub mod notify;
pub mod session;

pub use commands::{write_commands, CommandIssuer};
pub use config::ClientConfig;
pub use engine::StateEngine;
pub use error::{ClientError, ClientResult};
pub use handshake::{Handshake, Step, SUBSCRIPTIONS};
pub use notify::{Handler, Handlers};
pub use session::Client;
