//! Long-poll client for the vBulletin chatbox.
//!
//! A [`ChatboxClient`] logs in to a forum, keeps its security token current,
//! mirrors the chatbox feed into a [`ChatSink`] and posts messages back:
//!
//! ```ignore
//! let config = ChatboxConfig::new("https://forum.example.com/", "alice", "secret")?;
//! let client = ChatboxClient::connect(config, Arc::new(ReqwestTransport::new()?), sink).await?;
//! client.send("hello \u{1F600}");
//! client.stop().await;
//! ```
//!
//! Wire-level details (encoding, form bodies, feed extraction) live in
//! [`vbchat_protocol`], re-exported here as [`protocol`].

pub mod client;
pub mod command;
pub mod config;
pub mod cookies;
pub mod error;
pub mod fake;
pub mod fetcher;
pub mod poller;
pub mod sender;
pub mod session;
pub mod sink;
pub mod transport;

pub use client::ChatboxClient;
pub use command::Command;
pub use config::ChatboxConfig;
pub use error::{Error, Result};
pub use poller::{MessagePoller, PollControl, PollCursor, PollExit};
pub use sender::{Escalation, MessageSender, SendReport};
pub use session::SessionState;
pub use sink::{ChatSink, Notice};
pub use transport::{ReqwestTransport, Transport};
pub use vbchat_protocol as protocol;
pub use vbchat_protocol::{IdentityStyle, KnownUser, RemoteMessage, TokenPage};
