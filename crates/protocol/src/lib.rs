//! Wire layer for the vBulletin chatbox.
//!
//! This crate holds everything that decides what goes on the wire and how
//! the forum's responses are read back, without performing any I/O:
//!
//! * [`latin1`]: the fixed single-byte encoding used for every body
//! * [`encoder`]: the outgoing message encoder (percent escapes with an
//!   HTML numeric-reference fallback)
//! * [`form`] and [`endpoints`]: request bodies and paths
//! * [`markup`]: lenient querying of the weakly-formed HTML the forum emits
//! * [`feed`], [`token`], [`timestamp`]: extraction of chatbox rows, the
//!   security token and row timestamps
//!
//! The runtime that drives these (sessions, polling, sending) lives in the
//! `vbchat` crate.

pub mod encoder;
pub mod endpoints;
pub mod feed;
pub mod form;
pub mod latin1;
pub mod markup;
pub mod timestamp;
pub mod token;
pub mod types;

pub use encoder::{encode, encode_utf16_units};
pub use endpoints::{Endpoint, TokenPage};
pub use feed::{ChatRow, parse_feed};
pub use token::extract_security_token;
pub use types::{IdentityStyle, KnownUser, RemoteMessage};
