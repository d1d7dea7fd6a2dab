//! Protocol module containing the JSON wire messages, their codec, and the
//! router-to-injection-unit channel vocabulary.

pub mod codec;
pub mod messages;
pub mod worker;

pub use codec::{decode_client_message, decode_server_message, encode_message, ProtocolError};
pub use messages::*;
pub use worker::{WorkerCommand, WorkerEvent};
