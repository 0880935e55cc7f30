pub mod handshake;

pub use handshake::{CallbackParams, ExchangeFailure, HandshakePolicy, LoginLink};
