pub mod backoff;
pub mod ws_client;

pub use backoff::{ReconnectBackoff, ReconnectPolicy};
pub use ws_client::{ConnectionState, StreamClient, StreamHandle};
