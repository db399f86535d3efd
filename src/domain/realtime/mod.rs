//! Real-time push vocabulary: messages, close reasons and errors.

mod close;
mod errors;
mod message;

pub use close::{close_code, CloseReason};
pub use errors::{RegistryError, TransportError};
pub use message::{ChartSeries, MessageKind, PushMessage};
