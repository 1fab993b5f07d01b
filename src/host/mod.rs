//! Everything that faces the application hosting the bridge: its display
//! targets, its settings form, and the stdio command protocol.

pub mod channel;
pub mod contract;
pub mod display;
pub mod handler;
pub mod properties;
pub mod stdio;

pub use display::{DisplayHost, FileHost, MemoryHost, TextWrite};
pub use handler::BridgeHandler;
pub use properties::{PropertyDescriptor, PropertyKind, properties};
