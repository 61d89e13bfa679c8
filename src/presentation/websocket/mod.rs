//! WebSocket Gateway
//!
//! Real-time presence and direct-message delivery.

pub mod dispatcher;
pub mod gateway;
pub mod handler;
pub mod lifecycle;
pub mod messages;
pub mod registry;

pub use dispatcher::{Delivery, DispatchError, MessageDispatcher};
pub use gateway::Gateway;
pub use handler::ws_handler;
pub use lifecycle::{ConnectionLifecycle, ConnectionState, HelloOutcome};
pub use messages::{ClientEvent, ServerEvent};
pub use registry::{ConnectionHandle, ConnectionId, ConnectionRegistry};
