//! Hub relay library
//!
//! Delivers row-insert events to channel subscribers. Exposed as a library
//! for the integration tests.

mod connection;
mod messages;
mod state;

pub use connection::handle_connection;
pub use connection::handle_message;
pub use messages::RelayEvent;
pub use state::RelayState;
