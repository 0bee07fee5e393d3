mod chat;
pub mod input;
mod message;
mod profile;

pub use chat::ChatSummary;
pub use message::{ChatKind, Message};
pub use profile::Profile;
