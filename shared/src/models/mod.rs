//! Domain models for the Farm Assist platform

mod chat;
mod recommendation;
mod session;
mod soil;
mod weather;

pub use chat::*;
pub use recommendation::*;
pub use session::*;
pub use soil::*;
pub use weather::*;
