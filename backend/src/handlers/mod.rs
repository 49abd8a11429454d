//! HTTP request handlers

pub mod chat;
pub mod health;
pub mod launch;
pub mod recommendation;
pub mod weather;

pub use chat::*;
pub use health::*;
pub use launch::*;
pub use recommendation::*;
pub use weather::*;
