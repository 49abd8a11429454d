//! Screen services for the Farm Assist gateway

pub mod chat;
pub mod launch;
pub mod orchestrator;
pub mod recommendation;
pub mod registry;
pub mod sweeper;
pub mod weather;

pub use chat::{ChatSession, ChatSnapshot};
pub use launch::LaunchService;
pub use orchestrator::{ScreenContext, ScreenOrchestrator};
pub use recommendation::{RecommendationSession, RecommendationSnapshot};
pub use registry::{ScreenSession, SessionRegistry};
pub use sweeper::IdleSessionSweeper;
pub use weather::{WeatherSession, WeatherSnapshot};
