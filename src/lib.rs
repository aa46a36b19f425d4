pub mod config;
pub mod error;
pub mod geometry;
pub mod kernel;
pub mod layout;
pub mod math;
pub mod operations;
pub mod rectangle;
pub mod records;
pub mod registry;
pub mod session;
pub mod zone;

pub use config::GraphConfig;
pub use error::{Result, StoreGraphError};
pub use layout::{Command, CommandOutput, StoreLayout};
pub use session::{Mode, Session};
