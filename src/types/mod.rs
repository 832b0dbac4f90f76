//! Type definitions

pub mod hos;
pub mod messages;
pub mod plan;
pub mod route;
pub mod trip;

pub use hos::*;
pub use messages::*;
pub use plan::*;
pub use route::*;
pub use trip::*;
