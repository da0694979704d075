//! Detection event system: the observability port handed to the engine.

pub mod dispatcher;
pub mod handler;
pub mod types;

pub use dispatcher::EventDispatcher;
pub use handler::DetectionEventHandler;
