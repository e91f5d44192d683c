//! Request handlers.

pub mod downloads;
pub mod health;
pub mod tasks;

pub use downloads::*;
pub use health::*;
pub use tasks::*;
