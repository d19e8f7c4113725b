//! Request handlers.

pub mod applications;
pub mod careers;
pub mod health;

pub use applications::*;
pub use careers::*;
pub use health::*;
