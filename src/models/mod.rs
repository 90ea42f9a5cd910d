//! Data models

pub mod scan;
pub mod audit;
pub mod user;

pub use scan::*;
pub use audit::*;
pub use user::*;
