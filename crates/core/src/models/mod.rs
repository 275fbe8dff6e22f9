//! Data models for ClassMatch

mod session;
mod user;

pub use session::*;
pub use user::*;
