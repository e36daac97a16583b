//! API trait definitions split by responsibility
//!
//! - [`AuthApi`] - Account and login operations
//! - [`PinApi`] - Pin CRUD operations
//!
//! The [`EatorApi`](super::EatorApi) super-trait combines both.

mod auth;
mod pins;

pub use auth::AuthApi;
pub use pins::PinApi;
