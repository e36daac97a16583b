//! Eator API client

pub mod api;
pub mod eator;
#[cfg(test)]
pub mod fixtures;
#[cfg(test)]
pub mod mock;
pub mod models;

pub use api::{AuthApi, PinApi};
pub use eator::EatorClient;
#[cfg(test)]
pub use mock::MockEatorClient;

/// Full Eator API surface
pub trait EatorApi: AuthApi + PinApi {}

impl<T: AuthApi + PinApi> EatorApi for T {}
