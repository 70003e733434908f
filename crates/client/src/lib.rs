//! REST client for the rota scheduling API.
//!
//! [`api::RotaApi`] wraps the HTTP endpoints with [`reqwest`] and maps
//! every payload through the decoders in `rota_core::wire`. Consumers
//! depend on the [`traits::ScheduleApi`] seam so they can be tested
//! without a server.

pub mod api;
pub mod config;
pub mod error;
pub mod traits;

pub use api::RotaApi;
pub use config::ClientConfig;
pub use error::ApiError;
pub use traits::ScheduleApi;

#[cfg(any(test, feature = "test-support"))]
pub use traits::MockScheduleApi;
