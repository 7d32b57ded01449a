//! HTTP router, handlers and middleware.

pub(crate) mod constants;
pub(crate) mod errors;
pub(crate) mod health;
pub(crate) mod index;
pub(crate) mod router;
pub(crate) mod telemetry;
pub(crate) mod truncate;
