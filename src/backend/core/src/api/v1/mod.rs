//! V1 API.
//!
//! V1 is the current stable API version.

pub mod routes;
