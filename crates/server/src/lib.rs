//! HTTP surface over the cover search core, exported as a library so
//! integration tests can build the router in-process.

pub mod api;
pub mod state;
