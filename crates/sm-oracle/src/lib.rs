//! The auth oracle: the synchronous HTTP endpoints an MQTT broker calls
//! on every client authentication, superuser check and ACL decision.

mod form;
mod handlers;
mod server;

pub use server::{build_router, serve};
