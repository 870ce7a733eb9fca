/// cloudseal library crate: client-side encryption envelopes for files kept on
/// an untrusted server.
///
/// All modules are public so that `tests/` integration tests can reach the
/// crypto core via `use cloudseal::crypto::*`.
pub mod config;
pub mod crypto;
pub mod envelope;
pub mod error;
pub mod payload;
pub mod store;
pub mod transport;
pub mod util;
