//! Business logic services.

pub mod connection_probe;

pub use connection_probe::ConnectionProber;
