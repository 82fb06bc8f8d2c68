//! In-memory acquisition channels for testing.
//!
//! `MockCommand` stands in for the diagnostic command and `MockBus` for the
//! system bus, so collectors can be exercised without a running resolver.

mod bus;
mod command;
pub mod scenarios;

pub use bus::MockBus;
pub use command::MockCommand;
