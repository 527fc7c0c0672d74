pub mod adapters;
pub mod app;
pub mod config;
pub mod ports;
pub mod push;
mod session;
pub mod store;
pub mod sync;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use app::{Action, run};
