//! Local model server adapter
//!
//! Talks to a locally hosted model server over its JSON HTTP API and
//! implements the [`LanguageModel`](thinkstep_application::LanguageModel)
//! and [`AvailabilityPort`](thinkstep_application::AvailabilityPort) ports.

pub mod error;
pub mod gateway;
pub mod protocol;
pub mod session;

#[cfg(test)]
mod test_server;
