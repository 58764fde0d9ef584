//! Domain library for the retail loyalty and claims back office.
//!
//! The heart of the crate is [`loyalty::claims`]: the claim composer
//! (balance arithmetic, reward cart, affordability gate, submission
//! validator), the claim service with its repository traits, and the axum
//! router exposing the back-office HTTP surface. Around it sit the ambient
//! pieces every deployment needs: configuration, telemetry bootstrap, the
//! top-level error type, operator sessions, and the catalog CSV importer.

pub mod config;
pub mod error;
pub mod loyalty;
pub mod telemetry;
