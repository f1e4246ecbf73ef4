//! Witness policies for transparency log checkpoints
//!
//! A policy names the witnesses a relying party trusts, groups them into
//! threshold expressions, and designates one expression as the quorum a
//! checkpoint's cosignatures must satisfy.
//!
//! ```text
//! # comments start with '#'
//! log example.com/log+58490f8b+ARl/ayPhbIUy...
//! witness w1 witness.example+d831bcf1+BOpKbGPi... https://w1.example/
//! witness w2 ...
//! group trusted 2 w1 w2 w3
//! quorum trusted
//! ```

pub mod error;
pub mod policy;
pub mod quorum;

pub use error::{Error, Result};
pub use policy::{PolicyLog, PolicyWitness, WitnessPolicy};
pub use quorum::PolicyNode;
