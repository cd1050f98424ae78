//! # Agora Harness
//!
//! A deterministic world that wires the four governance contracts
//! together with mock collaborators (NFT collection, token ledger,
//! governance targets), driving an explicit clock and block counter.
//!
//! The harness is where the cross-contract flows live: unit tests in the
//! contract crates exercise each state machine in isolation; integration
//! tests here run the full stake -> vote -> execute loop.

pub mod mocks;
pub mod world;

pub use mocks::{MockLedger, MockNft, MockTarget};
pub use world::World;
