//! This crate contains general types and pure functions that need to be shared across multiple
//! crates of the staking workspace.
//!
//! Note that this crate lies at the bottom of the crate-hierarchy in this workspace i.e., it does
//! not depend on any other crate in this workspace.

pub mod address;
pub mod amount;
pub mod constants;
pub mod errors;
pub mod types;

pub use address::Address;
pub use amount::Amount;
pub use errors::PrimitivesError;
pub use types::{ChangeId, SlashCount, SlashRate, Timestamp, TranscoderState};
