//! MPL Rewards Core Types
//!
//! Account layouts, instruction builders and program addresses for the
//! Metaplex rewards program. Nothing in this crate talks to a cluster.

mod account;
mod codec;
mod error;
mod gpa;
mod programs;
mod shared;
mod transaction;

pub mod accounts;
pub mod instructions;
pub mod pda;

pub use account::*;
pub use error::*;
pub use gpa::*;
pub use programs::*;
pub use shared::*;
pub use transaction::*;
