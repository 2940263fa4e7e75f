//! Postgres client flavors.
//!
//! [`NonTx`] executes each statement on a pooled connection as-is, while
//! [`Tx`] runs everything in a single lazily opened transaction.

pub mod non_tx;
pub mod tx;

pub use self::{non_tx::NonTx, tx::Tx};
