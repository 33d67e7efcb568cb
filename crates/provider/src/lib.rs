//! Policy appliers and the action handler that drives a revocation.
//!
//! The handler is independent of the transport: it talks to an
//! [`ApplierFactory`], which turns a region and a set of credentials into a
//! [`DynPolicyApplier`]. The AWS implementation lives in `revoker-aws`;
//! [`LogApplier`] is a dry-run stand-in that performs no I/O.

pub mod applier;
pub mod handler;
pub mod log;

pub use applier::{ApplierFactory, DynPolicyApplier, PolicyApplier, apply_policy};
pub use handler::{RevokeSessionsHandler, Stage};
pub use log::LogApplier;
