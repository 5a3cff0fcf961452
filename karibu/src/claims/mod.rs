//! The competitive claims engine.
//!
//! A group booking can be advertised to property owners for a time-boxed
//! window, during which owners submit priced claims. This module holds the
//! pieces that make that safe:
//!
//! - [`eligibility`]: the pure rule engine deciding whether a property and
//!   offer may claim a booking
//! - [`window`]: deadline computation, lazy expiry sweeping and the periodic
//!   background sweeper
//! - [`submission`]: the transactional claim-submission coordinator
//!
//! Everything stateful funnels through the repositories in [`crate::db`];
//! nothing here holds state of its own.

pub mod eligibility;
pub mod submission;
pub mod window;
