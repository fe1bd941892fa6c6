//! Waybill Testing Infrastructure
//!
//! Deterministic keys, signed party records and route builders shared by the
//! test suites of every Waybill crate.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! waybill-testkit = { workspace = true }
//! ```
//!
//! ```rust,no_run
//! use waybill_testkit::DeliveryScenario;
//!
//! let scenario = DeliveryScenario::two_stop(1_700_000_000_000);
//! assert_eq!(scenario.route.commits.len(), 1);
//! ```

pub mod builders;
pub mod fixtures;
pub mod keys;
pub mod logging;
pub mod scenario;
pub mod strategies;

pub use builders::RouteBuilder;
pub use fixtures::{random_uuid, test_good, PartyFixture};
pub use keys::KeyFixture;
pub use logging::init_test_tracing;
pub use scenario::DeliveryScenario;
