//! Data-access layer for the fleet store.
//! - One contract ([`FleetService`]) with two interchangeable backends.
//! - Shared defaulting, allow-listing and reporting so both behave the same.
//! - Store-side rules stay in the store; failures surface with the store's message.

pub mod catalog;
pub mod contract;
pub mod defaults;
pub mod dispatch;
pub mod domain;
pub mod errors;
pub mod executor;
pub mod mapped;
pub mod raw;
pub mod reporting;
pub mod row_set;
pub mod selector;
pub mod statement;
#[cfg(test)]
pub mod test_support;

pub use configs::BackendKind;
pub use contract::{FleetService, DEFAULT_PREVIEW_ROWS};
pub use errors::FleetError;
pub use row_set::{Cell, RowSet};
pub use selector::{create_service, ServiceSelector};
