//! sea-orm entity definitions for the fleet store's base tables.
//!
//! Only base tables are mapped; views and routines are reached through raw
//! statements in the service crate.

pub mod db;
pub mod driver;
pub mod maintenance_record;
pub mod trip;
pub mod vehicle;
