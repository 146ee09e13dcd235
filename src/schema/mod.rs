//! # Schema Module
//!
//! The canonical schema representation shared by every parser path and the
//! query validator. All ingestion routes normalize into this one shape; see
//! [`model`] for the invariants it carries.

pub mod model;

pub use model::{Column, Row, Schema, Table, UNKNOWN_TYPE};
