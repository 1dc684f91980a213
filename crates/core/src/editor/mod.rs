//! Signature and rubric position editing.
//!
//! [`PositionEditor`] is the session controller; [`PositionList`] is the
//! engine it runs once per position kind.

pub mod controller;
pub mod position_list;

pub use controller::{DocumentLoadState, PageGeometry, PositionEditor};
pub use position_list::PositionList;
