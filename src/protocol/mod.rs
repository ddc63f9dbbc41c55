//! Compact text notations for positions (DFEN) and orders (DSON).
//!
//! Used for the configured starting board and for rendering reconstructed
//! histories.

pub mod dfen;
pub mod dson;

pub use dfen::{encode_dfen, parse_dfen, DfenError};
pub use dson::{format_order, parse_order, DsonError};
