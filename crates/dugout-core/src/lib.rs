// Shared building blocks: configuration, table identity, row cells, and
// numeric coercion for loosely typed CSV input.

pub mod cell;
pub mod coerce;
pub mod config;
pub mod table;

pub use cell::{Field, Row, NULL_SENTINEL};
pub use table::TableKind;
