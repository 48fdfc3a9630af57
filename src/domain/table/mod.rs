// ============================================================
// TABLE DOMAIN LAYER
// ============================================================
// Tagged cells, rows and the normalized table every engine reads
// No I/O, no async, no external dependencies

mod cell;
mod table;

pub use cell::Cell;
pub use table::{Row, Table};
