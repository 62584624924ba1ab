//! Table storage for fuzzdex
//!
//! The persisted schema (`words` and `entries`) as an in-memory table store:
//! a unique word index, one hash index per matcher column, posting indexes by
//! word, row and model, and undo-logged write transactions behind a
//! `parking_lot::RwLock`.

pub mod store;
pub mod tables;

pub use store::{IndexStore, InsertOutcome, ReadView, StoreStats, WriteTxn};
pub use tables::{Tables, WordFilter};
