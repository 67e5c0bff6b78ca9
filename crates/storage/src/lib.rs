#![forbid(unsafe_code)]

pub mod bank;
pub mod repository;
pub mod sqlite;

pub use bank::{BankError, load_bank, parse_bank};
pub use repository::{HistoryRepository, InMemoryHistoryStore, Storage, StorageError};
