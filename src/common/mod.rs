// Shared type aliases

pub mod types;

pub use types::{ItemId, TxnId};
