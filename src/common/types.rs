/// Transaction ID type
pub type TxnId = u32;

/// Data item identifier type
///
/// Items are opaque names; the lock manager never looks at a payload.
pub type ItemId = String;
