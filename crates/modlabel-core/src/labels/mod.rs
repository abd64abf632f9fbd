//! Address labels for the debugged process.
//!
//! Provides the module-relative label table with its single-lock store,
//! and the codec that persists it into the session document as separate
//! manual and automatic buckets.

mod codec;
mod store;
mod table;
mod types;

pub use codec::{LoadSummary, SaveSummary, AUTOMATIC_KEY, MANUAL_KEY};
pub use store::LabelStore;
pub use types::{
    LabelEntry, LabelError, LabelInfo, LabelText, MAX_LABEL_LEN, MAX_MODULE_NAME_LEN,
    RESERVED_CHAR,
};
