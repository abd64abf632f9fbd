pub mod error;
pub mod hex;
pub mod labels;
pub mod session;
pub mod snapshot;
pub mod target;
#[cfg(test)]
pub(crate) mod test_util;

pub use error::CoreError;
pub use labels::{LabelError, LabelInfo, LabelStore};
pub use snapshot::ProcessSnapshot;
pub use target::{Address, DebugTarget};
