//! Convenient re-exports for common usage.
//!
//! ```
//! use lww_dict::prelude::*;
//! ```

pub use crate::Bias;
pub use crate::Crdt;
pub use crate::DeltaCrdt;
pub use crate::Item;
pub use crate::LWWDict;
pub use crate::LWWDictDelta;
pub use crate::Lookup;
