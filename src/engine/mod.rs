pub mod blocklist;
pub mod extract;
pub mod registry;
mod traits;
pub mod verdict;

pub use blocklist::{BlocklistFilter, BlocklistParams};
pub use extract::{canonical_references, canonicalize, extract, RawReference, ReferenceKind};
pub use registry::FilterRegistry;
pub use traits::Filter;
pub use verdict::{FilterResult, Verdict};
