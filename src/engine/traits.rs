use super::verdict::FilterResult;
use crate::message::Update;

/// A content check consulted for every incoming update.
///
/// Implementations only read the update and their own immutable state, so
/// a single instance is shared by all concurrent handlers.
pub trait Filter: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    fn assess(&self, update: &Update) -> FilterResult;
}
