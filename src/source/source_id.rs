//! Input identification type.

/// Unique identifier for a combiner input.
///
/// Identifiers are allocated by the [`Combiner`](crate::Combiner) in
/// registration order and never reused within one combiner. They show up in
/// log fields, [`CombinerEvent`](crate::CombinerEvent)s and errors.
///
/// # Example
///
/// ```
/// use stream_combiner::SourceId;
///
/// let id = SourceId::new(3);
/// assert_eq!(id.get(), 3);
/// assert_eq!(id.to_string(), "input-3");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(u64);

impl SourceId {
    /// Creates a source ID from its raw value.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw numeric value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "input-{}", self.0)
    }
}

impl From<u64> for SourceId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}
