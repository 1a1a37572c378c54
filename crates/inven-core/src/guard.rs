use inven_common::types::Item;

/// Default cumulative payload ceiling for one upload batch.
pub const DEFAULT_UPLOAD_CEILING_BYTES: usize = 1024 * 1024;

/// Admission gate for the upload batch.
///
/// Exceeding the ceiling is an expected, recoverable condition signaled
/// through the returned boolean, never through an error; the caller decides
/// whether to drop, truncate, or defer the offending item.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use inven_common::types::Item;
/// use inven_core::SizeGuard;
///
/// let item = |content: &str| Item {
///     name: "Host:OperatingSystem".to_string(),
///     schema_version: "1.0".to_string(),
///     content: content.to_string(),
///     captured_at: Utc::now(),
/// };
///
/// let guard = SizeGuard::new(10);
/// let accepted = vec![item("12345678")];
/// assert!(guard.within_limit(&item("12"), &accepted));
/// assert!(!guard.within_limit(&item("123"), &accepted));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SizeGuard {
    ceiling_bytes: usize,
}

impl SizeGuard {
    pub fn new(ceiling_bytes: usize) -> Self {
        Self { ceiling_bytes }
    }

    pub fn ceiling_bytes(&self) -> usize {
        self.ceiling_bytes
    }

    /// Returns `true` iff adding `candidate` to the already-accepted items
    /// keeps the cumulative payload at or under the ceiling.
    ///
    /// Pure predicate: never mutates `accepted`.
    pub fn within_limit(&self, candidate: &Item, accepted: &[Item]) -> bool {
        let accumulated: usize = accepted.iter().map(Item::size_bytes).sum();
        candidate.size_bytes().saturating_add(accumulated) <= self.ceiling_bytes
    }
}

impl Default for SizeGuard {
    fn default() -> Self {
        Self::new(DEFAULT_UPLOAD_CEILING_BYTES)
    }
}
