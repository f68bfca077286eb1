use std::collections::BTreeSet;
use std::fmt;

use crate::foundation::error::{BakeError, BakeResult};

/// Default first identifier handed out by an [`IdAllocator`].
///
/// Seven digits keeps freshly minted IDs visually distinct from the template's own.
pub const DEFAULT_ID_FLOOR: i64 = 6_000_001;

/// Highest floor a session may start from; leaves room for a billion minted IDs.
pub const MAX_ID_FLOOR: i64 = i64::MAX - 1_000_000_000;

/// Numeric object identifier as it appears in the interchange text (`Model: 123, ...`).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ObjectId(pub i64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session-scoped, strictly increasing ID source.
///
/// IDs listed as reserved (typically every ID already declared by the template) are skipped, so a
/// minted ID never collides with one that exists in the source file.
#[derive(Clone, Debug)]
pub struct IdAllocator {
    floor: i64,
    /// `None` once `i64::MAX` has been handed out.
    next: Option<i64>,
    reserved: BTreeSet<i64>,
}

impl IdAllocator {
    /// Allocator starting at `floor`.
    pub fn new(floor: i64) -> Self {
        Self {
            floor,
            next: Some(floor),
            reserved: BTreeSet::new(),
        }
    }

    /// Allocator starting at `floor` that never returns any of `reserved`.
    pub fn with_reserved(floor: i64, reserved: impl IntoIterator<Item = ObjectId>) -> Self {
        let mut alloc = Self::new(floor);
        alloc.reserve(reserved);
        alloc
    }

    /// Mark additional IDs as taken.
    pub fn reserve(&mut self, ids: impl IntoIterator<Item = ObjectId>) {
        self.reserved
            .extend(ids.into_iter().map(|id| id.0).filter(|&v| v >= self.floor));
    }

    /// Lowest value this allocator may return.
    pub fn floor(&self) -> i64 {
        self.floor
    }

    /// Mint the next free identifier; fails once the ID space above the floor is used up.
    pub fn next_id(&mut self) -> BakeResult<ObjectId> {
        while let Some(candidate) = self.next {
            self.next = candidate.checked_add(1);
            if !self.reserved.contains(&candidate) {
                return Ok(ObjectId(candidate));
            }
        }
        Err(BakeError::configuration(format!(
            "object id space above {} is exhausted",
            self.floor
        )))
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new(DEFAULT_ID_FLOOR)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/ids.rs"]
mod tests;
