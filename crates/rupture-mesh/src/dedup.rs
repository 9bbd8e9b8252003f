//! Ownership resolution for points claimed by several partitions.
//!
//! Near partition boundaries the same point can be contained in elements
//! of more than one rank. After the per-rank `contained` flags have been
//! exchanged, every rank runs the same deterministic resolution so that
//! all ranks agree on one owner per point.

use crate::error::MeshError;

/// Owner rank of each point, or `None` if no rank claimed it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ownership {
    owners: Vec<Option<usize>>,
}

impl Ownership {
    /// Owner of one point.
    pub fn owner(&self, point: usize) -> Option<usize> {
        self.owners.get(point).copied().flatten()
    }

    /// Owners of all points, in point order.
    pub fn owners(&self) -> &[Option<usize>] {
        &self.owners
    }

    /// Contained flags for `rank` after deduplication.
    pub fn claims_for(&self, rank: usize) -> Vec<bool> {
        self.owners.iter().map(|&o| o == Some(rank)).collect()
    }

    /// Number of points no rank claimed.
    pub fn unowned(&self) -> usize {
        self.owners.iter().filter(|o| o.is_none()).count()
    }
}

/// Resolve each point to exactly one owning rank; the lowest rank wins.
///
/// `claims[rank][point]` is the contained flag rank `rank` computed for
/// `point`. All ranks must report the same number of points.
pub fn deduplicate_ownership<C: AsRef<[bool]>>(claims: &[C]) -> Result<Ownership, MeshError> {
    let expected = claims.first().map_or(0, |c| c.as_ref().len());
    if let Some((rank, found)) = claims
        .iter()
        .map(|c| c.as_ref().len())
        .enumerate()
        .find(|&(_, len)| len != expected)
    {
        return Err(MeshError::ClaimLengthMismatch {
            rank,
            expected,
            found,
        });
    }

    let owners: Vec<Option<usize>> = (0..expected)
        .map(|point| claims.iter().position(|c| c.as_ref()[point]))
        .collect();

    let duplicates = (0..expected)
        .filter(|&p| claims.iter().filter(|c| c.as_ref()[p]).count() > 1)
        .count();
    if duplicates > 0 {
        tracing::debug!(duplicates, "resolved points claimed by several ranks");
    }
    Ok(Ownership { owners })
}
