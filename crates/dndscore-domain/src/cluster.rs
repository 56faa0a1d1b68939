//! Claim clusters - equivalence classes produced by deduplication

use crate::claim::Claim;
use serde::{Deserialize, Serialize};

/// A non-empty set of claims judged mutually equivalent
///
/// Members are kept in ordinal order, so the representative (the canonical claim
/// that gets verified) is always the earliest mention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimCluster {
    id: usize,
    members: Vec<Claim>,
}

impl ClaimCluster {
    /// Build a cluster from its members
    ///
    /// Members are sorted by ordinal. Returns `None` for an empty member list,
    /// since every cluster must own at least its representative.
    ///
    /// # Examples
    ///
    /// ```
    /// use dndscore_domain::{Claim, ClaimCluster, PassageId};
    ///
    /// let p = PassageId::new("p");
    /// let cluster = ClaimCluster::from_members(0, vec![
    ///     Claim::new("b", p.clone(), 3, "s"),
    ///     Claim::new("a", p.clone(), 1, "s"),
    /// ]).unwrap();
    /// assert_eq!(cluster.representative().ordinal(), 1);
    /// assert_eq!(cluster.size(), 2);
    /// ```
    pub fn from_members(id: usize, mut members: Vec<Claim>) -> Option<Self> {
        if members.is_empty() {
            return None;
        }
        members.sort_by_key(Claim::ordinal);
        Some(Self { id, members })
    }

    /// Build a singleton cluster
    pub fn singleton(id: usize, claim: Claim) -> Self {
        Self {
            id,
            members: vec![claim],
        }
    }

    /// Cluster identifier, unique within one passage
    pub fn id(&self) -> usize {
        self.id
    }

    /// Lowest-ordinal member
    pub fn representative(&self) -> &Claim {
        &self.members[0]
    }

    /// All members in ordinal order
    pub fn members(&self) -> &[Claim] {
        &self.members
    }

    /// Number of deduplicated mentions
    pub fn size(&self) -> usize {
        self.members.len()
    }

    /// Ordinals of all members
    pub fn ordinals(&self) -> Vec<usize> {
        self.members.iter().map(Claim::ordinal).collect()
    }

    /// Whether the cluster contains the claim with this ordinal
    pub fn contains(&self, ordinal: usize) -> bool {
        self.members.iter().any(|c| c.ordinal() == ordinal)
    }
}
