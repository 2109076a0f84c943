//! Capabilities: named boolean permissions per acting user per board
//!
//! Capabilities are supplied by an external permission collaborator through
//! [`CapabilityProvider`]. The engine only reads them, and mirrors the actor's
//! set verbatim into the client state.

use crate::types::{BoardId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A named permission flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    View,
    ManageColumns,
    AddCard,
    ManageAllCards,
    ManageAssignedCards,
    MoveAllCards,
    MoveAssignedCards,
    AssignSelf,
    AssignOthers,
}

impl Capability {
    /// Every capability, in declaration order
    pub const ALL: [Capability; 9] = [
        Capability::View,
        Capability::ManageColumns,
        Capability::AddCard,
        Capability::ManageAllCards,
        Capability::ManageAssignedCards,
        Capability::MoveAllCards,
        Capability::MoveAssignedCards,
        Capability::AssignSelf,
        Capability::AssignOthers,
    ];

    /// Wire name, e.g. "moveallcards"
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::ManageColumns => "managecolumns",
            Self::AddCard => "addcard",
            Self::ManageAllCards => "manageallcards",
            Self::ManageAssignedCards => "manageassignedcards",
            Self::MoveAllCards => "moveallcards",
            Self::MoveAssignedCards => "moveassignedcards",
            Self::AssignSelf => "assignself",
            Self::AssignOthers => "assignothers",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The capability flags of one user on one board. Absent flags are false.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet(BTreeMap<Capability, bool>);

impl CapabilitySet {
    /// A set with no capability granted
    pub fn none() -> Self {
        Self::default()
    }

    /// A set with every capability granted
    pub fn all() -> Self {
        Capability::ALL.iter().copied().collect()
    }

    /// Grant a capability
    pub fn with(mut self, capability: Capability) -> Self {
        self.set(capability, true);
        self
    }

    /// Revoke a capability
    pub fn without(mut self, capability: Capability) -> Self {
        self.set(capability, false);
        self
    }

    /// Set a flag explicitly
    pub fn set(&mut self, capability: Capability, granted: bool) {
        self.0.insert(capability, granted);
    }

    /// Check a flag
    pub fn has(&self, capability: Capability) -> bool {
        self.0.get(&capability).copied().unwrap_or(false)
    }

    /// Iterate all explicitly set flags
    pub fn iter(&self) -> impl Iterator<Item = (Capability, bool)> + '_ {
        self.0.iter().map(|(c, g)| (*c, *g))
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self(iter.into_iter().map(|c| (c, true)).collect())
    }
}

/// Supplies capabilities per acting user per board
pub trait CapabilityProvider: Send + Sync {
    fn capabilities(&self, user: &UserId, board: &BoardId) -> CapabilitySet;
}

/// In-memory capability table: per-user overrides over a default set
#[derive(Debug, Clone, Default)]
pub struct StaticCapabilities {
    default: CapabilitySet,
    users: HashMap<UserId, CapabilitySet>,
}

impl StaticCapabilities {
    /// Every user gets `default` unless overridden
    pub fn new(default: CapabilitySet) -> Self {
        Self {
            default,
            users: HashMap::new(),
        }
    }

    /// Everyone may do everything
    pub fn permissive() -> Self {
        Self::new(CapabilitySet::all())
    }

    /// Override the set for one user
    pub fn with_user(mut self, user: impl Into<UserId>, set: CapabilitySet) -> Self {
        self.users.insert(user.into(), set);
        self
    }
}

impl CapabilityProvider for StaticCapabilities {
    fn capabilities(&self, user: &UserId, _board: &BoardId) -> CapabilitySet {
        self.users
            .get(user)
            .cloned()
            .unwrap_or_else(|| self.default.clone())
    }
}
