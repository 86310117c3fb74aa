//! Domain identifiers (strongly-typed IDs).
//!
//! # 2 種類の ID
//! - **`Id<T>`**: 永続化層（collaborator）が採番する数値 ID。
//!   Phantom type で ProjectId / ComponentId / ChecklistItemId を区別します。
//! - **`LocalToken`**: まだ永続化されていない checklist item に付ける一時的な識別子（ULID）。
//!
//! `ChecklistItemKey` はこの 2 つを tagged union として持つので、
//! 一時 ID が collaborator の ID と衝突することはありません。

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// IdMarker は各 ID 型のマーカー trait
///
/// Display で使うプレフィックス（"project-", "component-", ...）を提供します。
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

/// collaborator が採番する数値 ID
///
/// wire 上ではただの数値として (de)serialize されます。
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T: IdMarker> {
    value: u64,
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub const fn new(value: u64) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    pub fn value(&self) -> u64 {
        self.value
    }
}

impl<T: IdMarker> From<u64> for Id<T> {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.value)
    }
}

impl<T: IdMarker> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.value)
    }
}

impl<'de, T: IdMarker> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u64::deserialize(deserializer).map(Self::new)
    }
}

// ========================================
// マーカー型の定義
// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Project {}

impl IdMarker for Project {
    fn prefix() -> &'static str {
        "project-"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Component {}

impl IdMarker for Component {
    fn prefix() -> &'static str {
        "component-"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChecklistItem {}

impl IdMarker for ChecklistItem {
    fn prefix() -> &'static str {
        "item-"
    }
}

/// Identifier of a Project.
pub type ProjectId = Id<Project>;

/// Identifier of a Component (belongs to exactly one Project).
pub type ComponentId = Id<Component>;

/// Identifier of a persisted ChecklistItem.
pub type ChecklistItemId = Id<ChecklistItem>;

/// Placeholder identity for a checklist item the collaborator has not persisted yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalToken(Ulid);

impl LocalToken {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl fmt::Display for LocalToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pending-{}", self.0)
    }
}

/// Identity of a checklist item inside the snapshot.
///
/// `Pending` keys only live until the next full resynchronization, which
/// replaces them with the collaborator-assigned `Persisted` ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChecklistItemKey {
    Persisted(ChecklistItemId),
    Pending(LocalToken),
}

impl ChecklistItemKey {
    pub fn persisted_id(&self) -> Option<ChecklistItemId> {
        match self {
            ChecklistItemKey::Persisted(id) => Some(*id),
            ChecklistItemKey::Pending(_) => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ChecklistItemKey::Pending(_))
    }
}

impl From<ChecklistItemId> for ChecklistItemKey {
    fn from(id: ChecklistItemId) -> Self {
        ChecklistItemKey::Persisted(id)
    }
}

impl fmt::Display for ChecklistItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChecklistItemKey::Persisted(id) => id.fmt(f),
            ChecklistItemKey::Pending(token) => token.fmt(f),
        }
    }
}
