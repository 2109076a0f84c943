//! Sequence algebra over ordered id lists
//!
//! A sequence is the full display order of a container (columns on a board,
//! cards in a column, messages on a card). Every function here is pure and
//! returns a new sequence without duplicates.
//!
//! Sequences cross storage and wire boundaries as comma-joined text; use
//! [`serialize`]/[`parse`] (or the [`delimited`] serde helpers) only there.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

/// Where to insert an id within a sequence
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor<T> {
    /// Insert first
    Head,
    /// Insert immediately after the given id
    After(T),
}

impl<T> Anchor<T> {
    /// Anchor after `id`
    pub fn after(id: impl Into<T>) -> Self {
        Self::After(id.into())
    }

    /// The referenced id, if any
    pub fn id(&self) -> Option<&T> {
        match self {
            Self::Head => None,
            Self::After(id) => Some(id),
        }
    }
}

impl<T> Default for Anchor<T> {
    fn default() -> Self {
        Self::Head
    }
}

impl<T: fmt::Display> fmt::Display for Anchor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Head => write!(f, "head"),
            Self::After(id) => write!(f, "after {}", id),
        }
    }
}

/// Insert `id` immediately after `anchor`.
///
/// `id` is removed first if already present, so re-inserting moves it.
/// An anchor that is not in `sequence` (including `id` itself) appends at
/// the end.
pub fn insert_after<T>(sequence: &[T], id: &T, anchor: &Anchor<T>) -> Vec<T>
where
    T: Clone + Eq + Hash,
{
    let mut result = remove(sequence, id);
    let position = match anchor {
        Anchor::Head => 0,
        Anchor::After(after) => match result.iter().position(|x| x == after) {
            Some(index) => index + 1,
            None => result.len(),
        },
    };
    result.insert(position, id.clone());
    result
}

/// Append `id` at the end, moving it there if already present
pub fn push<T>(sequence: &[T], id: &T) -> Vec<T>
where
    T: Clone + Eq + Hash,
{
    let mut result = remove(sequence, id);
    result.push(id.clone());
    result
}

/// Remove `id` if present
pub fn remove<T>(sequence: &[T], id: &T) -> Vec<T>
where
    T: Clone + Eq + Hash,
{
    let mut seen = HashSet::with_capacity(sequence.len());
    sequence
        .iter()
        .filter(|x| *x != id && seen.insert(*x))
        .cloned()
        .collect()
}

/// Join a sequence into its comma-delimited text form
pub fn serialize<T: AsRef<str>>(sequence: &[T]) -> String {
    sequence
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse the comma-delimited text form.
///
/// Blank items are skipped and repeated ids keep their first position, so
/// `""` parses to an empty sequence.
pub fn parse<T>(text: &str) -> Vec<T>
where
    T: From<String> + Eq + Hash + Clone,
{
    let mut seen = HashSet::new();
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| T::from(item.to_string()))
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Serde adapter storing a `Vec` of ids as comma-joined text
pub mod delimited {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::hash::Hash;

    pub fn serialize<S, T>(sequence: &[T], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: AsRef<str>,
    {
        serializer.serialize_str(&super::serialize(sequence))
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: From<String> + Eq + Hash + Clone,
    {
        let text = String::deserialize(deserializer)?;
        Ok(super::parse(&text))
    }
}

/// Like [`delimited`], for optional sequences in patch fields
pub mod delimited_opt {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::hash::Hash;

    pub fn serialize<S, T>(sequence: &Option<Vec<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: AsRef<str>,
    {
        match sequence {
            Some(sequence) => serializer.serialize_str(&super::serialize(sequence)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: From<String> + Eq + Hash + Clone,
    {
        let text = Option::<String>::deserialize(deserializer)?;
        Ok(text.map(|text| super::parse(&text)))
    }
}
