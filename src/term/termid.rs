use core::fmt::Debug;
use std::fmt::Display;

use crate::{InteractomeError, InteractomeResult};

/// Unique identifier of a Gene Ontology term
///
/// Term IDs have the form `GO:0005737`. Only the numerical part
/// is stored; the `GO:` prefix is added back when displayed.
#[derive(Copy, Clone, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TermId {
    inner: u32,
}

impl TermId {
    /// Returns the integer representation of the term ID
    pub fn as_u32(&self) -> u32 {
        self.inner
    }
}

impl TryFrom<&str> for TermId {
    type Error = InteractomeError;
    fn try_from(s: &str) -> InteractomeResult<Self> {
        let Some(("GO", number)) = s.trim().split_once(':') else {
            return Err(InteractomeError::MalformedRecord(format!(
                "invalid GO term id: {s}"
            )));
        };
        if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InteractomeError::MalformedRecord(format!(
                "invalid GO term id: {s}"
            )));
        }
        let inner = number.parse::<u32>().map_err(|_| {
            InteractomeError::MalformedRecord(format!("invalid GO term id: {s}"))
        })?;
        Ok(TermId { inner })
    }
}

impl From<u32> for TermId {
    fn from(inner: u32) -> Self {
        Self { inner }
    }
}

impl Debug for TermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TermId({self})")
    }
}

impl Display for TermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GO:{:07}", self.inner)
    }
}

impl PartialEq<str> for TermId {
    fn eq(&self, other: &str) -> bool {
        TermId::try_from(other).map_or(false, |other| *self == other)
    }
}

impl PartialEq<&str> for TermId {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}
