//! Lazy reference resolution.
//!
//! References never fail loudly: anything that cannot be resolved becomes a
//! [`BrokenEntryReference`] so a load can continue and the caller can flag it.

use tracing::debug;

use super::{describe_supertypes, EntryCollection, EntryError};
use crate::constants::NO_REFERENCE_INDEX;
use crate::entries::{BrokenEntryReference, EntryKey, EntryRef, EntrySupertype, MsbEntry};

/// Outcome of resolving an [`EntryRef`] against a collection
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedRef<'a> {
    None,
    Entry(&'a MsbEntry),
    Broken(BrokenEntryReference),
}

impl<'a> ResolvedRef<'a> {
    pub fn entry(&self) -> Option<&'a MsbEntry> {
        match self {
            Self::Entry(entry) => Some(entry),
            _ => None,
        }
    }
}

impl EntryCollection {
    /// Build a reference from a packed index into all entries of `supertype`.
    ///
    /// Negative indices mean no reference; out-of-range indices become a
    /// broken reference carrying the index.
    pub fn ref_from_index(&self, supertype: EntrySupertype, index: i32) -> EntryRef {
        if index < 0 {
            return EntryRef::None;
        }
        match self.iter_supertype(supertype).nth(index as usize) {
            Some(entry) => EntryRef::Name(entry.name.clone()),
            None => {
                debug!(supertype = %supertype, index, "Unresolved reference index");
                EntryRef::Broken(BrokenEntryReference {
                    name: String::new(),
                    index,
                })
            }
        }
    }

    /// Resolve a reference to the first entry of `supertype` with its name.
    pub fn resolve_ref(&self, reference: &EntryRef, supertype: EntrySupertype) -> ResolvedRef<'_> {
        match reference {
            EntryRef::None => ResolvedRef::None,
            EntryRef::Broken(broken) => ResolvedRef::Broken(broken.clone()),
            EntryRef::Name(name) => match self.iter_supertype(supertype).find(|e| &e.name == name) {
                Some(entry) => ResolvedRef::Entry(entry),
                None => ResolvedRef::Broken(BrokenEntryReference {
                    name: name.clone(),
                    index: NO_REFERENCE_INDEX,
                }),
            },
        }
    }

    /// Packed index of a reference within all entries of `supertype`.
    ///
    /// Broken references keep their original index so they survive a
    /// load/save cycle untouched.
    pub fn ref_to_index(
        &self,
        reference: &EntryRef,
        supertype: EntrySupertype,
    ) -> Result<i32, EntryError> {
        match reference {
            EntryRef::None => Ok(NO_REFERENCE_INDEX),
            EntryRef::Broken(broken) => Ok(broken.index),
            EntryRef::Name(name) => self
                .iter_supertype(supertype)
                .position(|e| &e.name == name)
                .map(|index| index as i32)
                .ok_or_else(|| EntryError::NotFound {
                    name: name.clone(),
                    supertypes: describe_supertypes(&[supertype]),
                }),
        }
    }

    /// Every broken reference in the collection, as `(referrer, field, marker)`.
    pub fn broken_references(&self) -> Vec<(EntryKey, &'static str, BrokenEntryReference)> {
        let mut broken = Vec::new();
        for entry in self.entries() {
            for field in entry.references() {
                if let ResolvedRef::Broken(marker) =
                    self.resolve_ref(field.reference, field.target)
                {
                    broken.push((entry.key(), field.field, marker));
                }
            }
        }
        broken
    }

    /// Rename an entry and rewrite references to its old name.
    ///
    /// References are left alone if another entry of the same supertype still
    /// carries the old name. Returns the number of rewritten references.
    pub fn rename_entry(&mut self, key: EntryKey, new_name: &str) -> Result<usize, EntryError> {
        let entry = self.get_entry_mut(key).ok_or(EntryError::MissingEntry(key))?;
        let old_name = std::mem::replace(&mut entry.name, new_name.to_string());
        let supertype = entry.supertype();

        if self.iter_supertype(supertype).any(|e| e.name == old_name) {
            return Ok(0);
        }

        let mut rewritten = 0;
        for entry in self.entries_mut() {
            for (target, reference) in entry.references_mut() {
                if target == supertype && reference.name() == Some(old_name.as_str()) {
                    *reference = EntryRef::to(new_name);
                    rewritten += 1;
                }
            }
        }
        debug!(old = %old_name, new = %new_name, rewritten, "Renamed entry");
        Ok(rewritten)
    }
}
