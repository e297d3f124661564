//! Entry Collection
//!
//! The map layout aggregate: an ordered set of named sublists, each holding
//! entries of a single supertype. Provides:
//! - name and supertype lookup
//! - filtering and safe extension
//! - selector resolution for batch operations
//! - lazy reference resolution (see `refs`)

mod graph;
mod refs;
mod selection;

pub use graph::ReferenceGraph;
pub use refs::ResolvedRef;
pub use selection::{EntrySelector, Selection};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::constants::DEFAULT_LIST_SCHEMA;
use crate::entries::{EntryKey, EntrySupertype, MsbEntry};

/// Error type for entry lookups and collection edits
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntryError {
    #[error("No entry named {name:?} in {supertypes}")]
    NotFound { name: String, supertypes: String },
    #[error("Entry name {name:?} is ambiguous: {count} matches in {supertypes}")]
    Ambiguous {
        name: String,
        count: usize,
        supertypes: String,
    },
    #[error("Entry {name:?} is a {found}, expected {expected}")]
    TypeMismatch {
        name: String,
        expected: String,
        found: String,
    },
    #[error("Unknown entry list: {0}")]
    UnknownList(String),
    #[error("Entry list already exists: {0}")]
    ListExists(String),
    #[error("No entry with key {0:?} in this collection")]
    MissingEntry(EntryKey),
    #[error("Entry {name:?} shares key {key:?} with an entry already in this collection")]
    DuplicateKey { name: String, key: EntryKey },
}

pub(crate) fn describe_supertypes(supertypes: &[EntrySupertype]) -> String {
    supertypes
        .iter()
        .map(EntrySupertype::as_str)
        .collect::<Vec<_>>()
        .join("/")
}

fn normalize_list_name(name: &str) -> String {
    let flat: String = name
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect();
    match flat.strip_prefix("msb") {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => flat,
    }
}

/// One named sublist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryList {
    supertype: EntrySupertype,
    entries: Vec<MsbEntry>,
}

impl EntryList {
    pub fn new(supertype: EntrySupertype) -> Self {
        Self {
            supertype,
            entries: Vec::new(),
        }
    }

    pub fn supertype(&self) -> EntrySupertype {
        self.supertype
    }

    pub fn entries(&self) -> &[MsbEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MsbEntry> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, MsbEntry> {
        self.entries.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of the entries passing `predicate` (all of them if `None`).
    /// Copies keep their keys; the source is never modified.
    pub fn get_filtered_list(&self, predicate: Option<&dyn Fn(&MsbEntry) -> bool>) -> EntryList {
        let entries = match predicate {
            Some(predicate) => self.entries.iter().filter(|e| predicate(e)).cloned().collect(),
            None => self.entries.clone(),
        };
        EntryList {
            supertype: self.supertype,
            entries,
        }
    }

    pub fn get_entry_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    fn check_supertype(&self, entry: &MsbEntry) -> Result<(), EntryError> {
        if entry.supertype() != self.supertype {
            return Err(EntryError::TypeMismatch {
                name: entry.name.clone(),
                expected: self.supertype.as_str().to_string(),
                found: entry.supertype().as_str().to_string(),
            });
        }
        Ok(())
    }

    pub(crate) fn push_unchecked(&mut self, entry: MsbEntry) {
        self.entries.push(entry);
    }
}

impl<'a> IntoIterator for &'a EntryList {
    type Item = &'a MsbEntry;
    type IntoIter = std::slice::Iter<'a, MsbEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Ordered, named, typed sublists of map entries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryCollection {
    lists: IndexMap<String, EntryList>,
}

impl EntryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(schema: &[(&str, EntrySupertype)]) -> Self {
        let lists = schema
            .iter()
            .map(|(name, supertype)| (name.to_string(), EntryList::new(*supertype)))
            .collect();
        Self { lists }
    }

    /// Empty collection with the standard sublists
    pub fn with_default_schema() -> Self {
        Self::with_schema(DEFAULT_LIST_SCHEMA)
    }

    pub fn add_list(&mut self, name: &str, supertype: EntrySupertype) -> Result<(), EntryError> {
        if self.lists.contains_key(name) {
            return Err(EntryError::ListExists(name.to_string()));
        }
        self.lists.insert(name.to_string(), EntryList::new(supertype));
        Ok(())
    }

    /// Sublist names in declaration order
    pub fn list_names(&self) -> Vec<&str> {
        self.lists.keys().map(String::as_str).collect()
    }

    /// `(name, supertype)` pairs in declaration order
    pub fn schema(&self) -> Vec<(&str, EntrySupertype)> {
        self.lists
            .iter()
            .map(|(name, list)| (name.as_str(), list.supertype))
            .collect()
    }

    pub fn lists(&self) -> impl Iterator<Item = (&str, &EntryList)> {
        self.lists.iter().map(|(name, list)| (name.as_str(), list))
    }

    pub fn list(&self, name: &str) -> Result<&EntryList, EntryError> {
        self.lists
            .get(name)
            .ok_or_else(|| EntryError::UnknownList(name.to_string()))
    }

    pub fn list_mut(&mut self, name: &str) -> Result<&mut EntryList, EntryError> {
        self.lists
            .get_mut(name)
            .ok_or_else(|| EntryError::UnknownList(name.to_string()))
    }

    /// Look up a sublist by a looser name: case, `_`/`-`/space separators,
    /// an `MSB` class prefix and a singular form are all ignored, so
    /// `"MSBMapPiece"`, `"map piece"` and `"Map_Pieces"` all find
    /// `map_pieces`. An exact key always wins.
    pub fn find_list(&self, alias: &str) -> Result<(&str, &EntryList), EntryError> {
        if let Some((name, list)) = self.lists.get_key_value(alias) {
            return Ok((name.as_str(), list));
        }
        let wanted = normalize_list_name(alias);
        self.lists
            .iter()
            .find(|(name, _)| {
                let name = normalize_list_name(name);
                name == wanted || name == format!("{wanted}s") || name == format!("{wanted}es")
            })
            .map(|(name, list)| (name.as_str(), list))
            .ok_or_else(|| EntryError::UnknownList(alias.to_string()))
    }

    pub(crate) fn insert_list(&mut self, name: String, list: EntryList) {
        self.lists.insert(name, list);
    }

    /// Append an entry to a sublist. The entry's supertype must match, and
    /// its key must not already be in the collection (use
    /// [`MsbEntry::deep_copy`] to insert a copy).
    pub fn add_entry(&mut self, list_name: &str, entry: MsbEntry) -> Result<EntryKey, EntryError> {
        self.check_new_key(&entry)?;
        let list = self.list_mut(list_name)?;
        list.check_supertype(&entry)?;
        let key = entry.key();
        list.entries.push(entry);
        Ok(key)
    }

    /// Append several entries; nothing is added unless all of them fit.
    pub fn extend_list<I>(&mut self, list_name: &str, entries: I) -> Result<usize, EntryError>
    where
        I: IntoIterator<Item = MsbEntry>,
    {
        let entries: Vec<MsbEntry> = entries.into_iter().collect();
        let mut batch_keys = HashSet::with_capacity(entries.len());
        for entry in &entries {
            self.check_new_key(entry)?;
            if !batch_keys.insert(entry.key()) {
                return Err(EntryError::DuplicateKey {
                    name: entry.name.clone(),
                    key: entry.key(),
                });
            }
        }
        let list = self.list_mut(list_name)?;
        for entry in &entries {
            list.check_supertype(entry)?;
        }
        let added = entries.len();
        list.entries.extend(entries);
        Ok(added)
    }

    fn check_new_key(&self, entry: &MsbEntry) -> Result<(), EntryError> {
        if self.get_entry(entry.key()).is_some() {
            return Err(EntryError::DuplicateKey {
                name: entry.name.clone(),
                key: entry.key(),
            });
        }
        Ok(())
    }

    pub fn remove_entry(&mut self, key: EntryKey) -> Option<MsbEntry> {
        self.lists.values_mut().find_map(|list| {
            let index = list.entries.iter().position(|e| e.key() == key)?;
            Some(list.entries.remove(index))
        })
    }

    pub fn get_entry(&self, key: EntryKey) -> Option<&MsbEntry> {
        self.entries().find(|e| e.key() == key)
    }

    pub fn get_entry_mut(&mut self, key: EntryKey) -> Option<&mut MsbEntry> {
        self.entries_mut().find(|e| e.key() == key)
    }

    pub fn find_by_name(&self, name: &str) -> Vec<&MsbEntry> {
        self.entries().filter(|e| e.name == name).collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &MsbEntry> {
        self.lists.values().flat_map(|list| list.entries.iter())
    }

    pub fn entries_mut(&mut self) -> impl Iterator<Item = &mut MsbEntry> {
        self.lists.values_mut().flat_map(|list| list.entries.iter_mut())
    }

    /// Entries of one supertype, across its sublists in order
    pub fn iter_supertype(&self, supertype: EntrySupertype) -> impl Iterator<Item = &MsbEntry> {
        self.lists
            .values()
            .filter(move |list| list.supertype == supertype)
            .flat_map(|list| list.entries.iter())
    }

    pub fn iter_supertype_mut(
        &mut self,
        supertype: EntrySupertype,
    ) -> impl Iterator<Item = &mut MsbEntry> {
        self.lists
            .values_mut()
            .filter(move |list| list.supertype == supertype)
            .flat_map(|list| list.entries.iter_mut())
    }

    pub fn get_parts(&self) -> impl Iterator<Item = &MsbEntry> {
        self.iter_supertype(EntrySupertype::Parts)
    }

    pub fn get_regions(&self) -> impl Iterator<Item = &MsbEntry> {
        self.iter_supertype(EntrySupertype::Regions)
    }

    pub fn entry_count(&self) -> usize {
        self.lists.values().map(EntryList::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0
    }

    /// Check every entry sits in a sublist of its own supertype.
    pub fn validate(&self) -> Result<(), EntryError> {
        for list in self.lists.values() {
            for entry in &list.entries {
                list.check_supertype(entry)?;
            }
        }
        Ok(())
    }

    /// Resolve selectors to entry keys.
    ///
    /// Names are looked up only among the given supertypes and must match
    /// exactly one entry there. Key selectors pass through unchanged.
    pub fn resolve_entries(
        &self,
        selectors: &[EntrySelector],
        supertypes: &[EntrySupertype],
    ) -> Result<Vec<EntryKey>, EntryError> {
        selectors
            .iter()
            .map(|selector| match selector {
                EntrySelector::Entry(key) => Ok(*key),
                EntrySelector::Name(name) => self.resolve_name(name, supertypes),
            })
            .collect()
    }

    /// Like [`Self::resolve_entries`], but an empty selector list means all.
    pub fn resolve_selection(
        &self,
        selectors: &[EntrySelector],
        supertypes: &[EntrySupertype],
    ) -> Result<Selection, EntryError> {
        if selectors.is_empty() {
            return Ok(Selection::All);
        }
        let keys = self.resolve_entries(selectors, supertypes)?;
        Ok(Selection::Only(keys.into_iter().collect()))
    }

    fn resolve_name(
        &self,
        name: &str,
        supertypes: &[EntrySupertype],
    ) -> Result<EntryKey, EntryError> {
        let matches: Vec<EntryKey> = self
            .lists
            .values()
            .filter(|list| supertypes.contains(&list.supertype))
            .flat_map(|list| list.entries.iter())
            .filter(|e| e.name == name)
            .map(MsbEntry::key)
            .collect();
        match matches.as_slice() {
            [key] => Ok(*key),
            [] => Err(EntryError::NotFound {
                name: name.to_string(),
                supertypes: describe_supertypes(supertypes),
            }),
            _ => Err(EntryError::Ambiguous {
                name: name.to_string(),
                count: matches.len(),
                supertypes: describe_supertypes(supertypes),
            }),
        }
    }
}
