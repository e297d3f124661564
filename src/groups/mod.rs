//! Group Bitsets
//!
//! Stores the wide multi-`u32` bitfields used for draw/display/backread/navmesh
//! groups in map layouts. Three representations are interchangeable:
//! - packed `u32` words (as laid out in binary records)
//! - sparse set of enabled bit indices (the internal form)
//! - canonical text, e.g. `GroupBitSet128(0, 5, 97)`, also used for JSON

mod any;
mod repr;

pub use any::{AnyGroupBitSet, GroupWidth};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::ops::{BitAnd, BitOr};
use std::str::FromStr;

use crate::constants::BITS_PER_WORD;

/// Error type for group bitset operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GroupBitSetError {
    #[error("Bit {bit} is out of range for {bit_count}-bit group set")]
    OutOfRange { bit: u32, bit_count: u32 },
    #[error("Bit {bit} is not enabled")]
    NotFound { bit: u32 },
    #[error("Expected {expected} words for {bit_count}-bit group set, got {actual}")]
    SizeMismatch {
        expected: usize,
        actual: usize,
        bit_count: u32,
    },
    #[error("Expected {expected} bytes for {bit_count}-bit group set, got {actual}")]
    ByteLength {
        expected: usize,
        actual: usize,
        bit_count: u32,
    },
    #[error("Invalid text for {type_name}: {text:?}")]
    Format { type_name: String, text: String },
    #[error("Cannot combine {left}-bit group set with {right}-bit group set")]
    WidthMismatch { left: u32, right: u32 },
}

/// Fixed-width group flag set made of `WORDS` packed `u32` words.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct GroupBitSet<const WORDS: usize> {
    enabled_bits: BTreeSet<u32>,
}

/// Draw/display groups in older layouts
pub type GroupBitSet128 = GroupBitSet<4>;
/// Draw/display groups in newer layouts
pub type GroupBitSet256 = GroupBitSet<8>;

impl<const WORDS: usize> GroupBitSet<WORDS> {
    pub const BIT_COUNT: u32 = (WORDS as u32) * BITS_PER_WORD;
    pub const WORD_COUNT: usize = WORDS;

    pub fn new() -> Self {
        Self {
            enabled_bits: BTreeSet::new(),
        }
    }

    /// Name used in the canonical text form
    pub fn type_name() -> String {
        format!("GroupBitSet{}", Self::BIT_COUNT)
    }

    /// Decode packed words. Bit `i` of word `w` is global bit `32 * w + i`.
    pub fn from_words(words: &[u32]) -> Result<Self, GroupBitSetError> {
        if words.len() != WORDS {
            return Err(GroupBitSetError::SizeMismatch {
                expected: WORDS,
                actual: words.len(),
                bit_count: Self::BIT_COUNT,
            });
        }
        let mut enabled_bits = BTreeSet::new();
        for (word_index, word) in words.iter().enumerate() {
            for offset in 0..BITS_PER_WORD {
                if word & (1 << offset) != 0 {
                    enabled_bits.insert(word_index as u32 * BITS_PER_WORD + offset);
                }
            }
        }
        Ok(Self { enabled_bits })
    }

    pub fn from_bit_indices<I>(bits: I) -> Result<Self, GroupBitSetError>
    where
        I: IntoIterator<Item = u32>,
    {
        let mut set = Self::new();
        for bit in bits {
            set.add(bit)?;
        }
        Ok(set)
    }

    /// Decode little-endian packed words (`4 * WORDS` bytes).
    pub fn from_le_bytes(bytes: &[u8]) -> Result<Self, GroupBitSetError> {
        if bytes.len() != WORDS * 4 {
            return Err(GroupBitSetError::ByteLength {
                expected: WORDS * 4,
                actual: bytes.len(),
                bit_count: Self::BIT_COUNT,
            });
        }
        let words: Vec<u32> = bytes
            .chunks_exact(4)
            .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();
        Self::from_words(&words)
    }

    pub fn to_words(&self) -> [u32; WORDS] {
        let mut words = [0u32; WORDS];
        for &bit in &self.enabled_bits {
            words[(bit / BITS_PER_WORD) as usize] |= 1 << (bit % BITS_PER_WORD);
        }
        words
    }

    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.to_words()
            .iter()
            .flat_map(|word| word.to_le_bytes())
            .collect()
    }

    /// For display, mainly.
    pub fn to_sorted_indices(&self) -> Vec<u32> {
        self.enabled_bits.iter().copied().collect()
    }

    pub fn enabled_bits(&self) -> &BTreeSet<u32> {
        &self.enabled_bits
    }

    pub fn contains(&self, bit: u32) -> bool {
        self.enabled_bits.contains(&bit)
    }

    pub fn len(&self) -> usize {
        self.enabled_bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enabled_bits.is_empty()
    }

    pub fn clear(&mut self) {
        self.enabled_bits.clear();
    }

    pub fn add(&mut self, bit: u32) -> Result<(), GroupBitSetError> {
        Self::check_range(bit)?;
        self.enabled_bits.insert(bit);
        Ok(())
    }

    pub fn remove(&mut self, bit: u32) -> Result<(), GroupBitSetError> {
        Self::check_range(bit)?;
        if !self.enabled_bits.remove(&bit) {
            return Err(GroupBitSetError::NotFound { bit });
        }
        Ok(())
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            enabled_bits: self.enabled_bits.union(&other.enabled_bits).copied().collect(),
        }
    }

    /// Union with a plain index set. Indices are range-checked.
    pub fn union_indices(&self, bits: &BTreeSet<u32>) -> Result<Self, GroupBitSetError> {
        let mut merged = self.clone();
        for &bit in bits {
            merged.add(bit)?;
        }
        Ok(merged)
    }

    pub fn intersection(&self, other: &Self) -> Self {
        Self {
            enabled_bits: self
                .enabled_bits
                .intersection(&other.enabled_bits)
                .copied()
                .collect(),
        }
    }

    pub fn difference(&self, other: &Self) -> Self {
        Self {
            enabled_bits: self
                .enabled_bits
                .difference(&other.enabled_bits)
                .copied()
                .collect(),
        }
    }

    /// Decode the canonical text form. Also handles JSON values.
    pub fn from_repr(text: &str) -> Result<Self, GroupBitSetError> {
        let bits = repr::parse_bit_tuple(text, &Self::type_name())?;
        Self::from_bit_indices(bits)
    }

    fn check_range(bit: u32) -> Result<(), GroupBitSetError> {
        if bit >= Self::BIT_COUNT {
            return Err(GroupBitSetError::OutOfRange {
                bit,
                bit_count: Self::BIT_COUNT,
            });
        }
        Ok(())
    }
}

/// Iterating yields packed words, for embedding into fixed-layout records.
impl<'a, const WORDS: usize> IntoIterator for &'a GroupBitSet<WORDS> {
    type Item = u32;
    type IntoIter = std::array::IntoIter<u32, WORDS>;

    fn into_iter(self) -> Self::IntoIter {
        self.to_words().into_iter()
    }
}

impl<const WORDS: usize> fmt::Display for GroupBitSet<WORDS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&repr::format_bit_tuple(
            &Self::type_name(),
            self.enabled_bits.iter().copied(),
        ))
    }
}

impl<const WORDS: usize> FromStr for GroupBitSet<WORDS> {
    type Err = GroupBitSetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_repr(s)
    }
}

impl<const WORDS: usize> BitOr for &GroupBitSet<WORDS> {
    type Output = GroupBitSet<WORDS>;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl<const WORDS: usize> BitAnd for &GroupBitSet<WORDS> {
    type Output = GroupBitSet<WORDS>;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.intersection(rhs)
    }
}

impl<const WORDS: usize> Serialize for GroupBitSet<WORDS> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de, const WORDS: usize> Deserialize<'de> for GroupBitSet<WORDS> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_repr(&text).map_err(serde::de::Error::custom)
    }
}
