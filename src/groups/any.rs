use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::{GroupBitSet128, GroupBitSet256, GroupBitSetError};

/// Group field width for a given layout version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupWidth {
    Bits128,
    Bits256,
}

impl GroupWidth {
    pub fn bit_count(&self) -> u32 {
        match self {
            Self::Bits128 => GroupBitSet128::BIT_COUNT,
            Self::Bits256 => GroupBitSet256::BIT_COUNT,
        }
    }

    pub fn from_bit_count(bit_count: u32) -> Option<Self> {
        match bit_count {
            128 => Some(Self::Bits128),
            256 => Some(Self::Bits256),
            _ => None,
        }
    }
}

/// Group bitset of either width, as stored on entry fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AnyGroupBitSet {
    Bits128(GroupBitSet128),
    Bits256(GroupBitSet256),
}

impl Default for AnyGroupBitSet {
    fn default() -> Self {
        Self::Bits128(GroupBitSet128::new())
    }
}

impl AnyGroupBitSet {
    pub fn empty(width: GroupWidth) -> Self {
        match width {
            GroupWidth::Bits128 => Self::Bits128(GroupBitSet128::new()),
            GroupWidth::Bits256 => Self::Bits256(GroupBitSet256::new()),
        }
    }

    pub fn from_words(width: GroupWidth, words: &[u32]) -> Result<Self, GroupBitSetError> {
        Ok(match width {
            GroupWidth::Bits128 => Self::Bits128(GroupBitSet128::from_words(words)?),
            GroupWidth::Bits256 => Self::Bits256(GroupBitSet256::from_words(words)?),
        })
    }

    pub fn from_bit_indices<I>(width: GroupWidth, bits: I) -> Result<Self, GroupBitSetError>
    where
        I: IntoIterator<Item = u32>,
    {
        Ok(match width {
            GroupWidth::Bits128 => Self::Bits128(GroupBitSet128::from_bit_indices(bits)?),
            GroupWidth::Bits256 => Self::Bits256(GroupBitSet256::from_bit_indices(bits)?),
        })
    }

    pub fn width(&self) -> GroupWidth {
        match self {
            Self::Bits128(_) => GroupWidth::Bits128,
            Self::Bits256(_) => GroupWidth::Bits256,
        }
    }

    pub fn bit_count(&self) -> u32 {
        self.width().bit_count()
    }

    pub fn to_words(&self) -> Vec<u32> {
        match self {
            Self::Bits128(set) => set.to_words().to_vec(),
            Self::Bits256(set) => set.to_words().to_vec(),
        }
    }

    pub fn to_sorted_indices(&self) -> Vec<u32> {
        match self {
            Self::Bits128(set) => set.to_sorted_indices(),
            Self::Bits256(set) => set.to_sorted_indices(),
        }
    }

    pub fn contains(&self, bit: u32) -> bool {
        match self {
            Self::Bits128(set) => set.contains(bit),
            Self::Bits256(set) => set.contains(bit),
        }
    }

    pub fn add(&mut self, bit: u32) -> Result<(), GroupBitSetError> {
        match self {
            Self::Bits128(set) => set.add(bit),
            Self::Bits256(set) => set.add(bit),
        }
    }

    pub fn remove(&mut self, bit: u32) -> Result<(), GroupBitSetError> {
        match self {
            Self::Bits128(set) => set.remove(bit),
            Self::Bits256(set) => set.remove(bit),
        }
    }

    /// Union with a group set of the same width. Mixed widths are rejected.
    pub fn union(&self, other: &AnyGroupBitSet) -> Result<Self, GroupBitSetError> {
        match (self, other) {
            (Self::Bits128(a), Self::Bits128(b)) => Ok(Self::Bits128(a.union(b))),
            (Self::Bits256(a), Self::Bits256(b)) => Ok(Self::Bits256(a.union(b))),
            _ => Err(GroupBitSetError::WidthMismatch {
                left: self.bit_count(),
                right: other.bit_count(),
            }),
        }
    }

    pub fn union_indices(&self, bits: &BTreeSet<u32>) -> Result<Self, GroupBitSetError> {
        Ok(match self {
            Self::Bits128(set) => Self::Bits128(set.union_indices(bits)?),
            Self::Bits256(set) => Self::Bits256(set.union_indices(bits)?),
        })
    }
}

impl From<GroupBitSet128> for AnyGroupBitSet {
    fn from(set: GroupBitSet128) -> Self {
        Self::Bits128(set)
    }
}

impl From<GroupBitSet256> for AnyGroupBitSet {
    fn from(set: GroupBitSet256) -> Self {
        Self::Bits256(set)
    }
}

impl fmt::Display for AnyGroupBitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bits128(set) => fmt::Display::fmt(set, f),
            Self::Bits256(set) => fmt::Display::fmt(set, f),
        }
    }
}

impl FromStr for AnyGroupBitSet {
    type Err = GroupBitSetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with(&GroupBitSet256::type_name()) {
            GroupBitSet256::from_repr(s).map(Self::Bits256)
        } else {
            // also reports format errors for unknown prefixes
            GroupBitSet128::from_repr(s).map(Self::Bits128)
        }
    }
}

impl Serialize for AnyGroupBitSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AnyGroupBitSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
