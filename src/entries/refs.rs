use serde::{Deserialize, Serialize};
use std::fmt;

/// Assigned to reference fields when the target entry cannot be found.
///
/// Keeps the original name and packed index so the value can be shown to the
/// user and written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BrokenEntryReference {
    pub name: String,
    pub index: i32,
}

impl fmt::Display for BrokenEntryReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<broken reference {:?} #{}>", self.name, self.index)
    }
}

/// Non-owning reference from one entry to another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryRef {
    #[default]
    None,
    Name(String),
    Broken(BrokenEntryReference),
}

impl EntryRef {
    pub fn to(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Target name, if this is a by-name reference.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn is_broken(&self) -> bool {
        matches!(self, Self::Broken(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_none() {
        assert!(EntryRef::default().is_none());
        assert_eq!(EntryRef::default().name(), None);
    }

    #[test]
    fn test_broken_display() {
        let broken = BrokenEntryReference {
            name: "c1000_0000".into(),
            index: 12,
        };
        assert_eq!(broken.to_string(), "<broken reference \"c1000_0000\" #12>");
        assert!(EntryRef::Broken(broken).is_broken());
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_string(&EntryRef::to("r0")).unwrap();
        assert_eq!(json, r#"{"Name":"r0"}"#);
        let restored: EntryRef = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.name(), Some("r0"));
    }
}
