use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a member in a shared ledger.
///
/// The engine never interprets the contents; any stable string works
/// (UUIDs, nicknames, chat user ids).
///
/// # Examples
///
/// ```
/// use split_ledger::core::member::MemberId;
///
/// let alice = MemberId::new("alice");
/// let bob = MemberId::new("bob");
/// assert_ne!(alice, bob);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random identifier, as the group form does when a member is added.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MemberId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A participant of a group. Only `name` is mutable, and it never
/// affects any computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
}

impl Member {
    pub fn new(id: impl Into<MemberId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Member whose id doubles as the display name. Handy in tests.
    pub fn named(name: &str) -> Self {
        Self::new(MemberId::new(name), name)
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_id_equality() {
        let a = MemberId::new("alice");
        let b = MemberId::new("alice");
        let c = MemberId::new("bob");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_member_id_display() {
        let id = MemberId::new("carol");
        assert_eq!(format!("{}", id), "carol");
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(MemberId::generate(), MemberId::generate());
    }

    #[test]
    fn test_rename_keeps_identity() {
        let mut m = Member::named("dave");
        m.rename("David");
        assert_eq!(m.id, MemberId::new("dave"));
        assert_eq!(m.name, "David");
    }

    #[test]
    fn test_member_serializes_id_as_plain_string() {
        let m = Member::new("m-1", "Erin");
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["id"], "m-1");
        assert_eq!(json["name"], "Erin");
    }
}
