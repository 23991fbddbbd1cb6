use crate::core::member::MemberId;
use crate::core::snapshot::LedgerSnapshot;
use crate::engine::EngineError;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// What to do when a record references a member id that is not part of
/// the snapshot (typically a member removed after the fact).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownMemberPolicy {
    /// Skip the reference silently.
    #[default]
    Ignore,
    /// Skip the reference, log it and report it alongside the result.
    Warn,
    /// Fail the computation.
    Reject,
}

/// Where in a record an unknown member id was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReferenceSite {
    PaidBy,
    SplitBetween,
    SettlementFrom,
    SettlementTo,
}

impl fmt::Display for ReferenceSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReferenceSite::PaidBy => "paidBy",
            ReferenceSite::SplitBetween => "splitBetween",
            ReferenceSite::SettlementFrom => "settlement from",
            ReferenceSite::SettlementTo => "settlement to",
        };
        f.write_str(s)
    }
}

/// A reference to a member id the snapshot does not know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnknownReference {
    pub member: MemberId,
    /// Id of the expense or settlement holding the reference.
    pub record: Uuid,
    pub site: ReferenceSite,
}

impl fmt::Display for UnknownReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown member {} in {} of record {}",
            self.member, self.site, self.record
        )
    }
}

/// Maps member ids to accumulator slots and applies the unknown-member
/// policy to everything else.
///
/// A member id listed twice keeps the slot of its first occurrence.
/// Lookups never fail; under [`UnknownMemberPolicy::Reject`] the first
/// offending reference is kept and surfaced by [`MemberFilter::finish`].
pub(crate) struct MemberFilter<'a> {
    members: Vec<&'a MemberId>,
    slots: HashMap<&'a MemberId, usize>,
    policy: UnknownMemberPolicy,
    warnings: Vec<UnknownReference>,
    rejected: Option<UnknownReference>,
}

impl<'a> MemberFilter<'a> {
    pub(crate) fn new(snapshot: &'a LedgerSnapshot, policy: UnknownMemberPolicy) -> Self {
        let mut members = Vec::new();
        let mut slots = HashMap::new();
        for id in snapshot.member_ids() {
            slots.entry(id).or_insert_with(|| {
                members.push(id);
                members.len() - 1
            });
        }
        Self {
            members,
            slots,
            policy,
            warnings: Vec::new(),
            rejected: None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.members.len()
    }

    /// Distinct member ids, indexed by slot.
    pub(crate) fn members(&self) -> &[&'a MemberId] {
        &self.members
    }

    /// Slot of `member`, or `None` if the reference has to be skipped.
    pub(crate) fn resolve(
        &mut self,
        member: &MemberId,
        record: Uuid,
        site: ReferenceSite,
    ) -> Option<usize> {
        if let Some(&slot) = self.slots.get(member) {
            return Some(slot);
        }
        let reference = UnknownReference {
            member: member.clone(),
            record,
            site,
        };
        match self.policy {
            UnknownMemberPolicy::Ignore => {}
            UnknownMemberPolicy::Warn => {
                warn!("skipping {}", reference);
                self.warnings.push(reference);
            }
            UnknownMemberPolicy::Reject => {
                if self.rejected.is_none() {
                    self.rejected = Some(reference);
                }
            }
        }
        None
    }

    /// Collected warnings, or the rejection if one occurred.
    pub(crate) fn finish(self) -> Result<Vec<UnknownReference>, EngineError> {
        match self.rejected {
            Some(reference) => Err(EngineError::UnknownMember(reference)),
            None => Ok(self.warnings),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::member::Member;

    fn snapshot() -> LedgerSnapshot {
        LedgerSnapshot::new("g")
            .with_member(Member::named("A"))
            .with_member(Member::named("B"))
    }

    #[test]
    fn test_known_members_get_slots_in_order() {
        let snapshot = snapshot();
        let mut filter = MemberFilter::new(&snapshot, UnknownMemberPolicy::Reject);
        let id = Uuid::nil();
        assert_eq!(filter.len(), 2);
        assert_eq!(filter.resolve(&MemberId::new("A"), id, ReferenceSite::PaidBy), Some(0));
        assert_eq!(filter.resolve(&MemberId::new("B"), id, ReferenceSite::PaidBy), Some(1));
        assert!(filter.finish().unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_member_keeps_first_slot() {
        let snapshot: LedgerSnapshot = serde_json::from_str(
            r#"{ "name": "g", "members": [
                { "id": "A", "name": "A" },
                { "id": "B", "name": "B" },
                { "id": "A", "name": "Another A" }
            ] }"#,
        )
        .unwrap();
        assert_eq!(snapshot.members().len(), 3);
        let mut filter = MemberFilter::new(&snapshot, UnknownMemberPolicy::Reject);
        assert_eq!(filter.len(), 2);
        assert_eq!(filter.members(), &[&MemberId::new("A"), &MemberId::new("B")]);
        let slot = filter.resolve(&MemberId::new("A"), Uuid::nil(), ReferenceSite::PaidBy);
        assert_eq!(slot, Some(0));
    }

    #[test]
    fn test_ignore_policy_is_silent() {
        let snapshot = snapshot();
        let mut filter = MemberFilter::new(&snapshot, UnknownMemberPolicy::Ignore);
        let site = ReferenceSite::SplitBetween;
        assert_eq!(filter.resolve(&MemberId::new("Z"), Uuid::nil(), site), None);
        assert!(filter.finish().unwrap().is_empty());
    }

    #[test]
    fn test_warn_policy_collects() {
        let snapshot = snapshot();
        let mut filter = MemberFilter::new(&snapshot, UnknownMemberPolicy::Warn);
        filter.resolve(&MemberId::new("Z"), Uuid::nil(), ReferenceSite::SettlementTo);
        let warnings = filter.finish().unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].member, MemberId::new("Z"));
        assert_eq!(warnings[0].site, ReferenceSite::SettlementTo);
    }

    #[test]
    fn test_reject_policy_keeps_first_offender() {
        let snapshot = snapshot();
        let mut filter = MemberFilter::new(&snapshot, UnknownMemberPolicy::Reject);
        filter.resolve(&MemberId::new("X"), Uuid::nil(), ReferenceSite::PaidBy);
        filter.resolve(&MemberId::new("Y"), Uuid::nil(), ReferenceSite::PaidBy);
        match filter.finish() {
            Err(EngineError::UnknownMember(reference)) => {
                assert_eq!(reference.member, MemberId::new("X"))
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_policy_deserializes_lowercase() {
        let policy: UnknownMemberPolicy = serde_json::from_str("\"warn\"").unwrap();
        assert_eq!(policy, UnknownMemberPolicy::Warn);
    }
}
