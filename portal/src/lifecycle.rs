//! Domain rules for the maintenance-request lifecycle.
//!
//! Everything here is pure: status strings from the store parse into
//! [`RequestStatus`], the transition table decides what a PATCH may do, and
//! [`RequestTarget`] collapses the equipment-XOR-work-center invariant into a
//! single variant the handlers can match on.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    New,
    InProgress,
    Repaired,
    Scrap,
}

impl RequestStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(Self::New),
            "in_progress" => Some(Self::InProgress),
            "repaired" => Some(Self::Repaired),
            "scrap" => Some(Self::Scrap),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::InProgress => "in_progress",
            Self::Repaired => "repaired",
            Self::Scrap => "scrap",
        }
    }

    /// The full transition table. Anything not listed here, including
    /// self-transitions, is rejected.
    pub fn allowed_transitions(self) -> &'static [RequestStatus] {
        match self {
            Self::New => &[Self::InProgress, Self::Scrap],
            Self::InProgress => &[Self::Repaired, Self::Scrap],
            Self::Repaired | Self::Scrap => &[],
        }
    }

    pub fn can_transition_to(self, to: RequestStatus) -> bool {
        self.allowed_transitions().contains(&to)
    }

    /// Terminal states gate edits: completed requests cannot be updated.
    pub fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    Corrective,
    Preventive,
}

impl RequestType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "corrective" => Some(Self::Corrective),
            "preventive" => Some(Self::Preventive),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Corrective => "corrective",
            Self::Preventive => "preventive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Manager,
    Technician,
    User,
}

impl Role {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "manager" => Some(Self::Manager),
            "technician" => Some(Self::Technician),
            "user" => Some(Self::User),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Technician => "technician",
            Self::User => "user",
        }
    }

    /// Only managers and technicians may be assigned to a request.
    pub fn assignable(self) -> bool {
        matches!(self, Self::Manager | Self::Technician)
    }

    /// Managers may be assigned to any request; technicians only within
    /// their own team.
    pub fn bypasses_team_membership(self) -> bool {
        self == Self::Manager
    }
}

/// The one thing a request is raised against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestTarget {
    Equipment(i32),
    WorkCenter(i32),
}

impl RequestTarget {
    /// Resolve the two optional ids into a target. Both-present and
    /// both-absent are equally invalid.
    pub fn resolve(equipment_id: Option<i32>, work_center_id: Option<i32>) -> Option<Self> {
        match (equipment_id, work_center_id) {
            (Some(id), None) => Some(Self::Equipment(id)),
            (None, Some(id)) => Some(Self::WorkCenter(id)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use RequestStatus::*;

    #[test]
    fn transition_table_is_exhaustive() {
        let all = [New, InProgress, Repaired, Scrap];
        for from in all {
            for to in all {
                let expected = matches!(
                    (from, to),
                    (New, InProgress) | (New, Scrap) | (InProgress, Repaired) | (InProgress, Scrap)
                );
                assert_eq!(
                    from.can_transition_to(to),
                    expected,
                    "{from} -> {to} should be {expected}"
                );
            }
        }
    }

    #[test]
    fn self_transitions_rejected() {
        for s in [New, InProgress, Repaired, Scrap] {
            assert!(!s.can_transition_to(s));
        }
    }

    #[test]
    fn terminal_states() {
        assert!(!New.is_terminal());
        assert!(!InProgress.is_terminal());
        assert!(Repaired.is_terminal());
        assert!(Scrap.is_terminal());
    }

    #[test]
    fn status_parse_rejects_unknown() {
        assert_eq!(RequestStatus::parse("in_progress"), Some(InProgress));
        assert_eq!(RequestStatus::parse("done"), None);
        assert_eq!(RequestStatus::parse(""), None);
        // Stored values are lowercase; parsing is case-sensitive on purpose.
        assert_eq!(RequestStatus::parse("New"), None);
    }

    #[test]
    fn target_resolution_is_xor() {
        assert_eq!(
            RequestTarget::resolve(Some(1), None),
            Some(RequestTarget::Equipment(1))
        );
        assert_eq!(
            RequestTarget::resolve(None, Some(2)),
            Some(RequestTarget::WorkCenter(2))
        );
        assert_eq!(RequestTarget::resolve(Some(1), Some(2)), None);
        assert_eq!(RequestTarget::resolve(None, None), None);
    }

    #[test]
    fn assignable_roles() {
        assert!(Role::Manager.assignable());
        assert!(Role::Technician.assignable());
        assert!(!Role::Admin.assignable());
        assert!(!Role::User.assignable());
        assert!(Role::Manager.bypasses_team_membership());
        assert!(!Role::Technician.bypasses_team_membership());
    }
}
