//! Ranked access levels.

use serde::{Deserialize, Serialize};

/// Permission tier, compared by rank. Stored as lowercase text on the
/// member row; a member (or session) with no level ranks below `Read`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Read,
    Write,
    Admin,
}

impl AccessLevel {
    const ORDERED: [AccessLevel; 3] = [AccessLevel::Read, AccessLevel::Write, AccessLevel::Admin];

    /// Index in the ordered level list.
    pub fn rank(self) -> i32 {
        Self::ORDERED.iter().position(|l| *l == self).unwrap_or(0) as i32
    }

    /// Rank of an optional level; unset compares as -1.
    pub fn rank_of(level: Option<AccessLevel>) -> i32 {
        level.map(AccessLevel::rank).unwrap_or(-1)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AccessLevel::Read => "read",
            AccessLevel::Write => "write",
            AccessLevel::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "read" => Some(AccessLevel::Read),
            "write" => Some(AccessLevel::Write),
            "admin" => Some(AccessLevel::Admin),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_are_ordered() {
        assert!(AccessLevel::Read.rank() < AccessLevel::Write.rank());
        assert!(AccessLevel::Write.rank() < AccessLevel::Admin.rank());
    }

    #[test]
    fn unset_ranks_below_read() {
        assert_eq!(AccessLevel::rank_of(None), -1);
        assert!(AccessLevel::rank_of(None) < AccessLevel::Read.rank());
    }

    #[test]
    fn parse_round_trips() {
        for level in [AccessLevel::Read, AccessLevel::Write, AccessLevel::Admin] {
            assert_eq!(AccessLevel::parse(level.as_str()), Some(level));
        }
        assert_eq!(AccessLevel::parse("owner"), None);
    }
}
