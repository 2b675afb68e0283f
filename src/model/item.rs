// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pathnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pathnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use super::ids::{DbId, IdError, StableId};

/// Reference to an item inside a diagram, as accepted by select/highlight.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemRef {
    Stable(StableId),
    Db(DbId),
}

impl ItemRef {
    /// Parses an identifier as typed by a user or stored in a graph. All-digit input that fits a
    /// `u64` is a database id, anything else a stable id.
    pub fn parse(value: &str) -> Result<Self, IdError> {
        if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(raw) = value.parse::<u64>() {
                return Ok(Self::Db(DbId::new(raw)));
            }
        }
        StableId::new(value).map(Self::Stable)
    }

    pub fn stable_id(&self) -> Option<&StableId> {
        match self {
            Self::Stable(id) => Some(id),
            Self::Db(_) => None,
        }
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stable(id) => id.fmt(f),
            Self::Db(id) => id.fmt(f),
        }
    }
}

impl FromStr for ItemRef {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<StableId> for ItemRef {
    fn from(value: StableId) -> Self {
        Self::Stable(value)
    }
}

impl From<&StableId> for ItemRef {
    fn from(value: &StableId) -> Self {
        Self::Stable(value.clone())
    }
}

impl From<DbId> for ItemRef {
    fn from(value: DbId) -> Self {
        Self::Db(value)
    }
}

impl From<u64> for ItemRef {
    fn from(value: u64) -> Self {
        Self::Db(DbId::new(value))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::ItemRef;
    use crate::model::{DbId, IdError, StableId};

    #[rstest]
    #[case("109581", ItemRef::Db(DbId::new(109581)))]
    #[case("R-HSA-109581", ItemRef::Stable(StableId::new("R-HSA-109581").unwrap()))]
    #[case("R1", ItemRef::Stable(StableId::new("R1").unwrap()))]
    fn parse_distinguishes_db_ids_from_stable_ids(#[case] input: &str, #[case] expected: ItemRef) {
        assert_eq!(ItemRef::parse(input), Ok(expected));
    }

    #[test]
    fn parse_falls_back_to_stable_id_on_overflow() {
        let huge = "99999999999999999999999";
        let parsed = ItemRef::parse(huge).expect("parse");
        assert_eq!(parsed.stable_id().map(|id| id.as_str()), Some(huge));
    }

    #[test]
    fn parse_rejects_empty() {
        assert_eq!(ItemRef::parse(""), Err(IdError::Empty));
    }

    #[test]
    fn display_matches_input() {
        assert_eq!(ItemRef::from(7_u64).to_string(), "7");
        assert_eq!(ItemRef::parse("R-HSA-7").unwrap().to_string(), "R-HSA-7");
    }
}
