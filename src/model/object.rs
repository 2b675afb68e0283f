// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pathnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pathnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::ids::{DbId, StableId};

/// Schema class of a navigable event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Pathway,
    TopLevelPathway,
    Reaction,
    BlackBoxEvent,
    Polymerisation,
    Depolymerisation,
    FailedReaction,
}

impl EventKind {
    pub fn is_pathway(self) -> bool {
        matches!(self, Self::Pathway | Self::TopLevelPathway)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pathway => "Pathway",
            Self::TopLevelPathway => "TopLevelPathway",
            Self::Reaction => "Reaction",
            Self::BlackBoxEvent => "BlackBoxEvent",
            Self::Polymerisation => "Polymerisation",
            Self::Depolymerisation => "Depolymerisation",
            Self::FailedReaction => "FailedReaction",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not an event schema class")]
pub struct ParseEventKindError(pub String);

impl FromStr for EventKind {
    type Err = ParseEventKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pathway" => Ok(Self::Pathway),
            "TopLevelPathway" => Ok(Self::TopLevelPathway),
            "Reaction" => Ok(Self::Reaction),
            "BlackBoxEvent" => Ok(Self::BlackBoxEvent),
            "Polymerisation" => Ok(Self::Polymerisation),
            "Depolymerisation" => Ok(Self::Depolymerisation),
            "FailedReaction" => Ok(Self::FailedReaction),
            other => Err(ParseEventKindError(other.to_owned())),
        }
    }
}

/// A navigable entity: a pathway or a reaction-like event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    db_id: Option<DbId>,
    stable_id: StableId,
    display_name: String,
    kind: EventKind,
    has_diagram: bool,
}

impl Event {
    pub fn new(stable_id: StableId, display_name: impl Into<String>, kind: EventKind) -> Self {
        Self {
            db_id: None,
            stable_id,
            display_name: display_name.into(),
            kind,
            has_diagram: false,
        }
    }

    pub fn with_db_id(mut self, db_id: DbId) -> Self {
        self.db_id = Some(db_id);
        self
    }

    pub fn with_diagram(mut self, has_diagram: bool) -> Self {
        self.has_diagram = has_diagram;
        self
    }

    pub fn db_id(&self) -> Option<DbId> {
        self.db_id
    }

    pub fn stable_id(&self) -> &StableId {
        &self.stable_id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Only pathways own diagrams; the flag is ignored for reactions.
    pub fn has_diagram(&self) -> bool {
        self.has_diagram && self.kind.is_pathway()
    }
}

/// Any non-event object (physical entity, reference, ...). Kept only for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtherObject {
    db_id: Option<DbId>,
    stable_id: Option<StableId>,
    display_name: String,
    schema_class: String,
}

impl OtherObject {
    pub fn new(display_name: impl Into<String>, schema_class: impl Into<String>) -> Self {
        Self {
            db_id: None,
            stable_id: None,
            display_name: display_name.into(),
            schema_class: schema_class.into(),
        }
    }

    pub fn with_db_id(mut self, db_id: DbId) -> Self {
        self.db_id = Some(db_id);
        self
    }

    pub fn with_stable_id(mut self, stable_id: StableId) -> Self {
        self.stable_id = Some(stable_id);
        self
    }

    pub fn db_id(&self) -> Option<DbId> {
        self.db_id
    }

    pub fn stable_id(&self) -> Option<&StableId> {
        self.stable_id.as_ref()
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn schema_class(&self) -> &str {
        &self.schema_class
    }
}

/// Result of resolving an identifier against the object graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseObject {
    Event(Event),
    Other(OtherObject),
}

impl DatabaseObject {
    pub fn db_id(&self) -> Option<DbId> {
        match self {
            Self::Event(event) => event.db_id(),
            Self::Other(other) => other.db_id(),
        }
    }

    pub fn stable_id(&self) -> Option<&StableId> {
        match self {
            Self::Event(event) => Some(event.stable_id()),
            Self::Other(other) => other.stable_id(),
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Self::Event(event) => event.display_name(),
            Self::Other(other) => other.display_name(),
        }
    }

    pub fn schema_class(&self) -> &str {
        match self {
            Self::Event(event) => event.kind().as_str(),
            Self::Other(other) => other.schema_class(),
        }
    }

    pub fn as_event(&self) -> Option<&Event> {
        match self {
            Self::Event(event) => Some(event),
            Self::Other(_) => None,
        }
    }
}

impl From<Event> for DatabaseObject {
    fn from(value: Event) -> Self {
        Self::Event(value)
    }
}

impl From<OtherObject> for DatabaseObject {
    fn from(value: OtherObject) -> Self {
        Self::Other(value)
    }
}
