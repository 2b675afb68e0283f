// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pathnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pathnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! In-memory object graph loaded from a JSON fixture.
//!
//! The fixture lists objects with their parent pathways. Ancestor chains are derived from the
//! parent links: every route from the event up to a root, nearest first, starting with the event
//! itself. Events that reach no pathway at all (orphan reactions) have no chains.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use super::{GraphError, ObjectGraph};
use crate::model::{
    Ancestor, AncestorPath, Ancestors, DatabaseObject, DbId, Event, EventKind, IdError, ItemRef,
    OtherObject, StableId,
};

const DEMO_GRAPH_JSON: &str = include_str!("demo_graph.json");

/// Upper bound on the number of chains enumerated for one event.
const MAX_ANCESTOR_PATHS: usize = 256;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid fixture json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("object #{index} has an invalid stable id: {source}")]
    InvalidId {
        index: usize,
        #[source]
        source: IdError,
    },
    #[error("object #{index} has neither a stable id nor a database id")]
    MissingId { index: usize },
    #[error("object #{index} is an event but has no stable id")]
    EventWithoutStableId { index: usize },
    #[error("duplicate identifier '{0}'")]
    Duplicate(String),
    #[error("'{child}' lists unknown parent '{parent}'")]
    UnknownParent { child: String, parent: String },
    #[error("'{child}' lists '{parent}' as parent but it is not an event")]
    ParentNotEvent { child: String, parent: String },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct FixtureFile {
    objects: Vec<FixtureObject>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct FixtureObject {
    #[serde(default)]
    db_id: Option<u64>,
    #[serde(default)]
    st_id: Option<String>,
    display_name: String,
    schema_class: String,
    #[serde(default)]
    has_diagram: bool,
    #[serde(default)]
    parents: Vec<String>,
}

#[derive(Debug, Clone)]
struct Entry {
    object: DatabaseObject,
    parents: Vec<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct FixtureGraph {
    entries: Vec<Entry>,
    by_stable_id: BTreeMap<StableId, usize>,
    by_db_id: BTreeMap<DbId, usize>,
}

/// The graph bundled with the crate, used by the CLI `--demo` mode.
pub fn demo_graph() -> Result<FixtureGraph, FixtureError> {
    FixtureGraph::from_json(DEMO_GRAPH_JSON)
}

impl FixtureGraph {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, FixtureError> {
        let file: FixtureFile = serde_json::from_str(raw)?;
        Self::build(file.objects)
    }

    fn build(objects: Vec<FixtureObject>) -> Result<Self, FixtureError> {
        let mut graph = Self::default();
        let mut pending_parents = Vec::with_capacity(objects.len());

        for (index, raw) in objects.into_iter().enumerate() {
            let stable_id = raw
                .st_id
                .map(StableId::new)
                .transpose()
                .map_err(|source| FixtureError::InvalidId { index, source })?;
            let db_id = raw.db_id.map(DbId::new);
            if stable_id.is_none() && db_id.is_none() {
                return Err(FixtureError::MissingId { index });
            }

            let object = match raw.schema_class.parse::<EventKind>() {
                Ok(kind) => {
                    let stable_id =
                        stable_id.clone().ok_or(FixtureError::EventWithoutStableId { index })?;
                    let mut event = Event::new(stable_id, raw.display_name, kind)
                        .with_diagram(raw.has_diagram);
                    if let Some(db_id) = db_id {
                        event = event.with_db_id(db_id);
                    }
                    DatabaseObject::Event(event)
                }
                Err(_) => {
                    let mut other = OtherObject::new(raw.display_name, raw.schema_class);
                    if let Some(db_id) = db_id {
                        other = other.with_db_id(db_id);
                    }
                    if let Some(stable_id) = stable_id.clone() {
                        other = other.with_stable_id(stable_id);
                    }
                    DatabaseObject::Other(other)
                }
            };

            if let Some(stable_id) = stable_id {
                if graph.by_stable_id.insert(stable_id.clone(), index).is_some() {
                    return Err(FixtureError::Duplicate(stable_id.into_string()));
                }
            }
            if let Some(db_id) = db_id {
                if graph.by_db_id.insert(db_id, index).is_some() {
                    return Err(FixtureError::Duplicate(db_id.to_string()));
                }
            }

            graph.entries.push(Entry {
                object,
                parents: Vec::new(),
            });
            pending_parents.push(raw.parents);
        }

        for (index, parents) in pending_parents.into_iter().enumerate() {
            let child = graph.label(index);
            let mut resolved = Vec::with_capacity(parents.len());
            for parent in parents {
                let Some(&parent_index) = graph.by_stable_id.get(parent.as_str()) else {
                    return Err(FixtureError::UnknownParent { child, parent });
                };
                if graph.entries[parent_index].object.as_event().is_none() {
                    return Err(FixtureError::ParentNotEvent { child, parent });
                }
                resolved.push(parent_index);
            }
            graph.entries[index].parents = resolved;
        }

        Ok(graph)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, identifier: &str) -> Option<&DatabaseObject> {
        self.find(identifier).map(|index| &self.entries[index].object)
    }

    /// Ancestor chains of the event with `stable_id`, or `None` when it is not in the graph.
    pub fn ancestor_paths(&self, stable_id: &StableId) -> Option<Ancestors> {
        let start = *self.by_stable_id.get(stable_id)?;
        let mut paths = Vec::new();
        let mut trail = vec![start];
        self.walk(start, &mut trail, &mut paths);
        Some(Ancestors::new(paths))
    }

    fn find(&self, identifier: &str) -> Option<usize> {
        if let Some(&index) = self.by_stable_id.get(identifier) {
            return Some(index);
        }
        match ItemRef::parse(identifier).ok()? {
            ItemRef::Db(db_id) => self.by_db_id.get(&db_id).copied(),
            ItemRef::Stable(_) => None,
        }
    }

    fn label(&self, index: usize) -> String {
        let object = &self.entries[index].object;
        match (object.stable_id(), object.db_id()) {
            (Some(stable_id), _) => stable_id.to_string(),
            (None, Some(db_id)) => db_id.to_string(),
            (None, None) => format!("#{index}"),
        }
    }

    fn walk(&self, node: usize, trail: &mut Vec<usize>, out: &mut Vec<AncestorPath>) {
        if out.len() >= MAX_ANCESTOR_PATHS {
            return;
        }

        let mut extended = false;
        for &parent in &self.entries[node].parents {
            if trail.contains(&parent) {
                continue;
            }
            extended = true;
            trail.push(parent);
            self.walk(parent, trail, out);
            trail.pop();
        }

        if !extended && self.reaches_pathway(trail) && out.len() < MAX_ANCESTOR_PATHS {
            out.push(self.path_from(trail));
        }
    }

    fn reaches_pathway(&self, trail: &[usize]) -> bool {
        trail.iter().any(|&index| {
            self.entries[index].object.as_event().is_some_and(|event| event.kind().is_pathway())
        })
    }

    fn path_from(&self, trail: &[usize]) -> AncestorPath {
        AncestorPath::new(trail.iter().filter_map(|&index| {
            let event = self.entries[index].object.as_event()?;
            let ancestor = Ancestor::new(event.stable_id().clone(), event.display_name());
            Some(if event.has_diagram() {
                ancestor.with_diagram(event.stable_id().clone())
            } else {
                ancestor
            })
        }))
    }
}

#[async_trait]
impl ObjectGraph for FixtureGraph {
    async fn lookup(&self, identifier: &str) -> Result<DatabaseObject, GraphError> {
        self.get(identifier).cloned().ok_or_else(|| GraphError::NotFound(identifier.to_owned()))
    }

    async fn ancestors(&self, event: &Event) -> Result<Ancestors, GraphError> {
        self.ancestor_paths(event.stable_id())
            .ok_or_else(|| GraphError::NotFound(event.stable_id().to_string()))
    }
}
