// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pathnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pathnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use smallvec::SmallVec;

use super::ids::StableId;

/// One element of an ancestor chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ancestor {
    stable_id: StableId,
    display_name: String,
    diagram: Option<StableId>,
}

impl Ancestor {
    pub fn new(stable_id: StableId, display_name: impl Into<String>) -> Self {
        Self {
            stable_id,
            display_name: display_name.into(),
            diagram: None,
        }
    }

    /// Marks the ancestor as owning a renderable diagram with the given id.
    pub fn with_diagram(mut self, diagram: StableId) -> Self {
        self.diagram = Some(diagram);
        self
    }

    pub fn stable_id(&self) -> &StableId {
        &self.stable_id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn diagram(&self) -> Option<&StableId> {
        self.diagram.as_ref()
    }

    pub fn has_diagram(&self) -> bool {
        self.diagram.is_some()
    }
}

/// Ordered chain of ancestors, nearest first.
///
/// Object-graph services may put the event itself at the front of the chain, in which case a
/// directly renderable event wins over all of its ancestors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AncestorPath {
    nodes: SmallVec<[Ancestor; 8]>,
}

impl AncestorPath {
    pub fn new(nodes: impl IntoIterator<Item = Ancestor>) -> Self {
        Self {
            nodes: nodes.into_iter().collect(),
        }
    }

    pub fn nodes(&self) -> &[Ancestor] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The nearest ancestor that owns a renderable diagram.
    pub fn nearest_with_diagram(&self) -> Option<&Ancestor> {
        self.nodes.iter().find(|node| node.has_diagram())
    }

    /// Diagram id of [`Self::nearest_with_diagram`].
    pub fn nearest_diagram(&self) -> Option<&StableId> {
        self.nearest_with_diagram().and_then(Ancestor::diagram)
    }
}

/// All ancestor chains of an event, as returned by the object graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ancestors {
    paths: Vec<AncestorPath>,
}

impl Ancestors {
    pub fn new(paths: Vec<AncestorPath>) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &[AncestorPath] {
        &self.paths
    }

    pub fn first(&self) -> Option<&AncestorPath> {
        self.paths.first()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AncestorPath> {
        self.paths.iter()
    }
}

impl<'a> IntoIterator for &'a Ancestors {
    type Item = &'a AncestorPath;
    type IntoIter = std::slice::Iter<'a, AncestorPath>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
