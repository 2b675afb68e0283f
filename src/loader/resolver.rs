// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pathnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pathnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Navigation state machine.
//!
//! The resolver is synchronous and side-effect free: every [`Input`] moves it between phases and
//! yields the [`Effect`]s the driver has to perform (lookups, viewer calls, notifications).
//! Asynchronous completions carry the [`RequestToken`] of the request that started them; results
//! whose token does not match the current phase belong to a superseded request and are dropped.

use std::fmt;

use thiserror::Error;

use crate::graph::GraphError;
use crate::model::{Ancestors, DatabaseObject, Event, StableId};

/// Identifies one navigation request. Strictly increasing per resolver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn get(self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    LookingUp {
        token: RequestToken,
        identifier: String,
    },
    FetchingAncestors {
        token: RequestToken,
        target: StableId,
    },
    LoadingDiagram {
        token: RequestToken,
        target: StableId,
        diagram: StableId,
    },
    /// The target was selected; waiting for the deferred settle before returning to idle.
    Selecting {
        token: RequestToken,
        target: StableId,
    },
}

impl Phase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            Self::Idle => PhaseKind::Idle,
            Self::LookingUp { .. } => PhaseKind::LookingUp,
            Self::FetchingAncestors { .. } => PhaseKind::FetchingAncestors,
            Self::LoadingDiagram { .. } => PhaseKind::LoadingDiagram,
            Self::Selecting { .. } => PhaseKind::Selecting,
        }
    }

    pub fn token(&self) -> Option<RequestToken> {
        match self {
            Self::Idle => None,
            Self::LookingUp { token, .. }
            | Self::FetchingAncestors { token, .. }
            | Self::LoadingDiagram { token, .. }
            | Self::Selecting { token, .. } => Some(*token),
        }
    }

    /// The resolved entity being navigated to. Unknown while the identifier is still being
    /// looked up.
    pub fn target(&self) -> Option<&StableId> {
        match self {
            Self::Idle | Self::LookingUp { .. } => None,
            Self::FetchingAncestors { target, .. }
            | Self::LoadingDiagram { target, .. }
            | Self::Selecting { target, .. } => Some(target),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    #[default]
    Idle,
    LookingUp,
    FetchingAncestors,
    LoadingDiagram,
    Selecting,
}

impl PhaseKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::LookingUp => "looking_up",
            Self::FetchingAncestors => "fetching_ancestors",
            Self::LoadingDiagram => "loading_diagram",
            Self::Selecting => "selecting",
        }
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("failed to look up '{identifier}': {source}")]
    LookupFailed {
        identifier: String,
        #[source]
        source: GraphError,
    },
    #[error("'{identifier}' is a {schema_class}, not a navigable event")]
    NotNavigable {
        identifier: String,
        schema_class: String,
    },
    #[error("failed to fetch ancestors of '{target}': {source}")]
    AncestorsFailed {
        target: StableId,
        #[source]
        source: GraphError,
    },
    #[error("no ancestors found for '{target}'; it does not belong to any pathway")]
    NoAncestors { target: StableId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Navigate(String),
    Resolved {
        token: RequestToken,
        result: Result<DatabaseObject, GraphError>,
    },
    AncestorsLoaded {
        token: RequestToken,
        result: Result<Ancestors, GraphError>,
    },
    /// The viewer finished loading a diagram, whoever asked for it.
    DiagramLoaded(StableId),
    Settled {
        token: RequestToken,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Lookup {
        token: RequestToken,
        identifier: String,
    },
    FetchAncestors {
        token: RequestToken,
        event: Event,
    },
    LoadDiagram(StableId),
    SelectItem(StableId),
    NotifySubpathwaySelected(StableId),
    /// Feed [`Input::Settled`] back once the inputs already queued have been handled.
    ScheduleSettle {
        token: RequestToken,
    },
    Report(NavigationError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolver {
    last_token: RequestToken,
    phase: Phase,
    loaded_diagram: Option<StableId>,
    selected_pathway: Option<StableId>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn target(&self) -> Option<&StableId> {
        self.phase.target()
    }

    pub fn loaded_diagram(&self) -> Option<&StableId> {
        self.loaded_diagram.as_ref()
    }

    pub fn selected_pathway(&self) -> Option<&StableId> {
        self.selected_pathway.as_ref()
    }

    pub fn last_token(&self) -> RequestToken {
        self.last_token
    }

    pub fn handle(&mut self, input: Input) -> Vec<Effect> {
        let mut effects = Vec::new();
        match input {
            Input::Navigate(identifier) => self.navigate(identifier, &mut effects),
            Input::Resolved { token, result } => self.on_resolved(token, result, &mut effects),
            Input::AncestorsLoaded { token, result } => {
                self.on_ancestors(token, result, &mut effects)
            }
            Input::DiagramLoaded(diagram) => self.on_diagram_loaded(diagram, &mut effects),
            Input::Settled { token } => self.on_settled(token),
        }
        effects
    }

    fn set_phase(&mut self, phase: Phase) {
        tracing::debug!(from = %self.phase.kind(), to = %phase.kind(), "resolver transition");
        self.phase = phase;
    }

    fn navigate(&mut self, identifier: String, effects: &mut Vec<Effect>) {
        if self.selected_pathway.as_ref().is_some_and(|selected| *selected == *identifier) {
            tracing::debug!(%identifier, "already showing the requested entity");
            return;
        }

        if let Some(superseded) = self.phase.token() {
            tracing::debug!(%superseded, %identifier, "superseding in-flight navigation");
        }

        let token = self.last_token.next();
        self.last_token = token;
        self.set_phase(Phase::LookingUp {
            token,
            identifier: identifier.clone(),
        });
        effects.push(Effect::Lookup { token, identifier });
    }

    fn on_resolved(
        &mut self,
        token: RequestToken,
        result: Result<DatabaseObject, GraphError>,
        effects: &mut Vec<Effect>,
    ) {
        let identifier = match &self.phase {
            Phase::LookingUp {
                token: current,
                identifier,
            } if *current == token => identifier.clone(),
            _ => {
                tracing::debug!(%token, "discarding stale lookup result");
                return;
            }
        };

        match result {
            Err(source) => {
                self.set_phase(Phase::Idle);
                effects.push(Effect::Report(NavigationError::LookupFailed { identifier, source }));
            }
            Ok(DatabaseObject::Event(event)) => {
                self.set_phase(Phase::FetchingAncestors {
                    token,
                    target: event.stable_id().clone(),
                });
                effects.push(Effect::FetchAncestors { token, event });
            }
            Ok(DatabaseObject::Other(other)) => {
                self.set_phase(Phase::Idle);
                effects.push(Effect::Report(NavigationError::NotNavigable {
                    identifier,
                    schema_class: other.schema_class().to_owned(),
                }));
            }
        }
    }

    fn on_ancestors(
        &mut self,
        token: RequestToken,
        result: Result<Ancestors, GraphError>,
        effects: &mut Vec<Effect>,
    ) {
        let target = match &self.phase {
            Phase::FetchingAncestors {
                token: current,
                target,
            } if *current == token => target.clone(),
            _ => {
                tracing::debug!(%token, "discarding stale ancestors");
                return;
            }
        };

        let ancestors = match result {
            Ok(ancestors) => ancestors,
            Err(source) => {
                self.set_phase(Phase::Idle);
                effects.push(Effect::Report(NavigationError::AncestorsFailed { target, source }));
                return;
            }
        };

        let Some(path) = ancestors.first() else {
            self.set_phase(Phase::Idle);
            effects.push(Effect::Report(NavigationError::NoAncestors { target }));
            return;
        };

        match path.nearest_diagram() {
            Some(diagram) if self.loaded_diagram.as_ref() != Some(diagram) => {
                let diagram = diagram.clone();
                self.set_phase(Phase::LoadingDiagram {
                    token,
                    target,
                    diagram: diagram.clone(),
                });
                effects.push(Effect::LoadDiagram(diagram));
            }
            // Either the diagram is already displayed or nothing renders the target: select in
            // whatever is shown.
            _ => self.select(token, target, effects),
        }
    }

    fn on_diagram_loaded(&mut self, diagram: StableId, effects: &mut Vec<Effect>) {
        self.loaded_diagram = Some(diagram.clone());
        self.selected_pathway = Some(diagram.clone());

        let (token, target) = match &self.phase {
            Phase::LoadingDiagram {
                token,
                target,
                diagram: expected,
            } if *expected == diagram => (*token, target.clone()),
            Phase::LoadingDiagram {
                diagram: expected, ..
            } => {
                tracing::debug!(%diagram, %expected, "unrelated diagram loaded while waiting");
                return;
            }
            _ => return,
        };

        self.select(token, target, effects);
    }

    fn select(&mut self, token: RequestToken, target: StableId, effects: &mut Vec<Effect>) {
        if self.loaded_diagram.as_ref() == Some(&target) {
            self.set_phase(Phase::Idle);
            return;
        }

        self.selected_pathway = Some(target.clone());
        effects.push(Effect::SelectItem(target.clone()));
        effects.push(Effect::NotifySubpathwaySelected(target.clone()));
        effects.push(Effect::ScheduleSettle { token });
        self.set_phase(Phase::Selecting { token, target });
    }

    fn on_settled(&mut self, token: RequestToken) {
        if matches!(&self.phase, Phase::Selecting { token: current, .. } if *current == token) {
            self.set_phase(Phase::Idle);
        }
    }
}
