// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pathnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pathnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Diagram navigation.
//!
//! [`DiagramLoader`] resolves an arbitrary identifier to the diagram that contains it, asks the
//! viewer to load that diagram when it is not the one displayed, and selects the entity once the
//! viewer confirms the load. All state lives in one task that handles its inputs one at a time;
//! `load` only enqueues a request and returns.

mod listeners;
mod resolver;

#[cfg(test)]
mod tests;

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::graph::{GraphError, ObjectGraph};
use crate::model::{ItemRef, StableId};
use crate::viewer::DiagramViewer;

pub use listeners::ListenerHandle;
pub use resolver::{
    Effect, Input, NavigationError, Phase, PhaseKind, RequestToken, Resolver,
};

use listeners::Listeners;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoaderConfig {
    request_timeout: Option<Duration>,
}

impl LoaderConfig {
    /// Bounds every object-graph call. Without a timeout a request that never answers keeps the
    /// loader busy until the next `load` supersedes it.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }
}

/// Point-in-time view of the resolver, published after every handled input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoaderSnapshot {
    pub phase: PhaseKind,
    pub target: Option<StableId>,
    pub loaded_diagram: Option<StableId>,
    pub selected_pathway: Option<StableId>,
    /// Number of `load` requests handled so far.
    pub processed: u64,
}

#[derive(Debug)]
pub struct DiagramLoader {
    requests: mpsc::UnboundedSender<String>,
    submitted: AtomicU64,
    snapshot: watch::Receiver<LoaderSnapshot>,
    listeners: Listeners,
    task: JoinHandle<()>,
}

impl DiagramLoader {
    /// Starts the loader on the current tokio runtime.
    pub fn spawn(viewer: Arc<dyn DiagramViewer>, graph: Arc<dyn ObjectGraph>) -> Self {
        Self::spawn_with_config(viewer, graph, LoaderConfig::default())
    }

    pub fn spawn_with_config(
        viewer: Arc<dyn DiagramViewer>,
        graph: Arc<dyn ObjectGraph>,
        config: LoaderConfig,
    ) -> Self {
        let (requests, request_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot) = watch::channel(LoaderSnapshot::default());
        let listeners = Listeners::default();

        // Subscribe before spawning so no load notification slips through.
        let viewer_loads = viewer.subscribe_loads();
        let driver = Driver {
            resolver: Resolver::new(),
            viewer,
            graph,
            config,
            listeners: listeners.clone(),
            snapshot: snapshot_tx,
            in_flight: None,
            processed: 0,
        };
        let task = tokio::spawn(
            driver.run(request_rx, viewer_loads).instrument(tracing::debug_span!("diagram_loader")),
        );

        Self {
            requests,
            submitted: AtomicU64::new(0),
            snapshot,
            listeners,
            task,
        }
    }

    /// Navigates to `identifier`. Returns immediately; the outcome is observable through the
    /// sub-pathway listeners, [`DiagramLoader::target`] and [`DiagramLoader::settled`].
    pub fn load(&self, identifier: impl Into<String>) {
        let identifier = identifier.into();
        self.submitted.fetch_add(1, Ordering::SeqCst);
        if self.requests.send(identifier).is_err() {
            self.submitted.fetch_sub(1, Ordering::SeqCst);
            tracing::warn!("diagram loader is not running; navigation request dropped");
        }
    }

    /// The entity currently being navigated to, `None` when idle.
    pub fn target(&self) -> Option<StableId> {
        self.snapshot.borrow().target.clone()
    }

    pub fn snapshot(&self) -> LoaderSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Registers `listener` for every entity the loader selects. Listeners run on the loader task
    /// and should return quickly; a panic is caught and logged.
    pub fn add_subpathway_selected_listener(
        &self,
        listener: impl Fn(&StableId) + Send + Sync + 'static,
    ) -> ListenerHandle {
        self.listeners.add(listener)
    }

    /// Waits until every request submitted so far has been handled and the loader is idle.
    pub async fn settled(&self) {
        let submitted = self.submitted.load(Ordering::SeqCst);
        let mut snapshot = self.snapshot.clone();
        let _ = snapshot
            .wait_for(|state| state.processed >= submitted && state.phase == PhaseKind::Idle)
            .await;
    }
}

impl Drop for DiagramLoader {
    fn drop(&mut self) {
        self.task.abort();
    }
}

struct Driver {
    resolver: Resolver,
    viewer: Arc<dyn DiagramViewer>,
    graph: Arc<dyn ObjectGraph>,
    config: LoaderConfig,
    listeners: Listeners,
    snapshot: watch::Sender<LoaderSnapshot>,
    in_flight: Option<JoinHandle<()>>,
    processed: u64,
}

struct Channels {
    completions: mpsc::UnboundedSender<Input>,
    settles: mpsc::UnboundedSender<RequestToken>,
}

impl Driver {
    async fn run(
        mut self,
        mut requests: mpsc::UnboundedReceiver<String>,
        mut viewer_loads: mpsc::UnboundedReceiver<StableId>,
    ) {
        let (completions_tx, mut completions) = mpsc::unbounded_channel();
        let (settles_tx, mut settles) = mpsc::unbounded_channel();
        let channels = Channels {
            completions: completions_tx,
            settles: settles_tx,
        };
        let mut viewer_open = true;

        loop {
            // Order matters: settles only run after the diagram loads already queued, so a load
            // notification from the same tick is never read as the start of something new.
            let input = tokio::select! {
                biased;
                Some(input) = completions.recv() => input,
                load = viewer_loads.recv(), if viewer_open => match load {
                    Some(diagram) => Input::DiagramLoaded(diagram),
                    None => {
                        viewer_open = false;
                        continue;
                    }
                },
                Some(token) = settles.recv() => Input::Settled { token },
                request = requests.recv() => match request {
                    Some(identifier) => {
                        self.processed += 1;
                        Input::Navigate(identifier)
                    }
                    None => break,
                },
            };

            for effect in self.resolver.handle(input) {
                self.apply(effect, &channels);
            }
            self.publish();
        }

        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
    }

    fn apply(&mut self, effect: Effect, channels: &Channels) {
        match effect {
            Effect::Lookup { token, identifier } => {
                tracing::debug!(%token, %identifier, "looking up");
                let graph = self.graph.clone();
                let completions = channels.completions.clone();
                let timeout = self.config.request_timeout;
                self.start(async move {
                    let result = bounded(timeout, graph.lookup(&identifier)).await;
                    let _ = completions.send(Input::Resolved { token, result });
                });
            }
            Effect::FetchAncestors { token, event } => {
                tracing::debug!(%token, target = %event.stable_id(), "fetching ancestors");
                let graph = self.graph.clone();
                let completions = channels.completions.clone();
                let timeout = self.config.request_timeout;
                self.start(async move {
                    let result = bounded(timeout, graph.ancestors(&event)).await;
                    let _ = completions.send(Input::AncestorsLoaded { token, result });
                });
            }
            Effect::LoadDiagram(diagram) => self.viewer.load_diagram(&diagram),
            Effect::SelectItem(target) => self.viewer.select_item(&ItemRef::from(target)),
            Effect::NotifySubpathwaySelected(target) => self.listeners.notify(&target),
            Effect::ScheduleSettle { token } => {
                let _ = channels.settles.send(token);
            }
            Effect::Report(error) => report(&error),
        }
    }

    /// Runs an object-graph call, cancelling the one it supersedes.
    fn start(&mut self, call: impl Future<Output = ()> + Send + 'static) {
        if let Some(previous) = self.in_flight.replace(tokio::spawn(call.in_current_span())) {
            previous.abort();
        }
    }

    fn publish(&self) {
        let next = LoaderSnapshot {
            phase: self.resolver.phase().kind(),
            target: self.resolver.target().cloned(),
            loaded_diagram: self.resolver.loaded_diagram().cloned(),
            selected_pathway: self.resolver.selected_pathway().cloned(),
            processed: self.processed,
        };
        self.snapshot.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }
}

async fn bounded<T>(
    timeout: Option<Duration>,
    call: impl Future<Output = Result<T, GraphError>>,
) -> Result<T, GraphError> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .unwrap_or_else(|_| Err(GraphError::Timeout(limit))),
        None => call.await,
    }
}

/// Navigation failures never reach the caller of `load`; they end up in the log.
pub(crate) fn report(error: &NavigationError) {
    tracing::error!(%error, "navigation aborted");
}
