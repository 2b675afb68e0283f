// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pathnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pathnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use tracing_test::traced_test;

use super::{report, DiagramLoader, LoaderConfig, NavigationError, PhaseKind};
use crate::graph::{GraphError, ObjectGraph};
use crate::model::{
    Ancestor, AncestorPath, Ancestors, DatabaseObject, Event, EventKind, ItemRef, OtherObject,
    StableId,
};
use crate::viewer::{HeadlessViewer, ViewerCall, ViewerEvent, ViewerSettings};

fn sid(value: &str) -> StableId {
    StableId::new(value).expect("stable id")
}

async fn within<T>(future: impl Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(5), future).await.expect("timed out")
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    within(async {
        while !condition() {
            tokio::task::yield_now().await;
        }
    })
    .await;
}

#[derive(Default)]
struct ScriptedGraph {
    objects: BTreeMap<String, DatabaseObject>,
    ancestors: BTreeMap<String, Ancestors>,
    gates: Mutex<BTreeMap<String, Arc<Notify>>>,
    lookups: Mutex<Vec<String>>,
}

impl ScriptedGraph {
    fn with_event(mut self, event: Event, paths: Vec<AncestorPath>) -> Self {
        let key = event.stable_id().to_string();
        self.ancestors.insert(key.clone(), Ancestors::new(paths));
        self.objects.insert(key, event.into());
        self
    }

    fn with_object(mut self, identifier: &str, object: DatabaseObject) -> Self {
        self.objects.insert(identifier.to_owned(), object);
        self
    }

    /// Lookups of `identifier` block until the returned gate is opened.
    fn gate(&self, identifier: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert(identifier.to_owned(), gate.clone());
        gate
    }

    fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectGraph for ScriptedGraph {
    async fn lookup(&self, identifier: &str) -> Result<DatabaseObject, GraphError> {
        self.lookups.lock().unwrap().push(identifier.to_owned());
        let gate = self.gates.lock().unwrap().get(identifier).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.objects.get(identifier).cloned().ok_or_else(|| GraphError::NotFound(identifier.to_owned()))
    }

    async fn ancestors(&self, event: &Event) -> Result<Ancestors, GraphError> {
        Ok(self.ancestors.get(event.stable_id().as_str()).cloned().unwrap_or_default())
    }
}

fn reaction(id: &str) -> Event {
    Event::new(sid(id), id, EventKind::Reaction)
}

/// `R1` sits in sub-pathway `P1` drawn on `D1`, `R3` in `P1` drawn on its own diagram, `R2` in `P2`
/// drawn on `D2`.
fn scripted() -> ScriptedGraph {
    ScriptedGraph::default()
        .with_event(
            reaction("R1"),
            vec![AncestorPath::new([
                Ancestor::new(sid("P1"), "P1").with_diagram(sid("D1")),
                Ancestor::new(sid("P0"), "P0"),
            ])],
        )
        .with_event(
            reaction("R2"),
            vec![AncestorPath::new([Ancestor::new(sid("P2"), "P2").with_diagram(sid("D2"))])],
        )
        .with_event(
            reaction("R3"),
            vec![AncestorPath::new([
                Ancestor::new(sid("P1"), "P1").with_diagram(sid("P1")),
                Ancestor::new(sid("P0"), "P0"),
            ])],
        )
        .with_event(
            Event::new(sid("P1"), "P1", EventKind::Pathway).with_diagram(true),
            vec![AncestorPath::new([
                Ancestor::new(sid("P1"), "P1").with_diagram(sid("P1")),
                Ancestor::new(sid("P0"), "P0"),
            ])],
        )
        .with_object("C1", OtherObject::new("EGF:EGFR", "Complex").into())
}

struct Harness {
    viewer: Arc<HeadlessViewer>,
    graph: Arc<ScriptedGraph>,
    loader: DiagramLoader,
    notified: Arc<Mutex<Vec<String>>>,
}

impl Harness {
    fn new(viewer: HeadlessViewer, graph: ScriptedGraph) -> Self {
        Self::with_config(viewer, graph, LoaderConfig::default())
    }

    fn with_config(viewer: HeadlessViewer, graph: ScriptedGraph, config: LoaderConfig) -> Self {
        let viewer = Arc::new(viewer);
        let graph = Arc::new(graph);
        let loader = DiagramLoader::spawn_with_config(viewer.clone(), graph.clone(), config);
        let notified = Arc::new(Mutex::new(Vec::new()));
        {
            let notified = notified.clone();
            loader.add_subpathway_selected_listener(move |target| {
                notified.lock().unwrap().push(target.to_string());
            });
        }
        Self {
            viewer,
            graph,
            loader,
            notified,
        }
    }

    fn notified(&self) -> Vec<String> {
        self.notified.lock().unwrap().clone()
    }
}

fn headless() -> HeadlessViewer {
    HeadlessViewer::new(ViewerSettings::default())
}

#[tokio::test]
async fn loads_enclosing_diagram_then_selects_reaction() {
    let h = Harness::new(headless(), scripted());

    h.loader.load("R1");
    within(h.loader.settled()).await;

    assert_eq!(
        h.viewer.calls(),
        vec![ViewerCall::LoadDiagram(sid("D1")), ViewerCall::SelectItem(ItemRef::from(sid("R1")))]
    );
    assert_eq!(h.notified(), vec!["R1"]);
    assert_eq!(h.loader.target(), None);

    let snapshot = h.loader.snapshot();
    assert_eq!(snapshot.loaded_diagram, Some(sid("D1")));
    assert_eq!(snapshot.selected_pathway, Some(sid("R1")));
    assert_eq!(snapshot.phase, PhaseKind::Idle);
}

#[tokio::test]
async fn selects_directly_when_diagram_is_already_displayed() {
    let h = Harness::new(headless(), scripted());
    h.viewer.emit(ViewerEvent::DiagramLoaded { diagram: sid("D1") });

    h.loader.load("R1");
    within(h.loader.settled()).await;

    assert_eq!(h.viewer.calls(), vec![ViewerCall::SelectItem(ItemRef::from(sid("R1")))]);
    assert_eq!(h.notified(), vec!["R1"]);
}

#[tokio::test]
async fn repeated_request_for_selected_entity_does_nothing() {
    let h = Harness::new(headless(), scripted());
    h.loader.load("R1");
    within(h.loader.settled()).await;
    h.viewer.take_calls();

    h.loader.load("R1");
    within(h.loader.settled()).await;

    assert_eq!(h.graph.lookups(), vec!["R1"]);
    assert!(h.viewer.calls().is_empty());
    assert_eq!(h.notified(), vec!["R1"]);
}

#[tokio::test]
async fn navigating_to_the_displayed_pathway_needs_no_viewer_call() {
    let h = Harness::new(headless(), scripted());
    h.viewer.emit(ViewerEvent::DiagramLoaded { diagram: sid("P1") });
    wait_until(|| h.loader.snapshot().loaded_diagram == Some(sid("P1"))).await;

    // A repeated request is suppressed before any lookup.
    h.loader.load("P1");
    within(h.loader.settled()).await;
    assert!(h.graph.lookups().is_empty());

    // With R3 selected inside P1 the request resolves, but P1 is already in full view.
    h.loader.load("R3");
    within(h.loader.settled()).await;
    assert_eq!(h.viewer.take_calls(), vec![ViewerCall::SelectItem(ItemRef::from(sid("R3")))]);

    h.loader.load("P1");
    within(h.loader.settled()).await;
    assert_eq!(h.graph.lookups(), vec!["R3", "P1"]);
    assert!(h.viewer.calls().is_empty());
    assert_eq!(h.loader.target(), None);
}

#[tokio::test]
async fn non_event_identifiers_leave_the_loader_idle() {
    let h = Harness::new(headless(), scripted());

    h.loader.load("C1");
    within(h.loader.settled()).await;

    assert_eq!(h.loader.target(), None);
    assert!(h.viewer.calls().is_empty());
    assert!(h.notified().is_empty());
}

#[tokio::test]
async fn unknown_identifiers_leave_the_loader_idle() {
    let h = Harness::new(headless(), scripted());

    h.loader.load("R-404");
    within(h.loader.settled()).await;

    assert_eq!(h.loader.snapshot().phase, PhaseKind::Idle);
    assert_eq!(h.loader.target(), None);
    assert!(h.viewer.calls().is_empty());
}

#[tokio::test]
async fn back_to_back_requests_produce_one_outcome() {
    let h = Harness::new(headless(), scripted());

    h.loader.load("R1");
    h.loader.load("R1");
    within(h.loader.settled()).await;

    assert_eq!(
        h.viewer.calls(),
        vec![ViewerCall::LoadDiagram(sid("D1")), ViewerCall::SelectItem(ItemRef::from(sid("R1")))]
    );
    assert_eq!(h.notified(), vec!["R1"]);
}

#[tokio::test]
async fn superseded_request_never_lands() {
    let graph = scripted();
    let gate = graph.gate("R1");
    let h = Harness::new(headless(), graph);

    h.loader.load("R1");
    wait_until(|| h.graph.lookups() == vec!["R1"]).await;
    h.loader.load("R2");
    within(h.loader.settled()).await;

    gate.notify_one();
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }

    assert_eq!(
        h.viewer.calls(),
        vec![ViewerCall::LoadDiagram(sid("D2")), ViewerCall::SelectItem(ItemRef::from(sid("R2")))]
    );
    assert_eq!(h.notified(), vec!["R2"]);
    assert_eq!(h.loader.snapshot().selected_pathway, Some(sid("R2")));
}

#[tokio::test]
async fn waits_for_the_requested_diagram_before_selecting() {
    let h = Harness::new(headless().without_load_acknowledgement(), scripted());

    h.loader.load("R1");
    wait_until(|| h.viewer.calls() == vec![ViewerCall::LoadDiagram(sid("D1"))]).await;
    assert_eq!(h.loader.target(), Some(sid("R1")));
    assert_eq!(h.loader.snapshot().phase, PhaseKind::LoadingDiagram);

    h.viewer.emit(ViewerEvent::DiagramLoaded { diagram: sid("D9") });
    wait_until(|| h.loader.snapshot().loaded_diagram == Some(sid("D9"))).await;
    assert!(h.notified().is_empty());
    assert_eq!(h.loader.snapshot().phase, PhaseKind::LoadingDiagram);

    h.viewer.emit(ViewerEvent::DiagramLoaded { diagram: sid("D1") });
    within(h.loader.settled()).await;

    assert_eq!(h.notified(), vec!["R1"]);
    assert_eq!(h.loader.target(), None);
}

#[tokio::test]
async fn diagram_load_survives_a_burst_of_viewer_events() {
    let h = Harness::new(headless().without_load_acknowledgement(), scripted());

    h.loader.load("R1");
    wait_until(|| h.viewer.calls() == vec![ViewerCall::LoadDiagram(sid("D1"))]).await;

    h.viewer.emit(ViewerEvent::DiagramLoaded { diagram: sid("D1") });
    for _ in 0..200 {
        h.viewer.emit(ViewerEvent::ObjectHovered(None));
    }
    within(h.loader.settled()).await;

    assert_eq!(h.notified(), vec!["R1"]);
    assert_eq!(h.loader.target(), None);
    assert_eq!(h.loader.snapshot().loaded_diagram, Some(sid("D1")));
}

#[tokio::test]
async fn loader_keeps_running_after_a_listener_panics() {
    let h = Harness::new(headless(), scripted());
    h.loader.add_subpathway_selected_listener(|_| panic!("listener failure"));

    h.loader.load("R1");
    within(h.loader.settled()).await;
    h.loader.load("R2");
    within(h.loader.settled()).await;

    assert_eq!(h.notified(), vec!["R1", "R2"]);
    assert_eq!(h.loader.snapshot().selected_pathway, Some(sid("R2")));
}

#[tokio::test]
async fn unsubscribed_listeners_are_not_notified() {
    let h = Harness::new(headless(), scripted());
    let extra = Arc::new(Mutex::new(0));
    let handle = {
        let extra = extra.clone();
        h.loader.add_subpathway_selected_listener(move |_| *extra.lock().unwrap() += 1)
    };
    assert!(handle.unsubscribe());

    h.loader.load("R1");
    within(h.loader.settled()).await;

    assert_eq!(*extra.lock().unwrap(), 0);
    assert_eq!(h.notified(), vec!["R1"]);
}

#[tokio::test]
async fn request_timeout_ends_a_hanging_lookup() {
    let graph = scripted();
    let _gate = graph.gate("R1");
    let config = LoaderConfig::default().with_request_timeout(Duration::from_millis(50));
    let h = Harness::with_config(headless(), graph, config);

    h.loader.load("R1");
    within(h.loader.settled()).await;

    assert_eq!(h.loader.snapshot().phase, PhaseKind::Idle);
    assert!(h.viewer.calls().is_empty());
    assert!(h.notified().is_empty());
}

#[test]
#[traced_test]
fn navigation_errors_are_logged() {
    report(&NavigationError::NotNavigable {
        identifier: "C1".to_owned(),
        schema_class: "Complex".to_owned(),
    });
    assert!(logs_contain("not a navigable event"));
}
