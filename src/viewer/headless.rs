// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pathnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pathnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::{broadcast, mpsc};

use super::{DiagramViewer, ViewerError, ViewerEvent, ViewerSettings};
use crate::model::{ItemRef, PlaceHolderId, StableId};

const EVENT_CAPACITY: usize = 64;

/// A call received by [`HeadlessViewer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerCall {
    LoadDiagram(StableId),
    SelectItem(ItemRef),
    HighlightItem(ItemRef),
    ResetSelection,
    ResetHighlight,
    ResetAnalysis,
    SetAnalysisToken { token: String, resource: String },
    Attach(PlaceHolderId),
    SetSize { width: u32, height: u32 },
    Resize,
}

#[derive(Debug, Default)]
struct HeadlessState {
    calls: Vec<ViewerCall>,
    displayed: Option<StableId>,
    attached: Option<PlaceHolderId>,
    load_subscribers: Vec<mpsc::UnboundedSender<StableId>>,
}

/// Viewer without rendering: logs and records every call and acknowledges diagram loads.
#[derive(Debug)]
pub struct HeadlessViewer {
    settings: ViewerSettings,
    place_holders: BTreeSet<PlaceHolderId>,
    acknowledge_loads: bool,
    state: Mutex<HeadlessState>,
    events: broadcast::Sender<ViewerEvent>,
}

impl HeadlessViewer {
    pub fn new(settings: ViewerSettings) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            settings,
            place_holders: BTreeSet::new(),
            acknowledge_loads: true,
            state: Mutex::new(HeadlessState::default()),
            events,
        }
    }

    /// Registers a host element the viewer may be attached to.
    pub fn with_place_holder(mut self, place_holder: PlaceHolderId) -> Self {
        self.place_holders.insert(place_holder);
        self
    }

    /// Leaves `load_diagram` unacknowledged; callers emit [`ViewerEvent::DiagramLoaded`]
    /// themselves via [`HeadlessViewer::emit`].
    pub fn without_load_acknowledgement(mut self) -> Self {
        self.acknowledge_loads = false;
        self
    }

    pub fn settings(&self) -> &ViewerSettings {
        &self.settings
    }

    /// Publishes an event as if the widget produced it (user interaction, external loads).
    pub fn emit(&self, event: ViewerEvent) {
        if let ViewerEvent::DiagramLoaded { diagram } = &event {
            let mut state = self.lock_state();
            state.displayed = Some(diagram.clone());
            state.load_subscribers.retain(|subscriber| subscriber.send(diagram.clone()).is_ok());
        }
        // No receivers is fine: nobody is listening yet.
        let _ = self.events.send(event);
    }

    pub fn calls(&self) -> Vec<ViewerCall> {
        self.lock_state().calls.clone()
    }

    pub fn take_calls(&self) -> Vec<ViewerCall> {
        std::mem::take(&mut self.lock_state().calls)
    }

    pub fn displayed_diagram(&self) -> Option<StableId> {
        self.lock_state().displayed.clone()
    }

    pub fn attached_to(&self) -> Option<PlaceHolderId> {
        self.lock_state().attached.clone()
    }

    fn lock_state(&self) -> MutexGuard<'_, HeadlessState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: ViewerCall) {
        self.lock_state().calls.push(call);
    }
}

impl DiagramViewer for HeadlessViewer {
    fn load_diagram(&self, diagram: &StableId) {
        tracing::info!(%diagram, "viewer: load diagram");
        self.record(ViewerCall::LoadDiagram(diagram.clone()));
        if self.acknowledge_loads {
            self.emit(ViewerEvent::DiagramLoaded {
                diagram: diagram.clone(),
            });
        }
    }

    fn select_item(&self, item: &ItemRef) {
        tracing::info!(%item, "viewer: select item");
        self.record(ViewerCall::SelectItem(item.clone()));
    }

    fn highlight_item(&self, item: &ItemRef) {
        tracing::info!(%item, "viewer: highlight item");
        self.record(ViewerCall::HighlightItem(item.clone()));
    }

    fn reset_selection(&self) {
        self.record(ViewerCall::ResetSelection);
    }

    fn reset_highlight(&self) {
        self.record(ViewerCall::ResetHighlight);
    }

    fn reset_analysis(&self) {
        self.record(ViewerCall::ResetAnalysis);
        let _ = self.events.send(ViewerEvent::AnalysisReset);
    }

    fn set_analysis_token(&self, token: &str, resource: &str) {
        tracing::info!(token, resource, "viewer: set analysis token");
        self.record(ViewerCall::SetAnalysisToken {
            token: token.to_owned(),
            resource: resource.to_owned(),
        });
    }

    fn attach(&self, place_holder: &PlaceHolderId) -> Result<(), ViewerError> {
        if !self.place_holders.contains(place_holder) {
            return Err(ViewerError::PlaceHolderNotFound(place_holder.clone()));
        }
        tracing::debug!(%place_holder, "viewer: attach");
        let mut state = self.lock_state();
        state.attached = Some(place_holder.clone());
        state.calls.push(ViewerCall::Attach(place_holder.clone()));
        Ok(())
    }

    fn set_size(&self, width: u32, height: u32) {
        self.record(ViewerCall::SetSize { width, height });
    }

    fn on_resize(&self) {
        self.record(ViewerCall::Resize);
    }

    fn subscribe(&self) -> broadcast::Receiver<ViewerEvent> {
        self.events.subscribe()
    }

    fn subscribe_loads(&self) -> mpsc::UnboundedReceiver<StableId> {
        let (subscriber, loads) = mpsc::unbounded_channel();
        self.lock_state().load_subscribers.push(subscriber);
        loads
    }
}
