// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pathnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pathnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Host-facing entry point.
//!
//! A page may embed several diagram handles, but they all drive one shared viewer and one
//! [`DiagramLoader`]. Each [`DiagramHost::create`] moves that viewer into the requested place
//! holder and resizes it.


use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::graph::ObjectGraph;
use crate::loader::{DiagramLoader, ListenerHandle, LoaderConfig};
use crate::model::{ItemRef, PlaceHolderId, StableId};
use crate::viewer::{DiagramViewer, GraphObject, ViewerError, ViewerEvent, ViewerSettings};

const DEFAULT_WIDTH: u32 = 500;
const DEFAULT_HEIGHT: u32 = 400;

#[derive(Debug, Error)]
pub enum FacadeError {
    #[error("invalid diagram configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
    #[error(transparent)]
    InvalidPlaceHolder(#[from] ViewerError),
}

/// Embedding parameters, as accepted from the host page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DiagramConfig {
    place_holder: PlaceHolderId,
    #[serde(default)]
    proxy_prefix: String,
    #[serde(default = "default_width")]
    width: u32,
    #[serde(default = "default_height")]
    height: u32,
}

fn default_width() -> u32 {
    DEFAULT_WIDTH
}

fn default_height() -> u32 {
    DEFAULT_HEIGHT
}

impl DiagramConfig {
    pub fn new(place_holder: PlaceHolderId, width: u32, height: u32) -> Self {
        Self {
            place_holder,
            proxy_prefix: String::new(),
            width,
            height,
        }
    }

    /// Parses a host configuration object such as
    /// `{"placeHolder": "diagramHolder", "width": 800}`.
    pub fn from_json(json: &str) -> Result<Self, FacadeError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_proxy_prefix(mut self, proxy_prefix: impl Into<String>) -> Self {
        self.proxy_prefix = proxy_prefix.into();
        self
    }

    pub fn place_holder(&self) -> &PlaceHolderId {
        &self.place_holder
    }

    pub fn proxy_prefix(&self) -> &str {
        &self.proxy_prefix
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Builds the shared viewer. Called again only when the previous viewer was rejected by its
/// place holder.
pub trait ViewerFactory: Send + Sync {
    fn create(&self, settings: ViewerSettings) -> Arc<dyn DiagramViewer>;
}

impl<F> ViewerFactory for F
where
    F: Fn(ViewerSettings) -> Arc<dyn DiagramViewer> + Send + Sync,
{
    fn create(&self, settings: ViewerSettings) -> Arc<dyn DiagramViewer> {
        self(settings)
    }
}

#[derive(Clone)]
struct Shared {
    viewer: Arc<dyn DiagramViewer>,
    loader: Arc<DiagramLoader>,
}

pub struct DiagramHost {
    factory: Box<dyn ViewerFactory>,
    graph: Arc<dyn ObjectGraph>,
    loader_config: LoaderConfig,
    shared: Mutex<Option<Shared>>,
}

impl DiagramHost {
    pub fn new(factory: impl ViewerFactory + 'static, graph: Arc<dyn ObjectGraph>) -> Self {
        Self {
            factory: Box::new(factory),
            graph,
            loader_config: LoaderConfig::default(),
            shared: Mutex::new(None),
        }
    }

    pub fn with_loader_config(mut self, config: LoaderConfig) -> Self {
        self.loader_config = config;
        self
    }

    /// Returns a handle on the shared viewer, attached to `config`'s place holder.
    ///
    /// The viewer and loader are created by the first successful call, which must happen inside a
    /// tokio runtime. A viewer that cannot be attached is discarded. Later calls reuse the shared
    /// viewer; their proxy prefix is ignored.
    pub fn create(&self, config: &DiagramConfig) -> Result<Diagram, FacadeError> {
        let mut slot = self.lock_shared();
        let shared = match slot.clone() {
            Some(shared) => {
                shared.viewer.attach(&config.place_holder)?;
                shared.clone()
            }
            None => {
                tracing::debug!(proxy_prefix = %config.proxy_prefix, "creating shared viewer");
                let viewer = self.factory.create(ViewerSettings {
                    server_prefix: config.proxy_prefix.clone(),
                    show_fireworks_button: false,
                });
                viewer.attach(&config.place_holder)?;
                let loader = DiagramLoader::spawn_with_config(
                    viewer.clone(),
                    self.graph.clone(),
                    self.loader_config.clone(),
                );
                let shared = Shared {
                    viewer,
                    loader: Arc::new(loader),
                };
                *slot = Some(shared.clone());
                shared
            }
        };
        drop(slot);

        let diagram = Diagram {
            viewer: shared.viewer,
            loader: shared.loader,
        };
        diagram.resize(config.width, config.height);
        Ok(diagram)
    }

    fn lock_shared(&self) -> MutexGuard<'_, Option<Shared>> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for DiagramHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagramHost")
            .field("loader_config", &self.loader_config)
            .field("created", &self.lock_shared().is_some())
            .finish()
    }
}

/// Handle on the shared viewer. Cheap to clone.
#[derive(Clone)]
pub struct Diagram {
    viewer: Arc<dyn DiagramViewer>,
    loader: Arc<DiagramLoader>,
}

impl Diagram {
    pub fn highlight_item(&self, item: impl Into<ItemRef>) {
        self.viewer.highlight_item(&item.into());
    }

    pub fn select_item(&self, item: impl Into<ItemRef>) {
        self.viewer.select_item(&item.into());
    }

    pub fn load_diagram(&self, diagram: &StableId) {
        self.viewer.load_diagram(diagram);
    }

    pub fn reset_analysis(&self) {
        self.viewer.reset_analysis();
    }

    pub fn reset_highlight(&self) {
        self.viewer.reset_highlight();
    }

    pub fn reset_selection(&self) {
        self.viewer.reset_selection();
    }

    pub fn resize(&self, width: u32, height: u32) {
        self.viewer.set_size(width, height);
        self.viewer.on_resize();
    }

    pub fn set_analysis_token(&self, token: &str, resource: &str) {
        self.viewer.set_analysis_token(token, resource);
    }

    /// Shows `identifier` in the smallest diagram that contains it. See [`DiagramLoader::load`].
    pub fn navigate(&self, identifier: impl Into<String>) {
        self.loader.load(identifier);
    }

    pub fn loader(&self) -> &DiagramLoader {
        &self.loader
    }

    pub fn on_subpathway_selected(
        &self,
        callback: impl Fn(&StableId) + Send + Sync + 'static,
    ) -> ListenerHandle {
        self.loader.add_subpathway_selected_listener(callback)
    }

    pub fn on_diagram_loaded(
        &self,
        callback: impl Fn(&StableId) + Send + 'static,
    ) -> EventSubscription {
        self.watch(move |event| {
            if let ViewerEvent::DiagramLoaded { diagram } = event {
                callback(&diagram);
            }
        })
    }

    pub fn on_object_selected(
        &self,
        callback: impl Fn(Option<&GraphObject>) + Send + 'static,
    ) -> EventSubscription {
        self.watch(move |event| {
            if let ViewerEvent::ObjectSelected(object) = event {
                callback(object.as_ref());
            }
        })
    }

    pub fn on_object_hovered(
        &self,
        callback: impl Fn(Option<&GraphObject>) + Send + 'static,
    ) -> EventSubscription {
        self.watch(move |event| {
            if let ViewerEvent::ObjectHovered(object) = event {
                callback(object.as_ref());
            }
        })
    }

    pub fn on_analysis_reset(&self, callback: impl Fn() + Send + 'static) -> EventSubscription {
        self.watch(move |event| {
            if event == ViewerEvent::AnalysisReset {
                callback();
            }
        })
    }

    pub fn on_canvas_not_supported(
        &self,
        callback: impl Fn() + Send + 'static,
    ) -> EventSubscription {
        self.watch(move |event| {
            if event == ViewerEvent::CanvasNotSupported {
                callback();
            }
        })
    }

    fn watch(&self, handler: impl Fn(ViewerEvent) + Send + 'static) -> EventSubscription {
        // Subscribed here, not inside the task, so events emitted right after registration count.
        let mut events = self.viewer.subscribe();
        let task = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => handler(event),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "viewer event subscription lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
        EventSubscription { task }
    }
}

impl std::fmt::Debug for Diagram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Diagram").field("loader", &self.loader).finish()
    }
}

/// A viewer event callback registration.
///
/// Like [`ListenerHandle`], dropping it leaves the callback in place.
#[derive(Debug)]
pub struct EventSubscription {
    task: JoinHandle<()>,
}

impl EventSubscription {
    pub fn unsubscribe(self) {
        self.task.abort();
    }
}
