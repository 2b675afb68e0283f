// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pathnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pathnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Diagram viewer seam.
//!
//! The viewer renders diagrams and handles interaction; this crate only drives it and listens to
//! its events.

mod headless;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};

use crate::model::{DbId, ItemRef, PlaceHolderId, StableId};

pub use headless::{HeadlessViewer, ViewerCall};

/// Host-facing description of an object inside the displayed diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphObject {
    pub db_id: DbId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub st_id: Option<StableId>,
    pub display_name: String,
    pub schema_class: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerEvent {
    /// Emitted for every diagram the viewer finishes loading, whoever requested it.
    DiagramLoaded { diagram: StableId },
    ObjectSelected(Option<GraphObject>),
    ObjectHovered(Option<GraphObject>),
    AnalysisReset,
    CanvasNotSupported,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewerError {
    #[error("place holder '{0}' does not exist in the host")]
    PlaceHolderNotFound(PlaceHolderId),
}

/// Settings the viewer is created with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewerSettings {
    pub server_prefix: String,
    pub show_fireworks_button: bool,
}

/// The rendering/interaction widget.
///
/// Calls are fire-and-forget; completion of `load_diagram` is reported through
/// [`ViewerEvent::DiagramLoaded`] on the stream returned by [`DiagramViewer::subscribe`] and on
/// every [`DiagramViewer::subscribe_loads`] stream.
pub trait DiagramViewer: Send + Sync {
    fn load_diagram(&self, diagram: &StableId);
    fn select_item(&self, item: &ItemRef);
    fn highlight_item(&self, item: &ItemRef);
    fn reset_selection(&self);
    fn reset_highlight(&self);
    fn reset_analysis(&self);
    fn set_analysis_token(&self, token: &str, resource: &str);

    /// Moves the widget into the host element `place_holder`, detaching it from any previous one.
    fn attach(&self, place_holder: &PlaceHolderId) -> Result<(), ViewerError>;
    fn set_size(&self, width: u32, height: u32);
    fn on_resize(&self);

    /// All viewer events. Slow receivers may lag and miss some.
    fn subscribe(&self) -> broadcast::Receiver<ViewerEvent>;

    /// Every diagram the viewer finishes loading, in order and without gaps.
    fn subscribe_loads(&self) -> mpsc::UnboundedReceiver<StableId>;
}
