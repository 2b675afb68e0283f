// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pathnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pathnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! Identifiers, the typed view of object-graph entities, and ancestor chains.

pub mod ancestors;
pub mod ids;
pub mod item;
pub mod object;

pub use ancestors::{Ancestor, AncestorPath, Ancestors};
pub use ids::{DbId, Id, IdError, PlaceHolderId, StableId};
pub use item::ItemRef;
pub use object::{DatabaseObject, Event, EventKind, OtherObject, ParseEventKindError};
