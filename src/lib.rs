// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pathnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pathnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Pathnav: navigation for pathway diagram viewers.
//!
//! Given any identifier (a reaction, a sub-pathway, a pathway with its own diagram), the
//! [`loader::DiagramLoader`] finds the smallest diagram that contains it, makes the viewer show
//! that diagram and selects the entity. [`facade`] wraps the loader and a shared viewer for
//! embedding hosts.

pub mod facade;
pub mod graph;
pub mod loader;
pub mod model;
pub mod viewer;
