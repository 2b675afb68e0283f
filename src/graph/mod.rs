// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pathnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pathnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Object-graph lookup service.
//!
//! The resolver only needs two questions answered: what an identifier refers to, and which
//! ancestor chains lead from an event up to the top of the hierarchy.

pub mod fixture;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{Ancestors, DatabaseObject, Event};

pub use fixture::{demo_graph, FixtureError, FixtureGraph};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("no object found for identifier '{0}'")]
    NotFound(String),
    #[error("object graph request timed out after {0:?}")]
    Timeout(Duration),
    #[error("object graph service error: {0}")]
    Service(String),
}

/// Remote object-graph client.
#[async_trait]
pub trait ObjectGraph: Send + Sync {
    /// Materializes `identifier` (stable id or database id) into a typed object.
    async fn lookup(&self, identifier: &str) -> Result<DatabaseObject, GraphError>;

    /// Returns every ancestor chain of `event`, nearest ancestor first.
    async fn ancestors(&self, event: &Event) -> Result<Ancestors, GraphError>;
}
