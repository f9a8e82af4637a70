// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer — the shared application context and artifact storage.

pub mod app_context;
pub mod artifacts;

pub use app_context::AppContext;
pub use artifacts::Artifacts;
