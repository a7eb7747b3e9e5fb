// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use serde::{Deserialize, Serialize};

/// UI state of an engine that survives the host view being recreated.
///
/// The selection ends are kept as anchor and focus, so a backwards selection
/// is restored backwards. The text is only saved when the engine is set to
/// freeze it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedState {
    /// Selection anchor.
    pub selection_start: usize,
    /// Selection focus.
    pub selection_end: usize,
    /// The text, when frozen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frozen_text: Option<String>,
    /// The engine had focus when the text was frozen.
    #[serde(default)]
    pub frozen_with_focus: bool,
}
