// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Trait for types that represent the color of text, decorations and
/// highlights.
pub trait Brush: Clone + PartialEq + Default + core::fmt::Debug {}

impl<T: Clone + PartialEq + Default + core::fmt::Debug> Brush for T {}

/// Attribute attached to a range of the text.
///
/// Styles only affect painting, never line breaking, so changing them does
/// not require a new layout.
#[derive(Clone, Debug, PartialEq)]
pub enum SpanStyle<B: Brush> {
    /// Fill behind the covered text.
    Background(B),
    /// Color of the covered text.
    Foreground(B),
    /// Underline, in the text color when no brush is given.
    Underline(Option<B>),
    /// Line through the text, in the text color when no brush is given.
    Strikethrough(Option<B>),
    /// The input method's composing region. Drawn underlined.
    Composing,
}

impl<B: Brush> SpanStyle<B> {
    pub(crate) fn is_decoration(&self) -> bool {
        matches!(
            self,
            Self::Underline(_) | Self::Strikethrough(_) | Self::Composing
        )
    }
}
