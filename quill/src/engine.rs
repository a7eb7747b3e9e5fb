// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The text engine and its driver.

use core::fmt;
use core::ops::Range;
use core::time::Duration;

use peniko::kurbo::Rect;
use spanned_text::{Edit, Gravity, SpanFlags, SpanId, SpannedBuffer};
use tracing::{debug, trace, warn};

use crate::config::{TextConfig, Truncation};
use crate::draw::{DrawColors, Painter, Scene};
use crate::editing::{
    cursor_geometry, invalidation_rect, selection_geometry, BlinkState, HighlightGeometry,
    Selection, SelectionTracker,
};
use crate::error::{ConfigError, EngineError};
use crate::ime::{ExtractedText, ExtractedTextRequest, InputConnection, InputMethodClient};
use crate::layout::{Layout, LayoutContext, LayoutRequest};
use crate::marquee::{FrameRequest, FrameScheduler, MarqueeAnimator, TickOutcome};
use crate::measure::{sanitize, Measure};
use crate::notify::{ChangeNotifier, ChangedRange, SessionFlush, TextWatcher, WatcherId};
use crate::state::SavedState;
use crate::style::{Brush, SpanStyle};

/// Follow-up edits queued by watchers that are applied for a single edit.
const MAX_FOLLOW_UP_EDITS: usize = 64;

/// How long a cut or copy counts as recent.
const CUT_OR_COPY_WINDOW: Duration = Duration::from_secs(15);

/// Opaque representation of a generation.
///
/// Obtained from [`TextEngine::generation`].
// Overflow handling: the generations are only compared,
// so wrapping is fine. This could only fail if exactly
// `u32::MAX` generations happen between drawing
// operations. This is implausible and so can be ignored.
#[derive(PartialEq, Eq, Default, Clone, Copy, Debug)]
pub struct Generation(u32);

impl Generation {
    /// Make it not what it currently is.
    pub(crate) fn nudge(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}

/// A size constraint from the host's measurement pass.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MeasureSpec {
    /// Exactly this size.
    Exact(f32),
    /// Up to this size.
    AtMost(f32),
    /// Any size.
    Unspecified,
}

impl MeasureSpec {
    fn resolve(self, desired: f32) -> f32 {
        let size = match self {
            Self::Exact(size) => size,
            Self::AtMost(size) => desired.min(size),
            Self::Unspecified => desired,
        };
        sanitize(size, "measure spec")
    }
}

/// A measured size.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Size {
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

/// What the host has to do after changes to the engine.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Invalidation {
    /// The measured size may have changed.
    pub relayout: bool,
    /// Everything needs to be repainted.
    pub redraw: bool,
    /// Only this area needs to be repainted.
    pub dirty: Option<Rect>,
}

impl Invalidation {
    /// Returns `true` if nothing has to be done.
    pub fn is_empty(&self) -> bool {
        !self.relayout && !self.redraw && self.dirty.is_none()
    }

    fn add_rect(&mut self, rect: Option<Rect>) {
        match (self.dirty, rect) {
            (Some(dirty), Some(rect)) => self.dirty = Some(dirty.union(rect)),
            (None, rect) => self.dirty = rect,
            (Some(_), None) => {}
        }
    }
}

/// Rich, optionally editable text with its layout, selection and
/// notifications.
///
/// Most operations only record what changed. Anything that needs measured
/// text goes through a [`TextEngineDriver`], obtained from
/// [`driver`](Self::driver), which brings the layout up to date first.
pub struct TextEngine<B: Brush> {
    buffer: SpannedBuffer<SpanStyle<B>>,
    config: TextConfig,
    notifier: ChangeNotifier,
    tracker: SelectionTracker,
    layout: Layout,
    // Simple tracking of when the layout needs to be updated
    // before it can be used for selection geometry or drawing.
    layout_dirty: bool,
    /// The edits since the last layout, when they can be reflowed.
    pending_hint: Option<Edit>,
    width: f32,
    editable: bool,
    selectable: bool,
    focused: bool,
    shown: bool,
    selected: bool,
    composing: Option<SpanId>,
    colors: DrawColors<B>,
    marquee: MarqueeAnimator,
    /// The marquee may start once the layout is current.
    marquee_armed: bool,
    scheduler: Option<Box<dyn FrameScheduler>>,
    ime: Option<Box<dyn InputMethodClient>>,
    extract_request: Option<ExtractedTextRequest>,
    invalidation: Invalidation,
    generation: Generation,
    /// Time of the last tick.
    clock: Duration,
    blink_shown: BlinkState,
    last_cut_or_copy: Option<Duration>,
    frozen_with_focus: bool,
}

impl<B: Brush> fmt::Debug for TextEngine<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextEngine")
            .field("text", &self.buffer.as_str())
            .field("config", &self.config)
            .field("selection", &self.tracker.selection())
            .field("layout_dirty", &self.layout_dirty)
            .field("width", &self.width)
            .field("editable", &self.editable)
            .field("focused", &self.focused)
            .field("marquee", &self.marquee.status())
            .field("notifier", &self.notifier)
            .finish_non_exhaustive()
    }
}

impl<B: Brush> TextEngine<B> {
    /// Create an engine with no text.
    pub fn new(config: TextConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            buffer: SpannedBuffer::default(),
            tracker: SelectionTracker::new(config.cursor_width),
            config,
            notifier: ChangeNotifier::default(),
            layout: Layout::default(),
            layout_dirty: true,
            pending_hint: None,
            width: f32::INFINITY,
            editable: false,
            selectable: false,
            focused: false,
            shown: true,
            selected: false,
            composing: None,
            colors: DrawColors::default(),
            marquee: MarqueeAnimator::new(),
            marquee_armed: true,
            scheduler: None,
            ime: None,
            extract_request: None,
            invalidation: Invalidation::default(),
            // We don't use the `default` value to start with, as our consumers
            // will choose to use that as their initial value, but will probably need
            // to redraw if they haven't already.
            generation: Generation(1),
            clock: Duration::ZERO,
            blink_shown: BlinkState::Hidden,
            last_cut_or_copy: None,
            frozen_with_focus: false,
        })
    }

    /// Borrow a driver that can measure text.
    pub fn driver<'drv>(
        &'drv mut self,
        measure: &'drv dyn Measure,
        layout_cx: &'drv mut LayoutContext,
    ) -> TextEngineDriver<'drv, B> {
        TextEngineDriver {
            engine: self,
            measure,
            layout_cx,
        }
    }

    /// Borrow a connection for an input method.
    pub fn input_connection(&mut self) -> InputConnection<'_, B> {
        InputConnection::new(self)
    }

    // --- MARK: Configuration ---

    /// The configuration.
    pub fn config(&self) -> &TextConfig {
        &self.config
    }

    /// Replace the configuration.
    pub fn set_config(&mut self, config: TextConfig) -> Result<(), ConfigError> {
        config.validate()?;
        if config == self.config {
            return Ok(());
        }
        self.tracker.set_cursor_width(config.cursor_width);
        self.config = config;
        self.marquee.stop();
        self.marquee_armed = true;
        self.invalidate_layout();
        Ok(())
    }

    /// Brushes used where no span applies.
    pub fn colors(&self) -> &DrawColors<B> {
        &self.colors
    }

    /// Replace the default brushes.
    pub fn set_colors(&mut self, colors: DrawColors<B>) {
        if colors != self.colors {
            self.colors = colors;
            self.request_redraw();
        }
    }

    /// Make the text editable.
    ///
    /// Editable text is always selectable and uses a dynamic layout.
    pub fn set_editable(&mut self, editable: bool) {
        if editable != self.editable {
            self.editable = editable;
            self.sync_blink();
            self.invalidate_layout();
        }
    }

    /// Returns `true` if the text is editable.
    pub fn is_editable(&self) -> bool {
        self.editable
    }

    /// Allow the user to select the text.
    pub fn set_selectable(&mut self, selectable: bool) {
        if selectable != self.selectable {
            self.selectable = selectable;
            self.invalidate_layout();
        }
    }

    /// Returns `true` if the text can be selected.
    pub fn is_selectable(&self) -> bool {
        self.selectable || self.editable
    }

    /// Gain or lose input focus.
    pub fn set_focused(&mut self, focused: bool) {
        if focused != self.focused {
            self.focused = focused;
            self.sync_blink();
            self.marquee_conditions_changed();
            self.request_redraw();
        }
    }

    /// Returns `true` if the engine has focus.
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Mark the view as selected, which lets a marquee run without focus.
    pub fn set_selected(&mut self, selected: bool) {
        if selected != self.selected {
            self.selected = selected;
            self.marquee_conditions_changed();
        }
    }

    /// Tell the engine whether its view is on screen.
    pub fn set_shown(&mut self, shown: bool) {
        if shown != self.shown {
            self.shown = shown;
            self.marquee_conditions_changed();
        }
    }

    /// Start or end a drag selection.
    pub fn set_dragging(&mut self, dragging: bool) {
        self.tracker.blink_mut().set_dragging(dragging);
    }

    /// Set the width to lay out at, `None` for unbounded.
    pub fn set_width(&mut self, width: Option<f32>) {
        let width = match width {
            Some(width) => sanitize(width, "layout width"),
            None => f32::INFINITY,
        };
        if width != self.width {
            self.width = width;
            self.marquee_armed = true;
            self.invalidate_layout();
        }
    }

    /// The width the text is laid out at.
    pub fn width(&self) -> Option<f32> {
        self.width.is_finite().then_some(self.width)
    }

    // --- MARK: Text and spans ---

    /// The text.
    pub fn text(&self) -> &str {
        self.buffer.as_str()
    }

    /// The text with its spans.
    pub fn buffer(&self) -> &SpannedBuffer<SpanStyle<B>> {
        &self.buffer
    }

    /// Replace all text, dropping spans and putting the cursor at the start.
    pub fn set_text(&mut self, text: &str) {
        self.begin_batch_edit();
        self.composing = None;
        let edit = self.buffer.set_text(text, &mut self.notifier);
        self.text_changed(edit);
        self.pending_hint = None;
        self.update_selection(Selection::collapsed(0));
        self.notifier.after_change(self.buffer.as_str());
        self.apply_follow_ups(0);
        self.end_batch();
        if let Some(ime) = self.ime.as_mut() {
            ime.restart_input();
        }
    }

    /// Attach a style to `range`.
    pub fn add_span(
        &mut self,
        range: Range<usize>,
        style: SpanStyle<B>,
        flags: SpanFlags,
        priority: i32,
    ) -> Result<SpanId, EngineError> {
        let had_spans = self.buffer.has_spans();
        let id = self.buffer.add_span(range, style, flags, priority)?;
        self.spans_changed(had_spans);
        Ok(id)
    }

    /// Remove a style, returning it.
    pub fn remove_span(&mut self, id: SpanId) -> Result<SpanStyle<B>, EngineError> {
        let had_spans = self.buffer.has_spans();
        let style = self.buffer.remove_span(id)?;
        if self.composing == Some(id) {
            self.composing = None;
        }
        self.spans_changed(had_spans);
        Ok(style)
    }

    fn spans_changed(&mut self, had_spans: bool) {
        // Spans only affect painting, but whether there are any decides
        // the layout kind.
        if had_spans != self.buffer.has_spans() {
            self.invalidate_layout();
        } else {
            self.request_redraw();
        }
    }

    /// The input method's composing region.
    pub fn composing_range(&self) -> Option<Range<usize>> {
        self.composing.and_then(|id| self.buffer.span_range(id))
    }

    pub(crate) fn set_composing(&mut self, range: Option<Range<usize>>) -> Result<(), EngineError> {
        let had_spans = self.buffer.has_spans();
        if let Some(id) = self.composing.take() {
            // A span dropped by an edit is already gone.
            let _ = self.buffer.remove_span(id);
        }
        if let Some(range) = range {
            let id = self.buffer.add_span(
                range,
                SpanStyle::Composing,
                SpanFlags::INCLUSIVE_INCLUSIVE,
                0,
            )?;
            self.composing = Some(id);
        }
        self.notifier.session.record_selection_change();
        self.spans_changed(had_spans);
        Ok(())
    }

    // --- MARK: Selection ---

    /// The current selection.
    pub fn selection(&self) -> Selection {
        self.tracker.selection()
    }

    /// Select from `anchor` to `focus`.
    ///
    /// Offsets outside the text are clamped into it and offsets inside a
    /// character are moved to its start.
    pub fn set_selection(&mut self, anchor: usize, focus: usize) {
        let clamped = Selection::new(
            self.buffer.clamp_offset(anchor),
            self.buffer.clamp_offset(focus),
        );
        if clamped != Selection::new(anchor, focus) {
            warn!(anchor, focus, len = self.buffer.len(), "clamping selection into the text");
        }
        self.begin_batch_edit();
        self.update_selection(clamped);
        self.end_batch();
    }

    /// Select everything.
    pub fn select_all(&mut self) {
        self.set_selection(0, self.buffer.len());
    }

    /// The selected text.
    pub fn selected_text(&self) -> &str {
        &self.buffer.as_str()[self.tracker.selection().text_range()]
    }

    pub(crate) fn update_selection(&mut self, selection: Selection) {
        let old = self.tracker.cached_geometry().and_then(HighlightGeometry::bounds);
        if !self.tracker.set_selection(selection) {
            return;
        }
        trace!(anchor = selection.anchor(), focus = selection.focus(), "selection changed");
        self.notifier.session.record_selection_change();
        self.generation.nudge();
        if self.layout_dirty {
            self.invalidation.redraw = true;
        } else {
            let new = self.tracker.geometry(&self.layout).bounds();
            let rect = invalidation_rect(&self.layout, old, new);
            self.invalidation.add_rect(rect);
        }
    }

    /// The highlight geometry of the current selection.
    ///
    /// Fails if the layout is out of date; use
    /// [`TextEngineDriver::highlight`] to bring it up to date first.
    pub fn try_highlight(&mut self) -> Result<&HighlightGeometry, EngineError> {
        if self.layout_dirty {
            return Err(EngineError::StaleGeometryAccess);
        }
        Ok(self.tracker.geometry(&self.layout))
    }

    /// The cursor blink state at the time of the last tick.
    pub fn blink_state(&self) -> BlinkState {
        self.tracker.blink().state(self.clock)
    }

    fn sync_blink(&mut self) {
        let collapsed = self.tracker.selection().is_collapsed();
        let focused = self.focused && self.editable;
        let blink = self.tracker.blink_mut();
        blink.set_focused(focused);
        blink.set_collapsed(collapsed);
    }

    fn highlight_visible(&self) -> bool {
        let selection = self.tracker.selection();
        if selection.is_collapsed() {
            self.editable && self.blink_state() == BlinkState::Visible
        } else {
            self.is_selectable() && (self.focused || !self.editable)
        }
    }

    // --- MARK: Watchers and batches ---

    /// Register a watcher. Watchers are notified in registration order.
    pub fn add_watcher(&mut self, watcher: impl TextWatcher + 'static) -> WatcherId {
        self.notifier.add(Box::new(watcher))
    }

    /// Unregister a watcher. Returns `false` if it was not registered.
    pub fn remove_watcher(&mut self, id: WatcherId) -> bool {
        self.notifier.remove(id).is_some()
    }

    /// Open a batch. Until the outermost batch is closed, edits and
    /// selection changes are not reported to the input method and no
    /// relayout is requested.
    pub fn begin_batch_edit(&mut self) {
        self.notifier.session.begin();
    }

    /// Close a batch.
    pub fn end_batch_edit(&mut self) -> Result<(), EngineError> {
        if let Some(flush) = self.notifier.session.end()? {
            self.flush(flush);
        }
        Ok(())
    }

    /// Returns `true` while a batch is open.
    pub fn in_batch_edit(&self) -> bool {
        self.notifier.session.in_batch()
    }

    /// Close a batch opened by the engine itself.
    fn end_batch(&mut self) {
        // Batches opened internally are always balanced.
        let _ = self.end_batch_edit();
    }

    fn flush(&mut self, flush: SessionFlush) {
        if flush.is_empty() {
            return;
        }
        let changed = flush.changed.map(ChangedRange::from);
        if changed.is_some() {
            self.invalidation.relayout = true;
            self.invalidation.redraw = true;
        }
        debug!(?changed, selection = flush.selection_changed, "flushing batch");
        let Some(mut ime) = self.ime.take() else {
            return;
        };
        if let Some(changed) = changed {
            ime.content_changed(changed);
            if let Some(request) = self.extract_request.as_ref().filter(|r| r.monitor) {
                ime.update_extracted_text(request.token, &self.extracted_text(Some(changed)));
            }
        }
        ime.update_selection(self.tracker.selection(), self.composing_range());
        self.ime = Some(ime);
    }

    // --- MARK: Editing ---

    /// Replace `range` with `text` and run the watchers.
    ///
    /// Returns where the inserted text ends once the watchers' follow-up
    /// edits are applied.
    pub(crate) fn apply_edit(&mut self, range: Range<usize>, text: &str) -> Result<usize, EngineError> {
        self.begin_batch_edit();
        let result = self.apply_edit_in_batch(range, text);
        self.end_batch();
        result
    }

    fn apply_edit_in_batch(&mut self, range: Range<usize>, text: &str) -> Result<usize, EngineError> {
        let (start, end) = (range.start, range.end);
        let edit = self
            .buffer
            .edit(range, text, &mut self.notifier)
            .inspect_err(|error| warn!(start, end, %error, "rejecting edit"))?;
        self.text_changed(edit);
        self.notifier.after_change(self.buffer.as_str());
        Ok(self.apply_follow_ups(edit.new_end()))
    }

    /// Applies queued watcher edits, tracking `end` through them.
    fn apply_follow_ups(&mut self, mut end: usize) -> usize {
        let mut applied = 0;
        while let Some(pending) = self.notifier.take_pending() {
            if applied == MAX_FOLLOW_UP_EDITS {
                let dropped = 1 + self.notifier.discard_pending();
                warn!(dropped, "too many follow-up edits from text watchers");
                break;
            }
            applied += 1;
            match self
                .buffer
                .edit(pending.range.clone(), &pending.text, &mut self.notifier)
            {
                Ok(edit) => {
                    end = edit.map_offset(end, Gravity::Before);
                    self.text_changed(edit);
                    self.notifier.after_change(self.buffer.as_str());
                }
                Err(error) => {
                    warn!(range = ?pending.range, %error, "dropping follow-up edit");
                }
            }
        }
        end
    }

    fn text_changed(&mut self, edit: Edit) {
        self.pending_hint = match (self.layout_dirty, self.pending_hint) {
            (false, _) => Some(edit),
            (true, Some(hint)) => Some(hint.merge(edit)),
            (true, None) => None,
        };
        self.layout_dirty = true;
        self.tracker.invalidate_geometry();
        if self.tracker.adjust_for_edit(&edit, self.buffer.len()) {
            self.notifier.session.record_selection_change();
        }
        if let Some(id) = self.composing {
            if self.buffer.span(id).is_none() {
                self.composing = None;
            }
        }
        self.marquee.stop();
        self.marquee_armed = true;
        self.generation.nudge();
    }

    fn invalidate_layout(&mut self) {
        self.layout_dirty = true;
        self.pending_hint = None;
        self.tracker.invalidate_geometry();
        self.invalidation.relayout = true;
        self.invalidation.redraw = true;
        self.generation.nudge();
    }

    fn request_redraw(&mut self) {
        self.invalidation.redraw = true;
        self.generation.nudge();
    }

    /// Remember that text was cut or copied at `now`.
    pub fn note_cut_or_copy(&mut self, now: Duration) {
        self.last_cut_or_copy = Some(now);
    }

    /// Returns `true` if text was cut or copied shortly before `now`.
    pub fn recently_cut_or_copied(&self, now: Duration) -> bool {
        self.last_cut_or_copy
            .is_some_and(|at| now.saturating_sub(at) < CUT_OR_COPY_WINDOW)
    }

    // --- MARK: Input method ---

    /// Attach the input method that is told about changes.
    pub fn attach_input_method(&mut self, client: Box<dyn InputMethodClient>) {
        self.ime = Some(client);
        self.extract_request = None;
    }

    /// Detach the input method.
    pub fn detach_input_method(&mut self) -> Option<Box<dyn InputMethodClient>> {
        self.extract_request = None;
        self.ime.take()
    }

    pub(crate) fn set_extract_request(&mut self, request: ExtractedTextRequest) {
        self.extract_request = request.monitor.then_some(request);
    }

    /// The text as reported to an input method.
    ///
    /// With a `changed` range, only the replaced part is included and
    /// `partial_range` says what it replaces in the previously reported
    /// text.
    pub(crate) fn extracted_text(&self, changed: Option<ChangedRange>) -> ExtractedText {
        let text = self.buffer.as_str();
        let (start_offset, partial_range, text) = match changed {
            Some(changed) => (
                changed.start,
                Some(changed.start..changed.old_end),
                text.get(changed.start..changed.new_end)
                    .unwrap_or_default()
                    .to_owned(),
            ),
            None => (0, None, text.to_owned()),
        };
        ExtractedText {
            text,
            start_offset,
            partial_range,
            selection: self.tracker.selection(),
            single_line: self.config.single_line,
        }
    }

    // --- MARK: State ---

    /// Save the state that should survive the view being recreated.
    pub fn save_state(&self) -> SavedState {
        let selection = self.tracker.selection();
        let freeze = self.config.freezes_text;
        SavedState {
            selection_start: selection.anchor(),
            selection_end: selection.focus(),
            frozen_text: freeze.then(|| self.buffer.as_str().to_owned()),
            frozen_with_focus: freeze && self.focused,
        }
    }

    /// Restore state saved by [`save_state`](Self::save_state).
    ///
    /// Frozen text replaces the current text. A selection that does not fit
    /// the text is rejected and the current selection kept.
    pub fn restore_state(&mut self, state: &SavedState) -> Result<(), EngineError> {
        if let Some(text) = &state.frozen_text {
            self.set_text(text);
        }
        self.frozen_with_focus = state.frozen_with_focus;
        let len = self.buffer.len();
        let (start, end) = (state.selection_start, state.selection_end);
        let fits = |offset| offset <= len && self.buffer.is_char_boundary(offset);
        if !fits(start) || !fits(end) {
            warn!(start, end, len, "saved selection does not fit the text");
            return Err(EngineError::InvalidRange { start, end, len });
        }
        self.set_selection(start, end);
        Ok(())
    }

    /// Returns `true` if the restored state was saved while focused.
    pub fn was_frozen_with_focus(&self) -> bool {
        self.frozen_with_focus
    }

    // --- MARK: Frames ---

    /// Attach the scheduler that delivers ticks.
    pub fn attach_frame_scheduler(&mut self, scheduler: Box<dyn FrameScheduler>) {
        self.scheduler = Some(scheduler);
        self.marquee_armed = true;
        self.update_marquee();
    }

    /// Detach the scheduler, stopping any animation.
    pub fn detach_frame_scheduler(&mut self) -> Option<Box<dyn FrameScheduler>> {
        self.marquee.stop();
        let mut scheduler = self.scheduler.take()?;
        scheduler.cancel();
        Some(scheduler)
    }

    /// The marquee state.
    pub fn marquee(&self) -> &MarqueeAnimator {
        &self.marquee
    }

    /// Advance animations to `now`.
    pub fn tick(&mut self, now: Duration) -> TickOutcome {
        self.clock = now;
        self.tracker.blink_mut().tick(now);
        let marquee = self.marquee.tick(now);
        if marquee.redraw {
            self.request_redraw();
        }
        let blink_state = self.blink_state();
        let blink = TickOutcome {
            redraw: blink_state != self.blink_shown,
            next: self
                .tracker
                .blink()
                .until_toggle(now)
                .map_or(FrameRequest::None, FrameRequest::After),
        };
        self.blink_shown = blink_state;
        if blink.redraw {
            match self.tracker.cached_geometry().and_then(HighlightGeometry::bounds) {
                Some(bounds) if !self.layout_dirty => {
                    let rect = invalidation_rect(&self.layout, Some(bounds), None);
                    self.invalidation.add_rect(rect);
                }
                _ => self.invalidation.redraw = true,
            }
        }
        let outcome = marquee.merge(blink);
        self.schedule(outcome.next);
        outcome
    }

    fn schedule(&mut self, request: FrameRequest) {
        if request == FrameRequest::None {
            return;
        }
        if let Some(scheduler) = self.scheduler.as_mut() {
            scheduler.schedule(request);
        }
    }

    fn marquee_conditions_changed(&mut self) {
        self.marquee_armed = true;
        self.update_marquee();
    }

    fn marquee_allowed(&self) -> bool {
        self.config.truncation == Truncation::Marquee
            && (self.focused || self.selected)
            && self.shown
            && self.scheduler.is_some()
    }

    /// Start or stop the marquee to match the current state.
    fn update_marquee(&mut self) {
        if !self.marquee_allowed() {
            if !self.marquee.is_stopped() {
                self.marquee.stop();
                self.request_redraw();
            }
            return;
        }
        if self.layout_dirty || !self.marquee_armed || !self.marquee.is_stopped() {
            return;
        }
        self.marquee_armed = false;
        let line_width = self.layout.line_width(0);
        let view_width = if self.width.is_finite() { self.width } else { line_width };
        if self.marquee.start(
            line_width,
            view_width,
            self.config.marquee_repeat_limit,
            self.config.density,
        ) {
            self.schedule(FrameRequest::NextFrame);
        }
    }

    /// Take the accumulated invalidation, leaving none behind.
    pub fn take_invalidation(&mut self) -> Invalidation {
        core::mem::take(&mut self.invalidation)
    }

    /// Get the current `Generation` of the engine, to decide whether to draw.
    ///
    /// You should store the generation the engine was at when you last drew
    /// it, and then redraw when the generation is different (`Generation` is
    /// [`PartialEq`], so supports the equality `==` operation).
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// The current layout, if it is up to date.
    pub fn try_layout(&self) -> Option<&Layout> {
        (!self.layout_dirty).then_some(&self.layout)
    }
}

/// A short-lived wrapper around [`TextEngine`].
///
/// This can perform operations which require the engine's layout to
/// be up-to-date by refreshing it as necessary.
pub struct TextEngineDriver<'a, B: Brush> {
    /// The engine being driven.
    pub engine: &'a mut TextEngine<B>,
    /// Measures text for layouts.
    pub measure: &'a dyn Measure,
    /// Caches shared between layouts.
    pub layout_cx: &'a mut LayoutContext,
}

impl<B: Brush> TextEngineDriver<'_, B> {
    // --- MARK: Edits ---

    /// Insert `text` at `offset`.
    pub fn insert(&mut self, offset: usize, text: &str) -> Result<(), EngineError> {
        self.engine.apply_edit(offset..offset, text).map(drop)
    }

    /// Delete `start..end`.
    pub fn delete(&mut self, start: usize, end: usize) -> Result<(), EngineError> {
        self.replace(start, end, "")
    }

    /// Replace `start..end` with `text`.
    pub fn replace(&mut self, start: usize, end: usize, text: &str) -> Result<(), EngineError> {
        if start > end {
            return Err(EngineError::InvalidRange {
                start,
                end,
                len: self.engine.buffer.len(),
            });
        }
        self.engine.apply_edit(start..end, text).map(drop)
    }

    /// Insert at cursor, or replace selection.
    pub fn insert_or_replace_selection(&mut self, text: &str) -> Result<(), EngineError> {
        let range = self.engine.selection().text_range();
        let engine = &mut *self.engine;
        engine.begin_batch_edit();
        let result = engine.apply_edit(range, text);
        if let Ok(end) = result {
            engine.update_selection(Selection::collapsed(end));
        }
        engine.end_batch();
        result.map(drop)
    }

    /// Delete the selection.
    pub fn delete_selection(&mut self) -> Result<(), EngineError> {
        self.insert_or_replace_selection("")
    }

    /// Delete the selection or the previous character (typical ‘backspace’ behavior).
    pub fn backdelete(&mut self) -> Result<(), EngineError> {
        let selection = self.engine.selection();
        if !selection.is_collapsed() {
            return self.delete_selection();
        }
        let end = selection.focus();
        let text = self.engine.text();
        let Some((mut start, _)) = text[..end].char_indices().next_back() else {
            return Ok(());
        };
        // Treat CRLF as a single line break.
        if text[start..end] == *"\n" && text[..start].ends_with('\r') {
            start -= 1;
        }
        self.delete(start, end)
    }

    /// Delete the selection or the next cluster (typical ‘delete’ behavior).
    pub fn delete_forward(&mut self) -> Result<(), EngineError> {
        let selection = self.engine.selection();
        if !selection.is_collapsed() {
            return self.delete_selection();
        }
        let start = selection.focus();
        self.refresh_layout();
        let end = self
            .engine
            .layout
            .data()
            .clusters
            .iter()
            .find(|cluster| cluster.start == start)
            .map(|cluster| cluster.end);
        match end {
            Some(end) => self.delete(start, end),
            None => Ok(()),
        }
    }

    /// Copy the selection, returning it.
    pub fn copy_selection(&mut self, now: Duration) -> Option<String> {
        let text = self.engine.selected_text();
        if text.is_empty() {
            return None;
        }
        let text = text.to_owned();
        self.engine.note_cut_or_copy(now);
        Some(text)
    }

    /// Cut the selection, returning it.
    pub fn cut_selection(&mut self, now: Duration) -> Result<Option<String>, EngineError> {
        let Some(text) = self.copy_selection(now) else {
            return Ok(None);
        };
        self.delete_selection()?;
        Ok(Some(text))
    }

    // --- MARK: Layout ---

    fn refresh_layout(&mut self) {
        let engine = &mut *self.engine;
        if !engine.layout_dirty {
            return;
        }
        let request = LayoutRequest {
            text: engine.buffer.as_str(),
            width: engine.width,
            has_spans: engine.buffer.has_spans(),
            selectable: engine.selectable || engine.editable,
            editable: engine.editable,
        };
        engine.layout = match engine.pending_hint.take() {
            Some(hint) => {
                self.layout_cx
                    .reflow(&engine.layout, hint, &request, &engine.config, self.measure)
            }
            None => self.layout_cx.build(&request, &engine.config, self.measure),
        };
        engine.layout_dirty = false;
        engine.tracker.invalidate_geometry();
        engine.update_marquee();
    }

    /// The up-to-date layout.
    pub fn layout(&mut self) -> &Layout {
        self.refresh_layout();
        &self.engine.layout
    }

    /// Measure the text for the given constraints, and lay it out at the
    /// resulting width.
    pub fn measure(&mut self, width_spec: MeasureSpec, height_spec: MeasureSpec) -> Size {
        let width = match width_spec {
            MeasureSpec::Exact(width) => sanitize(width, "measure spec"),
            spec => {
                let engine = &*self.engine;
                let desired =
                    self.layout_cx
                        .desired_width(engine.buffer.as_str(), &engine.config, self.measure);
                let cursor = if engine.editable {
                    engine.config.cursor_width
                } else {
                    0.0
                };
                spec.resolve((desired + cursor).ceil())
            }
        };
        self.engine.set_width(Some(width));
        self.refresh_layout();
        let height = self.content_height();
        Size {
            width,
            height: height_spec.resolve(height.ceil()),
        }
    }

    /// Height of the layout limited to `max_lines` and padded to
    /// `min_lines`.
    fn content_height(&self) -> f32 {
        let engine = &*self.engine;
        let layout = &engine.layout;
        let config = &engine.config;
        let count = layout.line_count();
        let mut height = match config.max_lines {
            Some(max) if count > max => layout.height_for_lines(max),
            _ => layout.height(),
        };
        if let Some(min) = config.min_lines.filter(|min| *min > count) {
            let font = layout.font_metrics();
            let natural = font.ascent + font.descent;
            let line_height = natural * config.line_spacing_multiplier + config.line_spacing_extra;
            height += line_height.max(0.0) * (min - count) as f32;
        }
        height
    }

    // --- MARK: Geometry ---

    /// The highlight geometry of the current selection.
    pub fn highlight(&mut self) -> &HighlightGeometry {
        self.refresh_layout();
        let engine = &mut *self.engine;
        engine.tracker.geometry(&engine.layout)
    }

    /// The cursor shape at `offset`.
    pub fn cursor_path(&mut self, offset: usize) -> HighlightGeometry {
        self.refresh_layout();
        let engine = &*self.engine;
        cursor_geometry(
            &engine.layout,
            engine.buffer.clamp_offset(offset),
            engine.config.cursor_width,
        )
    }

    /// The highlight shape covering `start..end`.
    pub fn selection_path(&mut self, start: usize, end: usize) -> HighlightGeometry {
        self.refresh_layout();
        let engine = &*self.engine;
        selection_geometry(
            &engine.layout,
            engine.buffer.clamp_offset(start),
            engine.buffer.clamp_offset(end),
        )
    }

    /// The area to repaint when the selection changes from `old` to `new`.
    pub fn invalidation_rect(&mut self, old: Selection, new: Selection) -> Option<Rect> {
        let bounds = |driver: &mut Self, selection: Selection| {
            if selection.is_collapsed() {
                driver.cursor_path(selection.focus()).bounds()
            } else {
                driver.selection_path(selection.anchor(), selection.focus()).bounds()
            }
        };
        let old = bounds(self, old);
        let new = bounds(self, new);
        invalidation_rect(&self.engine.layout, old, new)
    }

    /// Put the cursor at the offset closest to the point.
    pub fn move_to_point(&mut self, x: f32, y: f32) {
        self.refresh_layout();
        let offset = self.engine.layout.hit_test(x, y);
        self.set_selection(Selection::collapsed(offset));
    }

    /// Move the selection focus to the offset closest to the point.
    pub fn select_to_point(&mut self, x: f32, y: f32) {
        self.refresh_layout();
        let offset = self.engine.layout.hit_test(x, y);
        let selection = self.engine.selection().with_focus(offset);
        self.set_selection(selection);
    }

    fn set_selection(&mut self, selection: Selection) {
        let engine = &mut *self.engine;
        engine.begin_batch_edit();
        engine.update_selection(selection);
        engine.sync_blink();
        engine.end_batch();
    }

    // --- MARK: Drawing ---

    /// Paint the text intersecting `clip`.
    pub fn draw(&mut self, painter: &mut impl Painter<B>, clip: Rect) {
        self.refresh_layout();
        let engine = &mut *self.engine;
        let show_highlight = engine.highlight_visible();
        let highlight = if show_highlight {
            Some(&*engine.tracker.geometry(&engine.layout))
        } else {
            None
        };
        let scene = Scene {
            layout: &engine.layout,
            buffer: &engine.buffer,
            colors: &engine.colors,
            highlight,
            scroll: engine.marquee.scroll(),
            ghost_offset: engine
                .marquee
                .should_draw_ghost()
                .then(|| engine.marquee.ghost_offset()),
        };
        scene.paint(painter, clip);
    }

    // --- MARK: Frames ---

    /// Bring the layout up to date and advance animations to `now`.
    pub fn tick(&mut self, now: Duration) -> TickOutcome {
        self.refresh_layout();
        self.engine.tick(now)
    }

    /// Borrow a connection for an input method.
    pub fn input_connection(&mut self) -> InputConnection<'_, B> {
        self.engine.input_connection()
    }
}
