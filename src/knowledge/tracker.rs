/// Playback tracking across knowledge points
use super::media::MediaElement;
use super::registry::KnowledgeRegistry;
use super::KnowledgePoint;
use crate::timestamp::seconds_or_sentinel;
use tracing::{debug, warn};

/// Index of the knowledge point active at `position`.
///
/// The first point whose closed window contains the position wins. Outside
/// every window the point with the nearest start is reported instead, earliest
/// in sequence on ties, so a non-empty registry always yields an index.
pub fn active_index(points: &[KnowledgePoint], position: f64) -> Option<usize> {
    if let Some(index) = points.iter().position(|p| p.contains(position)) {
        return Some(index);
    }

    let mut nearest: Option<(usize, f64)> = None;
    for (index, point) in points.iter().enumerate() {
        let distance = (position - f64::from(point.start_seconds)).abs();
        if nearest.map_or(true, |(_, best)| distance < best) {
            nearest = Some((index, distance));
        }
    }

    nearest.map(|(index, _)| index)
}

/// Change of the highlighted knowledge point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveChange {
    pub previous: Option<usize>,
    pub current: usize,
    /// Whether the caller should scroll the entry into view
    pub scroll_into_view: bool,
}

/// Remembers the highlighted point so the UI only updates on change
#[derive(Debug, Clone)]
pub struct TimelineTracker {
    active: Option<usize>,
    auto_scroll: bool,
    seek_step: f64,
}

impl TimelineTracker {
    pub fn new(auto_scroll: bool, seek_step: f64) -> Self {
        Self {
            active: None,
            auto_scroll,
            seek_step,
        }
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn auto_scroll(&self) -> bool {
        self.auto_scroll
    }

    /// Flip auto-scroll, returning the new setting
    pub fn toggle_auto_scroll(&mut self) -> bool {
        self.auto_scroll = !self.auto_scroll;
        self.auto_scroll
    }

    /// Forget the highlight, e.g. after the registry was replaced
    pub fn reset(&mut self) {
        self.active = None;
    }

    /// Feed a playback position; returns a change only when the active point moved
    pub fn update(&mut self, registry: &KnowledgeRegistry, position: f64) -> Option<ActiveChange> {
        let current = active_index(registry.points(), position)?;
        self.highlight(current)
    }

    /// Highlight a point directly, as after a click
    pub fn highlight(&mut self, index: usize) -> Option<ActiveChange> {
        if self.active == Some(index) {
            return None;
        }

        let change = ActiveChange {
            previous: self.active,
            current: index,
            scroll_into_view: self.auto_scroll,
        };
        self.active = Some(index);
        Some(change)
    }

    /// Seek to a point and start playback.
    ///
    /// Dropped with a log line when the player has no current data yet.
    pub fn jump<M: MediaElement + ?Sized>(&mut self, media: &mut M, registry: &KnowledgeRegistry, index: usize) -> bool {
        let Some(point) = registry.get(index) else {
            warn!("Invalid knowledge point index: {}", index);
            return false;
        };

        if !seek_and_play(media, point.start_seconds) {
            return false;
        }

        debug!("Jumped to knowledge point '{}' at {}s", point.title, point.start_seconds);
        self.highlight(index);
        true
    }

    /// Seek to the point an inline reference names
    pub fn jump_to_title<M: MediaElement + ?Sized>(&mut self, media: &mut M, registry: &KnowledgeRegistry, title: &str) -> bool {
        let Some(entry) = registry.lookup(title) else {
            warn!("No timestamp mapping found for concept: {}", title);
            return false;
        };

        if !seek_and_play(media, entry.start_seconds) {
            return false;
        }

        debug!("Jumped to concept '{}' at {}", title, entry.start_time);
        if let Some(index) = registry.position_of(title) {
            self.highlight(index);
        }
        true
    }

    /// Follow a bare `[HH:MM:SS]` reference from the summary
    pub fn jump_to_timestamp<M: MediaElement + ?Sized>(&mut self, media: &mut M, registry: &KnowledgeRegistry, text: &str) -> bool {
        let seconds = seconds_or_sentinel(text);
        let Ok(seconds) = u32::try_from(seconds) else {
            warn!("Ignoring malformed timestamp reference: {}", text);
            return false;
        };

        if !seek_and_play(media, seconds) {
            return false;
        }

        if let Some(index) = active_index(registry.points(), f64::from(seconds)) {
            self.highlight(index);
        }
        true
    }

    /// Seek relative to the current position, clamped to the media bounds
    pub fn nudge<M: MediaElement + ?Sized>(&self, media: &mut M, forward: bool) -> f64 {
        let delta = if forward { self.seek_step } else { -self.seek_step };
        let mut target = (media.current_time() + delta).max(0.0);
        if let Some(duration) = media.duration().filter(|d| d.is_finite()) {
            target = target.min(duration);
        }
        media.seek(target);
        target
    }
}

impl Default for TimelineTracker {
    fn default() -> Self {
        Self::new(true, 10.0)
    }
}

/// Toggle between play and pause
pub fn toggle_playback<M: MediaElement + ?Sized>(media: &mut M) {
    if media.is_paused() {
        media.play();
    } else {
        media.pause();
    }
}

fn seek_and_play<M: MediaElement + ?Sized>(media: &mut M, seconds: u32) -> bool {
    let state = media.ready_state();
    if !state.can_seek() {
        warn!("Video player not ready, readyState: {:?}", state);
        return false;
    }

    media.seek(f64::from(seconds));
    media.play();
    true
}
