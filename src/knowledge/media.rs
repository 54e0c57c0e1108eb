/// Host media element abstraction

/// Readiness of the media element, ordered like `HTMLMediaElement.readyState`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadyState {
    HaveNothing = 0,
    HaveMetadata = 1,
    HaveCurrentData = 2,
    HaveFutureData = 3,
    HaveEnoughData = 4,
}

impl ReadyState {
    /// Whether a seek can be issued in this state
    pub fn can_seek(self) -> bool {
        self >= ReadyState::HaveCurrentData
    }
}

/// The player the tutor synchronizes with
pub trait MediaElement {
    fn ready_state(&self) -> ReadyState;

    /// Current playback position in seconds
    fn current_time(&self) -> f64;

    /// Total duration in seconds, if known
    fn duration(&self) -> Option<f64>;

    fn is_paused(&self) -> bool;

    fn seek(&mut self, seconds: f64);

    fn play(&mut self);

    fn pause(&mut self);
}
