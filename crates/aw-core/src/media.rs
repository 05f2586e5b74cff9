//! Media-Ad State Machine
//!
//! Player-embedded ads cannot be removed without breaking playback, so
//! they are accelerated and muted instead. The watcher polls the player's
//! ad-showing signal on its own fixed interval, independent of the
//! mutation-driven path, because ad start/stop is a continuous media event
//! and not reliably visible as a tree edit.

/// Media control failures. All are swallowed by the watcher; the next poll
/// tries again.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("media element is not seekable yet")]
    NotSeekable,
    #[error("seek target {0} out of range")]
    SeekOutOfRange(f64),
}

/// The external player object: exposes whether an ad is presenting and an
/// optional programmatic skip.
pub trait AdPlayer {
    /// True while the player is presenting an ad (state markers such as
    /// "ad-showing" / "ad-interrupting" / "ad-preview").
    fn ad_showing(&self) -> bool;
    /// Invoke the player's skip capability if available. Returns whether a
    /// skip control was actually triggered.
    fn try_skip(&mut self) -> bool;
}

/// The managed video element.
pub trait MediaControls {
    fn playback_rate(&self) -> f64;
    fn set_playback_rate(&mut self, rate: f64);
    fn muted(&self) -> bool;
    fn set_muted(&mut self, muted: bool);
    /// Duration in seconds; NaN or infinite for live/unknown streams.
    fn duration(&self) -> f64;
    fn seek_to(&mut self, position: f64) -> Result<(), MediaError>;
}

/// Pre-ad playback settings, held only while an ad segment is active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSnapshot {
    pub rate: f64,
    pub muted: bool,
}

/// Per-player ad state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdState {
    NotShowingAd,
    ShowingAd,
}

/// Tracks one player's ad state and applies/reverts playback overrides.
///
/// Invariant: `snapshot` is `Some` only while in `ShowingAd` with an
/// unrestored prior segment. It is captured at most once per segment (so
/// repeated polls during one ad never overwrite the pre-ad values) and
/// cleared exactly once on restore (so the next segment captures fresh
/// values).
pub struct MediaAdWatcher {
    state: AdState,
    snapshot: Option<PlaybackSnapshot>,
    fast_forward_rate: f64,
}

impl MediaAdWatcher {
    pub fn new(fast_forward_rate: f64) -> Self {
        Self {
            state: AdState::NotShowingAd,
            snapshot: None,
            fast_forward_rate,
        }
    }

    pub fn state(&self) -> AdState {
        self.state
    }

    pub fn snapshot(&self) -> Option<PlaybackSnapshot> {
        self.snapshot
    }

    /// One poll of the player's ad signal.
    pub fn poll(&mut self, player: &mut dyn AdPlayer, video: &mut dyn MediaControls) {
        if player.ad_showing() {
            self.state = AdState::ShowingAd;
            if player.try_skip() {
                log::debug!("player ad skipped programmatically");
            }
            if self.snapshot.is_none() {
                self.snapshot = Some(PlaybackSnapshot {
                    rate: video.playback_rate(),
                    muted: video.muted(),
                });
            }
            video.set_playback_rate(self.fast_forward_rate);
            video.set_muted(true);
            // Best effort: media may not be seekable yet; the next poll or
            // the forced rate finishes the job.
            let duration = video.duration();
            if duration.is_finite() && duration > 0.0 {
                if let Err(err) = video.seek_to(duration) {
                    log::debug!("ad seek-to-end failed: {err}");
                }
            }
        } else {
            self.state = AdState::NotShowingAd;
            if let Some(saved) = self.snapshot.take() {
                video.set_playback_rate(saved.rate);
                video.set_muted(saved.muted);
            }
        }
    }
}
