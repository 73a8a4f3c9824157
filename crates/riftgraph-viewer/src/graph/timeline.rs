use std::time::Duration;

use crate::graph::adapter::RenderLink;

pub const PLAY_STEPS: f64 = 200.0;
pub const TICK_INTERVAL: Duration = Duration::from_millis(30);

/// Cancellable repeating task driven by a caller-supplied monotonic clock.
/// Fires at most once per `interval`, regardless of how often it is polled.
#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    last: Option<Duration>,
    running: bool,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
            running: false,
        }
    }

    pub fn start(&mut self, now: Duration) {
        self.running = true;
        self.last = Some(now);
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.last = None;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn poll(&mut self, now: Duration) -> bool {
        if !self.running {
            return false;
        }
        let last = *self.last.get_or_insert(now);
        if now.saturating_sub(last) >= self.interval {
            self.last = Some(now);
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimelineBounds {
    pub min: i64,
    pub max: i64,
}

impl TimelineBounds {
    pub fn from_links(links: &[RenderLink]) -> Self {
        let mut it = links.iter().filter_map(|l| l.parsed_ts);
        let Some(first) = it.next() else {
            return Self::default();
        };
        let (min, max) = it.fold((first, first), |(lo, hi), ts| (lo.min(ts), hi.max(ts)));
        Self { min, max }
    }

    pub fn is_degenerate(&self) -> bool {
        self.min == self.max
    }

    pub fn span(&self) -> f64 {
        (self.max - self.min) as f64
    }
}

#[derive(Debug, Clone)]
pub struct TemporalFilter {
    bounds: TimelineBounds,
    playhead: f64,
    step: f64,
    ticker: Ticker,
}

impl Default for TemporalFilter {
    fn default() -> Self {
        Self::new(TimelineBounds::default())
    }
}

impl TemporalFilter {
    /// Starts paused with the playhead at the end, so everything is visible.
    pub fn new(bounds: TimelineBounds) -> Self {
        Self {
            bounds,
            playhead: bounds.max as f64,
            step: 0.0,
            ticker: Ticker::new(TICK_INTERVAL),
        }
    }

    pub fn bounds(&self) -> TimelineBounds {
        self.bounds
    }

    pub fn playhead(&self) -> f64 {
        self.playhead
    }

    pub fn is_playing(&self) -> bool {
        self.ticker.is_running()
    }

    pub fn is_inert(&self) -> bool {
        self.bounds.is_degenerate()
    }

    /// Fraction of the range covered by the playhead, 0..=1.
    pub fn progress(&self) -> f64 {
        if self.is_inert() {
            return 1.0;
        }
        ((self.playhead - self.bounds.min as f64) / self.bounds.span()).clamp(0.0, 1.0)
    }

    pub fn set_playhead(&mut self, t: f64) {
        self.playhead = t.clamp(self.bounds.min as f64, self.bounds.max as f64);
    }

    pub fn toggle_play(&mut self, now: Duration) {
        if self.is_inert() {
            return;
        }
        if self.ticker.is_running() {
            self.ticker.stop();
        } else {
            self.step = self.bounds.span() / PLAY_STEPS;
            self.ticker.start(now);
        }
    }

    pub fn pause(&mut self) {
        self.ticker.stop();
    }

    /// One animation-loop callback. Returns true when the playhead moved.
    pub fn advance(&mut self, now: Duration) -> bool {
        if !self.ticker.poll(now) {
            return false;
        }
        let max = self.bounds.max as f64;
        let next = self.playhead + self.step;
        if next >= max {
            self.playhead = max;
            self.ticker.stop();
        } else {
            self.playhead = next;
        }
        true
    }

    pub fn is_visible(&self, link: &RenderLink) -> bool {
        if self.is_inert() {
            return true;
        }
        match link.parsed_ts {
            None => true,
            Some(ts) => ts as f64 <= self.playhead,
        }
    }
}
