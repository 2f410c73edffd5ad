//! Layout notifications and the settle-delay fallback.

use crate::resolver::RenderedLayout;
use std::time::{Duration, Instant};
use teeforge_core::view::ViewKey;

/// Platform notification that the rendered template's geometry is readable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayoutSignal {
    /// The template finished rendering (new view, color or fetched markup).
    RenderComplete(RenderedLayout),
    /// The container was resized.
    Resized(RenderedLayout),
}

impl LayoutSignal {
    pub fn layout(&self) -> RenderedLayout {
        match self {
            LayoutSignal::RenderComplete(layout) | LayoutSignal::Resized(layout) => *layout,
        }
    }
}

/// Fixed-delay timer for platforms that cannot signal render completion.
///
/// Best effort: the delay is a guess at when layout has settled, so bounds
/// read on expiry may still be stale on slow devices.
#[derive(Debug, Clone)]
pub struct SettleTimer {
    delay: Duration,
    armed: Option<(ViewKey, Instant)>,
}

impl SettleTimer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, armed: None }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Start (or restart) the countdown for `view`.
    pub fn arm(&mut self, view: ViewKey, now: Instant) {
        self.armed = Some((view, now + self.delay));
    }

    pub fn cancel(&mut self) {
        self.armed = None;
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Fire once the delay has elapsed, returning the view it was armed for.
    pub fn poll(&mut self, now: Instant) -> Option<ViewKey> {
        match self.armed {
            Some((view, deadline)) if now >= deadline => {
                self.armed = None;
                Some(view)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_after_delay() {
        let start = Instant::now();
        let mut timer = SettleTimer::new(Duration::from_millis(100));
        timer.arm(ViewKey::Back, start);

        assert_eq!(timer.poll(start + Duration::from_millis(50)), None);
        assert_eq!(timer.poll(start + Duration::from_millis(100)), Some(ViewKey::Back));
        assert_eq!(timer.poll(start + Duration::from_millis(500)), None);
        assert!(!timer.is_armed());
    }

    #[test]
    fn test_rearm_restarts() {
        let start = Instant::now();
        let mut timer = SettleTimer::new(Duration::from_millis(100));
        timer.arm(ViewKey::Front, start);
        timer.arm(ViewKey::Back, start + Duration::from_millis(80));
        assert_eq!(timer.poll(start + Duration::from_millis(120)), None);
        assert_eq!(timer.poll(start + Duration::from_millis(180)), Some(ViewKey::Back));
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut timer = SettleTimer::new(Duration::from_millis(10));
        timer.arm(ViewKey::Front, start);
        timer.cancel();
        assert_eq!(timer.poll(start + Duration::from_secs(1)), None);
    }
}
