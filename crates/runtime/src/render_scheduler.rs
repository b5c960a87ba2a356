//! Demand-driven repaint scheduling.
//!
//! `Idle -> Requested -> Painting -> Idle`. Any stimulus moves `Idle` to
//! `Requested` and asks the host for exactly one paint callback; further
//! stimuli before that paint collapse into it. A paint that ends with
//! animation still in flight goes straight back to `Requested`.

use foundation::time::Time;
use tracing::trace;

use crate::frame::Frame;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RenderState {
    Idle,
    Requested,
    Painting,
}

/// Why a repaint was asked for. Only used for tracing.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Stimulus {
    PointerMove,
    Click,
    Resize,
    AnimationTick,
    CameraChange,
    LayerSwap,
    DataLoaded,
}

/// One per viewer session.
#[derive(Debug)]
pub struct RenderScheduler {
    state: RenderState,
    dirty: bool,
    last_frame: Option<Frame>,
    paints: u64,
    collapsed: u64,
}

impl Default for RenderScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderScheduler {
    pub fn new() -> Self {
        Self {
            state: RenderState::Idle,
            dirty: false,
            last_frame: None,
            paints: 0,
            collapsed: 0,
        }
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of paints performed so far.
    pub fn paint_count(&self) -> u64 {
        self.paints
    }

    /// Number of requests absorbed by an already scheduled paint.
    pub fn collapsed_requests(&self) -> u64 {
        self.collapsed
    }

    /// Marks the frame stale.
    ///
    /// Returns `true` when the caller must schedule a paint callback (the
    /// `Idle -> Requested` edge); `false` when one is already owed.
    pub fn request_render(&mut self) -> bool {
        self.dirty = true;
        match self.state {
            RenderState::Idle => {
                self.state = RenderState::Requested;
                true
            }
            RenderState::Requested | RenderState::Painting => {
                self.collapsed += 1;
                false
            }
        }
    }

    pub fn notify(&mut self, stimulus: Stimulus) -> bool {
        let schedule = self.request_render();
        trace!(?stimulus, schedule, "render requested");
        schedule
    }

    /// Returns and clears the dirty flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Starts a paint. Returns `None` unless a paint was requested.
    ///
    /// The dirty flag is cleared before any camera, tween or draw work runs so
    /// stimuli raised during the paint schedule another one.
    pub fn begin_frame(&mut self, now: Time) -> Option<Frame> {
        if self.state != RenderState::Requested {
            return None;
        }
        self.state = RenderState::Painting;
        self.consume_dirty();
        let frame = match self.last_frame {
            Some(prev) => prev.next(now),
            None => Frame::first(now),
        };
        self.last_frame = Some(frame);
        self.paints += 1;
        Some(frame)
    }

    /// Finishes a paint.
    ///
    /// Returns `true` when another paint callback must be scheduled, either
    /// because `animating` is set or something requested a render mid-paint.
    pub fn end_frame(&mut self, animating: bool) -> bool {
        if self.state != RenderState::Painting {
            return false;
        }
        if animating {
            self.dirty = true;
        }
        if self.dirty {
            self.state = RenderState::Requested;
            true
        } else {
            self.state = RenderState::Idle;
            false
        }
    }

    /// Runs `paint` if a paint is owed. `paint` returns whether animation is
    /// still in flight. Returns whether another paint must be scheduled.
    pub fn run_frame<F>(&mut self, now: Time, paint: F) -> bool
    where
        F: FnOnce(Frame) -> bool,
    {
        let Some(frame) = self.begin_frame(now) else {
            return false;
        };
        let animating = paint(frame);
        self.end_frame(animating)
    }
}

#[cfg(test)]
mod tests {
    use super::{RenderScheduler, RenderState, Stimulus};
    use foundation::time::Time;

    #[test]
    fn idle_does_not_paint() {
        let mut s = RenderScheduler::new();
        assert!(s.begin_frame(Time(0.0)).is_none());
        assert!(!s.run_frame(Time(0.0), |_| panic!("painted while idle")));
        assert_eq!(s.paint_count(), 0);
    }

    #[test]
    fn simultaneous_stimuli_collapse_into_one_paint() {
        let mut s = RenderScheduler::new();
        assert!(s.notify(Stimulus::Resize));
        assert!(!s.notify(Stimulus::PointerMove));
        assert_eq!(s.state(), RenderState::Requested);

        let mut paints = 0;
        let again = s.run_frame(Time(0.0), |_| {
            paints += 1;
            false
        });
        assert!(!again);
        assert_eq!(paints, 1);
        assert_eq!(s.state(), RenderState::Idle);
        assert_eq!(s.collapsed_requests(), 1);
    }

    #[test]
    fn painting_clears_dirty_before_work() {
        let mut s = RenderScheduler::new();
        s.request_render();
        let frame = s.begin_frame(Time(0.0)).unwrap();
        assert_eq!(frame.index, 0);
        assert!(!s.is_dirty());
        assert_eq!(s.state(), RenderState::Painting);
    }

    #[test]
    fn animation_keeps_requesting() {
        let mut s = RenderScheduler::new();
        s.request_render();
        assert!(s.run_frame(Time(0.0), |_| true));
        assert_eq!(s.state(), RenderState::Requested);
        assert!(!s.run_frame(Time(0.016), |f| {
            assert_eq!(f.index, 1);
            false
        }));
        assert_eq!(s.state(), RenderState::Idle);
        assert_eq!(s.paint_count(), 2);
    }

    #[test]
    fn request_during_paint_schedules_another() {
        let mut s = RenderScheduler::new();
        s.request_render();
        s.begin_frame(Time(0.0));
        assert!(!s.request_render());
        assert!(s.end_frame(false));
        assert_eq!(s.state(), RenderState::Requested);
    }

    #[test]
    fn consume_dirty_resets_flag() {
        let mut s = RenderScheduler::new();
        s.request_render();
        assert!(s.consume_dirty());
        assert!(!s.consume_dirty());
    }
}
