//! Value tweens driven by paint time.

use foundation::arena::Arena;
use foundation::handles::Handle;
use foundation::time::{Time, TimeSpan};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TweenId(pub Handle);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    #[default]
    QuadraticInOut,
    CubicOut,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadraticInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) * 0.5
                }
            }
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
        }
    }
}

#[derive(Debug, Clone)]
struct Tween {
    from: Vec<f64>,
    to: Vec<f64>,
    current: Vec<f64>,
    span: TimeSpan,
    easing: Easing,
    finished: bool,
}

/// Owns every in-flight tween and reports whether any are still running.
#[derive(Default)]
pub struct TweenManager {
    tweens: Arena<Tween>,
    running: usize,
    completed: Vec<TweenId>,
}

impl TweenManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts animating `from -> to` (component-wise) over `duration_s`.
    ///
    /// Extra components in the longer slice are ignored.
    pub fn create(
        &mut self,
        from: &[f64],
        to: &[f64],
        duration_s: f64,
        easing: Easing,
        now: Time,
    ) -> TweenId {
        let n = from.len().min(to.len());
        let tween = Tween {
            from: from[..n].to_vec(),
            to: to[..n].to_vec(),
            current: from[..n].to_vec(),
            span: TimeSpan::starting_at(now, duration_s),
            easing,
            finished: false,
        };
        self.running += 1;
        TweenId(self.tweens.alloc(tween))
    }

    /// Advances all tweens to `now`. Returns whether any are still running.
    pub fn update(&mut self, now: Time) -> bool {
        for (handle, tween) in self.tweens.iter_mut() {
            if tween.finished {
                continue;
            }
            let k = tween.easing.apply(tween.span.progress(now));
            for ((c, a), b) in tween.current.iter_mut().zip(&tween.from).zip(&tween.to) {
                *c = a + (b - a) * k;
            }
            if tween.span.progress(now) >= 1.0 {
                tween.finished = true;
                self.running -= 1;
                self.completed.push(TweenId(handle));
            }
        }
        self.running > 0
    }

    pub fn running_count(&self) -> usize {
        self.running
    }

    pub fn is_running(&self, id: TweenId) -> bool {
        self.tweens.get(id.0).is_some_and(|t| !t.finished)
    }

    pub fn value(&self, id: TweenId) -> Option<&[f64]> {
        self.tweens.get(id.0).map(|t| t.current.as_slice())
    }

    /// Tweens that finished since the last call. Their final values stay
    /// readable until [`TweenManager::remove`] is called.
    pub fn drain_completed(&mut self) -> Vec<TweenId> {
        std::mem::take(&mut self.completed)
    }

    /// Stops and forgets a tween.
    pub fn remove(&mut self, id: TweenId) {
        if let Some(t) = self.tweens.remove(id.0)
            && !t.finished
        {
            self.running -= 1;
        }
    }
}
