use foundation::time::Time;

/// Metadata for one paint.
///
/// Frames are only produced when a paint actually happens, so `dt_s` is the
/// time since the previous paint, not a fixed tick.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based paint index.
    pub index: u64,
    /// Seconds since the previous paint (0 for the first).
    pub dt_s: f64,
    /// Time at the start of the paint.
    pub time: Time,
}

impl Frame {
    pub fn first(time: Time) -> Self {
        Self {
            index: 0,
            dt_s: 0.0,
            time,
        }
    }

    pub fn next(self, time: Time) -> Self {
        Self {
            index: self.index + 1,
            dt_s: time.seconds_since(self.time),
            time,
        }
    }
}
