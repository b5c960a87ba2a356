use foundation::color::Rgba;
use foundation::math::precision::TotalF64;

/// Maps a normalized scalar in `[0, 1]` to a color by linear RGBA blending
/// between sorted stops.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRamp {
    stops: Vec<(f64, Rgba)>,
}

impl ColorRamp {
    pub fn two(low: Rgba, high: Rgba) -> Self {
        Self {
            stops: vec![(0.0, low), (1.0, high)],
        }
    }

    /// Stops are sorted by position and clamped into `[0, 1]`; non-finite
    /// positions are dropped. Returns `None` when no stop survives.
    pub fn from_stops(stops: impl IntoIterator<Item = (f64, Rgba)>) -> Option<Self> {
        let mut stops: Vec<(f64, Rgba)> = stops
            .into_iter()
            .filter(|(t, _)| t.is_finite())
            .map(|(t, c)| (t.clamp(0.0, 1.0), c))
            .collect();
        if stops.is_empty() {
            return None;
        }
        stops.sort_by_key(|(t, _)| TotalF64(*t));
        Some(Self { stops })
    }

    /// Evenly spaced stops.
    pub fn evenly_spaced(colors: &[Rgba]) -> Option<Self> {
        match colors {
            [] => None,
            [only] => Some(Self::two(*only, *only)),
            _ => {
                let last = (colors.len() - 1) as f64;
                Self::from_stops(
                    colors
                        .iter()
                        .enumerate()
                        .map(|(i, c)| (i as f64 / last, *c)),
                )
            }
        }
    }

    pub fn stops(&self) -> &[(f64, Rgba)] {
        &self.stops
    }

    pub fn low(&self) -> Rgba {
        self.stops[0].1
    }

    pub fn high(&self) -> Rgba {
        self.stops[self.stops.len() - 1].1
    }

    /// NaN samples as 0.
    pub fn sample(&self, t: f64) -> Rgba {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let first = self.stops[0];
        if t <= first.0 {
            return first.1;
        }
        for pair in self.stops.windows(2) {
            let (t0, c0) = pair[0];
            let (t1, c1) = pair[1];
            if t <= t1 {
                let span = t1 - t0;
                if span <= 0.0 {
                    return c1;
                }
                return c0.lerp(c1, ((t - t0) / span) as f32);
            }
        }
        self.high()
    }
}

#[cfg(test)]
mod tests {
    use super::ColorRamp;
    use foundation::color::Rgba;

    fn ramp() -> ColorRamp {
        ColorRamp::two(
            Rgba::from_hex("#F7FBEA").expect("hex"),
            Rgba::from_hex("#CBEAA6").expect("hex"),
        )
    }

    #[test]
    fn endpoints_hit_stop_colors() {
        let r = ramp();
        assert_eq!(r.sample(0.0), r.low());
        assert_eq!(r.sample(1.0), r.high());
        assert_eq!(r.sample(-3.0), r.low());
        assert_eq!(r.sample(7.0), r.high());
        assert_eq!(r.sample(f64::NAN), r.low());
    }

    #[test]
    fn midpoint_blends_componentwise() {
        let r = ColorRamp::two(Rgba::new(0.0, 0.0, 0.0, 0.0), Rgba::new(1.0, 0.5, 0.25, 1.0));
        let m = r.sample(0.5);
        assert!((m.r - 0.5).abs() < 1e-6);
        assert!((m.g - 0.25).abs() < 1e-6);
        assert!((m.b - 0.125).abs() < 1e-6);
        assert!((m.a - 0.5).abs() < 1e-6);
    }

    #[test]
    fn multi_stop_picks_segment() {
        let red = Rgba::new(1.0, 0.0, 0.0, 1.0);
        let green = Rgba::new(0.0, 1.0, 0.0, 1.0);
        let blue = Rgba::new(0.0, 0.0, 1.0, 1.0);
        let r = ColorRamp::evenly_spaced(&[red, green, blue]).expect("ramp");
        assert_eq!(r.sample(0.5), green);
        let q = r.sample(0.75);
        assert!((q.g - 0.5).abs() < 1e-6);
        assert!((q.b - 0.5).abs() < 1e-6);
    }

    #[test]
    fn unsorted_stops_are_sorted() {
        let r = ColorRamp::from_stops([(1.0, Rgba::WHITE), (0.0, Rgba::TRANSPARENT)])
            .expect("ramp");
        assert_eq!(r.low(), Rgba::TRANSPARENT);
        assert!(ColorRamp::from_stops([(f64::NAN, Rgba::WHITE)]).is_none());
    }
}
