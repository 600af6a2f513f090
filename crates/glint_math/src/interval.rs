/// Accepted range of ray parameters when testing for hits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    pub const UNIVERSE: Interval = Interval {
        min: f64::NEG_INFINITY,
        max: f64::INFINITY,
    };

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// `[min, +inf)`, the usual starting range for a traced ray.
    pub fn from_min(min: f64) -> Self {
        Self::new(min, f64::INFINITY)
    }

    /// Inclusive membership.
    pub fn contains(&self, x: f64) -> bool {
        (self.min..=self.max).contains(&x)
    }

    /// Exclusive membership; hits exactly on a bound are rejected.
    pub fn surrounds(&self, x: f64) -> bool {
        self.min < x && x < self.max
    }

    pub fn clamp(&self, x: f64) -> f64 {
        x.clamp(self.min, self.max)
    }

    /// Same lower bound, new upper bound.
    ///
    /// Narrowed to the closest hit so far while scanning a list of objects.
    pub fn with_max(&self, max: f64) -> Interval {
        Interval::new(self.min, max)
    }
}
