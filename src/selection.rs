//! Weighted selection primitive.
//!
//! A weighted draw picks a uniform point `threshold` in `[0, total)` and walks
//! the candidates in order, accumulating their weights. The candidate whose
//! cumulative range `(before, after]` contains the threshold is the pick, so
//! each candidate wins with probability `weight / total`.
//!
//! ```
//! use stream_combiner::selection::PriorityFilter;
//!
//! // Three candidates of weight 2: ranges (0, 2], (2, 4], (4, 6].
//! let mut filter = PriorityFilter::new(3.0);
//! assert!(!filter.test(&2.0));
//! assert!(filter.test(&2.0));
//! assert!(!filter.test(&2.0));
//! ```

/// Anything that carries a selection weight.
pub trait Weighted {
    /// The non-negative selection weight.
    fn weight(&self) -> f64;
}

impl Weighted for f64 {
    fn weight(&self) -> f64 {
        *self
    }
}

impl<W: Weighted + ?Sized> Weighted for &W {
    fn weight(&self) -> f64 {
        (**self).weight()
    }
}

impl<W: Weighted + ?Sized> Weighted for std::sync::Arc<W> {
    fn weight(&self) -> f64 {
        (**self).weight()
    }
}

/// One weighted-selection pass over a running total.
///
/// Feed candidates to [`test`](Self::test) in a fixed order; exactly the
/// candidate whose accumulated weight first reaches the threshold tests
/// `true`. Every other call returns `false`, including all calls after the
/// crossing. A threshold of `0` never crosses, because the accumulator
/// already starts at the threshold.
#[derive(Debug, Clone)]
pub struct PriorityFilter {
    threshold: f64,
    accumulated: f64,
}

impl PriorityFilter {
    /// Creates a filter for one pass with the given threshold.
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            accumulated: 0.0,
        }
    }

    /// Returns the threshold this pass is looking for.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Returns the weight accumulated so far.
    pub fn accumulated(&self) -> f64 {
        self.accumulated
    }

    /// Adds the candidate's weight and reports whether it crossed the threshold.
    pub fn test<W: Weighted + ?Sized>(&mut self, candidate: &W) -> bool {
        let before = self.accumulated >= self.threshold;
        self.accumulated += candidate.weight();
        let after = self.accumulated >= self.threshold;
        before != after
    }
}

/// Runs one pass over `candidates` and returns the selected one, if any.
pub fn select<I>(candidates: I, threshold: f64) -> Option<I::Item>
where
    I: IntoIterator,
    I::Item: Weighted,
{
    let mut filter = PriorityFilter::new(threshold);
    candidates.into_iter().find(|candidate| filter.test(candidate))
}
