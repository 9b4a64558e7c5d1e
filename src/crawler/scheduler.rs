//! Scheduling of API windows for the recursive strategy
//!
//! This module handles:
//! - Deciding whether a result is final or its window must be split
//! - The explicit LIFO work stack of pending windows
//!
//! Nothing here performs I/O, so the splitting rules can be tested on their
//! own.

use crate::range::TimeRange;
use chrono::Duration;

/// A window waiting to be fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRange {
    /// The window
    pub range: TimeRange,

    /// Number of bisections between the root window and this one
    pub depth: u32,
}

/// What to do with a fetched window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitDecision {
    /// Below the cap: keep the result
    Accept,

    /// At the cap but too short to split: keep the possibly truncated result
    AcceptTruncated,

    /// At the cap: drop the result and fetch both halves instead
    Split(TimeRange, TimeRange),
}

/// Cap-driven bisection rule
///
/// A result whose length equals the cap is treated as truncated. That is a
/// proxy: a window with exactly `cap` real matches splits as well.
#[derive(Debug, Clone, Copy)]
pub struct SplitPolicy {
    cap: usize,
    min_interval: Duration,
}

impl SplitPolicy {
    /// Creates a policy
    ///
    /// # Arguments
    ///
    /// * `cap` - Records per call at which a result counts as truncated
    /// * `min_interval` - Shortest child window allowed
    pub fn new(cap: usize, min_interval: Duration) -> Self {
        Self { cap, min_interval }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Decides the fate of `range` given how many records it returned
    pub fn decide(&self, range: &TimeRange, count: usize) -> SplitDecision {
        if count < self.cap {
            return SplitDecision::Accept;
        }

        match range.bisect() {
            Some((left, right))
                if left.duration() >= self.min_interval
                    && right.duration() >= self.min_interval =>
            {
                SplitDecision::Split(left, right)
            }
            _ => SplitDecision::AcceptTruncated,
        }
    }
}

/// LIFO stack of pending windows
///
/// Children are pushed right first so the earlier half is always fetched
/// first and accepted results come out in chronological order.
#[derive(Debug, Default)]
pub struct WorkStack {
    stack: Vec<PendingRange>,
    deepest: u32,
}

impl WorkStack {
    /// Creates a stack holding only the root window
    pub fn new(root: TimeRange) -> Self {
        Self {
            stack: vec![PendingRange {
                range: root,
                depth: 0,
            }],
            deepest: 0,
        }
    }

    pub fn pop(&mut self) -> Option<PendingRange> {
        self.stack.pop()
    }

    /// Queues both halves of a split window
    pub fn push_children(&mut self, parent: &PendingRange, left: TimeRange, right: TimeRange) {
        let depth = parent.depth + 1;
        self.deepest = self.deepest.max(depth);
        self.stack.push(PendingRange { range: right, depth });
        self.stack.push(PendingRange { range: left, depth });
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Deepest split level seen so far
    pub fn deepest(&self) -> u32 {
        self.deepest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::parse_timestamp;

    fn range(from: &str, to: &str) -> TimeRange {
        TimeRange::new(parse_timestamp(from).unwrap(), parse_timestamp(to).unwrap()).unwrap()
    }

    fn policy() -> SplitPolicy {
        SplitPolicy::new(250, Duration::minutes(30))
    }

    #[test]
    fn test_below_cap_is_accepted() {
        let r = range("2020-01-01", "2020-02-01");
        assert_eq!(policy().decide(&r, 0), SplitDecision::Accept);
        assert_eq!(policy().decide(&r, 249), SplitDecision::Accept);
    }

    #[test]
    fn test_at_cap_splits_at_midpoint() {
        let r = range("2020-01-01", "2020-01-03");
        match policy().decide(&r, 250) {
            SplitDecision::Split(left, right) => {
                assert_eq!(left, range("2020-01-01", "2020-01-02"));
                assert_eq!(right, range("2020-01-02", "2020-01-03"));
            }
            other => panic!("expected split, got {:?}", other),
        }
    }

    #[test]
    fn test_exactly_min_interval_children_are_allowed() {
        let r = range("2020-01-01 00:00:00", "2020-01-01 01:00:00");
        assert!(matches!(
            policy().decide(&r, 250),
            SplitDecision::Split(_, _)
        ));
    }

    #[test]
    fn test_short_window_at_cap_is_accepted_truncated() {
        let r = range("2020-01-01 00:00:00", "2020-01-01 00:59:59");
        assert_eq!(policy().decide(&r, 250), SplitDecision::AcceptTruncated);
    }

    #[test]
    fn test_work_stack_is_chronological() {
        let root = range("2020-01-01", "2020-01-05");
        let mut stack = WorkStack::new(root);

        let parent = stack.pop().unwrap();
        let (left, right) = root.bisect().unwrap();
        stack.push_children(&parent, left, right);

        let first = stack.pop().unwrap();
        assert_eq!(first.range, left);
        assert_eq!(first.depth, 1);

        let (ll, lr) = left.bisect().unwrap();
        stack.push_children(&first, ll, lr);
        assert_eq!(stack.len(), 3);
        assert_eq!(stack.deepest(), 2);

        let order: Vec<TimeRange> = std::iter::from_fn(|| stack.pop().map(|p| p.range)).collect();
        assert_eq!(order, vec![ll, lr, right]);
        assert!(stack.is_empty());
    }
}
