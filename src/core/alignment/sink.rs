//! Alignment sinks.
//!
//! A sink accumulates the end points reported by the DP kernel for one work
//! item. The kernel reports `(score, text_pos, pattern_pos)` for every
//! candidate end cell; the sink decides what to keep.

use super::scoring::WORST_SCORE;

/// End cell of an alignment, relative to the item's text window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SinkPos {
    /// Offset of the last aligned text base from the window begin
    pub text: u32,
    /// Offset of the last aligned pattern base
    pub pattern: u32,
}

/// Accumulator for kernel-reported end cells.
pub trait AlignmentSink: Default + Clone + Send + Sync {
    /// Ignore reports below `min_score`
    fn set_min_score(&mut self, _min_score: i32) {}

    fn report(&mut self, score: i32, pos: SinkPos);

    /// Best score seen so far (WORST_SCORE if none)
    fn best_score(&self) -> i32;
}

/// Keeps the single best end cell at or above the minimum score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BestSink {
    pub score: i32,
    pub sink: Option<SinkPos>,
    min_score: i32,
}

impl Default for BestSink {
    fn default() -> Self {
        Self {
            score: WORST_SCORE,
            sink: None,
            min_score: WORST_SCORE,
        }
    }
}

impl BestSink {
    /// Text offset of the best end cell, or 0 when nothing was reported
    pub fn text_offset(&self) -> u32 {
        self.sink.map(|s| s.text).unwrap_or(0)
    }
}

impl AlignmentSink for BestSink {
    fn set_min_score(&mut self, min_score: i32) {
        self.min_score = min_score;
    }

    #[inline(always)]
    fn report(&mut self, score: i32, pos: SinkPos) {
        if score >= self.min_score && score > self.score {
            self.score = score;
            self.sink = Some(pos);
        }
    }

    fn best_score(&self) -> i32 {
        self.score
    }
}

/// Keeps up to `N` best end cells at distinct text columns.
///
/// Entries are held sorted by descending score; ties keep the earlier
/// report. A column already present is only replaced by a better score.
#[derive(Debug, Clone, Copy)]
pub struct BestColumnSink<const N: usize> {
    scores: [i32; N],
    sinks: [SinkPos; N],
    len: usize,
    min_score: i32,
}

impl<const N: usize> Default for BestColumnSink<N> {
    fn default() -> Self {
        Self {
            scores: [WORST_SCORE; N],
            sinks: [SinkPos::default(); N],
            len: 0,
            min_score: WORST_SCORE,
        }
    }
}

impl<const N: usize> BestColumnSink<N> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Entry `i` in descending score order
    pub fn entry(&self, i: usize) -> Option<(i32, SinkPos)> {
        (i < self.len).then(|| (self.scores[i], self.sinks[i]))
    }

    /// Best entry, plus the best entry whose text column lies at least
    /// `min_dist` away from it.
    pub fn best2(&self, min_dist: u32) -> (Option<(i32, SinkPos)>, Option<(i32, SinkPos)>) {
        let Some(best) = self.entry(0) else {
            return (None, None);
        };
        let second = (1..self.len)
            .map(|i| (self.scores[i], self.sinks[i]))
            .find(|(_, pos)| pos.text.abs_diff(best.1.text) >= min_dist);
        (Some(best), second)
    }

    fn remove(&mut self, i: usize) {
        for k in i..self.len - 1 {
            self.scores[k] = self.scores[k + 1];
            self.sinks[k] = self.sinks[k + 1];
        }
        self.len -= 1;
    }

    fn insert_sorted(&mut self, score: i32, pos: SinkPos) {
        // first slot holding a strictly lower score
        let at = (0..self.len).find(|&k| self.scores[k] < score).unwrap_or(self.len);
        if at >= N {
            return;
        }
        let last = if self.len < N { self.len } else { N - 1 };
        for k in (at..last).rev() {
            self.scores[k + 1] = self.scores[k];
            self.sinks[k + 1] = self.sinks[k];
        }
        self.scores[at] = score;
        self.sinks[at] = pos;
        if self.len < N {
            self.len += 1;
        }
    }
}

impl<const N: usize> AlignmentSink for BestColumnSink<N> {
    fn set_min_score(&mut self, min_score: i32) {
        self.min_score = min_score;
    }

    fn report(&mut self, score: i32, pos: SinkPos) {
        if score < self.min_score || N == 0 {
            return;
        }
        if let Some(k) = (0..self.len).find(|&k| self.sinks[k].text == pos.text) {
            if self.scores[k] >= score {
                return;
            }
            self.remove(k);
        } else if self.len == N && self.scores[N - 1] >= score {
            return;
        }
        self.insert_sorted(score, pos);
    }

    fn best_score(&self) -> i32 {
        self.entry(0).map(|(s, _)| s).unwrap_or(WORST_SCORE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(text: u32) -> SinkPos {
        SinkPos { text, pattern: 9 }
    }

    #[test]
    fn test_best_sink_keeps_first_maximum() {
        let mut sink = BestSink::default();
        assert_eq!(sink.best_score(), WORST_SCORE);
        assert_eq!(sink.text_offset(), 0);

        sink.report(-10, at(3));
        sink.report(-4, at(7));
        sink.report(-4, at(8));
        sink.report(-12, at(9));

        assert_eq!(sink.score, -4);
        assert_eq!(sink.sink, Some(at(7)));
        assert_eq!(sink.text_offset(), 7);
    }

    #[test]
    fn test_best_sink_min_score() {
        let mut sink = BestSink::default();
        sink.set_min_score(-5);
        sink.report(-6, at(1));
        assert_eq!(sink.score, WORST_SCORE);
        assert_eq!(sink.sink, None);
        sink.report(-5, at(2));
        assert_eq!(sink.score, -5);
    }

    #[test]
    fn test_column_sink_distinct_columns() {
        let mut sink = BestColumnSink::<4>::default();
        sink.report(5, at(10));
        sink.report(8, at(10)); // same column, better: replaces
        sink.report(3, at(10)); // same column, worse: ignored
        sink.report(6, at(20));

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.entry(0), Some((8, at(10))));
        assert_eq!(sink.entry(1), Some((6, at(20))));
    }

    #[test]
    fn test_column_sink_capacity_evicts_lowest() {
        let mut sink = BestColumnSink::<3>::default();
        for (s, t) in [(1, 1), (2, 2), (3, 3), (4, 4), (0, 5)] {
            sink.report(s, at(t));
        }
        assert_eq!(sink.len(), 3);
        assert_eq!(sink.entry(0), Some((4, at(4))));
        assert_eq!(sink.entry(1), Some((3, at(3))));
        assert_eq!(sink.entry(2), Some((2, at(2))));
    }

    #[test]
    fn test_column_sink_min_score() {
        let mut sink = BestColumnSink::<4>::default();
        sink.set_min_score(10);
        sink.report(9, at(1));
        assert!(sink.is_empty());
        assert_eq!(sink.best_score(), WORST_SCORE);
        sink.report(10, at(2));
        assert_eq!(sink.best_score(), 10);
    }

    #[test]
    fn test_best2_respects_distance() {
        let mut sink = BestColumnSink::<8>::default();
        sink.report(20, at(100));
        sink.report(19, at(101)); // too close to the best
        sink.report(15, at(160));

        let (best, second) = sink.best2(50);
        assert_eq!(best, Some((20, at(100))));
        assert_eq!(second, Some((15, at(160))));

        let (_, none) = sink.best2(100);
        assert_eq!(none, None);
    }
}
