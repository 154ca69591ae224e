//! Polyline merging
//!
//! Ways selected for rendering arrive one at a time in no particular order.
//! [`LineMerger`] stitches every way whose endpoint touches an endpoint of an
//! already known line onto that line, so the SVG output contains a handful of
//! long paths instead of thousands of short ones.
//!
//! Lines live in an arena and are addressed by a `LineId`. Two endpoint
//! indexes (`by_first`, `by_last`) map a point to a stack of line handles.
//! Every live line sits in exactly one `by_first` stack and one `by_last`
//! stack. A merge only moves one endpoint, so only that index entry is
//! touched; the other one stays valid because the handle does not change.
//!
//! When three or more ways meet in one point the stacks hold several lines
//! for the same key and the most recently pushed one wins. The result then
//! depends on input order. Junctions are not resolved topologically.

use std::collections::{HashMap, VecDeque};

use log::info;
use thiserror::Error;

use crate::geometry::Point;

/// Errors raised when feeding ways into the merger
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    /// A way needs a start and an end point
    #[error("way has {len} point(s), at least 2 are required")]
    TooFewPoints { len: usize },
}

/// Stable handle of a line in the merger arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LineId(usize);

/// One (possibly multi-way) continuous path
#[derive(Debug)]
struct Line {
    points: VecDeque<Point>,
}

impl Line {
    fn first(&self) -> Point {
        self.points[0]
    }

    fn last(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    fn append<I>(&mut self, points: I)
    where
        I: IntoIterator<Item = Point>,
    {
        self.points.extend(points);
    }

    /// Insert `points` in front of the line, keeping their order
    fn prepend<I>(&mut self, points: I)
    where
        I: IntoIterator<Item = Point>,
        I::IntoIter: DoubleEndedIterator,
    {
        for p in points.into_iter().rev() {
            self.points.push_front(p);
        }
    }
}

type EndpointIndex = HashMap<Point, Vec<LineId>>;

fn push(index: &mut EndpointIndex, key: Point, id: LineId) {
    index.entry(key).or_default().push(id);
}

fn pop(index: &mut EndpointIndex, key: Point) -> Option<LineId> {
    let stack = index.get_mut(&key)?;
    let id = stack.pop();
    if stack.is_empty() {
        index.remove(&key);
    }
    id
}

/// Number of ways taken in versus number of lines currently held
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub intake: usize,
    pub outgoing: usize,
}

/// Incrementally merges ways that share endpoints
#[derive(Debug, Default)]
pub struct LineMerger {
    lines: Vec<Line>,
    by_first: EndpointIndex,
    by_last: EndpointIndex,
    intake: usize,
}

impl LineMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest one way
    ///
    /// Candidates are tried in a fixed order: a line ending where the way
    /// starts, a line starting where the way ends, a line starting where the
    /// way starts (way reversed), a line ending where the way ends (way
    /// reversed). The shared point is kept once.
    pub fn add_way(&mut self, points: Vec<Point>) -> Result<(), MergeError> {
        if points.len() < 2 {
            return Err(MergeError::TooFewPoints { len: points.len() });
        }
        self.intake += 1;

        let n = points.len();
        let head = points[0];
        let tail = points[n - 1];

        if let Some(id) = pop(&mut self.by_last, head) {
            let line = &mut self.lines[id.0];
            line.append(points.into_iter().skip(1));
            push(&mut self.by_last, line.last(), id);
            return Ok(());
        }

        if let Some(id) = pop(&mut self.by_first, tail) {
            let line = &mut self.lines[id.0];
            line.prepend(points[..n - 1].iter().copied());
            push(&mut self.by_first, line.first(), id);
            return Ok(());
        }

        if let Some(id) = pop(&mut self.by_first, head) {
            let line = &mut self.lines[id.0];
            line.prepend(points[1..].iter().rev().copied());
            push(&mut self.by_first, line.first(), id);
            return Ok(());
        }

        if let Some(id) = pop(&mut self.by_last, tail) {
            let line = &mut self.lines[id.0];
            line.append(points[..n - 1].iter().rev().copied());
            push(&mut self.by_last, line.last(), id);
            return Ok(());
        }

        let id = LineId(self.lines.len());
        push(&mut self.by_first, head, id);
        push(&mut self.by_last, tail, id);
        self.lines.push(Line {
            points: points.into(),
        });
        Ok(())
    }

    /// Number of lines currently held
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn stats(&self) -> MergeStats {
        MergeStats {
            intake: self.intake,
            outgoing: self.lines.len(),
        }
    }

    /// Drain every merged line, in creation order
    pub fn get_ways(&mut self) -> Vec<Vec<Point>> {
        let stats = self.stats();
        debug_assert_eq!(
            stats.outgoing,
            self.by_first.values().map(Vec::len).sum::<usize>()
        );
        info!("Intake: {}, outgoing: {}", stats.intake, stats.outgoing);

        self.by_first.clear();
        self.by_last.clear();
        self.intake = 0;
        std::mem::take(&mut self.lines)
            .into_iter()
            .map(|line| line.points.into())
            .collect()
    }
}

/// Merge a batch of ways in one go
pub fn merge_ways<I>(ways: I) -> Result<Vec<Vec<Point>>, MergeError>
where
    I: IntoIterator<Item = Vec<Point>>,
{
    let mut merger = LineMerger::new();
    for way in ways {
        merger.add_way(way)?;
    }
    Ok(merger.get_ways())
}
