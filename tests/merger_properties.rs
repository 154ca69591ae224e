//! Behavioural tests for the polyline merger

use osm2svg::{merge_ways, LineMerger, MergeError, Point};
use pretty_assertions::assert_eq;

fn pts(raw: &[(i32, i32)]) -> Vec<Point> {
    raw.iter().copied().map(Point::from).collect()
}

/// A zig-zag of `n` distinct points
fn polyline(n: i32) -> Vec<Point> {
    (0..n).map(|i| Point::new(i * 10, (i % 3) * 7)).collect()
}

/// Split at the given indices; neighbouring pieces share the split point
fn split_at(points: &[Point], cuts: &[usize]) -> Vec<Vec<Point>> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for &cut in cuts.iter().chain(std::iter::once(&(points.len() - 1))) {
        pieces.push(points[start..=cut].to_vec());
        start = cut;
    }
    pieces
}

fn same_up_to_direction(a: &[Point], b: &[Point]) -> bool {
    a == b || a.iter().rev().eq(b.iter())
}

#[test]
fn test_split_and_merge_in_order_reproduces_input() {
    let line = polyline(12);
    for cuts in [vec![], vec![5], vec![1, 2, 3], vec![3, 7, 10], vec![1, 4, 6, 8, 10]] {
        let merged = merge_ways(split_at(&line, &cuts)).unwrap();
        assert_eq!(merged.len(), 1, "cuts {:?}", cuts);
        assert!(same_up_to_direction(&merged[0], &line), "cuts {:?}", cuts);
    }
}

#[test]
fn test_split_and_merge_in_reverse_order_reproduces_input() {
    let line = polyline(9);
    let mut pieces = split_at(&line, &[2, 4, 6]);
    pieces.reverse();
    let merged = merge_ways(pieces).unwrap();
    assert_eq!(merged, vec![line]);
}

#[test]
fn test_pieces_with_mixed_directions() {
    let line = polyline(10);
    let mut pieces = split_at(&line, &[3, 6]);
    pieces[1].reverse();
    let merged = merge_ways(pieces).unwrap();
    assert_eq!(merged.len(), 1);
    assert!(same_up_to_direction(&merged[0], &line));
}

#[test]
fn test_reversed_adjacent_way() {
    // A B C + E D C
    let a = (0, 0);
    let b = (1, 0);
    let c = (2, 0);
    let d = (3, 0);
    let e = (4, 0);
    let merged = merge_ways([pts(&[a, b, c]), pts(&[e, d, c])]).unwrap();
    assert_eq!(merged.len(), 1);
    assert!(same_up_to_direction(&merged[0], &pts(&[a, b, c, d, e])));
}

#[test]
fn test_endpoints_match_returned_lines() {
    let ways = vec![
        pts(&[(0, 0), (1, 1)]),
        pts(&[(5, 5), (6, 6)]),
        pts(&[(1, 1), (2, 2)]),
        pts(&[(6, 6), (5, 5)]),
        pts(&[(9, 9), (0, 0)]),
        pts(&[(7, 0), (2, 2)]),
    ];
    let mut merger = LineMerger::new();
    for way in &ways {
        merger.add_way(way.clone()).unwrap();
    }
    let stats = merger.stats();
    let lines = merger.get_ways();

    assert_eq!(stats.intake, ways.len());
    assert_eq!(stats.outgoing, lines.len());
    assert!(stats.outgoing <= stats.intake);

    // Total length is the sum of the ways minus one shared point per merge.
    let total: usize = lines.iter().map(Vec::len).sum();
    let intake_points: usize = ways.iter().map(Vec::len).sum();
    assert_eq!(total, intake_points - (stats.intake - stats.outgoing));

    // Every line is a chain whose consecutive ways share endpoints.
    assert_eq!(
        lines,
        vec![
            pts(&[(9, 9), (0, 0), (1, 1), (2, 2), (7, 0)]),
            pts(&[(5, 5), (6, 6), (5, 5)]),
        ]
    );
}

#[test]
fn test_outgoing_equals_intake_without_shared_endpoints() {
    let ways: Vec<Vec<Point>> = (0..5)
        .map(|i| pts(&[(i * 10, 0), (i * 10 + 1, 1), (i * 10 + 2, 0)]))
        .collect();
    let mut merger = LineMerger::new();
    for way in ways.clone() {
        merger.add_way(way).unwrap();
    }
    let stats = merger.stats();
    assert_eq!(stats.intake, 5);
    assert_eq!(stats.outgoing, 5);
    assert_eq!(merger.get_ways(), ways);
}

#[test]
fn test_partitioned_merge_can_be_merged_again() {
    let line = polyline(15);
    let pieces = split_at(&line, &[2, 4, 6, 8, 10, 12]);
    let (left, right): (Vec<_>, Vec<_>) = pieces
        .into_iter()
        .enumerate()
        .partition(|(i, _)| i % 2 == 0);

    let mut partial = merge_ways(left.into_iter().map(|(_, w)| w)).unwrap();
    partial.extend(merge_ways(right.into_iter().map(|(_, w)| w)).unwrap());
    assert_eq!(partial.len(), 7);

    // One pass only attaches ways to existing lines; lines bridged by a
    // later way need another pass.
    let once = merge_ways(partial).unwrap();
    assert_eq!(once.len(), 4);
    let twice = merge_ways(once).unwrap();
    assert_eq!(twice.len(), 1);
    assert!(same_up_to_direction(&twice[0], &line));
    assert_eq!(merge_ways(twice.clone()).unwrap(), twice);
}

#[test]
fn test_short_way_is_rejected_not_dropped() {
    let mut merger = LineMerger::new();
    merger.add_way(pts(&[(0, 0), (1, 0)])).unwrap();
    let err = merger.add_way(pts(&[(1, 0)])).unwrap_err();
    assert_eq!(err, MergeError::TooFewPoints { len: 1 });
    assert_eq!(err.to_string(), "way has 1 point(s), at least 2 are required");
    assert_eq!(merger.stats().intake, 1);
}
