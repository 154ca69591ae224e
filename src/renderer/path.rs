//! Path formatting
//!
//! Converts merged point sequences into SVG path `d` attribute strings.

use crate::geometry::Point;

/// Build the `d` attribute for a point sequence
///
/// Starts with an absolute move to the first point and continues with
/// relative line segments. Points equal to the current position are skipped.
/// Returns `None` when nothing would be drawn.
pub fn path_data(points: &[Point]) -> Option<String> {
    let (&first, rest) = points.split_first()?;

    let mut d = format!("M {first}");
    let mut current = first;
    let mut segments = 0;

    for &p in rest {
        if p == current {
            continue;
        }
        // Saturated projections can sit at both ends of the i32 range.
        let dx = i64::from(p.x) - i64::from(current.x);
        let dy = i64::from(p.y) - i64::from(current.y);
        d.push_str(&format!(" l {dx},{dy}"));
        current = p;
        segments += 1;
    }

    (segments > 0).then_some(d)
}

/// Build a complete `<path>` element carrying `style` as attributes
pub fn path_element(points: &[Point], style: &str) -> Option<String> {
    let d = path_data(points)?;
    if style.is_empty() {
        Some(format!(r#"<path d="{d}" />"#))
    } else {
        Some(format!(r#"<path {style} d="{d}" />"#))
    }
}
