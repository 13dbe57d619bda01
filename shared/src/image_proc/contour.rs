//! Marching-squares iso-lines over a scalar pixel field.
//!
//! Coordinates of the returned segments are `(x, y)` = `(column, row)` in
//! pixel-center units of the input array, so a segment endpoint at
//! `(2.5, 0.0)` lies halfway between columns 2 and 3 on row 0.

use ndarray::ArrayView2;

/// Line segment between two points in `(column, row)` coordinates
pub type Segment = ((f64, f64), (f64, f64));

fn crossing(a: f64, b: f64, level: f64) -> f64 {
    let d = b - a;
    if !a.is_finite() || !b.is_finite() || d.abs() < f64::EPSILON {
        0.5
    } else {
        ((level - a) / d).clamp(0.0, 1.0)
    }
}

/// Extract the iso-line segments of `field` at `level`
///
/// Values are compared with `>=`; non-finite values count as below the
/// level. Saddle cells are disambiguated with the cell-center average.
pub fn iso_segments(field: &ArrayView2<f64>, level: f64) -> Vec<Segment> {
    let (rows, cols) = field.dim();
    let mut segments = Vec::new();
    if rows < 2 || cols < 2 {
        return segments;
    }

    let value = |r: usize, c: usize| {
        let v = field[[r, c]];
        if v.is_finite() {
            v
        } else {
            f64::NEG_INFINITY
        }
    };

    for r in 0..rows - 1 {
        for c in 0..cols - 1 {
            // corners: bottom-left, bottom-right, top-right, top-left (row grows "up")
            let v0 = value(r, c);
            let v1 = value(r, c + 1);
            let v2 = value(r + 1, c + 1);
            let v3 = value(r + 1, c);

            let case = (v0 >= level) as u8
                | ((v1 >= level) as u8) << 1
                | ((v2 >= level) as u8) << 2
                | ((v3 >= level) as u8) << 3;
            if case == 0 || case == 15 {
                continue;
            }

            let (x, y) = (c as f64, r as f64);
            let bottom = || (x + crossing(v0, v1, level), y);
            let right = || (x + 1.0, y + crossing(v1, v2, level));
            let top = || (x + crossing(v3, v2, level), y + 1.0);
            let left = || (x, y + crossing(v0, v3, level));

            match case {
                1 | 14 => segments.push((left(), bottom())),
                2 | 13 => segments.push((bottom(), right())),
                3 | 12 => segments.push((left(), right())),
                4 | 11 => segments.push((right(), top())),
                6 | 9 => segments.push((bottom(), top())),
                7 | 8 => segments.push((left(), top())),
                5 | 10 => {
                    let finite = [v0, v1, v2, v3].iter().all(|v| v.is_finite());
                    let center_high = finite && (v0 + v1 + v2 + v3) / 4.0 >= level;
                    // case 5: v0 and v2 high; case 10: v1 and v3 high
                    if (case == 5) == center_high {
                        segments.push((left(), top()));
                        segments.push((bottom(), right()));
                    } else {
                        segments.push((left(), bottom()));
                        segments.push((right(), top()));
                    }
                }
                _ => unreachable!("marching squares case out of range"),
            }
        }
    }

    segments
}
