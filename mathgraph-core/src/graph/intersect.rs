use itertools::Itertools;

use super::PlotFunction;

/// A point where two plotted curves meet.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Sampling step along x, in plotting units.
const SCAN_STEP: f64 = 0.1;
/// Bisection iteration cap; guarantees termination on pathological input.
const BISECT_MAX_ITERS: u32 = 20;
/// Midpoint acceptance tolerance for the bisection refinement.
const BISECT_TOL: f64 = 1e-5;
/// A refined candidate must bring the two curves this close to count.
const VALIDATE_TOL: f64 = 1e-3;
/// Candidates this close to an accepted point, on both axes, are duplicates.
const DEDUP_RADIUS: f64 = 0.2;

/// Finds the intersection points of every unordered pair of visible
/// functions over `[start, end]`.
///
/// The difference of each pair is sampled at a fixed step; a sign change or
/// exact zero between consecutive samples brackets a root, which bisection
/// then refines. Cost is O(pairs x samples), fine for the handful of curves
/// that are ever plotted at once. Samples that come out as NaN never satisfy
/// the sign-change test, so gaps in a curve's domain are skipped naturally.
pub fn find_intersections(funcs: &[PlotFunction], start: f64, end: f64) -> Vec<Point> {
    find_intersections_cancellable(funcs, start, end, &mut || false)
        .unwrap_or_default()
}

/// Same as [`find_intersections`], probing `cancelled` as it scans; returns
/// `None` if the probe asked to stop. The background worker uses this to
/// abandon a scan that a newer request has superseded.
pub(crate) fn find_intersections_cancellable(
    funcs: &[PlotFunction],
    start: f64,
    end: f64,
    cancelled: &mut impl FnMut() -> bool,
) -> Option<Vec<Point>> {
    let visible: Vec<&PlotFunction> = funcs.iter().filter(|f| f.visible).collect();
    if visible.len() < 2 {
        return Some(Vec::new());
    }

    let mut points: Vec<Point> = Vec::new();
    for (f1, f2) in visible.iter().tuple_combinations() {
        let mut x = start;
        while x < end {
            if cancelled() {
                return None;
            }

            let next = x + SCAN_STEP;
            let diff_a = f1.eval_at(x) - f2.eval_at(x);
            let diff_b = f1.eval_at(next) - f2.eval_at(next);

            // sign change or exact zero between the two samples
            if diff_a * diff_b <= 0.0 {
                let root_x = bisect(f1, f2, x, next);
                let root_y = f1.eval_at(root_x);

                if (f1.eval_at(root_x) - f2.eval_at(root_x)).abs() < VALIDATE_TOL {
                    let duplicate = points.iter().any(|p| {
                        (p.x - root_x).abs() < DEDUP_RADIUS && (p.y - root_y).abs() < DEDUP_RADIUS
                    });
                    if !duplicate {
                        points.push(Point {
                            x: root_x,
                            y: root_y,
                        });
                    }
                }
            }
            x = next;
        }
    }
    Some(points)
}

/// Refines a bracketed root of `f1 - f2` by bisection, keeping the half
/// interval whose endpoints still straddle the sign change.
fn bisect(f1: &PlotFunction, f2: &PlotFunction, a: f64, b: f64) -> f64 {
    let mut low = a;
    let mut high = b;
    let mut mid = (low + high) / 2.0;

    for _ in 0..BISECT_MAX_ITERS {
        let diff_low = f1.eval_at(low) - f2.eval_at(low);
        let diff_mid = f1.eval_at(mid) - f2.eval_at(mid);

        if diff_mid.abs() < BISECT_TOL {
            return mid;
        }

        if diff_low * diff_mid < 0.0 {
            high = mid;
        } else {
            low = mid;
        }
        mid = (low + high) / 2.0;
    }
    mid
}
