//! Projective re-sampling of the located symbol into a module grid.

use crate::detector::OrderedCorners;
use crate::models::{BitMatrix, Point};

/// 3x3 homogeneous perspective transform.
pub struct PerspectiveTransform {
    a11: f32,
    a12: f32,
    a13: f32,
    a21: f32,
    a22: f32,
    a23: f32,
    a31: f32,
    a32: f32,
    a33: f32,
}

impl PerspectiveTransform {
    /// Solve for the transform mapping the four `src` points onto `dst`
    /// with the direct linear transform.
    pub fn from_points(src: &[Point; 4], dst: &[Point; 4]) -> Option<Self> {
        let mut a = [[0.0f32; 8]; 8];
        let mut b = [0.0f32; 8];

        for i in 0..4 {
            let (sx, sy) = (src[i].x, src[i].y);
            let (dx, dy) = (dst[i].x, dst[i].y);

            let row = i * 2;
            a[row][0] = sx;
            a[row][1] = sy;
            a[row][2] = 1.0;
            a[row][6] = -dx * sx;
            a[row][7] = -dx * sy;
            b[row] = dx;

            a[row + 1][3] = sx;
            a[row + 1][4] = sy;
            a[row + 1][5] = 1.0;
            a[row + 1][6] = -dy * sx;
            a[row + 1][7] = -dy * sy;
            b[row + 1] = dy;
        }

        solve_linear_system(&a, &b).map(|s| Self {
            a11: s[0],
            a12: s[1],
            a13: s[2],
            a21: s[3],
            a22: s[4],
            a23: s[5],
            a31: s[6],
            a32: s[7],
            a33: 1.0,
        })
    }

    pub fn transform(&self, p: &Point) -> Point {
        let denominator = self.a31 * p.x + self.a32 * p.y + self.a33;
        if denominator.abs() < 1e-10 {
            return Point::new(0.0, 0.0);
        }

        Point::new(
            (self.a11 * p.x + self.a12 * p.y + self.a13) / denominator,
            (self.a21 * p.x + self.a22 * p.y + self.a23) / denominator,
        )
    }
}

/// Gaussian elimination with partial pivoting on the 8x8 DLT system.
#[allow(clippy::needless_range_loop)]
fn solve_linear_system(a: &[[f32; 8]; 8], b: &[f32; 8]) -> Option<[f32; 8]> {
    let mut a = *a;
    let mut b = *b;
    let n = 8;

    for i in 0..n {
        let mut max_val = a[i][i].abs();
        let mut max_row = i;
        for k in (i + 1)..n {
            if a[k][i].abs() > max_val {
                max_val = a[k][i].abs();
                max_row = k;
            }
        }
        if max_val < 1e-10 {
            return None;
        }
        if max_row != i {
            a.swap(i, max_row);
            b.swap(i, max_row);
        }

        for k in (i + 1)..n {
            let factor = a[k][i] / a[i][i];
            b[k] -= factor * b[i];
            for j in i..n {
                a[k][j] -= factor * a[i][j];
            }
        }
    }

    let mut x = [0.0f32; 8];
    for i in (0..n).rev() {
        let mut sum = b[i];
        for j in (i + 1)..n {
            sum -= a[i][j] * x[j];
        }
        if a[i][i].abs() < 1e-10 {
            return None;
        }
        x[i] = sum / a[i][i];
    }

    Some(x)
}

/// The fourth corner of an undistorted symbol is the parallelogram point.
pub fn estimate_bottom_right(corners: &OrderedCorners) -> Point {
    Point::new(
        corners.top_right.x + corners.bottom_left.x - corners.top_left.x,
        corners.top_right.y + corners.bottom_left.y - corners.top_left.y,
    )
}

/// Map module space onto the image: finder centers sit at 3.5 modules in
/// from their corners.
pub fn build_transform(corners: &OrderedCorners) -> Option<PerspectiveTransform> {
    let dim = corners.dimension as f32;
    let src = [
        Point::new(3.5, 3.5),
        Point::new(dim - 3.5, 3.5),
        Point::new(3.5, dim - 3.5),
        Point::new(dim - 3.5, dim - 3.5),
    ];
    let dst = [
        corners.top_left,
        corners.top_right,
        corners.bottom_left,
        estimate_bottom_right(corners),
    ];
    PerspectiveTransform::from_points(&src, &dst)
}

/// Sample every module center through the transform, deciding each module
/// by majority vote over a 3x3 pixel neighborhood.
pub fn sample_modules(
    binary: &BitMatrix,
    transform: &PerspectiveTransform,
    dimension: usize,
) -> BitMatrix {
    let mut sampled = BitMatrix::new(dimension, dimension);

    for y in 0..dimension {
        for x in 0..dimension {
            let module_center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
            let img_point = transform.transform(&module_center);

            let img_x = img_point.x.round() as isize;
            let img_y = img_point.y.round() as isize;

            let mut black = 0;
            let mut total = 0;
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let sx = img_x + dx;
                    let sy = img_y + dy;
                    if sx >= 0
                        && sy >= 0
                        && (sx as usize) < binary.width()
                        && (sy as usize) < binary.height()
                    {
                        total += 1;
                        if binary.get(sx as usize, sy as usize) {
                            black += 1;
                        }
                    }
                }
            }
            if total > 0 {
                sampled.set(x, y, black * 2 >= total);
            }
        }
    }

    sampled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_like_transform() {
        let src = [
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(0.0, 100.0),
            Point::new(100.0, 100.0),
        ];
        let transform = PerspectiveTransform::from_points(&src, &src).unwrap();
        let p = transform.transform(&Point::new(37.0, 62.0));
        assert!((p.x - 37.0).abs() < 0.01);
        assert!((p.y - 62.0).abs() < 0.01);
    }

    #[test]
    fn scaling_transform() {
        let src = [
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(0.0, 100.0),
            Point::new(100.0, 100.0),
        ];
        let dst = [
            Point::new(0.0, 0.0),
            Point::new(50.0, 0.0),
            Point::new(0.0, 50.0),
            Point::new(50.0, 50.0),
        ];
        let transform = PerspectiveTransform::from_points(&src, &dst).unwrap();
        let p = transform.transform(&Point::new(50.0, 50.0));
        assert!((p.x - 25.0).abs() < 0.1);
        assert!((p.y - 25.0).abs() < 0.1);
    }

    #[test]
    fn degenerate_points_are_rejected() {
        // all four corners collinear
        let src = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(3.0, 0.0),
        ];
        let dst = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 2.0),
            Point::new(3.0, 3.0),
        ];
        assert!(PerspectiveTransform::from_points(&src, &dst).is_none());
    }

    #[test]
    fn samples_axis_aligned_grid() {
        // 21x21 symbol drawn at 4px per module with a checkerboard corner.
        let dimension = 21;
        let scale = 4usize;
        let mut binary = BitMatrix::new(dimension * scale, dimension * scale);
        for my in 0..dimension {
            for mx in 0..dimension {
                if (mx + my) % 2 == 0 {
                    for dy in 0..scale {
                        for dx in 0..scale {
                            binary.set(mx * scale + dx, my * scale + dy, true);
                        }
                    }
                }
            }
        }

        let corners = OrderedCorners {
            top_left: Point::new(14.0, 14.0),
            top_right: Point::new(70.0, 14.0),
            bottom_left: Point::new(14.0, 70.0),
            module_size: scale as f32,
            dimension,
        };
        let transform = build_transform(&corners).unwrap();
        let sampled = sample_modules(&binary, &transform, dimension);

        for my in 0..dimension {
            for mx in 0..dimension {
                assert_eq!(sampled.get(mx, my), (mx + my) % 2 == 0, "module ({mx},{my})");
            }
        }
    }
}
