//! Foreground regions of a binary mask and their oriented bounding boxes.

use dotsheet_core::{cross, GrayImage, Quad};
use nalgebra::{Point2, Vector2};

/// One 8-connected foreground region.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    /// Pixel coordinates of every region pixel (holes included for
    /// [`external_regions`]).
    pub pixels: Vec<Point2<f32>>,
}

impl Region {
    #[inline]
    pub fn area(&self) -> usize {
        self.pixels.len()
    }
}

/// Label the 8-connected components of the non-zero pixels of `mask`.
///
/// Regions are returned in raster order of their first pixel.
pub fn connected_regions(mask: &GrayImage) -> Vec<Region> {
    let (w, h) = (mask.width, mask.height);
    let mut visited = vec![false; w * h];
    let mut regions = Vec::new();
    let mut stack = Vec::new();

    for start in 0..w * h {
        if visited[start] || mask.data[start] == 0 {
            continue;
        }
        visited[start] = true;
        stack.push(start);
        let mut pixels = Vec::new();

        while let Some(idx) = stack.pop() {
            let (x, y) = (idx % w, idx / w);
            pixels.push(Point2::new(x as f32, y as f32));
            for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
                for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                    let n = ny * w + nx;
                    if !visited[n] && mask.data[n] != 0 {
                        visited[n] = true;
                        stack.push(n);
                    }
                }
            }
        }
        regions.push(Region { pixels });
    }

    regions
}

/// Outermost 8-connected regions of `mask` with their holes filled.
///
/// Background pixels that cannot reach the border of `mask` through
/// 4-connected background are holes. A hole and everything inside it,
/// nested foreground included, joins the region around it.
pub fn external_regions(mask: &GrayImage) -> Vec<Region> {
    let (w, h) = (mask.width, mask.height);
    if w == 0 || h == 0 {
        return Vec::new();
    }

    let mut outside = vec![false; w * h];
    let mut stack = Vec::new();
    for y in 0..h {
        for x in 0..w {
            let idx = y * w + x;
            let border = x == 0 || y == 0 || x + 1 == w || y + 1 == h;
            if border && mask.data[idx] == 0 {
                outside[idx] = true;
                stack.push(idx);
            }
        }
    }
    while let Some(idx) = stack.pop() {
        let (x, y) = (idx % w, idx / w);
        let mut visit = |n: usize| {
            if !outside[n] && mask.data[n] == 0 {
                outside[n] = true;
                stack.push(n);
            }
        };
        if x > 0 {
            visit(idx - 1);
        }
        if x + 1 < w {
            visit(idx + 1);
        }
        if y > 0 {
            visit(idx - w);
        }
        if y + 1 < h {
            visit(idx + w);
        }
    }

    let mut filled = GrayImage::new(w, h);
    for (dst, &out) in filled.data.iter_mut().zip(&outside) {
        if !out {
            *dst = 255;
        }
    }
    connected_regions(&filled)
}

/// Convex hull by the monotone chain, counter-clockwise in a y-up frame.
///
/// Collinear points are dropped. Fewer than three distinct points come back
/// as they are (deduplicated).
pub fn convex_hull(points: &[Point2<f32>]) -> Vec<Point2<f32>> {
    let mut pts: Vec<Point2<f32>> = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let mut hull: Vec<Point2<f32>> = Vec::with_capacity(2 * pts.len());
    for &p in &pts {
        while hull.len() >= 2 && turn(&hull[hull.len() - 2], &hull[hull.len() - 1], &p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower = hull.len() + 1;
    for &p in pts.iter().rev().skip(1) {
        while hull.len() >= lower && turn(&hull[hull.len() - 2], &hull[hull.len() - 1], &p) <= 0.0
        {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
    hull
}

fn turn(o: &Point2<f32>, a: &Point2<f32>, b: &Point2<f32>) -> f32 {
    cross(a - o, b - o)
}

/// Oriented rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotatedRect {
    pub center: Point2<f32>,
    /// Extent along `axis`.
    pub width: f32,
    /// Extent perpendicular to `axis`.
    pub height: f32,
    /// Unit direction of the first edge.
    pub axis: Vector2<f32>,
}

impl RotatedRect {
    /// Vertices in consecutive order.
    pub fn points(&self) -> Quad {
        let u = self.axis * (self.width / 2.0);
        let v = Vector2::new(-self.axis.y, self.axis.x) * (self.height / 2.0);
        let c = self.center;
        [c - u - v, c + u - v, c + u + v, c - u + v]
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}

/// Minimum-area enclosing rectangle of a point set (rotating calipers over
/// the convex hull edges). `None` for an empty set.
pub fn min_area_rect(points: &[Point2<f32>]) -> Option<RotatedRect> {
    let hull = convex_hull(points);
    match hull.len() {
        0 => None,
        1 => Some(RotatedRect {
            center: hull[0],
            width: 0.0,
            height: 0.0,
            axis: Vector2::x(),
        }),
        2 => {
            let d = hull[1] - hull[0];
            let len = d.norm();
            Some(RotatedRect {
                center: nalgebra::center(&hull[0], &hull[1]),
                width: len,
                height: 0.0,
                axis: d / len,
            })
        }
        n => {
            let mut best: Option<RotatedRect> = None;
            for i in 0..n {
                let edge = hull[(i + 1) % n] - hull[i];
                let len = edge.norm();
                if len <= f32::EPSILON {
                    continue;
                }
                let u = edge / len;
                let v = Vector2::new(-u.y, u.x);
                let (mut min_u, mut max_u) = (f32::INFINITY, f32::NEG_INFINITY);
                let (mut min_v, mut max_v) = (f32::INFINITY, f32::NEG_INFINITY);
                for p in &hull {
                    let d = p - hull[i];
                    let (pu, pv) = (d.dot(&u), d.dot(&v));
                    min_u = min_u.min(pu);
                    max_u = max_u.max(pu);
                    min_v = min_v.min(pv);
                    max_v = max_v.max(pv);
                }
                let rect = RotatedRect {
                    center: hull[i] + u * ((min_u + max_u) / 2.0) + v * ((min_v + max_v) / 2.0),
                    width: max_u - min_u,
                    height: max_v - min_v,
                    axis: u,
                };
                if best.is_none_or(|b| rect.area() < b.area()) {
                    best = Some(rect);
                }
            }
            best
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn mask_from(rows: &[&str]) -> GrayImage {
        let mut m = GrayImage::new(rows[0].len(), rows.len());
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                if ch == '#' {
                    m.set(x, y, 255);
                }
            }
        }
        m
    }

    #[test]
    fn diagonal_pixels_are_connected() {
        let m = mask_from(&["#...", ".#..", "..#.", "...#"]);
        let regions = connected_regions(&m);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].area(), 4);
    }

    #[test]
    fn separate_blobs() {
        let m = mask_from(&["##..#", "##..#", ".....", "..###"]);
        let mut areas: Vec<usize> = connected_regions(&m).iter().map(Region::area).collect();
        areas.sort_unstable();
        assert_eq!(areas, vec![2, 3, 4]);
    }

    #[test]
    fn nested_blob_joins_the_ring_around_it() {
        let m = mask_from(&[
            ".......",
            ".#####.",
            ".#...#.",
            ".#.#.#.",
            ".#...#.",
            ".#####.",
            ".......",
        ]);
        assert_eq!(connected_regions(&m).len(), 2);
        let outer = external_regions(&m);
        assert_eq!(outer.len(), 1);
        assert_eq!(outer[0].area(), 25);
    }

    #[test]
    fn open_shapes_and_border_rings() {
        // The inside of the U reaches the border, so nothing is filled.
        let u = mask_from(&["#...#", "#...#", "#####"]);
        let regions = external_regions(&u);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].area(), 9);

        // A ring on the mask border still encloses its center.
        let ring = mask_from(&["###", "#.#", "###"]);
        assert_eq!(external_regions(&ring)[0].area(), 9);
        assert!(external_regions(&GrayImage::new(0, 0)).is_empty());
    }

    #[test]
    fn hull_of_square_with_interior_points() {
        let mut pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(4.0, 4.0),
            Point2::new(0.0, 4.0),
        ];
        pts.push(Point2::new(2.0, 2.0));
        pts.push(Point2::new(2.0, 0.0));
        let hull = convex_hull(&pts);
        assert_eq!(hull.len(), 4);
    }

    #[test]
    fn axis_aligned_rect() {
        let mut pts = Vec::new();
        for y in 10..20 {
            for x in 30..50 {
                pts.push(Point2::new(x as f32, y as f32));
            }
        }
        let r = min_area_rect(&pts).expect("rect");
        assert_abs_diff_eq!(r.center.x, 39.5, epsilon = 1e-4);
        assert_abs_diff_eq!(r.center.y, 14.5, epsilon = 1e-4);
        assert_abs_diff_eq!(r.area(), 19.0 * 9.0, epsilon = 1e-3);
    }

    #[test]
    fn rotated_rect_is_tight() {
        // A 40 x 10 rectangle rotated by 30 degrees.
        let (s, c) = 30f32.to_radians().sin_cos();
        let corners = [(-20.0, -5.0), (20.0, -5.0), (20.0, 5.0), (-20.0, 5.0)]
            .map(|(x, y): (f32, f32)| Point2::new(100.0 + c * x - s * y, 50.0 + s * x + c * y));
        let r = min_area_rect(&corners).expect("rect");
        assert_abs_diff_eq!(r.area(), 400.0, epsilon = 1e-2);
        assert_abs_diff_eq!(r.center.x, 100.0, epsilon = 1e-3);
        assert_abs_diff_eq!(r.center.y, 50.0, epsilon = 1e-3);
        for p in r.points() {
            let hit = corners.iter().any(|q| (p - q).norm() < 1e-2);
            assert!(hit, "{p:?} is not a corner");
        }
    }

    #[test]
    fn degenerate_inputs() {
        assert!(min_area_rect(&[]).is_none());
        let single = min_area_rect(&[Point2::new(3.0, 4.0)]).expect("rect");
        assert_eq!(single.points(), [Point2::new(3.0, 4.0); 4]);
        let line = min_area_rect(&[Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)]).expect("rect");
        assert_abs_diff_eq!(line.width, 10.0);
        assert_abs_diff_eq!(line.height, 0.0);
    }
}
