//! 2D raster helpers shared by the flat renderer, the annotation
//! extractor, and the placement constraints
//!
//! Everything here operates on image-space points produced by
//! [`crate::camera::world_to_image`]: convex hulls of projected bounding
//! boxes, scanline fill over those hulls, and an object-index map used both
//! for overlap checks and occlusion-aware visibility.

use cgmath::Vector2;

/// Computes the convex hull of a point set (Andrew's monotone chain).
///
/// Returns the hull vertices in counter-clockwise order in image
/// coordinates. Degenerate inputs (fewer than 3 distinct points) return
/// what is available.
pub fn convex_hull(points: &[Vector2<f32>]) -> Vec<Vector2<f32>> {
    let mut pts: Vec<Vector2<f32>> = points.to_vec();
    pts.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap().then(a.y.partial_cmp(&b.y).unwrap()));
    pts.dedup_by(|a, b| (a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6);
    if pts.len() < 3 {
        return pts;
    }

    fn cross(o: Vector2<f32>, a: Vector2<f32>, b: Vector2<f32>) -> f32 {
        (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
    }

    let mut lower: Vec<Vector2<f32>> = Vec::new();
    for &p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p);
    }

    let mut upper: Vec<Vector2<f32>> = Vec::new();
    for &p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Tests whether two convex polygons intersect (separating axis theorem).
///
/// Degenerate polygons with fewer than 3 vertices never intersect anything.
pub fn hulls_intersect(a: &[Vector2<f32>], b: &[Vector2<f32>]) -> bool {
    if a.len() < 3 || b.len() < 3 {
        return false;
    }

    fn separated_by_edge_axes(poly: &[Vector2<f32>], other: &[Vector2<f32>]) -> bool {
        for i in 0..poly.len() {
            let p0 = poly[i];
            let p1 = poly[(i + 1) % poly.len()];
            // Outward normal of the edge
            let axis = Vector2::new(p1.y - p0.y, p0.x - p1.x);

            let project = |pts: &[Vector2<f32>]| {
                let mut min = f32::MAX;
                let mut max = f32::MIN;
                for p in pts {
                    let d = p.x * axis.x + p.y * axis.y;
                    min = min.min(d);
                    max = max.max(d);
                }
                (min, max)
            };

            let (a_min, a_max) = project(poly);
            let (b_min, b_max) = project(other);
            if a_max < b_min || b_max < a_min {
                return true;
            }
        }
        false
    }

    !separated_by_edge_axes(a, b) && !separated_by_edge_axes(b, a)
}

/// Visits every pixel whose center lies inside the convex polygon.
///
/// Pixel centers sit at integer coordinates. Pixels outside the
/// `width` x `height` image rectangle are clipped away.
pub fn scan_hull(
    hull: &[Vector2<f32>],
    width: u32,
    height: u32,
    mut plot: impl FnMut(u32, u32),
) {
    if hull.len() < 3 {
        return;
    }

    let y_min = hull.iter().map(|p| p.y).fold(f32::MAX, f32::min);
    let y_max = hull.iter().map(|p| p.y).fold(f32::MIN, f32::max);
    let row_start = y_min.ceil().max(0.0) as i64;
    let row_end = y_max.floor().min(height as f32 - 1.0) as i64;

    for row in row_start..=row_end {
        let y = row as f32;
        let mut x_min = f32::MAX;
        let mut x_max = f32::MIN;

        for i in 0..hull.len() {
            let p0 = hull[i];
            let p1 = hull[(i + 1) % hull.len()];
            if (p0.y <= y && p1.y >= y) || (p1.y <= y && p0.y >= y) {
                let dy = p1.y - p0.y;
                let x = if dy.abs() < 1e-9 {
                    // Horizontal edge contributes both endpoints
                    x_min = x_min.min(p0.x.min(p1.x));
                    x_max = x_max.max(p0.x.max(p1.x));
                    continue;
                } else {
                    p0.x + (y - p0.y) * (p1.x - p0.x) / dy
                };
                x_min = x_min.min(x);
                x_max = x_max.max(x);
            }
        }

        if x_min > x_max {
            continue;
        }
        let col_start = x_min.ceil().max(0.0) as i64;
        let col_end = x_max.floor().min(width as f32 - 1.0) as i64;
        for col in col_start..=col_end {
            plot(col as u32, row as u32);
        }
    }
}

/// Object-index map over the image.
///
/// Each pixel holds the index + 1 of the object whose hull was painted
/// there last; zero pixels indicate no object. Painting back-to-front makes
/// the final value the nearest object, which is what the visibility flag
/// reads.
pub struct ObjectMap {
    width: u32,
    height: u32,
    ids: Vec<u32>,
}

impl ObjectMap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ids: vec![0; (width as usize) * (height as usize)],
        }
    }

    /// Paints a hull with the given object id (index + 1)
    pub fn fill_hull(&mut self, hull: &[Vector2<f32>], id: u32) {
        let width = self.width;
        let ids = &mut self.ids;
        scan_hull(hull, self.width, self.height, |x, y| {
            ids[(y * width + x) as usize] = id;
        });
    }

    /// True if any pixel still carries the given id
    pub fn contains_id(&self, id: u32) -> bool {
        self.ids.iter().any(|&v| v == id)
    }

    pub fn id_at(&self, x: u32, y: u32) -> u32 {
        self.ids[(y * self.width + x) as usize]
    }

    /// Number of pixels carrying the given id
    pub fn count_id(&self, id: u32) -> usize {
        self.ids.iter().filter(|&&v| v == id).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f32, y: f32, half: f32) -> Vec<Vector2<f32>> {
        vec![
            Vector2::new(x - half, y - half),
            Vector2::new(x + half, y - half),
            Vector2::new(x + half, y + half),
            Vector2::new(x - half, y + half),
        ]
    }

    #[test]
    fn test_hull_of_square_with_interior_point() {
        let mut points = square(5.0, 5.0, 2.0);
        points.push(Vector2::new(5.0, 5.0)); // interior, must be dropped
        let hull = convex_hull(&points);
        assert_eq!(hull.len(), 4);
    }

    #[test]
    fn test_hulls_intersect_overlapping() {
        let a = convex_hull(&square(5.0, 5.0, 2.0));
        let b = convex_hull(&square(6.0, 6.0, 2.0));
        assert!(hulls_intersect(&a, &b));
    }

    #[test]
    fn test_hulls_intersect_disjoint() {
        let a = convex_hull(&square(2.0, 2.0, 1.0));
        let b = convex_hull(&square(8.0, 8.0, 1.0));
        assert!(!hulls_intersect(&a, &b));
    }

    #[test]
    fn test_scan_hull_fills_square() {
        let hull = convex_hull(&square(5.0, 5.0, 1.5));
        let mut count = 0;
        scan_hull(&hull, 16, 16, |_, _| count += 1);
        // Pixel centers 4..=6 in both axes
        assert_eq!(count, 9);
    }

    #[test]
    fn test_scan_hull_clips_to_image() {
        let hull = convex_hull(&square(0.0, 0.0, 2.0));
        let mut pixels = Vec::new();
        scan_hull(&hull, 16, 16, |x, y| pixels.push((x, y)));
        assert!(pixels.iter().all(|&(x, y)| x <= 2 && y <= 2));
        assert!(!pixels.is_empty());
    }

    #[test]
    fn test_object_map_painter_order() {
        let mut map = ObjectMap::new(16, 16);
        map.fill_hull(&convex_hull(&square(5.0, 5.0, 2.0)), 1);
        map.fill_hull(&convex_hull(&square(5.0, 5.0, 2.0)), 2);
        // Second paint fully covers the first
        assert!(!map.contains_id(1));
        assert!(map.contains_id(2));
        assert_eq!(map.id_at(5, 5), 2);
    }
}
