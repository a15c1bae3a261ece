use crate::models::RectangleBox;
use image::GrayImage;
use imageproc::contours::find_contours;
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point;

/// A closed contour after polygon approximation
#[derive(Debug, Clone)]
pub struct Polygon {
    pub vertices: Vec<Point<i32>>,
}

impl Polygon {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Axis-aligned bounding rectangle, inclusive of both extreme pixels
    pub fn bounding_rect(&self) -> Option<RectangleBox> {
        let first = self.vertices.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);

        for p in &self.vertices {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        Some(RectangleBox::new(
            min_x,
            min_y,
            max_x - min_x + 1,
            max_y - min_y + 1,
        ))
    }
}

/// Approximate a closed curve with tolerance `epsilon_ratio` of its perimeter
pub fn approximate_closed(points: &[Point<i32>], epsilon_ratio: f64) -> Polygon {
    if points.len() < 3 {
        return Polygon {
            vertices: points.to_vec(),
        };
    }

    let epsilon = epsilon_ratio * arc_length(points, true);
    if epsilon <= 0.0 {
        return Polygon {
            vertices: points.to_vec(),
        };
    }
    let mut vertices = approximate_polygon_dp(points, epsilon, true);

    // A closed result may repeat its first vertex at the end
    if vertices.len() > 1 && vertices.first() == vertices.last() {
        vertices.pop();
    }

    Polygon { vertices }
}

/// Extract every border (outer and hole) of a binary image and approximate it
pub fn find_polygons(binary: &GrayImage, epsilon_ratio: f64) -> Vec<Polygon> {
    find_contours::<i32>(binary)
        .iter()
        .map(|contour| approximate_closed(&contour.points, epsilon_ratio))
        .collect()
}
