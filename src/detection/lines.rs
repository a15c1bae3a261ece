use crate::models::SegmentBox;
use image::{GrayImage, ImageBuffer, Luma};
use imageproc::hough::PolarLine;
use imageproc::suppress::suppress_non_maximum;

/// Parameters of segment extraction along Hough lines
#[derive(Debug, Clone, Copy)]
pub struct SegmentOptions {
    pub vote_threshold: u32,
    pub suppression_radius: u32,
    pub min_line_length: f32,
    pub max_line_gap: u32,
}

fn is_edge(edges: &GrayImage, x: i64, y: i64) -> bool {
    x >= 0
        && y >= 0
        && (x as u32) < edges.width()
        && (y as u32) < edges.height()
        && edges.get_pixel(x as u32, y as u32)[0] > 0
}

fn order_endpoints(a: (i32, i32), b: (i32, i32)) -> SegmentBox {
    if (b.0, b.1) < (a.0, a.1) {
        SegmentBox::from_endpoints(b, a)
    } else {
        SegmentBox::from_endpoints(a, b)
    }
}

/// Walk one polar line across the image and cut it into supported segments.
///
/// A step counts as supported when the edge map has a pixel on the line or one
/// pixel to either side of it along the normal. Runs are bridged across gaps of
/// at most `max_line_gap` steps.
pub fn segments_along(edges: &GrayImage, line: &PolarLine, options: &SegmentOptions) -> Vec<SegmentBox> {
    let theta = (line.angle_in_degrees as f32).to_radians();
    let (sin, cos) = theta.sin_cos();
    let (x0, y0) = (line.r * cos, line.r * sin);
    let diag = ((edges.width().pow(2) + edges.height().pow(2)) as f32).sqrt().ceil() as i64;

    let mut segments = Vec::new();
    let mut start: Option<(i32, i32)> = None;
    let mut last: (i32, i32) = (0, 0);
    let mut gap = 0u32;

    let mut close_run = |start: Option<(i32, i32)>, last: (i32, i32)| {
        if let Some(s) = start {
            let segment = order_endpoints(s, last);
            if segment.extent() as f32 >= options.min_line_length {
                segments.push(segment);
            }
        }
    };

    for t in -diag..=diag {
        let px = x0 - t as f32 * sin;
        let py = y0 + t as f32 * cos;
        let (x, y) = (px.round() as i64, py.round() as i64);

        let hit = [-1.0f32, 0.0, 1.0].iter().any(|&n| {
            is_edge(
                edges,
                (px + n * cos).round() as i64,
                (py + n * sin).round() as i64,
            )
        });

        if hit {
            if start.is_none() {
                start = Some((x as i32, y as i32));
            }
            last = (x as i32, y as i32);
            gap = 0;
        } else if start.is_some() {
            gap += 1;
            if gap > options.max_line_gap {
                close_run(start.take(), last);
                gap = 0;
            }
        }
    }
    close_run(start, last);

    segments
}

/// Standard Hough transform at 1 px / 1° resolution.
///
/// Each edge pixel votes for the bin nearest to `x cos θ + y sin θ`. Truncating
/// instead would split a horizontal line over two bins, since `cos 90°` is not
/// exactly zero in f32.
pub fn hough_lines(edges: &GrayImage, vote_threshold: u32, suppression_radius: u32) -> Vec<PolarLine> {
    let (width, height) = edges.dimensions();
    let rmax = ((width as f64).hypot(height as f64)).ceil() as i32;

    let trig: Vec<(f32, f32)> = (0..180u32)
        .map(|deg| {
            let (sin, cos) = (deg as f32).to_radians().sin_cos();
            (cos, sin)
        })
        .collect();

    let mut acc: ImageBuffer<Luma<u32>, Vec<u32>> = ImageBuffer::new(2 * rmax as u32 + 1, 180);
    for (x, y, pixel) in edges.enumerate_pixels() {
        if pixel[0] == 0 {
            continue;
        }
        for (deg, &(cos, sin)) in trig.iter().enumerate() {
            let r = (x as f32 * cos + y as f32 * sin).round() as i32;
            if r.abs() <= rmax {
                acc.get_pixel_mut((r + rmax) as u32, deg as u32)[0] += 1;
            }
        }
    }

    let peaks = suppress_non_maximum(&acc, suppression_radius);

    let mut lines = Vec::new();
    for (bin, deg, votes) in peaks.enumerate_pixels() {
        if votes[0] >= vote_threshold {
            lines.push(PolarLine {
                r: (bin as i32 - rmax) as f32,
                angle_in_degrees: deg,
            });
        }
    }
    lines
}

/// Hough voting over an edge map followed by segment extraction on every accepted line
pub fn find_segments(edges: &GrayImage, options: &SegmentOptions) -> Vec<SegmentBox> {
    let lines = hough_lines(edges, options.vote_threshold, options.suppression_radius);

    lines
        .iter()
        .flat_map(|line| segments_along(edges, line, options))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> SegmentOptions {
        SegmentOptions {
            vote_threshold: 100,
            suppression_radius: 8,
            min_line_length: 30.0,
            max_line_gap: 10,
        }
    }

    #[test]
    fn test_horizontal_run_is_one_segment() {
        let mut edges = GrayImage::new(100, 50);
        for x in 10..80 {
            edges.put_pixel(x, 20, Luma([255]));
        }
        let line = PolarLine { r: 20.0, angle_in_degrees: 90 };
        let segments = segments_along(&edges, &line, &options());

        assert_eq!(segments.len(), 1);
        let s = segments[0];
        assert_eq!((s.x1, s.y1), (10, 20));
        assert_eq!((s.dx, s.dy), (69, 0));
    }

    #[test]
    fn test_large_gap_splits_and_short_runs_drop() {
        let mut edges = GrayImage::new(200, 10);
        for x in (0..40).chain(60..100).chain(150..160) {
            edges.put_pixel(x, 5, Luma([255]));
        }
        let line = PolarLine { r: 5.0, angle_in_degrees: 90 };
        let segments = segments_along(&edges, &line, &options());

        let mut starts: Vec<i32> = segments.iter().map(|s| s.x1).collect();
        starts.sort();
        assert_eq!(starts, vec![0, 60]);
    }

    #[test]
    fn test_small_gap_is_bridged() {
        let mut edges = GrayImage::new(100, 10);
        for x in (0..30).chain(38..70) {
            edges.put_pixel(x, 5, Luma([255]));
        }
        let line = PolarLine { r: 5.0, angle_in_degrees: 90 };
        let segments = segments_along(&edges, &line, &options());

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].dx, 69);
    }

    #[test]
    fn test_horizontal_edge_row_keeps_its_votes() {
        let mut edges = GrayImage::new(200, 200);
        for x in 20..180 {
            edges.put_pixel(x, 98, Luma([255]));
        }
        let lines = hough_lines(&edges, 100, 8);

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].angle_in_degrees, 90);
        assert_eq!(lines[0].r, 98.0);
    }

    #[test]
    fn test_horizontal_and_vertical_rows_become_segments() {
        let mut edges = GrayImage::new(200, 200);
        for i in 20..180 {
            edges.put_pixel(i, 150, Luma([255]));
            edges.put_pixel(40, i, Luma([255]));
        }
        let segments = find_segments(&edges, &options());

        assert!(segments.iter().any(|s| s.dy == 0 && s.y1 == 150 && s.dx >= 150));
        assert!(segments.iter().any(|s| s.dx == 0 && s.x1 == 40 && s.dy >= 150));
    }

    #[test]
    fn test_short_diagonal_is_measured_by_axis_span() {
        let mut edges = GrayImage::new(60, 60);
        for k in 0..25 {
            edges.put_pixel(k, k, Luma([255]));
        }
        let diagonal = PolarLine { r: 0.0, angle_in_degrees: 135 };
        assert!(segments_along(&edges, &diagonal, &options()).is_empty());

        for k in 25..45 {
            edges.put_pixel(k, k, Luma([255]));
        }
        let segments = segments_along(&edges, &diagonal, &options());
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].extent(), 44);
    }
}
