use crate::error::{BlueprintError, Result};
use crate::models::{BoxGeometry, DetectionRecord, RectangleBox, SHAPE_CLASS};
use ab_glyph::{FontVec, PxScale};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut, draw_text_mut};
use imageproc::rect::Rect;
use std::path::Path;

pub const SHAPE_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
pub const LINE_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
pub const OBJECT_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Draws detections over a copy of the source image
pub struct Annotator {
    font: Option<FontVec>,
    text_scale: f32,
}

impl Annotator {
    /// Boxes and lines only
    pub fn new() -> Self {
        Self {
            font: None,
            text_scale: 16.0,
        }
    }

    /// Also label object boxes using a TrueType/OpenType font file
    pub fn with_font_file(mut self, path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(BlueprintError::not_found("font", path));
        }
        let bytes = std::fs::read(path)?;
        let font = FontVec::try_from_vec(bytes)
            .map_err(|e| BlueprintError::Font(format!("{}: {}", path.display(), e)))?;
        self.font = Some(font);
        Ok(self)
    }

    fn draw_rect(canvas: &mut RgbImage, rect: &RectangleBox, color: Rgb<u8>) {
        // 2 px border: the rectangle and the one just inside it
        for inset in 0..2i32 {
            let w = rect.width - 2 * inset;
            let h = rect.height - 2 * inset;
            if w <= 0 || h <= 0 {
                break;
            }
            let r = Rect::at(rect.x + inset, rect.y + inset).of_size(w as u32, h as u32);
            draw_hollow_rect_mut(canvas, r, color);
        }
    }

    fn draw_segment(canvas: &mut RgbImage, start: (i32, i32), end: (i32, i32), color: Rgb<u8>) {
        let horizontalish = (end.0 - start.0).abs() >= (end.1 - start.1).abs();
        for offset in 0..2 {
            let (ox, oy) = if horizontalish { (0.0, offset as f32) } else { (offset as f32, 0.0) };
            draw_line_segment_mut(
                canvas,
                (start.0 as f32 + ox, start.1 as f32 + oy),
                (end.0 as f32 + ox, end.1 as f32 + oy),
                color,
            );
        }
    }

    pub fn render(&self, image: &DynamicImage, records: &[DetectionRecord]) -> RgbImage {
        let mut canvas = image.to_rgb8();

        for record in records {
            match &record.geometry {
                BoxGeometry::Segment(seg) => {
                    Self::draw_segment(&mut canvas, (seg.x1, seg.y1), seg.end(), LINE_COLOR);
                }
                BoxGeometry::Rectangle(rect) if record.class == SHAPE_CLASS => {
                    Self::draw_rect(&mut canvas, rect, SHAPE_COLOR);
                }
                BoxGeometry::Rectangle(rect) => {
                    Self::draw_rect(&mut canvas, rect, OBJECT_COLOR);
                    if let Some(font) = &self.font {
                        let text = match record.confidence {
                            Some(conf) => format!("{}: {:.2}", record.class, conf),
                            None => record.class.clone(),
                        };
                        draw_text_mut(
                            &mut canvas,
                            OBJECT_COLOR,
                            rect.x,
                            rect.y - 10,
                            PxScale::from(self.text_scale),
                            font,
                            &text,
                        );
                    }
                }
            }
        }

        canvas
    }
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new()
    }
}
