use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use tempfile::NamedTempFile;

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const INK: Rgb<u8> = Rgb([0, 0, 0]);

/// Uniform image with nothing to detect
pub fn blank_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, WHITE))
}

/// White sheet with a 3 px black rectangle outline
pub fn rectangle_image(x: i32, y: i32, width: u32, height: u32) -> DynamicImage {
    let mut img = RgbImage::from_pixel(200, 200, WHITE);
    for inset in 0..3 {
        draw_hollow_rect_mut(
            &mut img,
            Rect::at(x + inset, y + inset).of_size(width - 2 * inset as u32, height - 2 * inset as u32),
            INK,
        );
    }
    DynamicImage::ImageRgb8(img)
}

/// White sheet with one horizontal 3 px black stroke
pub fn horizontal_line_image(x: i32, y: i32, length: u32) -> DynamicImage {
    let mut img = RgbImage::from_pixel(200, 200, WHITE);
    draw_filled_rect_mut(&mut img, Rect::at(x, y - 1).of_size(length, 3), INK);
    DynamicImage::ImageRgb8(img)
}

/// 300×300 sheet with a rectangle outline, a long horizontal stroke at y = 270
/// and a long vertical stroke at x = 250
pub fn plan_image() -> DynamicImage {
    let mut img = RgbImage::from_pixel(300, 300, WHITE);
    for inset in 0..3 {
        draw_hollow_rect_mut(
            &mut img,
            Rect::at(40 + inset, 40 + inset).of_size(100 - 2 * inset as u32, 80 - 2 * inset as u32),
            INK,
        );
    }
    draw_filled_rect_mut(&mut img, Rect::at(20, 269).of_size(260, 3), INK);
    draw_filled_rect_mut(&mut img, Rect::at(249, 20).of_size(3, 200), INK);
    DynamicImage::ImageRgb8(img)
}

/// Saves an image into a temp `.png` file that is removed on drop
pub fn save_temp_image(img: &DynamicImage) -> NamedTempFile {
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    img.save_with_format(file.path(), image::ImageFormat::Png)
        .expect("Failed to save test image");
    file
}

/// Writes text into a temp file with the given suffix
pub fn temp_file_with(contents: &str, suffix: &str) -> NamedTempFile {
    let file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("Failed to create temp file");
    std::fs::write(file.path(), contents).expect("Failed to write temp file");
    file
}

/// The two-record detections file used by the builder scenarios
pub const DOOR_AND_LINE_JSON: &str =
    r#"[{"class":"door","box":[10,20,30,40]}, {"class":"detected line","box":[0,0,5,5]}]"#;
