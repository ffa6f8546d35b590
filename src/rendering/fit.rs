//! Contain-fit of an image inside a box.

use crate::{Error, Result};

/// Aspect-preserving placement relative to the box origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fit {
    pub draw_w: u32,
    pub draw_h: u32,
    pub offset_x: u32,
    pub offset_y: u32,
}

/// Scale `image_w x image_h` by the largest factor that keeps it inside
/// `box_w x box_h`, then center it. Never crops and never exceeds the box.
pub fn fit(image_w: u32, image_h: u32, box_w: u32, box_h: u32) -> Result<Fit> {
    if image_w == 0 || image_h == 0 {
        return Err(Error::InvalidImage(format!(
            "image has zero dimension ({}x{})",
            image_w, image_h
        )));
    }
    if box_w == 0 || box_h == 0 {
        return Err(Error::InvalidLayout(format!(
            "target box has zero dimension ({}x{})",
            box_w, box_h
        )));
    }

    let scale = f64::min(box_w as f64 / image_w as f64, box_h as f64 / image_h as f64);
    let draw_w = ((image_w as f64 * scale).round() as u32).clamp(1, box_w);
    let draw_h = ((image_h as f64 * scale).round() as u32).clamp(1, box_h);

    Ok(Fit {
        draw_w,
        draw_h,
        offset_x: (box_w - draw_w) / 2,
        offset_y: (box_h - draw_h) / 2,
    })
}
