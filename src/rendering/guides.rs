//! Dotted cut lines and edge ticks between the four cells.
//!
//! Guides are purely additive: they are painted after every image draw and
//! never influence where images are placed.

use crate::rendering::layout::CellRect;
use crate::rendering::paint::{Color, PaintCommand};
use crate::rendering::raster::Surface;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuideStyle {
    pub color: Color,
    /// Cut line thickness in pixels
    pub thickness: u32,
    /// Length of each painted dash
    pub dash: u32,
    /// Space between dashes
    pub gap: u32,
    /// Length of the solid ticks at the sheet edges
    pub tick_length: u32,
    pub tick_thickness: u32,
}

impl Default for GuideStyle {
    fn default() -> Self {
        Self {
            color: Color::rgb(136, 136, 136),
            thickness: 3,
            dash: 12,
            gap: 10,
            tick_length: 40,
            tick_thickness: 4,
        }
    }
}

impl GuideStyle {
    /// Reject sizes that cannot fit on a `sheet_w x sheet_h` sheet.
    pub fn validate(&self, sheet_w: u32, sheet_h: u32) -> Result<()> {
        let limit = sheet_w.max(sheet_h);
        let fields = [
            ("thickness", self.thickness),
            ("dash", self.dash),
            ("gap", self.gap),
            ("tick_length", self.tick_length),
            ("tick_thickness", self.tick_thickness),
        ];
        for (name, v) in fields {
            if v > limit {
                return Err(Error::ConfigError(format!(
                    "guide {} is {}px but the sheet is only {}x{}px",
                    name, v, sheet_w, sheet_h
                )));
            }
        }
        Ok(())
    }
}

/// Paint the cut guides for `cells` onto `surface`.
pub fn draw_guides(surface: &mut Surface, cells: &[CellRect; 4], style: &GuideStyle) {
    let commands = guide_commands(surface.width(), surface.height(), cells, style);
    log::debug!("drawing {} guide segments", commands.len());
    surface.paint(&commands);
}

/// Build the paint commands for the guides on a `sheet_w x sheet_h` sheet.
pub fn guide_commands(sheet_w: u32, sheet_h: u32, cells: &[CellRect; 4], style: &GuideStyle) -> Vec<PaintCommand> {
    let mut out = Vec::new();
    if style.thickness == 0 {
        return out;
    }

    let [top_left, top_right, bottom_left, _] = cells;
    // midpoints of the vertical and horizontal boundaries (gap is 0 when cells touch)
    let mid_x = (top_left.right() as i64 + top_right.x as i64) / 2;
    let mid_y = (top_left.bottom() as i64 + bottom_left.y as i64) / 2;
    let half = (style.thickness / 2) as i64;
    let top = top_left.y;
    let bottom = bottom_left.bottom();
    let left = top_left.x;
    let right = top_right.right();

    // vertical dotted line
    for (start, len) in dashes(top, bottom, style.dash, style.gap) {
        out.push(PaintCommand::rect(origin(mid_x - half), origin(start as i64), style.thickness, len, style.color));
    }
    // horizontal dotted line
    for (start, len) in dashes(left, right, style.dash, style.gap) {
        out.push(PaintCommand::rect(origin(start as i64), origin(mid_y - half), len, style.thickness, style.color));
    }

    if style.tick_length > 0 && style.tick_thickness > 0 {
        let t_half = (style.tick_thickness / 2) as i64;
        let len = style.tick_length;
        let (tx, ty) = (origin(mid_x - t_half), origin(mid_y - t_half));
        let bottom_edge = origin(sheet_h as i64 - len as i64);
        let right_edge = origin(sheet_w as i64 - len as i64);
        out.push(PaintCommand::rect(tx, 0, style.tick_thickness, len, style.color));
        out.push(PaintCommand::rect(tx, bottom_edge, style.tick_thickness, len, style.color));
        out.push(PaintCommand::rect(0, ty, len, style.tick_thickness, style.color));
        out.push(PaintCommand::rect(right_edge, ty, len, style.tick_thickness, style.color));
    }

    out
}

// paint origins are i32; anything outside is clipped by the surface anyway
fn origin(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

// (start, length) of each dash covering [from, to)
fn dashes(from: u32, to: u32, dash: u32, gap: u32) -> Vec<(u32, u32)> {
    let dash = dash.max(1);
    let mut out = Vec::new();
    let mut pos = from;
    while pos < to {
        let len = dash.min(to - pos);
        out.push((pos, len));
        pos = pos.saturating_add(dash.saturating_add(gap));
    }
    out
}
