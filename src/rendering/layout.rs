//! Sheet geometry: physical sheet size, layout presets and the 2x2 cell planner.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

const MM_PER_INCH: f64 = 25.4;

/// A physical sheet rasterized at a fixed resolution.
///
/// Pixel dimensions are computed once in the constructor and never change for
/// the lifetime of the value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PhysicalSheet", into = "PhysicalSheet")]
pub struct SheetSpec {
    width_mm: f64,
    height_mm: f64,
    dpi: f64,
    width: u32,
    height: u32,
}

/// Serialized form of a [`SheetSpec`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PhysicalSheet {
    pub width_mm: f64,
    pub height_mm: f64,
    pub dpi: f64,
}

impl SheetSpec {
    pub fn new(width_mm: f64, height_mm: f64, dpi: f64) -> Result<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(width_mm) || !valid(height_mm) || !valid(dpi) {
            return Err(Error::ConfigError(format!(
                "sheet must have positive size and resolution, got {}x{}mm @ {}dpi",
                width_mm, height_mm, dpi
            )));
        }
        let px_per_mm = dpi / MM_PER_INCH;
        let width = (width_mm * px_per_mm).round();
        let height = (height_mm * px_per_mm).round();
        if width < 1.0 || height < 1.0 || width > u32::MAX as f64 || height > u32::MAX as f64 {
            return Err(Error::ConfigError(format!(
                "sheet rasterizes to unusable size {}x{}px",
                width, height
            )));
        }
        Ok(Self {
            width_mm,
            height_mm,
            dpi,
            width: width as u32,
            height: height as u32,
        })
    }

    /// ISO A4 portrait (210 x 297 mm).
    pub fn a4(dpi: f64) -> Result<Self> {
        Self::new(210.0, 297.0, dpi)
    }

    /// Build a sheet from exact pixel dimensions; the physical size is derived.
    pub fn from_pixels(width: u32, height: u32, dpi: f64) -> Result<Self> {
        if width == 0 || height == 0 || !dpi.is_finite() || dpi <= 0.0 {
            return Err(Error::ConfigError(format!(
                "sheet must have positive size and resolution, got {}x{}px @ {}dpi",
                width, height, dpi
            )));
        }
        Ok(Self {
            width_mm: width as f64 * MM_PER_INCH / dpi,
            height_mm: height as f64 * MM_PER_INCH / dpi,
            dpi,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn width_mm(&self) -> f64 {
        self.width_mm
    }

    pub fn height_mm(&self) -> f64 {
        self.height_mm
    }

    pub fn dpi(&self) -> f64 {
        self.dpi
    }

    pub fn px_per_mm(&self) -> f64 {
        self.dpi / MM_PER_INCH
    }

    /// Convert a physical length to whole sheet pixels.
    pub fn mm_to_px(&self, mm: f64) -> u32 {
        (mm * self.px_per_mm()).round().max(0.0) as u32
    }
}

impl Default for SheetSpec {
    fn default() -> Self {
        // 210x297mm @ 300dpi => 2480x3508px
        Self {
            width_mm: 210.0,
            height_mm: 297.0,
            dpi: 300.0,
            width: 2480,
            height: 3508,
        }
    }
}

impl TryFrom<PhysicalSheet> for SheetSpec {
    type Error = Error;

    fn try_from(p: PhysicalSheet) -> Result<Self> {
        SheetSpec::new(p.width_mm, p.height_mm, p.dpi)
    }
}

impl From<SheetSpec> for PhysicalSheet {
    fn from(s: SheetSpec) -> Self {
        PhysicalSheet {
            width_mm: s.width_mm,
            height_mm: s.height_mm,
            dpi: s.dpi,
        }
    }
}

/// Pixel layout of the 2x2 grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LayoutSpec {
    /// Outer margin plus a gutter between cells.
    Gutter {
        margin_x: u32,
        margin_y: u32,
        gutter_x: u32,
        gutter_y: u32,
    },
    /// Outer margin, edge-adjacent cells, and an inner margin inside each cell.
    Inset {
        margin_x: u32,
        margin_y: u32,
        inset: u32,
    },
}

impl LayoutSpec {
    pub fn margins(&self) -> (u32, u32) {
        match *self {
            LayoutSpec::Gutter { margin_x, margin_y, .. } => (margin_x, margin_y),
            LayoutSpec::Inset { margin_x, margin_y, .. } => (margin_x, margin_y),
        }
    }

    pub fn gutter(&self) -> (u32, u32) {
        match *self {
            LayoutSpec::Gutter { gutter_x, gutter_y, .. } => (gutter_x, gutter_y),
            LayoutSpec::Inset { .. } => (0, 0),
        }
    }

    pub fn inset(&self) -> u32 {
        match *self {
            LayoutSpec::Gutter { .. } => 0,
            LayoutSpec::Inset { inset, .. } => inset,
        }
    }

    /// The box an image is fitted into for a given cell.
    pub fn content_box(&self, cell: &CellRect) -> Result<CellRect> {
        cell.inset(self.inset()).ok_or_else(|| {
            Error::InvalidLayout(format!(
                "inset {}px leaves no room inside {}x{} cell",
                self.inset(),
                cell.width,
                cell.height
            ))
        })
    }
}

/// Configurable layout presets, resolved to pixels against a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "preset", rename_all = "snake_case")]
pub enum LayoutPreset {
    /// Margin and gutter as fractions of each sheet dimension.
    PercentGutter { margin_pct: f64, gutter_pct: f64 },
    /// Margin and per-cell inset in millimeters at the sheet resolution.
    MillimeterInset { margin_mm: f64, inset_mm: f64 },
}

impl LayoutPreset {
    pub fn percent_gutter() -> Self {
        LayoutPreset::PercentGutter {
            margin_pct: 0.05,
            gutter_pct: 0.04,
        }
    }

    pub fn millimeter_inset() -> Self {
        LayoutPreset::MillimeterInset {
            margin_mm: 6.0,
            inset_mm: 3.0,
        }
    }

    pub fn resolve(&self, sheet: &SheetSpec) -> Result<LayoutSpec> {
        match *self {
            LayoutPreset::PercentGutter { margin_pct, gutter_pct } => {
                for (name, v) in [("margin_pct", margin_pct), ("gutter_pct", gutter_pct)] {
                    if !v.is_finite() || !(0.0..1.0).contains(&v) {
                        return Err(Error::ConfigError(format!("{} must be in [0, 1), got {}", name, v)));
                    }
                }
                let w = sheet.width() as f64;
                let h = sheet.height() as f64;
                Ok(LayoutSpec::Gutter {
                    margin_x: (w * margin_pct).round() as u32,
                    margin_y: (h * margin_pct).round() as u32,
                    gutter_x: (w * gutter_pct).round() as u32,
                    gutter_y: (h * gutter_pct).round() as u32,
                })
            }
            LayoutPreset::MillimeterInset { margin_mm, inset_mm } => {
                for (name, v) in [("margin_mm", margin_mm), ("inset_mm", inset_mm)] {
                    if !v.is_finite() || v < 0.0 {
                        return Err(Error::ConfigError(format!("{} must be non-negative, got {}", name, v)));
                    }
                }
                let margin = sheet.mm_to_px(margin_mm);
                Ok(LayoutSpec::Inset {
                    margin_x: margin,
                    margin_y: margin,
                    inset: sheet.mm_to_px(inset_mm),
                })
            }
        }
    }
}

impl Default for LayoutPreset {
    fn default() -> Self {
        Self::percent_gutter()
    }
}

/// A rectangle in sheet-pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CellRect {
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn intersects(&self, other: &CellRect) -> bool {
        self.x < other.right() && other.x < self.right() && self.y < other.bottom() && other.y < self.bottom()
    }

    /// Shrink by `px` on every side; `None` if nothing is left.
    pub fn inset(&self, px: u32) -> Option<CellRect> {
        let w = self.width.checked_sub(px.checked_mul(2)?)?;
        let h = self.height.checked_sub(px.checked_mul(2)?)?;
        if w == 0 || h == 0 {
            return None;
        }
        Some(CellRect {
            x: self.x + px,
            y: self.y + px,
            width: w,
            height: h,
        })
    }
}

/// Plan the four cells of a 2x2 grid, ordered top-left, top-right,
/// bottom-left, bottom-right.
pub fn plan(sheet: &SheetSpec, layout: &LayoutSpec) -> Result<[CellRect; 4]> {
    let (mx, my) = layout.margins();
    let (gx, gy) = layout.gutter();

    let cell_w = cell_extent("width", sheet.width(), mx, gx)?;
    let cell_h = cell_extent("height", sheet.height(), my, gy)?;

    let x0 = mx;
    let x1 = mx + cell_w + gx;
    let y0 = my;
    let y1 = my + cell_h + gy;

    let cell = |x, y| CellRect {
        x,
        y,
        width: cell_w,
        height: cell_h,
    };
    let cells = [cell(x0, y0), cell(x1, y0), cell(x0, y1), cell(x1, y1)];

    // inset mode must leave a drawable box in every cell
    layout.content_box(&cells[0])?;

    Ok(cells)
}

// floor((dim - 2*margin - gutter) / 2), rejecting anything <= 0
fn cell_extent(axis: &str, dim: u32, margin: u32, gutter: u32) -> Result<u32> {
    let remaining = dim as i64 - 2 * margin as i64 - gutter as i64;
    let cell = remaining.div_euclid(2);
    if cell <= 0 {
        return Err(Error::InvalidLayout(format!(
            "cell {} would be {}px (sheet {}px, margin {}px, gutter {}px)",
            axis, cell, dim, margin, gutter
        )));
    }
    Ok(cell as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_at_300_dpi_is_2480_by_3508() {
        let sheet = SheetSpec::a4(300.0).unwrap();
        assert_eq!((sheet.width(), sheet.height()), (2480, 3508));
        assert_eq!(sheet, SheetSpec::default());
    }

    #[test]
    fn percent_preset_matches_reference_values() {
        let sheet = SheetSpec::default();
        let layout = LayoutPreset::percent_gutter().resolve(&sheet).unwrap();
        assert_eq!(
            layout,
            LayoutSpec::Gutter {
                margin_x: 124,
                margin_y: 175,
                gutter_x: 99,
                gutter_y: 140
            }
        );
    }

    #[test]
    fn millimeter_preset_converts_at_sheet_dpi() {
        let sheet = SheetSpec::default();
        let layout = LayoutPreset::millimeter_inset().resolve(&sheet).unwrap();
        // 6mm and 3mm at 300dpi
        assert_eq!(
            layout,
            LayoutSpec::Inset {
                margin_x: 71,
                margin_y: 71,
                inset: 35
            }
        );
    }

    #[test]
    fn plan_gutter_mode_reference_sheet() {
        let sheet = SheetSpec::default();
        let layout = LayoutPreset::percent_gutter().resolve(&sheet).unwrap();
        let cells = plan(&sheet, &layout).unwrap();
        assert_eq!(cells[0], CellRect { x: 124, y: 175, width: 1066, height: 1509 });
        assert_eq!(cells[1], CellRect { x: 124 + 1066 + 99, y: 175, width: 1066, height: 1509 });
        assert_eq!(cells[2], CellRect { x: 124, y: 175 + 1509 + 140, width: 1066, height: 1509 });
        assert_eq!(cells[3], CellRect { x: 1289, y: 1824, width: 1066, height: 1509 });
    }

    #[test]
    fn plan_inset_mode_cells_are_edge_adjacent() {
        let sheet = SheetSpec::from_pixels(1000, 800, 300.0).unwrap();
        let layout = LayoutSpec::Inset { margin_x: 50, margin_y: 40, inset: 10 };
        let cells = plan(&sheet, &layout).unwrap();
        assert_eq!(cells[0].right(), cells[1].x);
        assert_eq!(cells[0].bottom(), cells[2].y);
        assert_eq!(cells[0].width, 450);
        assert_eq!(cells[0].height, 360);
    }

    #[test]
    fn plan_rejects_margins_that_consume_the_sheet() {
        let sheet = SheetSpec::from_pixels(100, 100, 300.0).unwrap();
        let layout = LayoutSpec::Gutter { margin_x: 50, margin_y: 10, gutter_x: 0, gutter_y: 0 };
        assert!(matches!(plan(&sheet, &layout), Err(Error::InvalidLayout(_))));

        let layout = LayoutSpec::Gutter { margin_x: 10, margin_y: 10, gutter_x: 79, gutter_y: 0 };
        assert!(matches!(plan(&sheet, &layout), Err(Error::InvalidLayout(_))));
    }

    #[test]
    fn plan_rejects_inset_larger_than_cell() {
        let sheet = SheetSpec::from_pixels(100, 100, 300.0).unwrap();
        let layout = LayoutSpec::Inset { margin_x: 0, margin_y: 0, inset: 25 };
        assert!(matches!(plan(&sheet, &layout), Err(Error::InvalidLayout(_))));
    }

    #[test]
    fn cell_rect_inset_and_overlap() {
        let a = CellRect { x: 0, y: 0, width: 10, height: 10 };
        let b = CellRect { x: 10, y: 0, width: 10, height: 10 };
        assert!(!a.intersects(&b));
        assert!(a.intersects(&CellRect { x: 9, y: 9, width: 2, height: 2 }));
        assert_eq!(a.inset(2), Some(CellRect { x: 2, y: 2, width: 6, height: 6 }));
        assert_eq!(a.inset(5), None);
    }

    #[test]
    fn sheet_rejects_non_positive_input() {
        assert!(SheetSpec::new(0.0, 297.0, 300.0).is_err());
        assert!(SheetSpec::new(210.0, 297.0, f64::NAN).is_err());
        assert!(SheetSpec::from_pixels(0, 10, 300.0).is_err());
    }

    #[test]
    fn sheet_deserializes_from_physical_size() {
        let sheet: SheetSpec = serde_json::from_str(r#"{"width_mm":210,"height_mm":297,"dpi":300}"#).unwrap();
        assert_eq!(sheet.width(), 2480);
        assert!(serde_json::from_str::<SheetSpec>(r#"{"width_mm":-1,"height_mm":297,"dpi":300}"#).is_err());
    }
}
