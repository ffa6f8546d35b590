//! Property sweeps for the cell planner and the contain-fit.

use sheetprint::rendering::fit::fit;
use sheetprint::rendering::layout::plan;
use sheetprint::{CellRect, Error, LayoutPreset, LayoutSpec, SheetSpec};

// Small deterministic generator so sweeps are reproducible without extra crates
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn range(&mut self, lo: u32, hi: u32) -> u32 {
        lo + (self.next() % (hi - lo + 1) as u64) as u32
    }
}

fn check_partition(sheet: &SheetSpec, layout: &LayoutSpec, cells: &[CellRect; 4]) {
    let (mx, my) = layout.margins();
    let (gx, gy) = layout.gutter();

    for i in 0..4 {
        for j in (i + 1)..4 {
            assert!(!cells[i].intersects(&cells[j]), "cells {} and {} overlap: {:?}", i, j, cells);
        }
    }

    // all cells share a size
    assert!(cells.iter().all(|c| c.width == cells[0].width && c.height == cells[0].height));

    // margins + two cells + gutter reconstruct the sheet, up to the floor remainder
    let slack_x = sheet.width() - (2 * mx + 2 * cells[0].width + gx);
    let slack_y = sheet.height() - (2 * my + 2 * cells[0].height + gy);
    assert!(slack_x <= 1 && slack_y <= 1, "slack {}x{} for {:?}", slack_x, slack_y, layout);

    // gaps between neighbours are exactly the gutter
    assert_eq!(cells[1].x - cells[0].right(), gx);
    assert_eq!(cells[2].y - cells[0].bottom(), gy);
    assert_eq!(cells[0].x, mx);
    assert_eq!(cells[0].y, my);
    assert_eq!(cells[3].right(), cells[1].right());
    assert_eq!(cells[3].bottom(), cells[2].bottom());

    // cell union plus margins/gutters/slack covers the sheet area exactly
    let cell_area: u64 = cells.iter().map(|c| c.area()).sum();
    let inner_w = (2 * cells[0].width + gx) as u64;
    let inner_h = (2 * cells[0].height + gy) as u64;
    let gutter_area = gx as u64 * inner_h + gy as u64 * inner_w - gx as u64 * gy as u64;
    assert_eq!(cell_area + gutter_area, inner_w * inner_h);
    assert!(inner_w + 2 * mx as u64 <= sheet.width() as u64);
    assert!(inner_h + 2 * my as u64 <= sheet.height() as u64);
}

#[test]
fn reference_a4_gutter_sheet() {
    let sheet = SheetSpec::from_pixels(2480, 3508, 300.0).unwrap();
    let layout = LayoutSpec::Gutter { margin_x: 124, margin_y: 175, gutter_x: 99, gutter_y: 140 };
    let cells = plan(&sheet, &layout).unwrap();
    assert_eq!(cells[0], CellRect { x: 124, y: 175, width: 1066, height: 1509 });
    assert_eq!((cells[1].x, cells[1].y), (124 + 1066 + 99, 175));
    assert_eq!((cells[2].x, cells[2].y), (124, 175 + 1509 + 140));
    assert_eq!((cells[3].x, cells[3].y), (124 + 1066 + 99, 175 + 1509 + 140));
    check_partition(&sheet, &layout, &cells);
}

#[test]
fn partition_holds_for_random_gutter_layouts() {
    let mut rng = Lcg(0x5eed);
    let mut checked = 0;
    for _ in 0..500 {
        let sheet = SheetSpec::from_pixels(rng.range(20, 4000), rng.range(20, 4000), 300.0).unwrap();
        let layout = LayoutSpec::Gutter {
            margin_x: rng.range(0, sheet.width() / 3),
            margin_y: rng.range(0, sheet.height() / 3),
            gutter_x: rng.range(0, sheet.width() / 4),
            gutter_y: rng.range(0, sheet.height() / 4),
        };
        match plan(&sheet, &layout) {
            Ok(cells) => {
                check_partition(&sheet, &layout, &cells);
                checked += 1;
            }
            Err(Error::InvalidLayout(_)) => {}
            Err(e) => panic!("unexpected error {}", e),
        }
    }
    assert!(checked > 100);
}

#[test]
fn partition_holds_for_random_inset_layouts() {
    let mut rng = Lcg(42);
    for _ in 0..300 {
        let sheet = SheetSpec::from_pixels(rng.range(100, 3000), rng.range(100, 3000), 300.0).unwrap();
        let layout = LayoutSpec::Inset {
            margin_x: rng.range(0, sheet.width() / 5),
            margin_y: rng.range(0, sheet.height() / 5),
            inset: rng.range(0, 10),
        };
        let cells = plan(&sheet, &layout).unwrap();
        check_partition(&sheet, &layout, &cells);
        assert_eq!(cells[0].right(), cells[1].x);
        assert_eq!(cells[0].bottom(), cells[2].y);
    }
}

#[test]
fn non_positive_cells_fail_closed() {
    let sheet = SheetSpec::from_pixels(500, 500, 300.0).unwrap();
    for (mx, gx) in [(250, 0), (249, 2), (200, 100), (0, 500), (0, 499)] {
        let layout = LayoutSpec::Gutter { margin_x: mx, margin_y: 0, gutter_x: gx, gutter_y: 0 };
        assert!(
            matches!(plan(&sheet, &layout), Err(Error::InvalidLayout(_))),
            "margin {} gutter {} should be rejected",
            mx,
            gx
        );
    }
}

#[test]
fn planning_is_deterministic() {
    for preset in [LayoutPreset::percent_gutter(), LayoutPreset::millimeter_inset()] {
        let sheet = SheetSpec::a4(300.0).unwrap();
        let layout = preset.resolve(&sheet).unwrap();
        assert_eq!(plan(&sheet, &layout).unwrap(), plan(&sheet, &layout).unwrap());
    }
}

#[test]
fn reference_portrait_fit() {
    let f = fit(1200, 1600, 1066, 1509).unwrap();
    assert_eq!((f.draw_w, f.draw_h), (1066, 1421));
    assert_eq!(f.offset_x, 0);
    assert!(f.offset_y > 0);
    assert_eq!(f.offset_y, (1509 - 1421) / 2);
}

#[test]
fn fit_stays_inside_box_and_keeps_aspect() {
    let mut rng = Lcg(7);
    for _ in 0..5000 {
        let (iw, ih) = (rng.range(1, 5000), rng.range(1, 5000));
        let (bw, bh) = (rng.range(1, 3000), rng.range(1, 3000));
        let f = fit(iw, ih, bw, bh).unwrap();

        assert!(f.draw_w <= bw && f.draw_h <= bh);
        assert!(f.offset_x + f.draw_w <= bw);
        assert!(f.offset_y + f.draw_h <= bh);

        // one axis is always filled
        assert!(f.draw_w == bw || f.draw_h == bh, "{}x{} in {}x{} -> {:?}", iw, ih, bw, bh, f);

        // centering: the two leftover margins differ by at most one pixel
        let right = bw - f.draw_w - f.offset_x;
        let bottom = bh - f.draw_h - f.offset_y;
        assert!(right - f.offset_x <= 1);
        assert!(bottom - f.offset_y <= 1);

        // aspect ratio preserved within a pixel of rounding on the free axis
        let scale = f64::min(bw as f64 / iw as f64, bh as f64 / ih as f64);
        let exact_w = iw as f64 * scale;
        let exact_h = ih as f64 * scale;
        assert!((f.draw_w as f64 - exact_w).abs() <= 1.0);
        assert!((f.draw_h as f64 - exact_h).abs() <= 1.0);
    }
}

#[test]
fn fit_rejects_empty_images() {
    assert!(matches!(fit(0, 100, 10, 10), Err(Error::InvalidImage(_))));
    assert!(matches!(fit(100, 0, 10, 10), Err(Error::InvalidImage(_))));
}
