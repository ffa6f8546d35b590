use std::fs;
use std::io::Cursor;
use std::path::PathBuf;

use image::{ImageOutputFormat, Rgba, RgbaImage};
use sha2::{Digest, Sha256};
use sheetprint::{
    Compositor, CompositionResult, CompositorConfig, GuideStyle, ImageSelection, LayoutPreset, SheetSpec,
    StaticSourceLoader,
};

fn golden_path(name: &str) -> PathBuf {
    let mut p = PathBuf::from("tests/goldens/expected");
    p.push(name);
    p
}

// Four solid fills with different aspect ratios so every fit path is hit.
// Resampling a uniform image reproduces it exactly, which keeps the goldens
// independent of filter rounding.
const FIXTURES: [((u32, u32), [u8; 4]); 4] = [
    ((120, 160), [255, 0, 0, 255]),
    ((160, 90), [0, 255, 0, 255]),
    ((64, 64), [0, 0, 255, 255]),
    ((30, 200), [0, 0, 0, 255]),
];

fn fixtures() -> Vec<Vec<u8>> {
    FIXTURES
        .iter()
        .map(|&((w, h), rgba)| {
            let mut buf = Cursor::new(Vec::new());
            image::DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba(rgba)))
                .write_to(&mut buf, ImageOutputFormat::Png)
                .expect("encode fixture");
            buf.into_inner()
        })
        .collect()
}

// Digest of the decoded RGB raster, so the goldens pin pixels rather than
// the deflate stream of a particular encoder version
fn raster_digest(sheet: &CompositionResult) -> String {
    let rgb = image::load_from_memory(&sheet.png_data).expect("decode export").to_rgb8();
    hex::encode(Sha256::digest(rgb.as_raw()))
}

async fn compose(preset: LayoutPreset, guides: bool) -> CompositionResult {
    let sheet = SheetSpec::a4(40.0).expect("sheet");
    let config = CompositorConfig {
        sheet,
        layout: preset.resolve(&sheet).expect("layout"),
        selection: ImageSelection::Four,
        guides: guides.then(GuideStyle::default),
    };
    let mut compositor = Compositor::new(config, StaticSourceLoader::new(fixtures())).expect("compositor");
    compositor.compose().await.expect("compose")
}

fn check_golden(name: &str, sheet: &CompositionResult) {
    let expected_path = golden_path(name);
    if std::env::var("UPDATE_GOLDENS").is_ok() {
        fs::create_dir_all("tests/goldens/expected").ok();
        fs::write(&expected_path, raster_digest(sheet)).expect("write golden");
        println!("Updated golden: {:?}", expected_path);
        return;
    }

    if !expected_path.exists() {
        println!(
            "No golden at {:?}; run with UPDATE_GOLDENS=1 to create it. Skipping.",
            expected_path
        );
        return;
    }

    let exp = fs::read_to_string(&expected_path).expect("unable to read golden");
    assert_eq!(raster_digest(sheet), exp.trim());
}

#[tokio::test]
async fn golden_percent_sheet_matches_fixture() {
    let sheet = compose(LayoutPreset::percent_gutter(), false).await;
    assert!(golden_path("percent_four.sha256").exists());
    check_golden("percent_four.sha256", &sheet);
}

#[tokio::test]
async fn golden_millimeter_sheet_with_guides_matches_fixture() {
    let sheet = compose(LayoutPreset::millimeter_inset(), true).await;
    assert!(golden_path("millimeter_four_guides.sha256").exists());
    // cells meet at (165, 234), where both cut lines cross
    let rgb = image::load_from_memory(&sheet.png_data).expect("decode export").to_rgb8();
    assert_eq!(rgb.get_pixel(165, 234).0, [136, 136, 136]);
    assert_eq!(rgb.get_pixel(9 + 5 + 70, 9 + 5 + 100).0, [255, 0, 0]);
    check_golden("millimeter_four_guides.sha256", &sheet);
}

#[tokio::test]
async fn composition_is_byte_identical_across_runs() {
    for guides in [false, true] {
        let a = compose(LayoutPreset::millimeter_inset(), guides).await;
        let b = compose(LayoutPreset::millimeter_inset(), guides).await;
        assert_eq!(a.png_data, b.png_data);
        assert_eq!(a.digest(), b.digest());
    }
}

#[tokio::test]
async fn exported_sheet_is_opaque_rgb() {
    let sheet = compose(LayoutPreset::percent_gutter(), true).await;
    let decoded = image::load_from_memory(&sheet.png_data).expect("decode export");
    assert_eq!(decoded.color(), image::ColorType::Rgb8);
    assert_eq!((decoded.width(), decoded.height()), (sheet.width, sheet.height));
    // corner lies in the margin
    assert_eq!(decoded.to_rgb8().get_pixel(0, 0).0, [255, 255, 255]);
}
