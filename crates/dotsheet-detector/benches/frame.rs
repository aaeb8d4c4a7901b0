use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dotsheet_code::{CodeTable, Corner, Palette};
use dotsheet_core::{CalibrationCache, Keypoint, RgbImageView};
use dotsheet_detector::{
    DetectorConfig, FrameInput, GeometryMemory, GraphParams, NeighborGraph, PaperDetector,
};
use nalgebra::{Point2, Vector2};

const WIDTH: usize = 1280;
const HEIGHT: usize = 720;
const DOT: f32 = 12.0;
const SPACING: f32 = 20.0;

/// Three sheets side by side, each with all four corner codes and one dark
/// object on it.
fn render() -> (Vec<u8>, Vec<Keypoint>) {
    let mut rgb = vec![255u8; WIDTH * HEIGHT * 3];
    let mut keypoints = Vec::new();
    let palette = Palette::default();
    let table = CodeTable::standard();
    let down = Vector2::new(0.0, 1.0);
    let right = Vector2::new(1.0, 0.0);

    let mut paint = |x: usize, y: usize, c: [u8; 3]| {
        let i = 3 * (y * WIDTH + x);
        rgb[i..i + 3].copy_from_slice(&c);
    };

    for (sheet, x0) in [(3u32, 60.0f32), (17, 480.0), (1024, 900.0)] {
        let (x1, y0, y1) = (x0 + 320.0, 150.0, 550.0);
        let layout = [
            (Corner::TopLeft, Point2::new(x0, y0), down, right),
            (Corner::TopRight, Point2::new(x1, y0), -right, down),
            (Corner::BottomRight, Point2::new(x1, y1), -down, -right),
            (Corner::BottomLeft, Point2::new(x0, y1), right, -down),
        ];
        for (corner, origin, a, b) in layout {
            let Ok(code) = table.code_for(sheet, corner) else {
                continue;
            };
            let positions = [3.0, 2.0, 1.0, 0.0]
                .map(|k| origin + a * k * SPACING)
                .into_iter()
                .chain([1.0, 2.0, 3.0].map(|k| origin + b * k * SPACING));
            for (p, &color) in positions.zip(&code) {
                let c = palette.color(color as usize).unwrap_or_default();
                let c = [c.r as u8, c.g as u8, c.b as u8];
                let (cx, cy) = (p.x as i64, p.y as i64);
                for y in cy - 6..=cy + 6 {
                    for x in cx - 6..=cx + 6 {
                        if (x - cx).pow(2) + (y - cy).pow(2) <= 36 {
                            paint(x as usize, y as usize, c);
                        }
                    }
                }
                keypoints.push(Keypoint::new(p.x, p.y, DOT));
            }
        }
        let mx = (x0 + 140.0) as usize;
        for y in 320..360 {
            for x in mx..mx + 30 {
                paint(x, y, [30, 30, 30]);
            }
        }
    }
    (rgb, keypoints)
}

fn bench_frame(c: &mut Criterion) {
    let (rgb, keypoints) = render();
    let frame = RgbImageView {
        width: WIDTH,
        height: HEIGHT,
        data: &rgb,
    };
    let detector = PaperDetector::new(DetectorConfig::default()).expect("default config");
    let input = FrameInput {
        frame,
        keypoints: keypoints.clone(),
        debug_pages: Vec::new(),
    };
    let memory = GeometryMemory::new();
    let mut cache = CalibrationCache::new();

    c.bench_function("neighbor_graph", |b| {
        b.iter(|| NeighborGraph::build(black_box(&keypoints), &GraphParams::default()))
    });

    c.bench_function("detect_from_keypoints", |b| {
        b.iter(|| detector.detect_from_keypoints(black_box(&input), &memory, &mut cache))
    });
}

criterion_group!(benches, bench_frame);
criterion_main!(benches);
