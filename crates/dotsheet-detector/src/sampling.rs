//! Dot color sampling.

use dotsheet_core::{Keypoint, Rgb, RgbImageView};

/// Mean color of a dot, white-balanced against the paper around it.
///
/// Averages the pixels of the disk of radius `size / 2 - 1` inside the dot's
/// `size x size` box, then scales each channel so that the brightest of the
/// four pixels just outside the box corners maps to 255.
pub fn sample_dot_color(frame: &RgbImageView<'_>, kp: &Keypoint) -> Rgb {
    if frame.width == 0 || frame.height == 0 {
        return Rgb::default();
    }

    let side = kp.size.round().max(1.0) as i64;
    let x0 = (kp.position.x - kp.size / 2.0).floor() as i64;
    let y0 = (kp.position.y - kp.size / 2.0).floor() as i64;
    let c = side / 2;
    let radius = kp.size / 2.0 - 1.0;
    let r2 = radius * radius;

    let (w, h) = (frame.width as i64, frame.height as i64);
    let mut sum = [0.0f64; 3];
    let mut count = 0usize;
    if radius >= 0.0 {
        for dy in 0..side {
            let y = y0 + dy;
            if y < 0 || y >= h {
                continue;
            }
            for dx in 0..side {
                let x = x0 + dx;
                if x < 0 || x >= w {
                    continue;
                }
                let (ox, oy) = ((dx - c) as f32, (dy - c) as f32);
                if ox * ox + oy * oy > r2 {
                    continue;
                }
                let px = frame.pixel(x as usize, y as usize);
                sum[0] += px.r as f64;
                sum[1] += px.g as f64;
                sum[2] += px.b as f64;
                count += 1;
            }
        }
    }

    let mean = if count == 0 {
        frame.pixel_clamped(kp.position.x as i64, kp.position.y as i64)
    } else {
        let n = count as f64;
        Rgb::new(
            (sum[0] / n) as f32,
            (sum[1] / n) as f32,
            (sum[2] / n) as f32,
        )
    };

    let corners = [
        frame.pixel_clamped(x0 - 1, y0 - 1),
        frame.pixel_clamped(x0 + side + 1, y0 - 1),
        frame.pixel_clamped(x0 - 1, y0 + side + 1),
        frame.pixel_clamped(x0 + side + 1, y0 + side + 1),
    ];
    let white = corners.iter().fold(Rgb::new(1.0, 1.0, 1.0), |acc, p| {
        Rgb::new(acc.r.max(p.r), acc.g.max(p.g), acc.b.max(p.b))
    });

    Rgb::new(
        (mean.r / white.r * 255.0).clamp(0.0, 255.0),
        (mean.g / white.g * 255.0).clamp(0.0, 255.0),
        (mean.b / white.b * 255.0).clamp(0.0, 255.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn frame(width: usize, height: usize, bg: [u8; 3]) -> Vec<u8> {
        bg.iter().copied().cycle().take(width * height * 3).collect()
    }

    fn fill_disk(data: &mut [u8], width: usize, cx: f32, cy: f32, r: f32, c: [u8; 3]) {
        let height = data.len() / (3 * width);
        for y in 0..height {
            for x in 0..width {
                let (dx, dy) = (x as f32 - cx, y as f32 - cy);
                if dx * dx + dy * dy <= r * r {
                    let i = 3 * (y * width + x);
                    data[i..i + 3].copy_from_slice(&c);
                }
            }
        }
    }

    #[test]
    fn uniform_dot_on_white_paper() {
        let mut data = frame(40, 40, [255, 255, 255]);
        fill_disk(&mut data, 40, 20.0, 20.0, 6.0, [200, 30, 10]);
        let view = RgbImageView {
            width: 40,
            height: 40,
            data: &data,
        };
        let c = sample_dot_color(&view, &Keypoint::new(20.0, 20.0, 12.0));
        assert_abs_diff_eq!(c.r, 200.0, epsilon = 1e-3);
        assert_abs_diff_eq!(c.g, 30.0, epsilon = 1e-3);
        assert_abs_diff_eq!(c.b, 10.0, epsilon = 1e-3);
    }

    #[test]
    fn dim_paper_is_white_balanced() {
        let mut data = frame(40, 40, [200, 180, 160]);
        fill_disk(&mut data, 40, 20.0, 20.0, 6.0, [100, 18, 160]);
        let view = RgbImageView {
            width: 40,
            height: 40,
            data: &data,
        };
        let c = sample_dot_color(&view, &Keypoint::new(20.0, 20.0, 12.0));
        assert_abs_diff_eq!(c.r, 127.5, epsilon = 1e-3);
        assert_abs_diff_eq!(c.g, 25.5, epsilon = 1e-3);
        assert_abs_diff_eq!(c.b, 255.0, epsilon = 1e-3);
    }

    #[test]
    fn dot_at_frame_border_uses_visible_pixels() {
        let mut data = frame(20, 20, [255, 255, 255]);
        fill_disk(&mut data, 20, 0.0, 10.0, 6.0, [0, 0, 0]);
        let view = RgbImageView {
            width: 20,
            height: 20,
            data: &data,
        };
        let c = sample_dot_color(&view, &Keypoint::new(0.0, 10.0, 12.0));
        assert!(c.r < 1.0 && c.g < 1.0 && c.b < 1.0);
    }
}
