use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Lab, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Categorical palette
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    (0..n).map(|i| palette_color(i, n)).collect()
}

/// The `i`-th colour of an `n`-colour palette.
pub fn palette_color(i: usize, n: usize) -> Color32 {
    let hue = (i as f32 / n.max(1) as f32) * 360.0 + 210.0;
    to_color32(Hsl::new(hue, 0.65, 0.55).into_color())
}

// ---------------------------------------------------------------------------
// Diverging "coolwarm" ramp for the correlation heatmap
// ---------------------------------------------------------------------------

const COOL: (f32, f32, f32) = (0.230, 0.299, 0.754);
const NEUTRAL: (f32, f32, f32) = (0.865, 0.865, 0.865);
const WARM: (f32, f32, f32) = (0.706, 0.016, 0.150);

/// Map a value in `[-1, 1]` to blue → grey → red, interpolated in Lab.
pub fn coolwarm(value: f64) -> Color32 {
    let t = value.clamp(-1.0, 1.0) as f32;
    let (from, to, amount) = if t < 0.0 {
        (COOL, NEUTRAL, t + 1.0)
    } else {
        (NEUTRAL, WARM, t)
    };
    let a: Lab = linear(from).into_color();
    let b: Lab = linear(to).into_color();
    let mixed: LinSrgb = a.mix(b, amount).into_color();
    to_color32(Srgb::from_linear(mixed))
}

fn linear((r, g, b): (f32, f32, f32)) -> LinSrgb {
    Srgb::new(r, g, b).into_linear()
}

/// Text colour that stays readable on top of `background`.
pub fn contrast_text(background: Color32) -> Color32 {
    let luma = 0.299 * background.r() as f32
        + 0.587 * background.g() as f32
        + 0.114 * background.b() as f32;
    if luma > 140.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

fn to_color32(rgb: Srgb) -> Color32 {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgb(channel(rgb.red), channel(rgb.green), channel(rgb.blue))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        let p = generate_palette(5);
        assert_eq!(p.len(), 5);
        assert_eq!(p[3], palette_color(3, 5));
    }

    #[test]
    fn coolwarm_endpoints() {
        let cold = coolwarm(-1.0);
        let hot = coolwarm(1.0);
        assert!(cold.b() > cold.r());
        assert!(hot.r() > hot.b());
        // out-of-range input is clamped
        assert_eq!(coolwarm(5.0), hot);
        let mid = coolwarm(0.0);
        assert!(mid.r().abs_diff(mid.b()) < 8);
    }

    #[test]
    fn contrast_text_flips_on_dark_backgrounds() {
        assert_eq!(contrast_text(Color32::WHITE), Color32::BLACK);
        assert_eq!(contrast_text(Color32::from_rgb(20, 20, 80)), Color32::WHITE);
    }
}
