use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

/// Peak marker colour (CSS "Crimson").
pub const PEAK_COLOR: Color32 = Color32::from_rgb(220, 20, 60);

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n).map(|i| hue_color(i as f32 / n as f32 * 360.0)).collect()
}

fn hue_color(hue: f32) -> Color32 {
    let hsl = Hsl::new(hue, 0.65, 0.45);
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size_and_distinct_colours() {
        assert!(generate_palette(0).is_empty());
        let p = generate_palette(4);
        assert_eq!(p.len(), 4);
        for (i, a) in p.iter().enumerate() {
            for b in &p[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
