use plotters::style::{HSLColor, RGBColor};
use serde::{Deserialize, Serialize};

// Viridis sampled at 0, 1/8, ..., 1.
const VIRIDIS_STOPS: [(u8, u8, u8); 9] = [
    (68, 1, 84),
    (71, 44, 122),
    (59, 81, 139),
    (44, 113, 142),
    (33, 144, 141),
    (39, 173, 129),
    (92, 200, 99),
    (170, 220, 50),
    (253, 231, 37),
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Colormap {
    #[default]
    Viridis,
    /// Blue (low) to red (high) hue ramp.
    Hsl,
}

impl Colormap {
    /// Colour for `t` in [0, 1]; out-of-range and NaN inputs are clamped.
    pub fn color(self, t: f64) -> RGBColor {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Colormap::Viridis => viridis(t),
            Colormap::Hsl => hsl_to_rgb(HSLColor((240.0 - 240.0 * t) / 360.0, 0.90, 0.45)),
        }
    }
}

fn viridis(t: f64) -> RGBColor {
    let pos = t * (VIRIDIS_STOPS.len() - 1) as f64;
    let i = (pos.floor() as usize).min(VIRIDIS_STOPS.len() - 2);
    let frac = pos - i as f64;
    let (r0, g0, b0) = VIRIDIS_STOPS[i];
    let (r1, g1, b1) = VIRIDIS_STOPS[i + 1];
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    RGBColor(lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
}

fn hsl_to_rgb(c: HSLColor) -> RGBColor {
    use plotters::style::Color;
    let (r, g, b) = c.rgb();
    RGBColor(r, g, b)
}

/// Relative luminance in [0, 1], used to pick readable annotation text.
pub fn luminance(c: RGBColor) -> f64 {
    let RGBColor(r, g, b) = c;
    (0.2126 * r as f64 + 0.7152 * g as f64 + 0.0722 * b as f64) / 255.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viridis_endpoints_match_stops() {
        assert_eq!(Colormap::Viridis.color(0.0), RGBColor(68, 1, 84));
        assert_eq!(Colormap::Viridis.color(1.0), RGBColor(253, 231, 37));
        assert_eq!(Colormap::Viridis.color(0.5), RGBColor(33, 144, 141));
    }

    #[test]
    fn clamps_out_of_range() {
        assert_eq!(Colormap::Viridis.color(-3.0), Colormap::Viridis.color(0.0));
        assert_eq!(Colormap::Viridis.color(7.0), Colormap::Viridis.color(1.0));
        assert_eq!(Colormap::Hsl.color(f64::NAN), Colormap::Hsl.color(0.0));
    }

    #[test]
    fn viridis_brightens_monotonically() {
        let mut last = -1.0;
        for i in 0..=32 {
            let l = luminance(Colormap::Viridis.color(i as f64 / 32.0));
            assert!(l >= last - 1e-3, "luminance dropped at step {i}");
            last = l;
        }
    }

    #[test]
    fn hsl_runs_blue_to_red() {
        let RGBColor(r0, _, b0) = Colormap::Hsl.color(0.0);
        let RGBColor(r1, _, b1) = Colormap::Hsl.color(1.0);
        assert!(b0 > r0);
        assert!(r1 > b1);
    }
}
