//! Wedge-and-label rendering of the wheel onto an abstract surface.
//!
//! The renderer is a pure function of the wheel and the rotation angle, so
//! redrawing after a clear reproduces the same image. The orientation
//! matches [`crate::angle::sector_index`]: the wedge under the fixed north
//! pointer at rotation `a` belongs to sector `sector_index(a, total)`.

use itertools::Itertools;

use crate::angle::{self, TAU};
use crate::wheel::{Sector, WheelState};

/// Slight wedge overlap so adjacent fills leave no seam.
const SEAM_EPSILON: f64 = 0.003;
/// The pointer sits north; canvas angle zero is east.
const POINTER_OFFSET: f64 = TAU * 0.75;
/// Labels sit near the outer edge of their wedge.
const LABEL_RADIUS: f64 = 0.72;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };

    /// Parse `#rrggbb`. Anything else is `None`; callers fall back to white
    /// rather than failing a draw over a bad config color.
    pub fn from_hex(raw: &str) -> Option<Rgb> {
        let hex = raw.strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Rgb { r, g, b })
    }
}

pub fn sector_color(sector: &Sector) -> Rgb {
    Rgb::from_hex(&sector.color).unwrap_or(Rgb::WHITE)
}

/// Drawing target. Coordinates are centered on the wheel hub, y up.
pub trait Surface {
    fn plot(&mut self, x: f64, y: f64, color: Rgb);
    fn label(&mut self, x: f64, y: f64, text: &str, color: Rgb);
}

#[derive(Clone, Copy, Debug)]
pub struct SectorRenderer {
    pub radius: f64,
}

impl SectorRenderer {
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }

    /// Draw the full wheel at the given absolute rotation. Mutates only the
    /// surface.
    pub fn draw(&self, wheel: &WheelState, rotation: f64, surface: &mut impl Surface) {
        let total = wheel.total();
        if total == 0 {
            return;
        }
        let arc = angle::arc_width(total);

        for (index, sector) in wheel.sectors().iter().enumerate() {
            let color = sector_color(sector);
            let start = arc * index as f64 - SEAM_EPSILON;
            let span = arc + 2.0 * SEAM_EPSILON;

            // Fine enough to leave no radial gaps at the rim.
            let sweep_steps = (span * self.radius * 2.0).ceil().max(1.0) as usize;
            let radial_steps = self.radius.ceil().max(1.0) as usize;
            for (step, ring) in (0..=sweep_steps).cartesian_product(1..=radial_steps) {
                let theta = start + span * step as f64 / sweep_steps as f64;
                let (x, y) = self.project(theta, rotation, ring as f64);
                surface.plot(x, y, color);
            }

            let bisector = arc * index as f64 + arc / 2.0;
            let (x, y) = self.project(bisector, rotation, self.radius * LABEL_RADIUS);
            surface.label(x, y, &sector.label, Rgb::WHITE);
        }

        // Fixed pointer just above the rim.
        surface.label(0.0, self.radius + 2.0, "▼", Rgb::WHITE);
    }

    /// Wedge-local angle to surface coordinates. The y flip keeps the
    /// drawing order and `sector_index` agreeing on a y-up surface.
    fn project(&self, theta: f64, rotation: f64, r: f64) -> (f64, f64) {
        let screen = theta + rotation + POINTER_OFFSET;
        (r * screen.cos(), -r * screen.sin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;
    use std::collections::HashMap;

    #[derive(Default, PartialEq, Debug)]
    struct GridSurface {
        pixels: HashMap<(i32, i32), Rgb>,
        labels: Vec<(i32, i32, String)>,
    }

    impl Surface for GridSurface {
        fn plot(&mut self, x: f64, y: f64, color: Rgb) {
            self.pixels.insert((x.round() as i32, y.round() as i32), color);
        }
        fn label(&mut self, x: f64, y: f64, text: &str, _color: Rgb) {
            self.labels
                .push((x.round() as i32, y.round() as i32, text.to_string()));
        }
    }

    fn wheel(colors: &[&str]) -> WheelState {
        let sectors = colors
            .iter()
            .enumerate()
            .map(|(i, color)| Sector {
                label: format!("s{i}"),
                color: color.to_string(),
                message: None,
                function: String::from("builtins.default"),
                args: Map::new(),
            })
            .collect();
        WheelState::new(sectors, "v1")
    }

    #[test]
    fn from_hex__parses_and_rejects() {
        assert_eq!(
            Rgb::from_hex("#336699"),
            Some(Rgb {
                r: 0x33,
                g: 0x66,
                b: 0x99
            })
        );
        assert_eq!(Rgb::from_hex("336699"), None);
        assert_eq!(Rgb::from_hex("#33669"), None);
        assert_eq!(Rgb::from_hex("#zzzzzz"), None);
    }

    #[test]
    fn draw__is_idempotent() {
        let wheel = wheel(&["#ff0000", "#00ff00", "#0000ff"]);
        let renderer = SectorRenderer::new(20.0);

        let mut first = GridSurface::default();
        renderer.draw(&wheel, 1.234, &mut first);
        let mut second = GridSurface::default();
        renderer.draw(&wheel, 1.234, &mut second);

        assert!(!first.pixels.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn draw__sector_under_pointer_matches_sector_index() {
        let colors = ["#ff0000", "#00ff00", "#0000ff", "#ffff00"];
        let wheel = wheel(&colors);
        let renderer = SectorRenderer::new(30.0);
        let arc = angle::arc_width(4);

        // Sample rotations well inside each wedge.
        for k in 0..8 {
            let rotation = arc * k as f64 / 2.0 + arc / 4.0;
            let mut surface = GridSurface::default();
            renderer.draw(&wheel, rotation, &mut surface);

            // Point just inside the rim, straight under the north pointer.
            let under_pointer = surface.pixels.get(&(0, 28)).copied();
            let expected = angle::sector_index(rotation, 4);
            assert_eq!(
                under_pointer,
                Some(sector_color(&wheel.sectors()[expected])),
                "rotation {rotation} should land on sector {expected}"
            );
        }
    }

    #[test]
    fn draw__labels_every_sector_once() {
        let wheel = wheel(&["#ff0000", "#00ff00"]);
        let renderer = SectorRenderer::new(15.0);
        let mut surface = GridSurface::default();
        renderer.draw(&wheel, 0.0, &mut surface);

        let names: Vec<_> = surface
            .labels
            .iter()
            .map(|(_, _, text)| text.as_str())
            .collect();
        assert!(names.contains(&"s0"));
        assert!(names.contains(&"s1"));
        assert!(names.contains(&"▼"));
    }
}
