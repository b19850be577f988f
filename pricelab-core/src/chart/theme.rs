//! Dark chart theme and colour scales.

use plotters::style::RGBColor;

pub const BACKGROUND: RGBColor = RGBColor(17, 17, 17);
pub const PLOT_BACKGROUND: RGBColor = RGBColor(26, 26, 26);
pub const GRID: RGBColor = RGBColor(40, 52, 66);
pub const GRID_LIGHT: RGBColor = RGBColor(31, 36, 44);
pub const TEXT: RGBColor = RGBColor(242, 245, 250);
pub const BULL: RGBColor = RGBColor(38, 166, 154);
pub const BEAR: RGBColor = RGBColor(239, 83, 80);
pub const BENCHMARK: RGBColor = RGBColor(255, 165, 0);
pub const MISSING: RGBColor = RGBColor(90, 90, 90);

pub const FONT: &str = "sans-serif";
pub const TITLE_SIZE: u32 = 24;
pub const LABEL_SIZE: u32 = 14;

const PALETTE: [RGBColor; 8] = [
    RGBColor(99, 110, 250),
    RGBColor(239, 85, 59),
    RGBColor(0, 204, 150),
    RGBColor(171, 99, 250),
    RGBColor(255, 161, 90),
    RGBColor(25, 211, 243),
    RGBColor(255, 102, 146),
    RGBColor(182, 232, 128),
];

/// Panel colours for the side-by-side benchmark grid.
const PANEL_PALETTE: [RGBColor; 4] = [
    RGBColor(255, 107, 107),
    RGBColor(78, 205, 196),
    RGBColor(69, 183, 209),
    RGBColor(150, 206, 180),
];

/// Line colour for the `i`-th series.
pub fn series_color(i: usize) -> RGBColor {
    PALETTE[i % PALETTE.len()]
}

pub fn panel_color(i: usize) -> RGBColor {
    PANEL_PALETTE[i % PANEL_PALETTE.len()]
}

/// Red-white-blue diverging scale centred at zero: -1 red, 0 white, +1 blue.
pub fn diverging(value: f64) -> RGBColor {
    const STOPS: [(f64, (u8, u8, u8)); 5] = [
        (-1.0, (103, 0, 31)),
        (-0.5, (214, 96, 77)),
        (0.0, (247, 247, 247)),
        (0.5, (67, 147, 195)),
        (1.0, (5, 48, 97)),
    ];

    if !value.is_finite() {
        return MISSING;
    }
    let v = value.clamp(-1.0, 1.0);
    for pair in STOPS.windows(2) {
        let (lo, c0) = pair[0];
        let (hi, c1) = pair[1];
        if v <= hi {
            let t = (v - lo) / (hi - lo);
            let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
            return RGBColor(mix(c0.0, c1.0), mix(c0.1, c1.1), mix(c0.2, c1.2));
        }
    }
    let (_, c) = STOPS[STOPS.len() - 1];
    RGBColor(c.0, c.1, c.2)
}

/// Readable annotation colour on top of a diverging-scale cell.
pub fn contrast_text(value: f64) -> RGBColor {
    if value.is_finite() && value.abs() < 0.5 {
        RGBColor(20, 20, 20)
    } else {
        TEXT
    }
}
