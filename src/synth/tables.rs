//! Read-only lookup tables shared by every resonator, built once on first use.
//!
//! Both tables have `TABLE_SIZE + 1` entries so that `util::interpolate` can
//! read one past the last segment.

use std::sync::LazyLock;

/// Number of segments in each table.
pub const TABLE_SIZE: usize = 256;

/// Peak (negative) stiffness in the compressed-partials region of geometry.
const MAX_COMPRESSION: f32 = 0.045;

/// Per-mode stretch increment as a function of geometry.
///
/// - `0.0`: exactly zero, a pure harmonic series.
/// - `(0, 0.25)`: negative, partials compressed (membrane-like).
/// - `[0.25, 0.3)`: zero plateau, harmonic string.
/// - `[0.3, 0.9)`: exponential rise toward a stiff bar.
/// - `[0.9, 1]`: raised-cosine toward 2.0, bell/plate inharmonicity.
pub static STIFFNESS: LazyLock<[f32; TABLE_SIZE + 1]> = LazyLock::new(|| {
    let mut table = [0.0; TABLE_SIZE + 1];
    for (i, v) in table.iter_mut().enumerate() {
        let g = i as f64 / TABLE_SIZE as f64;
        let s = if g < 0.25 {
            let x = g / 0.25;
            -(MAX_COMPRESSION as f64) * 4.0 * x * (1.0 - x)
        } else if g < 0.3 {
            0.0
        } else if g < 0.9 {
            let x = (g - 0.3) / 0.6;
            0.01 * 10f64.powf(x * 2.005) - 0.01
        } else {
            let x = (g - 0.9) / 0.1;
            let x = x * x;
            1.5 - (x * std::f64::consts::PI).cos() / 2.0
        };
        *v = s as f32;
    }
    table[TABLE_SIZE] = 2.0;
    table[TABLE_SIZE - 1] = 2.0;
    table
});

/// `10^(4x)` for `x` in 0..=1: four decades of resonance range.
pub static FOUR_DECADES: LazyLock<[f32; TABLE_SIZE + 1]> = LazyLock::new(|| {
    let mut table = [0.0; TABLE_SIZE + 1];
    for (i, v) in table.iter_mut().enumerate() {
        let x = i as f64 / TABLE_SIZE as f64;
        *v = 10f64.powf(4.0 * x) as f32;
    }
    table
});
