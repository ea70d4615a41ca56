//! Small DSP helpers (denorm flush, clamping, table interpolation).

const DENORM_THRESH: f32 = 1.0e-20;

/// Flush denormals to zero. Non-finite values pass through untouched so that
/// divergence stays visible to the caller's guard.
#[inline(always)]
pub fn flush_denorm(x: f32) -> f32 {
    if x.abs() < DENORM_THRESH { 0.0 } else { x }
}

/// Clamp to `[min, max]`, mapping non-finite input to `fallback`.
#[inline]
pub fn clamp_finite(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if !value.is_finite() {
        return fallback;
    }
    value.clamp(min, max)
}

/// Linear interpolation into a table of `size + 1` entries, `x` in 0..=1.
#[inline]
pub fn interpolate(table: &[f32], x: f32, size: f32) -> f32 {
    let pos = (x * size).clamp(0.0, size);
    let idx = pos as usize;
    let frac = pos - idx as f32;
    let a = table[idx];
    let b = table[(idx + 1).min(table.len() - 1)];
    a + (b - a) * frac
}

/// Fractional part in `[0, 1)`.
#[inline]
pub fn wrap_unit(x: f32) -> f32 {
    let w = x - x.floor();
    if w >= 1.0 { 0.0 } else { w }
}
