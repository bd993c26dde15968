//! Monospace-over-proportional-font digit layout for numeric screens (§4.7).
//!
//! Resolves §9's "inconsistent moduli" note against `original_source/hw_interface/screen_handler.py`'s
//! `ScreenDrawer.draw_tuning_window`: glyphs are drawn with a narrow proportional font, but a digit
//! cursor needs to land under a fixed-width slot. Past the decimal point the narrower point glyph
//! leaves a 6px gap that has to be added back in, or every cursor from that digit on drifts left.

/// Pixel x-offset of the digit slot at logical cursor position `cursor_pos`, relative to `base_x`.
///
/// Each digit slot is 11px wide; once `cursor_pos` has passed the decimal point (slot 4) an extra
/// 6px compensates for the point glyph being narrower than a digit.
pub fn monospace_digit_x(base_x: i32, cursor_pos: u8) -> i32 {
    base_x + cursor_pos as i32 * 11 + (cursor_pos >= 4) as i32 * 6
}
