//! Target-size arithmetic shared by the resize passes.
//!
//! Every function returns the input unchanged when it already fits and never returns a zero
//! edge.

/// Cap the width at `max_width`, scaling the height proportionally.
pub fn fit_width(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width || width == 0 {
        return (width, height);
    }
    let new_height = (u64::from(height) * u64::from(max_width) / u64::from(width)) as u32;
    (max_width.max(1), new_height.max(1))
}

/// Scale down to fit a `max_width` × `max_height` box, preserving aspect ratio.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if (width <= max_width && height <= max_height) || width == 0 || height == 0 {
        return (width, height);
    }
    let ratio =
        (f64::from(max_width) / f64::from(width)).min(f64::from(max_height) / f64::from(height));
    scale(width, height, ratio)
}

/// Scale down so the longer side equals `max_side`.
pub fn fit_longest_side(width: u32, height: u32, max_side: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max_side || longest == 0 {
        return (width, height);
    }
    scale(width, height, f64::from(max_side) / f64::from(longest))
}

/// Round an edge down to an even number, never below one.
pub fn even(edge: u32) -> u32 {
    if edge <= 1 {
        1
    } else {
        edge - edge % 2
    }
}

fn scale(width: u32, height: u32, ratio: f64) -> (u32, u32) {
    let new_width = (f64::from(width) * ratio).floor() as u32;
    let new_height = (f64::from(height) * ratio).floor() as u32;
    (new_width.max(1), new_height.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_width_scales_height() {
        assert_eq!(fit_width(2000, 1000, 1200), (1200, 600));
        assert_eq!(fit_width(800, 600, 1200), (800, 600));
        assert_eq!(fit_width(5000, 1, 100), (100, 1));
    }

    #[test]
    fn fit_within_uses_tighter_bound() {
        assert_eq!(fit_within(1600, 1200, 800, 600), (800, 600));
        assert_eq!(fit_within(1000, 2000, 800, 600), (300, 600));
        assert_eq!(fit_within(640, 480, 800, 600), (640, 480));
    }

    #[test]
    fn fit_within_keeps_aspect_ratio_within_a_pixel() {
        let (w, h) = fit_within(3000, 1999, 1200, 1000);
        let expected_h = f64::from(w) * 1999.0 / 3000.0;
        assert!((f64::from(h) - expected_h).abs() <= 1.0);
    }

    #[test]
    fn fit_longest_side_handles_portrait_and_landscape() {
        assert_eq!(fit_longest_side(8000, 4000, 4000), (4000, 2000));
        assert_eq!(fit_longest_side(3000, 6000, 4000), (2000, 4000));
        assert_eq!(fit_longest_side(300, 300, 4000), (300, 300));
    }

    #[test]
    fn even_rounds_down_but_not_to_zero() {
        assert_eq!(even(801), 800);
        assert_eq!(even(600), 600);
        assert_eq!(even(1), 1);
        assert_eq!(even(0), 1);
    }
}
