//! Shared test utilities for the seatiles workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic grid and point-cloud generators
//! - Temporary output directories
//! - Common fixtures (bounding boxes, config snippets)
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

pub use generators::*;
pub use paths::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Assert that every pixel of an RGBA buffer has alpha 0.
#[macro_export]
macro_rules! assert_fully_transparent {
    ($pixels:expr) => {{
        let pixels: &[u8] = &$pixels;
        if let Some(pos) = pixels.chunks_exact(4).position(|p| p[3] != 0) {
            panic!("pixel {} is not transparent: {:?}", pos, &pixels[pos * 4..pos * 4 + 4]);
        }
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(0.0, 0.0, 0.0001);
        assert_approx_eq!(-5.5, -5.500001, 0.0001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }

    #[test]
    fn test_assert_fully_transparent() {
        assert_fully_transparent!(vec![0u8; 16]);
    }

    #[test]
    #[should_panic(expected = "is not transparent")]
    fn test_assert_fully_transparent_fails() {
        assert_fully_transparent!(vec![0u8, 0, 0, 0, 1, 2, 3, 255]);
    }
}
