//! pixbatch-test - Regression test framework for pixbatch
//!
//! Tracks a numbered sequence of checks for one regression test and
//! reports every failure at the end instead of stopping at the first one.
//! Two modes are supported:
//!
//! - **Compare**: Run the checks (default)
//! - **Display**: Run the checks and also write intermediate images to
//!   the regout directory for visual inspection
//!
//! # Usage
//!
//! ```ignore
//! use pixbatch_test::{RegParams, load_test_image};
//!
//! let mut rp = RegParams::new("invert");
//! let image = load_test_image("tiny.ppm").unwrap();
//! rp.compare_values(4.0, image.buffer().width() as f64, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "compare" or "display"

mod error;
mod params;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

use pixbatch_core::{Channels, PixelBuffer};
use pixbatch_io::PnmImage;

/// Load a test image from the test data directory
///
/// # Arguments
///
/// * `name` - Image filename (e.g., "tiny.ppm")
pub fn load_test_image(name: &str) -> TestResult<PnmImage> {
    let path = test_data_path(name);
    pixbatch_io::read_image(&path).map_err(|e| TestError::ImageLoad {
        path: path.clone(),
        message: e.to_string(),
    })
}

/// Build a buffer whose samples follow `f(x, y, c)`.
///
/// # Panics
///
/// Panics if the dimensions are invalid; fixtures are expected to be valid.
pub fn synthetic_buffer(
    width: u32,
    height: u32,
    channels: Channels,
    f: impl Fn(u32, u32, usize) -> u8,
) -> PixelBuffer {
    let mut buf = PixelBuffer::new(width, height, channels).expect("valid fixture dimensions");
    for y in 0..height {
        for x in 0..width {
            for c in 0..channels.samples() {
                let idx = buf.offset(x, y, c);
                buf.data_mut()[idx] = f(x, y, c);
            }
        }
    }
    buf
}

/// Get the path to the workspace root
fn workspace_root() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    // pixbatch-test is at crates/pixbatch-test, so go up two directories
    format!("{}/../..", manifest_dir)
}

/// Get the path to a test data file
pub fn test_data_path(name: &str) -> String {
    format!("{}/tests/data/images/{}", workspace_root(), name)
}

/// Get the path to the regout (regression output) directory
pub fn regout_dir() -> String {
    format!("{}/tests/regout", workspace_root())
}
