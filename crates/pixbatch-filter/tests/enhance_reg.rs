//! Enhancement regression test
//!
//! Tests the stateless transforms through the orchestrator:
//!   (1) Invert on a 2x2 RGB image, and inversion being an involution
//!   (2) Greyscale luma on a single pixel, on exact-half pixels and on a
//!       fixture image
//!   (3) sRGB curve fixed points and monotonicity
//!   (4) Identical output for every worker count

use pixbatch_core::{Channels, PixelBuffer};
use pixbatch_filter::{Orchestrator, Transform, luma, run, srgb_trc};
use pixbatch_test::{RegParams, load_test_image, synthetic_buffer};
use pretty_assertions::assert_eq;

#[test]
fn enhance_reg_invert_scenario() {
    let mut rp = RegParams::new("enhance_invert");

    let buf = PixelBuffer::from_bytes(
        2,
        2,
        Channels::Rgb,
        vec![0, 0, 0, 255, 255, 255, 128, 128, 128, 64, 64, 64],
    )
    .expect("2x2 buffer");
    let out = run(buf.clone(), Transform::Invert, 2).expect("invert");

    let expected = [[255u8, 255, 255], [0, 0, 0], [127, 127, 127], [191, 191, 191]];
    for (i, px) in expected.iter().enumerate() {
        let (x, y) = ((i % 2) as u32, (i / 2) as u32);
        rp.compare_strings(px, out.get_pixel(x, y).expect("pixel"));
    }

    // Applying invert twice restores the input
    let back = run(out, Transform::Invert, 1).expect("invert again");
    rp.compare_buffers(&buf, &back);

    assert!(rp.cleanup(), "enhance_invert regression test failed");
}

#[test]
fn enhance_reg_invert_all_values() {
    let mut rp = RegParams::new("enhance_invert_all");

    let buf = synthetic_buffer(16, 16, Channels::Gray, |x, y, _| (y * 16 + x) as u8);
    let out = run(buf, Transform::Invert, 5).expect("invert");
    for v in 0..=255u32 {
        let got = out.get_sample(v % 16, v / 16, 0).expect("sample");
        rp.compare_values((255 - v) as f64, got as f64, 0.0);
    }

    assert!(rp.cleanup(), "enhance_invert_all regression test failed");
}

#[test]
fn enhance_reg_greyscale_scenario() {
    let mut rp = RegParams::new("enhance_greyscale");

    let buf = PixelBuffer::from_bytes(1, 1, Channels::Rgb, vec![100, 150, 200]).expect("1x1");
    let out = run(buf, Transform::Greyscale, 4).expect("greyscale");
    rp.compare_strings(&[141, 141, 141], out.data());

    assert!(rp.cleanup(), "enhance_greyscale regression test failed");
}

#[test]
fn enhance_reg_greyscale_halves() {
    let mut rp = RegParams::new("enhance_greyscale_halves");

    // Luma of each pixel is exactly x.5 and rounds up
    let buf = PixelBuffer::from_bytes(
        3,
        1,
        Channels::Rgb,
        vec![0, 36, 12, 0, 80, 110, 0, 118, 81],
    )
    .expect("3x1 buffer");
    let out = run(buf, Transform::Greyscale, 2).expect("greyscale");
    rp.compare_strings(&[23, 23, 23, 60, 60, 60, 79, 79, 79], out.data());

    assert!(rp.cleanup(), "enhance_greyscale_halves regression test failed");
}

#[test]
fn enhance_reg_greyscale_fixture() {
    let mut rp = RegParams::new("enhance_greyscale_fixture");

    let image = load_test_image("tiny.ppm").expect("load tiny.ppm");
    let src = image.buffer().clone();
    let out = run(src.clone(), Transform::Greyscale, 3).expect("greyscale");

    for y in 0..src.height() {
        for x in 0..src.width() {
            let p = src.get_pixel(x, y).expect("src pixel");
            let q = out.get_pixel(x, y).expect("out pixel");
            let y_val = luma(p[0], p[1], p[2]);
            rp.compare_strings(&[y_val, y_val, y_val], q);
        }
    }
    let image = image.with_buffer(out).expect("same geometry");
    rp.write_image(&image, "grey").expect("write grey");

    // Single-channel images are already grey
    let pgm = load_test_image("tiny.pgm").expect("load tiny.pgm");
    let grey = run(pgm.buffer().clone(), Transform::Greyscale, 2).expect("greyscale pgm");
    rp.compare_buffers(pgm.buffer(), &grey);

    assert!(rp.cleanup(), "enhance_greyscale_fixture regression test failed");
}

#[test]
fn enhance_reg_srgb_properties() {
    let mut rp = RegParams::new("enhance_srgb");

    let zeros = PixelBuffer::new(5, 3, Channels::Rgb).expect("zeros");
    let out = run(zeros.clone(), Transform::GammaCorrect, 2).expect("srgb zeros");
    rp.compare_buffers(&zeros, &out);

    let ones = synthetic_buffer(5, 3, Channels::Rgb, |_, _, _| 255);
    let out = run(ones.clone(), Transform::GammaCorrect, 2).expect("srgb ones");
    rp.compare_buffers(&ones, &out);

    let ramp = synthetic_buffer(256, 1, Channels::Gray, |x, _, _| x as u8);
    let out = run(ramp, Transform::GammaCorrect, 1).expect("srgb ramp");
    let row = out.row(0);
    let monotonic = row.windows(2).all(|w| w[0] <= w[1]);
    rp.compare_values(1.0, if monotonic { 1.0 } else { 0.0 }, 0.0);
    rp.compare_strings(&srgb_trc(), row);

    assert!(rp.cleanup(), "enhance_srgb regression test failed");
}

#[test]
fn enhance_reg_worker_independence() {
    let mut rp = RegParams::new("enhance_workers");

    let buf = synthetic_buffer(13, 29, Channels::Rgb, |x, y, c| {
        ((x * 31 + y * 17 + c as u32 * 101) % 256) as u8
    });
    for transform in Transform::ALL {
        let reference = run(buf.clone(), transform, 1).expect("single worker");
        for workers in [2, 3, 4, 7, 29, 64] {
            let (out, summary) = Orchestrator::new(workers)
                .expect("orchestrator")
                .run_with_summary(buf.clone(), transform)
                .expect("run");
            rp.compare_values(workers.min(29) as f64, summary.workers() as f64, 0.0);
            rp.compare_buffers(&reference, &out);
        }
    }

    assert!(rp.cleanup(), "enhance_workers regression test failed");
}

#[test]
fn enhance_reg_summary_ranges() {
    let buf = PixelBuffer::new(3, 4, Channels::Gray).expect("buffer");
    let (_, summary) = Orchestrator::new(3)
        .expect("orchestrator")
        .run_with_summary(buf, Transform::Invert)
        .expect("run");
    let ranges: Vec<(u32, u32)> = summary.ranges.iter().map(|r| (r.start, r.end)).collect();
    assert_eq!(ranges, vec![(0, 1), (2, 2), (3, 3)]);
}
