//! I/O formats regression test
//!
//! Tests format detection and read/write roundtrips for every supported
//! format, on synthetic images.

use vein_core::{ImageFormat, Pix, PixelDepth};
use vein_io::{
    detect_format, detect_format_from_bytes, read_image, read_image_mem, write_image,
    write_image_auto, write_image_mem,
};
use vein_test::{RegParams, regout_path, synth};

#[test]
fn ioformats_reg_memory_roundtrip() {
    let mut rp = RegParams::new("ioformats_mem");

    let pix = synth::horizontal_ramp(37, 11);
    for format in [ImageFormat::Png, ImageFormat::Bmp, ImageFormat::Pnm] {
        let bytes = write_image_mem(&pix, format).expect("write_image_mem");
        let detected = detect_format_from_bytes(&bytes).expect("detect");
        rp.compare_values(1.0, if detected == format { 1.0 } else { 0.0 }, 0.0);

        let pix2 = read_image_mem(&bytes).expect("read_image_mem");
        rp.compare_pix(&pix, &pix2);
        rp.compare_values(1.0, if pix2.informat() == format { 1.0 } else { 0.0 }, 0.0);
    }

    // Lossy: only check size and approximate value
    let flat = synth::uniform(24, 16, 128);
    let bytes = write_image_mem(&flat, ImageFormat::Jpeg).expect("write jpeg");
    let pix2 = read_image_mem(&bytes).expect("read jpeg");
    rp.compare_values(24.0, pix2.width() as f64, 0.0);
    rp.compare_values(16.0, pix2.height() as f64, 0.0);
    rp.compare_values(128.0, pix2.get_pixel(12, 8).unwrap() as f64, 2.0);

    assert!(rp.cleanup(), "ioformats_mem regression test failed");
}

#[test]
fn ioformats_reg_files() {
    let mut rp = RegParams::new("ioformats_files");

    let dir = regout_path("ioformats");
    std::fs::create_dir_all(&dir).unwrap();

    let pix = synth::horizontal_stripe(40, 30, 30, 200, 10..=14);

    let png_path = format!("{}/stripe.png", dir);
    write_image_auto(&pix, &png_path).expect("write png");
    rp.compare_values(
        1.0,
        if detect_format(&png_path).unwrap() == ImageFormat::Png {
            1.0
        } else {
            0.0
        },
        0.0,
    );
    let back = read_image(&png_path).expect("read png");
    rp.compare_pix(&pix, &back);

    // Extension does not decide the decoder
    let mislabeled = format!("{}/stripe_really_bmp.png", dir);
    write_image(&pix, &mislabeled, ImageFormat::Bmp).expect("write bmp");
    let back = read_image(&mislabeled).expect("read bmp");
    rp.compare_pix(&pix, &back);
    rp.compare_values(1.0, if back.informat() == ImageFormat::Bmp { 1.0 } else { 0.0 }, 0.0);

    // Unknown extension is refused
    let bad = format!("{}/stripe.xyz", dir);
    rp.compare_values(1.0, if write_image_auto(&pix, &bad).is_err() { 1.0 } else { 0.0 }, 0.0);

    // Missing file
    let missing = format!("{}/does_not_exist.png", dir);
    rp.compare_values(1.0, if read_image(&missing).is_err() { 1.0 } else { 0.0 }, 0.0);

    assert!(rp.cleanup(), "ioformats_files regression test failed");
}

#[test]
fn ioformats_reg_binary_and_rgb() {
    let mut rp = RegParams::new("ioformats_depths");

    let bin = synth::binary_squares(33, 9, &[(2, 2, 4), (30, 5, 3)]);
    let bytes = write_image_mem(&bin, ImageFormat::Pnm).unwrap();
    let back = read_image_mem(&bytes).unwrap();
    rp.compare_pix(&bin, &back);

    let mut pm = Pix::new(6, 6, PixelDepth::Bit32).unwrap().try_into_mut().unwrap();
    pm.set_rgb(5, 5, 12, 34, 56).unwrap();
    let rgb: Pix = pm.into();
    for format in [ImageFormat::Png, ImageFormat::Bmp, ImageFormat::Pnm] {
        let bytes = write_image_mem(&rgb, format).unwrap();
        let back = read_image_mem(&bytes).unwrap();
        rp.compare_values(32.0, back.depth().bits() as f64, 0.0);
        let (r, g, b) = back.get_rgb(5, 5).unwrap();
        rp.compare_values(12.0, r as f64, 0.0);
        rp.compare_values(34.0, g as f64, 0.0);
        rp.compare_values(56.0, b as f64, 0.0);
    }

    assert!(rp.cleanup(), "ioformats_depths regression test failed");
}
