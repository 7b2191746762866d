//! Gabor bank regression test
//!
//! Builds the four-orientation bank, checks the response of flat and
//! striped inputs and the windowed statistics and median helpers used
//! downstream.

use std::f64::consts::FRAC_PI_4;

use vein_filter::{
    BorderPolicy, GaborParams, Kernel, blend_gray, gabor_bank_response, local_mean_std,
    median_filter,
};
use vein_test::{RegParams, synth};

fn bank() -> Vec<Kernel> {
    (0..4)
        .map(|i| {
            let mut k = Kernel::gabor(&GaborParams {
                theta: i as f64 * FRAC_PI_4,
                ..Default::default()
            })
            .unwrap();
            k.normalize_by_sum(1.5).unwrap();
            k
        })
        .collect()
}

#[test]
fn gabor_reg_bank() {
    let mut rp = RegParams::new("gabor_bank");
    let kernels = bank();

    for k in &kernels {
        rp.compare_values(1.0 / 1.5, k.sum() as f64, 1e-4);
    }

    // A flat field responds with value / 1.5
    let flat = synth::uniform(32, 32, 205);
    let resp = gabor_bank_response(&flat, &kernels, BorderPolicy::Replicate).unwrap();
    rp.compare_values(137.0, resp.get_pixel(0, 0).unwrap() as f64, 0.0);
    rp.compare_values(137.0, resp.get_pixel(16, 16).unwrap() as f64, 0.0);
    let resp = gabor_bank_response(&flat, &kernels, BorderPolicy::Reflect101).unwrap();
    rp.compare_values(137.0, resp.get_pixel(0, 31).unwrap() as f64, 0.0);

    // Zero border leaves pixels whose footprint is inside the image alone
    let resp = gabor_bank_response(&flat, &kernels, BorderPolicy::Zero).unwrap();
    rp.compare_values(137.0, resp.get_pixel(16, 16).unwrap() as f64, 0.0);

    // A horizontal band answers more strongly at its center than far away
    let stripe = synth::horizontal_stripe(64, 64, 20, 160, 28..=35);
    let resp = gabor_bank_response(&stripe, &kernels, BorderPolicy::Replicate).unwrap();
    let center = resp.get_pixel(32, 31).unwrap();
    let far = resp.get_pixel(32, 2).unwrap();
    rp.compare_values(1.0, if center > far { 1.0 } else { 0.0 }, 0.0);

    let blended = blend_gray(&stripe, 0.95, &resp, 0.05).unwrap();
    // 0.95 * 20 + 0.05 * 13
    rp.compare_values(20.0, blended.get_pixel(32, 2).unwrap() as f64, 0.0);

    let mut bad = Kernel::from_slice(3, 1, &[1.0, -2.0, 1.0]).unwrap();
    rp.compare_values(
        1.0,
        if bad.normalize_by_sum(1.5).is_err() { 1.0 } else { 0.0 },
        0.0,
    );

    assert!(rp.cleanup(), "gabor_bank regression test failed");
}

#[test]
fn gabor_reg_stats_and_median() {
    let mut rp = RegParams::new("gabor_stats");

    let pix = synth::horizontal_stripe(50, 50, 10, 210, 20..=29);
    let stats = local_mean_std(&pix, 31).unwrap();
    // Far from the band the window still sees it; at the corner it does not
    rp.compare_values(10.0, stats.mean.get_pixel(0, 0).unwrap() as f64, 1e-4);
    rp.compare_values(0.0, stats.std_dev.get_pixel(0, 0).unwrap() as f64, 1e-4);
    // At the band center the 31-row window (rows 9..=39) holds 10 bright rows
    let expected_mean = (10.0 * 210.0 + 21.0 * 10.0) / 31.0;
    rp.compare_values(expected_mean, stats.mean.get_pixel(25, 24).unwrap() as f64, 1e-3);

    let bin = synth::binary_squares(30, 30, &[(5, 5, 1), (15, 15, 10)])
        .convert_to_8()
        .unwrap();
    let med = median_filter(&bin, 5, 5).unwrap();
    rp.compare_values(0.0, med.get_pixel(5, 5).unwrap() as f64, 0.0);
    rp.compare_values(255.0, med.get_pixel(20, 20).unwrap() as f64, 0.0);

    assert!(rp.cleanup(), "gabor_stats regression test failed");
}
