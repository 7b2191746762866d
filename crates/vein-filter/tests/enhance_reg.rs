//! Tone curve and diffusion regression test
//!
//! Checks gamma / contrast TRC values and edge-preserving behaviour of the
//! anisotropic diffusion on synthetic images.

use vein_filter::{
    DiffusionParams, anisotropic_diffusion, gamma_trc, gamma_trc_pix, linear_trc, linear_trc_pix,
};
use vein_test::{RegParams, synth};

#[test]
fn enhance_reg_trc() {
    let mut rp = RegParams::new("enhance_trc");

    let lut = gamma_trc(2.2).unwrap();
    rp.compare_values(0.0, lut[0] as f64, 0.0);
    rp.compare_values(255.0, lut[255] as f64, 0.0);
    rp.compare_values(2.0, lut[30] as f64, 0.0);
    rp.compare_values(149.0, lut[200] as f64, 0.0);

    let lut = linear_trc(1.9, 0.0);
    rp.compare_values(255.0, lut[200] as f64, 0.0);
    rp.compare_values(4.0, lut[2] as f64, 0.0);

    let pix = synth::horizontal_stripe(16, 16, 30, 200, 5..=7);
    let out = linear_trc_pix(&gamma_trc_pix(&pix, 2.2).unwrap(), 1.9, 0.0).unwrap();
    rp.compare_values(255.0, out.get_pixel(3, 6).unwrap() as f64, 0.0);
    rp.compare_values(4.0, out.get_pixel(3, 0).unwrap() as f64, 0.0);

    assert!(rp.cleanup(), "enhance_trc regression test failed");
}

#[test]
fn enhance_reg_diffusion() {
    let mut rp = RegParams::new("enhance_diffusion");
    let params = DiffusionParams::default();

    let flat = synth::uniform(20, 20, 137);
    let out = anisotropic_diffusion(&flat, &params).unwrap();
    rp.compare_pix(&flat, &out);

    // Noise is reduced, the mean level is kept
    let noisy = synth::noise(40, 40, 100, 140, 7);
    let out = anisotropic_diffusion(&noisy, &params).unwrap();
    let spread = |p: &vein_core::Pix| {
        let vals: Vec<f64> = (1..39)
            .flat_map(|y| (1..39).map(move |x| (x, y)))
            .map(|(x, y)| p.get_pixel(x, y).unwrap() as f64)
            .collect();
        let m = vals.iter().sum::<f64>() / vals.len() as f64;
        (m, vals.iter().map(|v| (v - m).abs()).sum::<f64>() / vals.len() as f64)
    };
    let (m_in, s_in) = spread(&noisy);
    let (m_out, s_out) = spread(&out);
    rp.compare_values(m_in, m_out, 2.0);
    rp.compare_values(1.0, if s_out < s_in { 1.0 } else { 0.0 }, 0.0);

    // Border pixels pass through
    for x in 0..40 {
        rp.compare_values(
            noisy.get_pixel(x, 0).unwrap() as f64,
            out.get_pixel(x, 0).unwrap() as f64,
            0.0,
        );
    }

    assert!(rp.cleanup(), "enhance_diffusion regression test failed");
}
