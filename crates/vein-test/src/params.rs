//! Check bookkeeping for one regression test

use std::fs;

use vein_core::Pix;

use crate::regout_dir;

/// Collects the outcome of every check in a `*_reg` test.
///
/// Checks never panic; a failed check is recorded and printed, and the
/// test asserts on [`RegParams::cleanup`] once at the end so every
/// mismatch shows up in a single run.
pub struct RegParams {
    pub test_name: String,
    checks: usize,
    failures: Vec<String>,
}

impl RegParams {
    /// Start a test named `test_name` and make sure the scratch directory
    /// exists.
    pub fn new(test_name: &str) -> Self {
        let _ = fs::create_dir_all(regout_dir());
        eprintln!("==== {}_reg ====", test_name);

        Self {
            test_name: test_name.to_string(),
            checks: 0,
            failures: Vec::new(),
        }
    }

    fn fail(&mut self, detail: String) -> bool {
        let msg = format!("{}_reg check {}: {}", self.test_name, self.checks, detail);
        eprintln!("{}", msg);
        self.failures.push(msg);
        false
    }

    /// Check that `actual` lies within `delta` of `expected`.
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        self.checks += 1;
        let diff = (expected - actual).abs();
        // NaN never compares within delta
        if diff <= delta {
            return true;
        }
        self.fail(format!(
            "expected {}, got {} (diff {} > delta {})",
            expected, actual, diff, delta
        ))
    }

    /// Check that two images have the same size, depth and pixels.
    ///
    /// On mismatch the first differing pixel and the number of differing
    /// pixels are reported.
    pub fn compare_pix(&mut self, expected: &Pix, actual: &Pix) -> bool {
        self.checks += 1;
        if expected.dimensions() != actual.dimensions() || expected.depth() != actual.depth() {
            return self.fail(format!(
                "expected {:?} at {} bpp, got {:?} at {} bpp",
                expected.dimensions(),
                expected.depth().bits(),
                actual.dimensions(),
                actual.depth().bits()
            ));
        }

        let (w, h) = expected.dimensions();
        let mut first = None;
        let mut differing = 0usize;
        for y in 0..h {
            for x in 0..w {
                let (a, b) = (expected.get_pixel_unchecked(x, y), actual.get_pixel_unchecked(x, y));
                if a != b {
                    differing += 1;
                    first.get_or_insert((x, y, a, b));
                }
            }
        }

        match first {
            None => true,
            Some((x, y, a, b)) => self.fail(format!(
                "{} pixels differ, first at ({}, {}): expected {}, got {}",
                differing, x, y, a, b
            )),
        }
    }

    /// Whether every check so far has passed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    /// Print the summary and return whether the whole test passed.
    pub fn cleanup(self) -> bool {
        let ok = self.is_success();
        if ok {
            eprintln!("{}_reg: {} checks passed", self.test_name, self.checks);
        } else {
            eprintln!(
                "{}_reg: {} of {} checks failed",
                self.test_name,
                self.failures.len(),
                self.checks
            );
            for failure in &self.failures {
                eprintln!("  {}", failure);
            }
        }
        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vein_core::PixelDepth;

    #[test]
    fn test_compare_values() {
        let mut rp = RegParams::new("params_values");
        assert!(rp.compare_values(100.0, 100.0, 0.0));
        assert!(rp.compare_values(100.0, 100.5, 1.0));
        assert!(rp.is_success());
        assert!(!rp.compare_values(100.0, 200.0, 0.0));
        assert!(!rp.compare_values(0.0, f64::NAN, 1.0));
        assert_eq!(rp.failures().len(), 2);
        assert!(!rp.cleanup());
    }

    #[test]
    fn test_compare_pix_reports_mismatch() {
        let mut rp = RegParams::new("params_pix");
        let a = Pix::new(6, 4, PixelDepth::Bit8).unwrap();
        let mut pm = a.to_mut();
        pm.set_pixel_unchecked(3, 2, 9);
        pm.set_pixel_unchecked(5, 3, 9);
        let b: Pix = pm.into();

        assert!(rp.compare_pix(&a, &a.clone()));
        assert!(!rp.compare_pix(&a, &b));
        assert!(rp.failures()[0].contains("2 pixels differ, first at (3, 2)"));

        let small = Pix::new(6, 3, PixelDepth::Bit8).unwrap();
        assert!(!rp.compare_pix(&a, &small));
        assert_eq!(rp.failures().len(), 2);
        assert!(!rp.cleanup());
    }
}
