use serde::{Deserialize, Serialize};

use crate::{dual::Dual, math::complex::Complex};

/// Per-region physical property tag.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    /// Display color, 0xRRGGBB. Has no effect on meshing.
    pub color: u32,
    /// Relative permittivity, used where there is no callback.
    pub epsilon: Complex<Dual>,
    /// Names a position-dependent property function.
    pub callback: Option<String>,
}

impl Material {
    pub const DEFAULT_COLOR: u32 = 0xe0e0ff;

    pub fn new(color: u32, epsilon: Complex<Dual>) -> Self {
        Material { color, epsilon, callback: None }
    }

    pub fn with_callback(mut self, callback: impl Into<String>) -> Self {
        self.callback = Some(callback.into());
        self
    }

    /// Set epsilon from one (real) or two (real, imaginary) values.
    /// Returns false for any other count.
    pub fn set_parameters(&mut self, values: &[Dual]) -> bool {
        match values {
            [re] => self.epsilon = Complex::re(*re),
            [re, im] => self.epsilon = Complex::new(*re, *im),
            _ => return false,
        }
        true
    }
}

impl Default for Material {
    fn default() -> Self {
        Material::new(Self::DEFAULT_COLOR, Complex::one())
    }
}

/// Derivatives are not part of a material's identity.
impl PartialEq for Material {
    fn eq(&self, other: &Self) -> bool {
        self.color == other.color
            && self.epsilon.v() == other.epsilon.v()
            && self.callback == other.callback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn equality_ignores_derivatives() {
        let mut a = Material::default();
        let mut b = Material::default();
        assert!(a.set_parameters(&[Dual::new(4., 1.)]));
        assert!(b.set_parameters(&[Dual::new(4., -3.)]));
        assert_eq!(a, b);
        b.color = 0xff0000;
        assert_ne!(a, b);
        assert_ne!(Material::default(), Material::default().with_callback("f"));
    }

    #[test]
    fn parameters() {
        let mut m = Material::default();
        assert_eq!(m.epsilon.v().re, 1.);
        assert!(m.set_parameters(&[Dual::constant(2.), Dual::constant(-0.5)]));
        assert_eq!(m.epsilon.v().im, -0.5);
        assert!(!m.set_parameters(&[]));
        assert!(!m.set_parameters(&[Dual::constant(1.); 3]));
    }
}
