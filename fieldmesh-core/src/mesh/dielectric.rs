//! Position-dependent material properties.
//!
//! A material with a callback name has its permittivity computed per mesh
//! point by a [`PropertyEvaluator`], typically a scripting engine.

use std::collections::BTreeSet;

use log::{debug, warn};

use crate::{dual::Dual, error::EvaluatorError, math::complex::Complex, mesh::Mesh};

/// Result of one callback: real parts, and optionally imaginary parts, one
/// per point.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyValues {
    pub re: Vec<Dual>,
    pub im: Option<Vec<Dual>>,
}

impl PropertyValues {
    pub fn real(re: Vec<Dual>) -> Self {
        PropertyValues { re, im: None }
    }
    pub fn complex(re: Vec<Dual>, im: Vec<Dual>) -> Self {
        PropertyValues { re, im: Some(im) }
    }
}

pub trait PropertyEvaluator {
    /// Evaluate `callback` at the points (xs[i], ys[i]).
    fn evaluate(&mut self, callback: &str, xs: &[Dual], ys: &[Dual]) -> Result<PropertyValues, EvaluatorError>;
}

impl<F> PropertyEvaluator for F
where
    F: FnMut(&str, &[Dual], &[Dual]) -> Result<PropertyValues, EvaluatorError>,
{
    fn evaluate(&mut self, callback: &str, xs: &[Dual], ys: &[Dual]) -> Result<PropertyValues, EvaluatorError> {
        self(callback, xs, ys)
    }
}

impl Mesh {
    /// Fill [`Mesh::dielectric`] from the material callbacks. If any
    /// callback fails the whole result is dropped with a warning.
    pub fn evaluate_dielectric(&mut self, evaluator: &mut dyn PropertyEvaluator) {
        self.dielectric.clear();
        if !self.materials.iter().any(|m| m.callback.is_some()) {
            return;
        }
        match self.compute_dielectric(evaluator) {
            Ok(values) => self.dielectric = values,
            Err(err) => warn!("Dielectric not computed: {}", err),
        }
    }

    fn compute_dielectric(&self, evaluator: &mut dyn PropertyEvaluator) -> Result<Vec<Complex<Dual>>, EvaluatorError> {
        let mut values = vec![Complex::one(); self.points.len()];
        for (m, material) in self.materials.iter().enumerate() {
            let Some(callback) = &material.callback else { continue };
            let points: BTreeSet<usize> = self
                .triangles
                .iter()
                .filter(|tri| tri.material == m)
                .flat_map(|tri| tri.index)
                .collect();
            if points.is_empty() {
                continue;
            }
            let xs: Vec<Dual> = points.iter().map(|&i| self.points[i].p.x).collect();
            let ys: Vec<Dual> = points.iter().map(|&i| self.points[i].p.y).collect();
            let result = evaluator.evaluate(callback, &xs, &ys)?;
            let expected = points.len();
            let got = if result.re.len() != expected {
                result.re.len()
            } else {
                result.im.as_ref().map_or(expected, Vec::len)
            };
            if got != expected {
                return Err(EvaluatorError::LengthMismatch { callback: callback.clone(), expected, got });
            }
            debug!("{}: {} points for material {}", callback, expected, m);
            for (k, &i) in points.iter().enumerate() {
                let im = result.im.as_ref().map_or(Dual::constant(0.), |im| im[k]);
                values[i] = Complex::new(result.re[k], im);
            }
        }
        Ok(values)
    }
}
