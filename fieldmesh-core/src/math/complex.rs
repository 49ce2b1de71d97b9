use std::{fmt::{Display, Formatter, self}, ops::{Mul, Sub, Add}};

use derive_more;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};

use crate::dual::Dual;

#[derive(
    Clone, Copy, Debug, PartialEq,
    Serialize, Deserialize,
    derive_more::Add,
    derive_more::Sub,
)]
pub struct Complex<D> {
    pub re: D,
    pub im: D,
}

impl<D> Complex<D> {
    pub fn new(re: D, im: D) -> Self {
        Self { re, im }
    }
}

impl<D: Zero> Complex<D> {
    pub fn re(re: D) -> Self {
        Self { re, im: D::zero() }
    }
}

impl<D: Zero + One> Complex<D> {
    pub fn one() -> Self {
        Self { re: D::one(), im: D::zero() }
    }
}

impl Complex<Dual> {
    pub fn v(&self) -> Complex<f64> {
        Complex { re: self.re.v(), im: self.im.v() }
    }
}

impl<
    D
    : Clone
    + Add<Output = D>
    + Sub<Output = D>
    + Mul<Output = D>
> Mul for Complex<D> {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        let Complex { re: a, im: b } = self;
        let Complex { re: c, im: d } = rhs;
        Self {
            re: a.clone() * c.clone() - b.clone() * d.clone(),
            im: a * d + b * c,
        }
    }
}

impl<
    D
    : Clone
    + Mul<Output = D>
> Mul<D> for Complex<D> {
    type Output = Self;
    fn mul(self, rhs: D) -> Self::Output {
        Self {
            re: self.re * rhs.clone(),
            im: self.im * rhs,
        }
    }
}

impl<D: Display> Display for Complex<D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}i", self.re, self.im)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn mul() {
        let a = Complex::new(Dual::new(1., 1.), Dual::constant(2.));
        let b = Complex::new(Dual::constant(3.), Dual::constant(-1.));
        let c = a * b;
        assert_eq!(c.v(), Complex::new(5., 5.));
        assert_eq!(c.re.d(), 3.);
        assert_eq!(c.im.d(), -1.);
        assert_eq!(Complex::<Dual>::one().v(), Complex::new(1., 0.));
    }
}
