use std::{fmt::{Debug, Display}, iter::Sum, ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign}};

use approx::{AbsDiffEq, RelativeEq};
use num_dual::{Dual64, DualNum};
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};

/// A value together with its first derivative with respect to the single
/// free parameter of the geometry.
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "DualRepr", into = "DualRepr")]
pub struct Dual(pub Dual64);

/// Wire form: `{"v": .., "d": ..}`, or a bare number for a constant.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum DualRepr {
    Full { v: f64, d: f64 },
    Value(f64),
}

impl From<DualRepr> for Dual {
    fn from(r: DualRepr) -> Self {
        match r {
            DualRepr::Full { v, d } => Dual::new(v, d),
            DualRepr::Value(v) => Dual::constant(v),
        }
    }
}

impl From<Dual> for DualRepr {
    fn from(d: Dual) -> Self {
        DualRepr::Full { v: d.v(), d: d.d() }
    }
}

impl Dual {
    pub fn new(v: f64, d: f64) -> Self {
        Dual(Dual64::new(v, d))
    }
    pub fn constant(v: f64) -> Self {
        Dual::new(v, 0.)
    }
    /// The free parameter itself: derivative 1.
    pub fn variable(v: f64) -> Self {
        Dual::new(v, 1.)
    }
    pub fn v(&self) -> f64 {
        self.0.re
    }
    pub fn d(&self) -> f64 {
        self.0.eps
    }
    pub fn set_d(&mut self, d: f64) {
        self.0.eps = d;
    }
    pub fn is_finite(&self) -> bool {
        self.v().is_finite() && self.d().is_finite()
    }
    pub fn sqrt(self) -> Self {
        Dual(<Dual64 as DualNum<f64>>::sqrt(&self.0))
    }
    pub fn abs(self) -> Self {
        if self.v() < 0. { -self } else { self }
    }
    pub fn sin(self) -> Self {
        Dual(<Dual64 as DualNum<f64>>::sin(&self.0))
    }
    pub fn cos(self) -> Self {
        Dual(<Dual64 as DualNum<f64>>::cos(&self.0))
    }
    pub fn atan2(self, x: Self) -> Self {
        let y = self;
        let r2 = x.v() * x.v() + y.v() * y.v();
        let d = if r2 == 0. { 0. } else { (x.v() * y.d() - y.v() * x.d()) / r2 };
        Dual::new(y.v().atan2(x.v()), d)
    }
    /// Smaller of two values; the winner keeps its own derivative.
    pub fn min(self, o: Self) -> Self {
        if o.v() < self.v() { o } else { self }
    }
    pub fn max(self, o: Self) -> Self {
        if o.v() > self.v() { o } else { self }
    }
}

impl Default for Dual {
    fn default() -> Self {
        Dual::constant(0.)
    }
}

impl Display for Dual {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.v())
    }
}

impl Debug for Dual {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Dual::new({:?}, {:?})", self.v(), self.d())
    }
}

impl From<f64> for Dual {
    fn from(v: f64) -> Self {
        Dual::constant(v)
    }
}

impl From<Dual> for f64 {
    fn from(d: Dual) -> Self {
        d.v()
    }
}

impl Zero for Dual {
    fn zero() -> Self {
        Dual::constant(0.)
    }
    fn is_zero(&self) -> bool {
        self.v() == 0. && self.d() == 0.
    }
}

impl One for Dual {
    fn one() -> Self {
        Dual::constant(1.)
    }
}

impl AbsDiffEq for Dual {
    type Epsilon = f64;
    fn default_epsilon() -> Self::Epsilon {
        1e-16
    }
    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.v().abs_diff_eq(&other.v(), epsilon) && self.d().abs_diff_eq(&other.d(), epsilon)
    }
}

impl RelativeEq for Dual {
    fn default_max_relative() -> Self::Epsilon {
        1e-16
    }
    fn relative_eq(&self, other: &Self, epsilon: Self::Epsilon, max_relative: Self::Epsilon) -> bool {
        self.v().relative_eq(&other.v(), epsilon, max_relative) && self.d().relative_eq(&other.d(), epsilon, max_relative)
    }
}

impl Add for Dual {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Dual(self.0 + rhs.0)
    }
}

impl Add<f64> for Dual {
    type Output = Self;
    fn add(self, rhs: f64) -> Self::Output {
        Dual(self.0 + Dual64::from_re(rhs))
    }
}

impl Add<Dual> for f64 {
    type Output = Dual;
    fn add(self, rhs: Dual) -> Self::Output {
        rhs + self
    }
}

impl AddAssign for Dual {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Dual {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Dual(self.0 - rhs.0)
    }
}

impl Sub<f64> for Dual {
    type Output = Self;
    fn sub(self, rhs: f64) -> Self::Output {
        Dual(self.0 - Dual64::from_re(rhs))
    }
}

impl Sub<Dual> for f64 {
    type Output = Dual;
    fn sub(self, rhs: Dual) -> Self::Output {
        -rhs + self
    }
}

impl SubAssign for Dual {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul for Dual {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        Dual(self.0 * rhs.0)
    }
}

impl Mul<f64> for Dual {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self::Output {
        Dual(self.0 * Dual64::from_re(rhs))
    }
}

impl Mul<Dual> for f64 {
    type Output = Dual;
    fn mul(self, rhs: Dual) -> Self::Output {
        rhs * self
    }
}

impl Div for Dual {
    type Output = Self;
    fn div(self, rhs: Self) -> Self::Output {
        Dual(self.0 / rhs.0)
    }
}

impl Div<f64> for Dual {
    type Output = Self;
    fn div(self, rhs: f64) -> Self::Output {
        Dual(self.0 / Dual64::from_re(rhs))
    }
}

impl Neg for Dual {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Dual(-self.0)
    }
}

impl Sum for Dual {
    fn sum<I: Iterator<Item = Dual>>(iter: I) -> Self {
        iter.fold(Dual::zero(), |a, b| a + b)
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;
    use approx::assert_relative_eq;
    use super::*;
    use test_log::test;

    #[test]
    fn accessors() {
        let mut d = Dual::new(3.5, 2.);
        assert_eq!(d.v(), 3.5);
        assert_eq!(d.d(), 2.);
        d.set_d(-1.);
        assert_eq!(d.d(), -1.);
        assert_eq!(Dual::variable(2.).d(), 1.);
        assert_eq!(Dual::from(4.).d(), 0.);
    }

    #[test]
    fn linear() {
        let a = Dual::new(2., 1.);
        let b = Dual::new(3., -2.);
        let c = a * 3. + b - 1.;
        assert_eq!(c.v(), 8.);
        assert_eq!(c.d(), 1.);
        let e = 5. - a;
        assert_eq!(e.v(), 3.);
        assert_eq!(e.d(), -1.);
    }

    #[test]
    fn product_and_quotient() {
        let a = Dual::new(6., 1.);
        let b = Dual::new(2., 0.5);
        let p = a * b;
        assert_eq!(p.v(), 12.);
        assert_eq!(p.d(), 6. * 0.5 + 2. * 1.);
        // d(a/b) = (a'b - ab')/b²
        let q = a / b;
        assert_eq!(q.v(), 3.);
        assert_relative_eq!(q.d(), (1. * 2. - 6. * 0.5) / 4.);
    }

    #[test]
    fn sqrt() {
        let a = Dual::new(4., 1.);
        let b = a.sqrt();
        assert_eq!(b.v(), 2.);
        assert_eq!(b.d(), 0.25);
    }

    #[test]
    fn sin_cos() {
        let a = Dual::new(PI / 2., 1.);
        assert_relative_eq!(a.sin().v(), 1.);
        assert_relative_eq!(a.sin().d(), 0., epsilon = 1e-15);
        assert_relative_eq!(a.cos().d(), -1.);
    }

    #[test]
    fn atan2() {
        let y = Dual::new(1., 1.);
        let x = Dual::new(1., 0.);
        let theta = y.atan2(x);
        assert_relative_eq!(theta.v(), PI / 4.);
        assert_relative_eq!(theta.d(), 0.5);
    }

    #[test]
    fn abs_min_max() {
        let a = Dual::new(-3., 1.);
        assert_eq!(a.abs(), Dual::new(3., -1.));
        let b = Dual::new(2., 5.);
        assert_eq!(a.min(b), a);
        assert_eq!(a.max(b), b);
    }

    #[test]
    fn sum() {
        let s: Dual = vec![Dual::new(1., 1.), Dual::new(2., 0.), Dual::new(3., 1.)].into_iter().sum();
        assert_eq!(s, Dual::new(6., 2.));
    }

    #[test]
    fn serde_forms() {
        let d: Dual = serde_json::from_str(r#"{"v": 1.5, "d": 2}"#).unwrap();
        assert_eq!(d, Dual::new(1.5, 2.));
        let c: Dual = serde_json::from_str("0.25").unwrap();
        assert_eq!(c, Dual::constant(0.25));
        assert_eq!(serde_json::to_string(&d).unwrap(), r#"{"v":1.5,"d":2.0}"#);
    }
}
