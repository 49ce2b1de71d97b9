use super::*;
use crate::error::EvaluatorError;
use test_log::test;

fn shifted_x(callback: &str, xs: &[Dual], ys: &[Dual]) -> Result<PropertyValues, EvaluatorError> {
    assert_eq!(callback, "eps");
    assert_eq!(xs.len(), ys.len());
    Ok(PropertyValues::real(xs.iter().map(|x| *x + 1.).collect()))
}

#[test]
fn callback_values() {
    let shape = Shape::rectangle(0., 0., 1., 1.).with_material(Material::default().with_callback("eps"));
    let mut calls = 0;
    let mut evaluator = |callback: &str, xs: &[Dual], ys: &[Dual]| {
        calls += 1;
        shifted_x(callback, xs, ys)
    };
    let mesh = Mesh::new(&shape, 0.25, Some(&mut evaluator));
    assert!(mesh.is_valid());
    assert_eq!(calls, 1);
    assert_eq!(mesh.dielectric().len(), mesh.num_points());
    for (point, eps) in mesh.points().iter().zip(mesh.dielectric()) {
        assert_eq!(eps.re.v(), point.v().x + 1.);
        assert_eq!(eps.im.v(), 0.);
    }
}

#[test]
fn only_callback_materials_are_evaluated() {
    let mut shape = Shape::rectangle(0., 0., 2., 1.);
    shape.paint(&Shape::rectangle(1., 0., 2., 1.), &Material::default().with_callback("eps"));
    let mut evaluator = |callback: &str, xs: &[Dual], ys: &[Dual]| {
        // Points of the painted half only.
        assert!(xs.iter().all(|x| x.v() >= 1.));
        shifted_x(callback, xs, ys).map(|values| PropertyValues::complex(values.re, ys.to_vec()))
    };
    let mesh = Mesh::new(&shape, 0.25, Some(&mut evaluator));
    assert_eq!(mesh.dielectric().len(), mesh.num_points());
    for (point, eps) in mesh.points().iter().zip(mesh.dielectric()) {
        let p = point.v();
        if p.x < 1. {
            assert_eq!(eps.v(), Complex::new(1., 0.));
        } else {
            assert_eq!(eps.v(), Complex::new(p.x + 1., p.y));
        }
    }
}

#[test]
fn failure_clears_everything() {
    let mut shape = Shape::rectangle(0., 0., 2., 1.).with_material(Material::default().with_callback("eps"));
    shape.paint(&Shape::rectangle(1., 0., 2., 1.), &Material::default().with_callback("broken"));
    let mut evaluator = |callback: &str, xs: &[Dual], _: &[Dual]| -> Result<PropertyValues, EvaluatorError> {
        match callback {
            "broken" => Err(EvaluatorError::Callback { callback: callback.to_string(), message: "no such function".to_string() }),
            _ => Ok(PropertyValues::real(xs.to_vec())),
        }
    };
    let mesh = Mesh::new(&shape, 0.25, Some(&mut evaluator));
    assert!(mesh.is_valid());
    assert!(mesh.dielectric().is_empty());
}

#[test]
fn wrong_length_clears_everything() {
    let shape = Shape::rectangle(0., 0., 1., 1.).with_material(Material::default().with_callback("eps"));
    let mut evaluator = |_: &str, xs: &[Dual], _: &[Dual]| -> Result<PropertyValues, EvaluatorError> {
        Ok(PropertyValues::real(xs[1..].to_vec()))
    };
    let mesh = Mesh::new(&shape, 0.25, Some(&mut evaluator));
    assert!(mesh.is_valid());
    assert!(mesh.dielectric().is_empty());
}

#[test]
fn no_callbacks_no_calls() {
    let shape = Shape::rectangle(0., 0., 1., 1.);
    let mut evaluator = |_: &str, _: &[Dual], _: &[Dual]| -> Result<PropertyValues, EvaluatorError> {
        panic!("no material has a callback")
    };
    let mesh = Mesh::new(&shape, 0.25, Some(&mut evaluator));
    assert!(mesh.is_valid());
    assert!(mesh.dielectric().is_empty());
}
