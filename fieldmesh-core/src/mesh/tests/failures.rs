use super::*;
use crate::error::GeometryError;
use test_log::test;

struct Failing;

impl Triangulator for Failing {
    fn triangulate(&self, _: &Switches, _: &KernelInput, _: Option<UnsuitableFn>) -> Result<KernelOutput, KernelError> {
        Err(KernelError::TooManyPoints(0))
    }
}

struct Panicking;

impl Triangulator for Panicking {
    fn triangulate(&self, _: &Switches, _: &KernelInput, _: Option<UnsuitableFn>) -> Result<KernelOutput, KernelError> {
        panic!("kernel blew up")
    }
}

/// Passes the input points through, but marks the last one 1.
struct ReservedMarker;

impl Triangulator for ReservedMarker {
    fn triangulate(&self, switches: &Switches, input: &KernelInput, _: Option<UnsuitableFn>) -> Result<KernelOutput, KernelError> {
        let mut out = DelaunayRefiner::default().triangulate(switches, input, None)?;
        if let Some(marker) = out.point_markers.last_mut() {
            *marker = 1;
        }
        Ok(out)
    }
}

/// Records the switches it was called with, then defers to the real kernel.
struct Recording(Mutex<Vec<String>>);

impl Triangulator for Recording {
    fn triangulate(&self, switches: &Switches, input: &KernelInput, unsuitable: Option<UnsuitableFn>) -> Result<KernelOutput, KernelError> {
        self.0.lock().unwrap().push(switches.to_string());
        assert_eq!(unsuitable.is_some(), switches.refine);
        DelaunayRefiner::default().triangulate(switches, input, unsuitable)
    }
}

fn square() -> Shape {
    Shape::rectangle(0., 0., 1., 1.)
}

#[test]
fn kernel_error_invalidates() {
    let mesh = Mesh::with_config(&square(), &MeshConfig::new(0.1), None, &Failing);
    assert!(!mesh.is_valid());
    assert_eq!(mesh.error(), Some(&MeshError::Kernel(KernelError::TooManyPoints(0))));
    assert_eq!(mesh.num_points(), 0);
    assert_eq!(mesh.num_triangles(), 0);
    assert!(mesh.materials().is_empty());
}

#[test]
fn kernel_panic_invalidates() {
    let result = Mesh::build(&square(), &MeshConfig::new(0.1), None, &Panicking);
    assert_eq!(result.err(), Some(MeshError::Kernel(KernelError::Aborted("kernel blew up".to_string()))));
    // The oracle lock was released.
    let mesh = Mesh::new(&square(), 0.5, None);
    assert!(mesh.is_valid());
}

#[test]
#[should_panic(expected = "reserved marker 1")]
fn reserved_marker_is_fatal() {
    Mesh::with_config(&square(), &MeshConfig::default(), None, &ReservedMarker);
}

#[test]
fn switches() {
    let kernel = Recording(Mutex::new(vec![]));
    assert!(Mesh::with_config(&square(), &MeshConfig::new(0.3), None, &kernel).is_valid());
    assert!(Mesh::with_config(&square(), &MeshConfig::new(0.), None, &kernel).is_valid());
    assert!(Mesh::with_config(&square(), &MeshConfig::new(-1.), None, &kernel).is_valid());
    assert_eq!(*kernel.0.lock().unwrap(), vec!["zpAQqun", "zpAQn", "zpAQn"]);
}

#[test]
fn point_limit() {
    let config = MeshConfig { max_points: 20, ..MeshConfig::new(0.01) };
    let mesh = Mesh::with_config(&square(), &config, None, &DelaunayRefiner::new(config.max_points));
    assert_eq!(mesh.error(), Some(&MeshError::Kernel(KernelError::TooManyPoints(20))));
}

#[test]
fn bad_geometry() {
    let mut bowtie = Shape::new();
    for (x, y) in [(0., 0.), (1., 1.), (1., 0.), (0., 1.)] {
        bowtie.add_point(x, y);
    }
    let mesh = Mesh::new(&bowtie, 0.1, None);
    assert!(matches!(mesh.error(), Some(MeshError::Geometry(GeometryError::EdgesCross { .. }))));
    assert_eq!(mesh.find_triangle(0.5, 0.1), None);

    let mut spike = Shape::new();
    for (x, y) in [(0., 0.), (1., 0.), (1., 1.), (0.5, 1e6)] {
        spike.add_point(x, y);
    }
    let mesh = Mesh::new(&spike, 0.1, None);
    assert!(matches!(mesh.error(), Some(MeshError::SharpAngle { .. })), "{:?}", mesh.error());

    // The same failure is reported again without trouble.
    let again = Mesh::new(&spike, 0.1, None);
    assert_eq!(again.error(), mesh.error());
}
