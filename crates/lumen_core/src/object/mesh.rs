//! Polygon meshes made of triangle or quad faces.

use log::debug;
use lumen_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

use super::{Object, SurfaceHit};
use crate::random::gen_f64;
use crate::Material;

/// Faces below this area never report a hit.
const MIN_FACE_AREA: f64 = 1e-8;

/// Tolerance on the barycentric sum.
const BARY_TOLERANCE: f64 = 1e-8;

/// Number of vertices per face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshPrimitive {
    Triangles,
    Quads,
}

impl MeshPrimitive {
    pub fn vertex_count(self) -> usize {
        match self {
            MeshPrimitive::Triangles => 3,
            MeshPrimitive::Quads => 4,
        }
    }

    pub fn from_vertex_count(count: usize) -> Option<Self> {
        match count {
            3 => Some(MeshPrimitive::Triangles),
            4 => Some(MeshPrimitive::Quads),
            _ => None,
        }
    }
}

/// Mesh vertex: position plus shading normal.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self { position, normal }
    }
}

/// A triangle or quad with its flat face normal precomputed.
///
/// The face normal comes from the first three vertices; it is zero when they
/// are collinear, and such a face never intersects.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    vertices: [Vertex; 4],
    count: usize,
    normal: Vec3,
}

impl Face {
    pub fn triangle(a: Vertex, b: Vertex, c: Vertex) -> Self {
        Self::build([a, b, c, Vertex::default()], 3)
    }

    pub fn quad(a: Vertex, b: Vertex, c: Vertex, d: Vertex) -> Self {
        Self::build([a, b, c, d], 4)
    }

    /// Face from a 3 or 4 vertex slice.
    pub fn from_vertices(vertices: &[Vertex]) -> Option<Self> {
        match *vertices {
            [a, b, c] => Some(Self::triangle(a, b, c)),
            [a, b, c, d] => Some(Self::quad(a, b, c, d)),
            _ => None,
        }
    }

    fn build(vertices: [Vertex; 4], count: usize) -> Self {
        let edge_a = vertices[1].position - vertices[0].position;
        let edge_b = vertices[2].position - vertices[0].position;
        Self {
            vertices,
            count,
            normal: edge_a.cross(edge_b).normalize_or_zero(),
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices[..self.count]
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn is_quad(&self) -> bool {
        self.count == 4
    }

    /// The face as one or two triangles: {0,1,2} and, for quads, {0,2,3}.
    fn triangles(&self) -> impl Iterator<Item = [&Vertex; 3]> {
        let v = &self.vertices;
        let second = self.is_quad().then(|| [&v[0], &v[2], &v[3]]);
        std::iter::once([&v[0], &v[1], &v[2]]).chain(second)
    }

    /// First triangle hit wins; the second half of a quad is only tried
    /// when the first misses.
    pub fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<SurfaceHit> {
        if self.normal == Vec3::ZERO {
            return None;
        }
        self.triangles()
            .find_map(|tri| intersect_triangle(tri, self.normal, ray, ray_t))
    }

    pub fn area(&self) -> f64 {
        self.triangles().map(triangle_area).sum()
    }

    /// Uniform point on the face; quads pick a half by area.
    pub fn sample(&self, rng: &mut dyn RngCore) -> Vec3 {
        let v = &self.vertices;
        let first = [&v[0], &v[1], &v[2]];
        if !self.is_quad() {
            return sample_triangle(first, rng);
        }

        let second = [&v[0], &v[2], &v[3]];
        let (a0, a1) = (triangle_area(first), triangle_area(second));
        if a0 + a1 <= 0.0 || gen_f64(rng) * (a0 + a1) < a0 {
            sample_triangle(first, rng)
        } else {
            sample_triangle(second, rng)
        }
    }
}

fn triangle_area([a, b, c]: [&Vertex; 3]) -> f64 {
    (b.position - a.position)
        .cross(c.position - a.position)
        .length()
        * 0.5
}

fn sample_triangle([a, b, c]: [&Vertex; 3], rng: &mut dyn RngCore) -> Vec3 {
    let r1 = gen_f64(rng).sqrt();
    let r2 = gen_f64(rng);
    a.position * (1.0 - r1) + b.position * (r1 * (1.0 - r2)) + c.position * (r1 * r2)
}

/// Barycentric coordinates of `p` from sub-triangle areas projected on the
/// face normal. `None` for faces too small to resolve.
fn barycentric(p: Vec3, [a, b, c]: [&Vertex; 3], normal: Vec3) -> Option<Vec3> {
    let projected_area = |u: Vec3, v: Vec3| (u.cross(v).dot(normal) * 0.5).abs();

    let area = projected_area(b.position - a.position, c.position - a.position);
    if area < MIN_FACE_AREA {
        return None;
    }

    let pa = a.position - p;
    let pb = b.position - p;
    let pc = c.position - p;

    Some(Vec3::new(
        projected_area(pb, pc) / area,
        projected_area(pc, pa) / area,
        projected_area(pa, pb) / area,
    ))
}

fn intersect_triangle(tri: [&Vertex; 3], normal: Vec3, ray: &Ray, ray_t: Interval) -> Option<SurfaceHit> {
    let ndotdir = normal.dot(ray.direction);
    if ndotdir == 0.0 {
        return None;
    }

    let t = (normal.dot(tri[0].position) - normal.dot(ray.origin)) / ndotdir;
    if !ray_t.admits(t) {
        return None;
    }

    let point = ray.at(t);
    let bc = barycentric(point, tri, normal)?;
    let sum = bc.x + bc.y + bc.z;
    if sum < -BARY_TOLERANCE || sum > 1.0 + BARY_TOLERANCE {
        return None;
    }

    let blended = tri[0].normal * bc.x + tri[1].normal * bc.y + tri[2].normal * bc.z;
    Some(SurfaceHit {
        t,
        point,
        normal: blended.normalize_or_zero(),
    })
}

/// Triangle or quad mesh. Owns its faces and keeps its bounds current.
#[derive(Debug, Clone)]
pub struct Mesh {
    primitive: MeshPrimitive,
    faces: Vec<Face>,
    material: Material,
    bbox: Aabb,
}

impl Mesh {
    pub fn new(primitive: MeshPrimitive, material: Material) -> Self {
        Self {
            primitive,
            faces: Vec::new(),
            material,
            bbox: Aabb::EMPTY,
        }
    }

    pub fn with_faces(primitive: MeshPrimitive, faces: Vec<Face>, material: Material) -> Self {
        let mut mesh = Self::new(primitive, material);
        for face in faces {
            mesh.add_face(face);
        }
        mesh
    }

    pub fn add_face(&mut self, face: Face) {
        let face_box = Aabb::enclosing(face.vertices().iter().map(|v| v.position));
        self.bbox = Aabb::surrounding(&self.bbox, &face_box);
        self.faces.push(face);
    }

    pub fn primitive(&self) -> MeshPrimitive {
        self.primitive
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }
}

impl Object for Mesh {
    /// Box-gated exhaustive scan; the smallest `t` wins, earlier faces
    /// win ties.
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<SurfaceHit> {
        if !self.bbox.hit(ray, ray_t) {
            return None;
        }

        let mut nearest: Option<SurfaceHit> = None;
        for face in &self.faces {
            if let Some(hit) = face.intersect(ray, ray_t) {
                if nearest.map_or(true, |n| hit.t < n.t) {
                    nearest = Some(hit);
                }
            }
        }
        nearest
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    /// Uniform face pick, then a uniform point on it. An empty mesh has
    /// nothing to sample and reports the origin.
    fn sample_surface_point(&self, rng: &mut dyn RngCore) -> Vec3 {
        if self.faces.is_empty() {
            debug!("sampling an empty mesh");
            return Vec3::ZERO;
        }
        let idx = ((gen_f64(rng) * self.faces.len() as f64) as usize).min(self.faces.len() - 1);
        self.faces[idx].sample(rng)
    }

    fn material(&self) -> &Material {
        &self.material
    }

    fn kind(&self) -> &'static str {
        "mesh"
    }
}
