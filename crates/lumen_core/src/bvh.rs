//! Scene-wide spatial index: a bounding volume hierarchy over every object
//! with finite bounds, plus a flat list for unbounded ones (planes).
//!
//! Nearest-hit selection is identical to testing the object list in order
//! and keeping strictly smaller `t`: among equal `t` the lowest
//! [`ObjectId`] wins.

use log::debug;
use lumen_math::{Aabb, Interval, Ray, Vec3, RAY_MAG};

use crate::object::{Intersection, Object, ObjectId, SurfaceHit};

/// Maximum objects per leaf node before splitting.
const LEAF_MAX_SIZE: usize = 4;

/// Index entry: an object and the box it was built with.
#[derive(Debug, Clone, Copy)]
struct Entry {
    id: ObjectId,
    bbox: Aabb,
}

/// BVH node - either a branch with two children or a leaf with objects.
#[derive(Debug)]
enum BvhNode {
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    Leaf {
        objects: Vec<ObjectId>,
        bbox: Aabb,
    },
    Empty,
}

impl BvhNode {
    /// Median split on the longest axis of the centroid bounds.
    fn build(mut entries: Vec<Entry>) -> Self {
        if entries.is_empty() {
            return BvhNode::Empty;
        }

        let bbox = entries
            .iter()
            .fold(Aabb::EMPTY, |acc, e| Aabb::surrounding(&acc, &e.bbox));

        if entries.len() <= LEAF_MAX_SIZE {
            return BvhNode::Leaf {
                objects: entries.iter().map(|e| e.id).collect(),
                bbox,
            };
        }

        let centroid_bounds = Aabb::enclosing(entries.iter().map(|e| e.bbox.centroid()));
        let axis = centroid_bounds.longest_axis();

        entries.sort_unstable_by(|a, b| {
            a.bbox.centroid()[axis].total_cmp(&b.bbox.centroid()[axis])
        });

        let right = entries.split_off(entries.len() / 2);
        BvhNode::Branch {
            left: Box::new(Self::build(entries)),
            right: Box::new(Self::build(right)),
            bbox,
        }
    }

    fn depth(&self) -> usize {
        match self {
            BvhNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
            BvhNode::Leaf { .. } => 1,
            BvhNode::Empty => 0,
        }
    }

    fn visit(&self, query: &mut Query<'_>) {
        match self {
            BvhNode::Empty => {}
            BvhNode::Leaf { objects, bbox } => {
                if !bbox.hit(query.ray, query.range()) {
                    return;
                }
                for &id in objects {
                    query.test(id);
                }
            }
            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(query.ray, query.range()) {
                    return;
                }
                left.visit(query);
                // The right child only sees the range narrowed by the left
                right.visit(query);
            }
        }
    }
}

/// In-flight nearest-hit search.
struct Query<'q> {
    objects: &'q [Box<dyn Object>],
    ray: &'q Ray,
    exclude: Option<ObjectId>,
    best: Option<(SurfaceHit, ObjectId)>,
}

impl Query<'_> {
    /// Travel range, capped at the best hit so far. The cap is inclusive so
    /// equal-`t` hits still reach the tie-break.
    fn range(&self) -> Interval {
        match &self.best {
            Some((hit, _)) => Ray::TRAVEL.with_max(hit.t),
            None => Ray::TRAVEL,
        }
    }

    fn test(&mut self, id: ObjectId) {
        if self.exclude == Some(id) {
            return;
        }
        let Some(object) = self.objects.get(id.0) else {
            return;
        };
        let Some(hit) = object.intersect(self.ray, self.range()) else {
            return;
        };
        let better = match &self.best {
            None => true,
            Some((best, best_id)) => hit.t < best.t || (hit.t == best.t && id < *best_id),
        };
        if better {
            self.best = Some((hit, id));
        }
    }
}

/// Read-only acceleration structure over a scene's objects.
#[derive(Debug)]
pub struct SpatialIndex {
    /// Gate every query must pass first
    bounds: Aabb,
    root: BvhNode,
    unbounded: Vec<ObjectId>,
    len: usize,
}

impl SpatialIndex {
    /// Build over `objects`, asking each for its bounding box once.
    ///
    /// The gate is the `±RAY_MAG` cube grown to cover every finite box, so
    /// it contains anything a ray can reach, infinite planes included.
    pub fn build(objects: &[Box<dyn Object>]) -> Self {
        let mut bounded = Vec::new();
        let mut unbounded = Vec::new();

        for (i, object) in objects.iter().enumerate() {
            let id = ObjectId(i);
            let bbox = object.bounding_box();
            if bbox.is_finite() {
                bounded.push(Entry { id, bbox });
            } else {
                unbounded.push(id);
            }
        }

        let reach = Aabb::from_points(Vec3::splat(-RAY_MAG), Vec3::splat(RAY_MAG));
        let bounds = bounded
            .iter()
            .fold(reach, |acc, e| Aabb::surrounding(&acc, &e.bbox));

        let bounded_count = bounded.len();
        let root = BvhNode::build(bounded);
        debug!(
            "Spatial index: {} bounded objects (depth {}), {} unbounded",
            bounded_count,
            root.depth(),
            unbounded.len()
        );

        Self {
            bounds,
            root,
            unbounded,
            len: objects.len(),
        }
    }

    /// Number of objects the index was built over.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Nearest hit of `ray` within [`Ray::TRAVEL`], never reporting
    /// `exclude`.
    ///
    /// `objects` must be the slice the index was built from.
    pub fn nearest<'a>(
        &self,
        objects: &'a [Box<dyn Object>],
        ray: &Ray,
        exclude: Option<ObjectId>,
    ) -> Option<Intersection<'a>> {
        if !self.bounds.hit(ray, Ray::TRAVEL) {
            return None;
        }

        let mut query = Query {
            objects,
            ray,
            exclude,
            best: None,
        };
        self.root.visit(&mut query);
        for &id in &self.unbounded {
            query.test(id);
        }

        let (hit, id) = query.best?;
        let object = objects.get(id.0)?;
        Some(Intersection::new(hit, &**object, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{gen_f64, random_unit_vector};
    use crate::{Face, Material, Mesh, MeshPrimitive, Plane, PointLight, Sphere, Vertex};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn linear_scan<'a>(
        objects: &'a [Box<dyn Object>],
        ray: &Ray,
        exclude: Option<ObjectId>,
    ) -> Option<(f64, ObjectId)> {
        let mut nearest: Option<(f64, ObjectId)> = None;
        for (i, object) in objects.iter().enumerate() {
            if exclude == Some(ObjectId(i)) {
                continue;
            }
            if let Some(hit) = object.intersect(ray, Ray::TRAVEL) {
                if nearest.map_or(true, |(t, _)| hit.t < t) {
                    nearest = Some((hit.t, ObjectId(i)));
                }
            }
        }
        nearest
    }

    fn random_scene(rng: &mut StdRng) -> Vec<Box<dyn Object>> {
        let mut objects: Vec<Box<dyn Object>> = Vec::new();
        for _ in 0..40 {
            let center = Vec3::new(
                gen_f64(rng) * 20.0 - 10.0,
                gen_f64(rng) * 20.0 - 10.0,
                gen_f64(rng) * 20.0 - 10.0,
            );
            objects.push(Box::new(Sphere::new(center, 0.3 + gen_f64(rng), Material::default())));
        }
        objects.push(Box::new(Plane::new(Vec3::Y, -12.0, Material::default())));
        objects.push(Box::new(PointLight::new(Vec3::new(0.0, 15.0, 0.0), Vec3::ONE)));

        let v = |x, y, z| Vertex::new(Vec3::new(x, y, z), Vec3::Z);
        let tri = Face::triangle(v(-3.0, -3.0, 0.5), v(3.0, -3.0, 0.5), v(0.0, 3.0, 0.5));
        objects.push(Box::new(Mesh::with_faces(
            MeshPrimitive::Triangles,
            vec![tri],
            Material::default(),
        )));
        objects
    }

    #[test]
    fn test_empty_index() {
        let objects: Vec<Box<dyn Object>> = Vec::new();
        let index = SpatialIndex::build(&objects);
        assert!(index.is_empty());

        let ray = Ray::new(Vec3::ZERO, Vec3::X * RAY_MAG);
        assert!(index.nearest(&objects, &ray, None).is_none());
    }

    #[test]
    fn test_single_sphere() {
        let objects: Vec<Box<dyn Object>> = vec![Box::new(Sphere::new(
            Vec3::new(0.0, 0.0, -5.0),
            0.5,
            Material::default(),
        ))];
        let index = SpatialIndex::build(&objects);

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z * RAY_MAG);
        let hit = index.nearest(&objects, &ray, None).expect("should hit");
        assert_eq!(hit.id, ObjectId(0));
        assert!((hit.point.z + 4.5).abs() < 1e-9);
    }

    #[test]
    fn test_exclusion_reveals_object_behind() {
        let objects: Vec<Box<dyn Object>> = vec![
            Box::new(Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0, Material::default())),
            Box::new(Sphere::new(Vec3::new(0.0, 0.0, -10.0), 1.0, Material::default())),
        ];
        let index = SpatialIndex::build(&objects);
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z * RAY_MAG);

        assert_eq!(index.nearest(&objects, &ray, None).map(|h| h.id), Some(ObjectId(0)));
        assert_eq!(
            index.nearest(&objects, &ray, Some(ObjectId(0))).map(|h| h.id),
            Some(ObjectId(1))
        );
    }

    #[test]
    fn test_equal_t_goes_to_lowest_id() {
        // Two identical spheres behind enough others to force a branch
        let mut objects: Vec<Box<dyn Object>> = Vec::new();
        for i in 0..9 {
            objects.push(Box::new(Sphere::new(
                Vec3::new(i as f64 * 3.0, 10.0, 0.0),
                1.0,
                Material::default(),
            )));
        }
        objects.push(Box::new(Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0, Material::default())));
        objects.push(Box::new(Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0, Material::default())));
        let index = SpatialIndex::build(&objects);

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z * RAY_MAG);
        assert_eq!(index.nearest(&objects, &ray, None).map(|h| h.id), Some(ObjectId(9)));
    }

    #[test]
    fn test_matches_linear_scan() {
        let mut rng = StdRng::seed_from_u64(42);
        let objects = random_scene(&mut rng);
        let index = SpatialIndex::build(&objects);

        for _ in 0..2000 {
            let origin = random_unit_vector(&mut rng) * 15.0;
            let ray = Ray::new(origin, random_unit_vector(&mut rng) * RAY_MAG);
            let exclude = rng.gen_bool(0.2).then(|| ObjectId(rng.gen_range(0..objects.len())));

            let expected = linear_scan(&objects, &ray, exclude);
            let actual = index.nearest(&objects, &ray, exclude).map(|h| (h.t, h.id));
            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn test_gate_rejects_rays_starting_far_outside() {
        let objects: Vec<Box<dyn Object>> =
            vec![Box::new(Plane::new(Vec3::Y, 0.0, Material::default()))];
        let index = SpatialIndex::build(&objects);

        let far = Ray::new(Vec3::new(5.0 * RAY_MAG, 1.0, 0.0), Vec3::NEG_Y * RAY_MAG);
        assert!(index.nearest(&objects, &far, None).is_none());

        let near = Ray::new(Vec3::new(5.0, 1.0, 0.0), Vec3::NEG_Y * RAY_MAG);
        assert!(index.nearest(&objects, &near, None).is_some());
    }
}
