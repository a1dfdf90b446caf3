//! Scene container: objects, lights, camera and the spatial index.

use std::sync::OnceLock;

use log::debug;
use lumen_math::Ray;

use crate::object::{Intersection, Object, ObjectId};
use crate::{Camera, Color, SpatialIndex};

/// A renderable scene.
///
/// Objects are addressed by [`ObjectId`], their insertion index. Emissive
/// objects (point lights included) are also listed as lights. The spatial
/// index is built on the first query and dropped whenever an object is
/// added afterwards.
#[derive(Default)]
pub struct Scene {
    objects: Vec<Box<dyn Object>>,
    lights: Vec<ObjectId>,
    ambient: Color,
    camera: Camera,
    index: OnceLock<SpatialIndex>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object, registering it as a light if it emits.
    pub fn add_object<O: Object + 'static>(&mut self, object: O) -> ObjectId {
        self.add_boxed(Box::new(object))
    }

    pub fn add_boxed(&mut self, object: Box<dyn Object>) -> ObjectId {
        let id = ObjectId(self.objects.len());
        if object.is_emissive() {
            self.lights.push(id);
        }
        debug!("Added {} {}", object.kind(), id);
        self.objects.push(object);
        self.index = OnceLock::new();
        id
    }

    pub fn objects(&self) -> &[Box<dyn Object>] {
        &self.objects
    }

    pub fn object(&self, id: ObjectId) -> Option<&dyn Object> {
        self.objects.get(id.0).map(|o| &**o)
    }

    /// Ids of emissive objects, in insertion order.
    pub fn lights(&self) -> &[ObjectId] {
        &self.lights
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    pub fn ambient(&self) -> Color {
        self.ambient
    }

    pub fn set_ambient(&mut self, ambient: Color) {
        self.ambient = ambient;
    }

    /// The spatial index, built on first use.
    pub fn index(&self) -> &SpatialIndex {
        self.index.get_or_init(|| SpatialIndex::build(&self.objects))
    }

    /// Nearest hit of `ray` over the whole scene.
    pub fn intersection(&self, ray: &Ray) -> Option<Intersection<'_>> {
        self.intersection_excluding(ray, None)
    }

    /// Nearest hit of `ray`, skipping `exclude`. Used for shadow rays aimed
    /// at a light, which must not be blocked by the light itself.
    pub fn intersection_excluding(
        &self,
        ray: &Ray,
        exclude: Option<ObjectId>,
    ) -> Option<Intersection<'_>> {
        self.index().nearest(&self.objects, ray, exclude)
    }
}
