//! Scene objects and the scene that owns them.
//!
//! The viewer only ever shows three kinds of things, so shapes are a closed
//! enum rather than a trait hierarchy. Every object owns its [`GeometryBuffer`];
//! objects that take part in picking also carry a [`PickId`].

pub mod shapes;

use cgmath::{Matrix4, Vector3};

use crate::{
    config::ViewerConfig,
    data_structures::{
        geometry::GeometryBuffer, pick_id::PickId, transform::Transform, vertex::MeshData,
    },
    gpu::{GpuBackend, GpuError},
};

/// Index of an object inside its [`Scene`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub usize);

/// Index into the renderer's table of 2D textures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureSlot(pub usize);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Sphere { radius: f32 },
    Cuboid { size: Vector3<f32> },
    Skybox { size: f32 },
}

impl Shape {
    pub fn mesh_data(&self) -> MeshData {
        match *self {
            Shape::Sphere { radius } => {
                shapes::uv_sphere(radius, shapes::SPHERE_SECTORS, shapes::SPHERE_STACKS)
            }
            Shape::Cuboid { size } => shapes::cuboid(size),
            Shape::Skybox { size } => shapes::skybox(size),
        }
    }

    /// Skyboxes are backdrop only and never show up in the id pass.
    pub fn is_pickable(&self) -> bool {
        !matches!(self, Shape::Skybox { .. })
    }

    pub fn is_skybox(&self) -> bool {
        matches!(self, Shape::Skybox { .. })
    }
}

pub struct SceneObject<B: GpuBackend> {
    name: String,
    shape: Shape,
    geometry: GeometryBuffer<B>,
    pick_id: Option<PickId>,
    pub texture: Option<TextureSlot>,
    /// Placement relative to the shared model controls.
    pub anchor: Vector3<f32>,
    pub transform: Transform,
}

impl<B: GpuBackend> SceneObject<B> {
    /// Generate the shape's geometry and upload it.
    pub fn new(backend: &B, name: &str, shape: Shape) -> Result<Self, GpuError> {
        let mesh = shape.mesh_data();
        let mut geometry = GeometryBuffer::new();
        geometry.initialise(backend, name, &mesh.vertices, &mesh.indices)?;
        Ok(Self {
            name: name.to_string(),
            shape,
            geometry,
            pick_id: None,
            texture: None,
            anchor: Vector3::new(0.0, 0.0, 0.0),
            transform: Transform::new(),
        })
    }

    pub fn with_anchor(mut self, anchor: Vector3<f32>) -> Self {
        self.anchor = anchor;
        self
    }

    /// Tag this object for the id pass. Ignored (with a warning) for skyboxes.
    pub fn set_pick_id(&mut self, r: u8, g: u8, b: u8) {
        if !self.shape.is_pickable() {
            log::warn!("{} cannot be picked, ignoring pick colour", self.name);
            return;
        }
        match &mut self.pick_id {
            Some(id) => id.set(r, g, b),
            None => self.pick_id = Some(PickId::new(r, g, b)),
        }
    }

    pub fn pick_id(&self) -> Option<PickId> {
        self.pick_id
    }

    /// `false` for objects without a pick colour.
    pub fn matches(&self, colour: [u8; 3]) -> bool {
        self.pick_id.is_some_and(|id| id.matches(colour))
    }

    /// The transform moved to this object's anchor.
    pub fn model_matrix(&self) -> Matrix4<f32> {
        self.transform.translated(self.anchor).to_matrix()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn geometry(&self) -> &GeometryBuffer<B> {
        &self.geometry
    }
}

pub struct Scene<B: GpuBackend> {
    objects: Vec<SceneObject<B>>,
}

impl<B: GpuBackend> Scene<B> {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
        }
    }

    /// Add an object. Duplicate or background-coloured pick tags are reported, not rejected.
    pub fn add(&mut self, object: SceneObject<B>) -> ObjectId {
        if let Some(id) = object.pick_id() {
            if id.matches([0, 0, 0]) {
                log::warn!(
                    "{} uses the id-pass background colour {id} and can never be picked",
                    object.name()
                );
            }
            if let Some(other) = self.objects.iter().find(|o| o.pick_id() == Some(id)) {
                log::warn!(
                    "{} and {} share the pick colour {id}; only the first will be picked",
                    other.name(),
                    object.name()
                );
            }
        }
        self.objects.push(object);
        ObjectId(self.objects.len() - 1)
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject<B>> {
        self.objects.get(id.0)
    }

    pub fn name(&self, id: ObjectId) -> Option<&str> {
        self.get(id).map(SceneObject::name)
    }

    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &SceneObject<B>)> {
        self.objects.iter().enumerate().map(|(i, o)| (ObjectId(i), o))
    }

    pub fn objects_mut(&mut self) -> impl Iterator<Item = &mut SceneObject<B>> {
        self.objects.iter_mut()
    }

    /// Objects that carry a pick colour, in insertion order.
    pub fn pickable(&self) -> impl Iterator<Item = (ObjectId, &SceneObject<B>, PickId)> {
        self.objects()
            .filter_map(|(i, o)| o.pick_id().map(|id| (i, o, id)))
    }

    /// The first object whose pick colour equals `colour`.
    pub fn find_by_colour(&self, colour: [u8; 3]) -> Option<ObjectId> {
        self.pickable()
            .find(|(_, object, _)| object.matches(colour))
            .map(|(i, _, _)| i)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Textures of the stock scene, if they were loaded.
#[derive(Clone, Copy, Debug, Default)]
pub struct StockTextures {
    pub earth: Option<TextureSlot>,
    pub crate_box: Option<TextureSlot>,
}

/**
 * The viewer's scene: a textured earth left of the origin, a textured box to the
 * right and a skybox around both.
 *
 * The earth and the box get the pick colours from `config`; the skybox gets none.
 * Every object is placed with [`ModelControls::default`].
 */
pub fn stock_scene<B: GpuBackend>(
    backend: &B,
    config: &ViewerConfig,
    textures: StockTextures,
) -> Result<Scene<B>, GpuError> {
    let mut earth = SceneObject::new(
        backend,
        "Earth",
        Shape::Sphere {
            radius: config.sphere_radius,
        },
    )?
    .with_anchor(Vector3::new(-0.7, 0.0, 0.0));
    earth.texture = textures.earth;
    let [r, g, b] = config.sphere_pick;
    earth.set_pick_id(r, g, b);

    let size = config.box_size;
    let mut crate_box = SceneObject::new(
        backend,
        "Box",
        Shape::Cuboid {
            size: Vector3::new(size, size, size),
        },
    )?
    .with_anchor(Vector3::new(0.7, 0.0, 0.0));
    crate_box.texture = textures.crate_box;
    let [r, g, b] = config.box_pick;
    crate_box.set_pick_id(r, g, b);

    let skybox = SceneObject::new(
        backend,
        "Skybox",
        Shape::Skybox {
            size: config.skybox_size,
        },
    )?;

    let mut scene = Scene::new();
    scene.add(earth);
    scene.add(crate_box);
    scene.add(skybox);
    ModelControls::default().apply(&mut scene);
    Ok(scene)
}

/// Translation, scale and rotation shared by every pickable object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModelControls {
    pub translation: Vector3<f32>,
    pub scaling: f32,
    /// Radians around x, y and z.
    pub rotation: Vector3<f32>,
}

impl ModelControls {
    pub const MIN_SCALING: f32 = 0.05;

    pub fn transform(&self) -> Transform {
        Transform {
            translation: self.translation,
            scale: Vector3::new(self.scaling, self.scaling, self.scaling),
            rotation: self.rotation,
        }
    }

    pub fn rotate(&mut self, by: Vector3<f32>) {
        self.rotation += by;
    }

    pub fn scale_by(&mut self, delta: f32) {
        self.scaling = (self.scaling + delta).max(Self::MIN_SCALING);
    }

    /// Copy the shared transform onto every object except skyboxes.
    pub fn apply<B: GpuBackend>(&self, scene: &mut Scene<B>) {
        let transform = self.transform();
        scene
            .objects_mut()
            .filter(|object| !object.shape().is_skybox())
            .for_each(|object| object.transform = transform);
    }
}

impl Default for ModelControls {
    fn default() -> Self {
        Self {
            translation: Vector3::new(0.0, 0.0, 0.0),
            scaling: 0.4,
            rotation: Vector3::new(0.5, 0.5, 0.0),
        }
    }
}

impl<B: GpuBackend> Default for Scene<B> {
    fn default() -> Self {
        Self::new()
    }
}
