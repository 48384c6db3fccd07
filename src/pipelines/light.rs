use cgmath::Vector3;
use wgpu::util::DeviceExt;

/// How the light source shapes its contribution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LightKind {
    #[default]
    Directional,
    Point,
    Spot,
}

impl LightKind {
    /// Directional -> Point -> Spot -> Directional.
    pub fn next(self) -> Self {
        match self {
            LightKind::Directional => LightKind::Point,
            LightKind::Point => LightKind::Spot,
            LightKind::Spot => LightKind::Directional,
        }
    }

    fn flag(self) -> u32 {
        match self {
            LightKind::Directional => 0,
            LightKind::Point => 1,
            LightKind::Spot => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub position: Vector3<f32>,
    pub direction: Vector3<f32>,
    pub strength: f32,
    pub fall_off_start: f32,
    pub fall_off_end: f32,
    pub spot_power: f32,
    pub kind: LightKind,
    pub use_blinn_phong: bool,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 2.0),
            direction: Vector3::new(0.0, 0.0, -1.0),
            strength: 1.0,
            fall_off_start: 0.0,
            fall_off_end: 10.0,
            spot_power: 1.0,
            kind: LightKind::Directional,
            use_blinn_phong: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: 0.1,
            diffuse: 1.0,
            specular: 1.0,
            shininess: 1.0,
        }
    }
}

/// Everything the main pass fragment shader needs besides textures.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shading {
    pub light: Light,
    pub material: Material,
    pub use_texture: bool,
}

impl Default for Shading {
    fn default() -> Self {
        Self {
            light: Light::default(),
            material: Material::default(),
            use_texture: true,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    position: [f32; 3],
    strength: f32,
    direction: [f32; 3],
    fall_off_start: f32,
    fall_off_end: f32,
    spot_power: f32,
    kind: u32,
    use_blinn_phong: u32,
}

impl From<&Light> for LightUniform {
    fn from(light: &Light) -> Self {
        Self {
            position: light.position.into(),
            strength: light.strength,
            direction: light.direction.into(),
            fall_off_start: light.fall_off_start,
            fall_off_end: light.fall_off_end,
            spot_power: light.spot_power,
            kind: light.kind.flag(),
            use_blinn_phong: u32::from(light.use_blinn_phong),
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    ambient: f32,
    diffuse: f32,
    specular: f32,
    shininess: f32,
}

impl From<&Material> for MaterialUniform {
    fn from(material: &Material) -> Self {
        Self {
            ambient: material.ambient,
            diffuse: material.diffuse,
            specular: material.specular,
            shininess: material.shininess,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShadingUniform {
    light: LightUniform,
    material: MaterialUniform,
    use_texture: u32,
    // Uniform structs are padded to 16 bytes.
    _padding: [u32; 3],
}

impl From<&Shading> for ShadingUniform {
    fn from(shading: &Shading) -> Self {
        Self {
            light: (&shading.light).into(),
            material: (&shading.material).into(),
            use_texture: u32::from(shading.use_texture),
            _padding: [0; 3],
        }
    }
}

#[derive(Debug)]
pub struct ShadingResources {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl ShadingResources {
    pub fn new(device: &wgpu::Device, shading: &Shading) -> Self {
        let buffer = mk_buffer(device, shading.into());
        let bind_group_layout = mk_bind_group_layout(device);
        let bind_group = mk_bind_group(device, &bind_group_layout, &buffer);
        Self {
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn update(&self, queue: &wgpu::Queue, shading: &Shading) {
        let uniform: ShadingUniform = shading.into();
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[uniform]));
    }
}

pub fn mk_buffer(device: &wgpu::Device, uniform: ShadingUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Shading Buffer"),
        contents: bytemuck::cast_slice(&[uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("shading_bind_group_layout"),
    })
}

pub fn mk_bind_group(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
        label: Some("shading_bind_group"),
    })
}
