//! Model transforms and the per-object data handed to the shaders.
//!
//! Each draw gets one [`ObjectUniform`] slot: the model matrix, the matrix for
//! normals, the pick colour for the id pass and the `is_picked` flag for the
//! main pass.

use cgmath::{Matrix, Matrix4, Rad, SquareMatrix, Vector3};

use crate::data_structures::pick_id::PickId;

/// Translation, uniform-per-axis scale and Euler rotation of one object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vector3<f32>,
    pub scale: Vector3<f32>,
    /// Radians around x, y and z.
    pub rotation: Vector3<f32>,
}

impl Transform {
    pub fn new() -> Self {
        Self {
            translation: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
        }
    }

    /// `T * S * Rx * Ry * Rz`: rotation happens in model space before scaling.
    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.translation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
            * Matrix4::from_angle_x(Rad(self.rotation.x))
            * Matrix4::from_angle_y(Rad(self.rotation.y))
            * Matrix4::from_angle_z(Rad(self.rotation.z))
    }

    pub fn translated(mut self, offset: Vector3<f32>) -> Self {
        self.translation += offset;
        self
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

/**
 * The raw per-object data as it is laid out in the uniform buffer.
 *
 * The normal matrix is the inverse transpose of the model matrix. It is stored
 * as a full mat4 so that WGSL's uniform alignment rules need no padding fields.
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    model: [[f32; 4]; 4],
    normal: [[f32; 4]; 4],
    pick_colour: [f32; 4],
    // x: is_picked, yzw unused
    flags: [u32; 4],
}

impl ObjectUniform {
    pub fn new(model: Matrix4<f32>, pick_id: Option<PickId>, is_picked: bool) -> Self {
        let normal = model.invert().map_or(Matrix4::identity(), |inv| inv.transpose());
        Self {
            model: model.into(),
            normal: normal.into(),
            pick_colour: pick_id.map_or([0.0, 0.0, 0.0, 1.0], |id| id.to_uniform()),
            flags: [u32::from(is_picked), 0, 0, 0],
        }
    }

    pub fn is_picked(&self) -> bool {
        self.flags[0] != 0
    }

    pub fn pick_colour(&self) -> [f32; 4] {
        self.pick_colour
    }
}
