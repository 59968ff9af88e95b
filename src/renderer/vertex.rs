//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for game elements
pub mod colors {
    pub const CABINET: [f32; 4] = [0.08, 0.06, 0.1, 1.0];
    pub const BEZEL: [f32; 4] = [0.18, 0.16, 0.22, 1.0];
    pub const ARENA: [f32; 4] = [0.02, 0.02, 0.05, 1.0];
    pub const ARENA_BORDER: [f32; 4] = [0.3, 0.3, 0.4, 1.0];
    pub const PLAYER: [f32; 4] = [0.2, 0.8, 0.4, 1.0];
    pub const PLAYER_DEAD: [f32; 4] = [0.5, 0.2, 0.2, 1.0];
    pub const BULLET: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const HAZARD: [f32; 4] = [1.0, 0.4, 0.2, 1.0];
    pub const JOYSTICK_BASE: [f32; 4] = [1.0, 1.0, 1.0, 0.25];
    pub const JOYSTICK_THUMB: [f32; 4] = [1.0, 1.0, 1.0, 0.6];
    pub const FIRE_BUTTON: [f32; 4] = [1.0, 0.3, 0.3, 0.5];
    pub const FIRE_BUTTON_PRESSED: [f32; 4] = [1.0, 0.3, 0.3, 0.85];
}
