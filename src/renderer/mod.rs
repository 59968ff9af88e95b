//! WebGPU rendering module
//!
//! Game state becomes a layered display list (`scene`), which the cabinet
//! renderer draws through the compositor's two cameras.

pub mod cabinet;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use cabinet::CabinetRenderer;
pub use scene::{DisplayList, Drawable, build_scene};
pub use shapes::Shape;
pub use vertex::Vertex;
