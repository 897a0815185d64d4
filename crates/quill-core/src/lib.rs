pub mod lru;
pub mod math;
pub mod renderer;
pub mod text;

mod color;
mod config;
mod error;
mod image;
mod texture;

pub use self::color::*;
pub use self::config::*;
pub use self::error::*;
pub use self::image::*;
pub use self::renderer::Renderer;
pub use self::texture::*;
