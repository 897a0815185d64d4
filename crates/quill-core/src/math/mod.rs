//! Reexports [`glam`] and adds [`URect`].

mod rect;

pub use glam::*;

pub use self::rect::*;
