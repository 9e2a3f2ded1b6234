pub mod renderer;

pub use renderer::{HudView, Renderer};
