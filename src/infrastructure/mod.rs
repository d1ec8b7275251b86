pub mod renderer;

pub use renderer::{ChromeRenderer, Renderer};
