pub mod headless;

pub use headless::{RenderSession, SessionOptions};
