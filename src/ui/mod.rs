pub mod composer;
pub mod tabs;
pub mod viewport;

pub use composer::{compose_sections, tab_label, visible_sections};
pub use tabs::TabState;
pub use viewport::Viewport;
