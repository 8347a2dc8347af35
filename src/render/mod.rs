pub mod html;
pub mod navigation;
pub mod node;
pub mod page;
pub mod section_renderer;
pub mod theme;

use crate::ui::viewport::Viewport;

pub use html::{HtmlRenderer, render_to_string};
pub use node::{Element, PortalTarget, RenderNode};
pub use page::{PageRenderOptions, render_page, render_page_tree};
pub use section_renderer::{SectionRenderer, render_section};

/// 編集可能モードか閲覧専用モードか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    ReadOnly,
    Editable,
}

impl std::str::FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" | "readonly" => Ok(RenderMode::ReadOnly),
            "edit" | "editable" => Ok(RenderMode::Editable),
            other => Err(format!("Unknown render mode '{}' (expected view/edit)", other)),
        }
    }
}

/// 描画時の環境（ビューポートとモード）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderContext {
    pub viewport: Viewport,
    pub mode: RenderMode,
}

impl RenderContext {
    pub fn new(viewport: Viewport, mode: RenderMode) -> Self {
        Self { viewport, mode }
    }

    pub fn is_editable(&self) -> bool {
        self.mode == RenderMode::Editable
    }
}
