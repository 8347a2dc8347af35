// ========================================
// ページエディタのセルプラグイン登録
// ========================================
//
// セルに配置できるコンテンツ（プラグイン）の一覧を保持する。
// 組み込みプラグインはセクション型ごとに1つと spacer / text。
// 外部クレートは register_cell_plugin か CELL_PLUGIN_BOOTSTRAP で追加する。

use log::{debug, warn};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};

use super::BuilderKit;
use crate::model::section::{AppPageSection, SectionType};
use crate::render::node::{Element, RenderNode};
use crate::render::section_renderer::render_section;
use crate::render::RenderContext;

/// セルの data を描画する関数
pub type CellRenderFn = fn(&Value, &RenderContext) -> RenderNode;

#[derive(Debug, Clone)]
pub struct CellPlugin {
    pub id: String,
    pub version: u32,
    pub title: String,
    pub kits: Vec<BuilderKit>,
    pub section_type: Option<SectionType>,
    pub render: CellRenderFn,
}

impl CellPlugin {
    pub fn supports(&self, kit: BuilderKit) -> bool {
        self.kits.contains(&kit)
    }
}

/// 組み込みセクション型プラグインのID
pub fn section_plugin_id(ty: SectionType) -> String {
    format!("pagekit/{}", ty.as_str())
}

lazy_static::lazy_static! {
    static ref CELL_PLUGIN_REGISTRY: Arc<Mutex<HashMap<String, CellPlugin>>> =
        Arc::new(Mutex::new(builtin_plugins()));
}

// Distributed-slice bootstrap for plugin registrations (native only)
#[cfg(not(target_arch = "wasm32"))]
#[linkme::distributed_slice]
pub static CELL_PLUGIN_BOOTSTRAP: [fn()] = [..];

static BOOTSTRAP: Once = Once::new();

/// linkme 経由で登録されたプラグインを一度だけ読み込む
pub fn initialize_cell_plugins() {
    BOOTSTRAP.call_once(|| {
        #[cfg(not(target_arch = "wasm32"))]
        for init_fn in CELL_PLUGIN_BOOTSTRAP {
            init_fn();
        }
        debug!("Cell plugins ready");
    });
}

/// プラグインを登録（同じIDは上書き）
pub fn register_cell_plugin(plugin: CellPlugin) {
    let Ok(mut registry) = CELL_PLUGIN_REGISTRY.lock() else {
        warn!("Cell plugin registry is poisoned; '{}' was not registered", plugin.id);
        return;
    };
    if registry.contains_key(&plugin.id) {
        warn!("Cell plugin '{}' replaced", plugin.id);
    }
    registry.insert(plugin.id.clone(), plugin);
}

pub fn find_plugin(id: &str) -> Option<CellPlugin> {
    CELL_PLUGIN_REGISTRY.lock().ok()?.get(id).cloned()
}

/// キットで使えるプラグイン（ID順）
pub fn plugins_for_kit(kit: BuilderKit) -> Vec<CellPlugin> {
    let Ok(registry) = CELL_PLUGIN_REGISTRY.lock() else {
        return Vec::new();
    };
    let mut plugins: Vec<CellPlugin> = registry.values().filter(|p| p.supports(kit)).cloned().collect();
    plugins.sort_by(|a, b| a.id.cmp(&b.id));
    plugins
}

// ========================================
// 組み込みプラグイン
// ========================================

fn builtin_plugins() -> HashMap<String, CellPlugin> {
    let mut plugins = HashMap::new();
    for ty in SectionType::ALL {
        let info = ty.info();
        let plugin = CellPlugin {
            id: section_plugin_id(*ty),
            version: 1,
            title: info.title.to_string(),
            kits: info.kits.to_vec(),
            section_type: Some(*ty),
            render: render_section_cell,
        };
        plugins.insert(plugin.id.clone(), plugin);
    }

    let all = vec![BuilderKit::General, BuilderKit::Nft, BuilderKit::Swap];
    for (id, title, render) in [
        ("pagekit/spacer", "Spacer", render_spacer as CellRenderFn),
        ("pagekit/text", "Text", render_text as CellRenderFn),
    ] {
        plugins.insert(
            id.to_string(),
            CellPlugin {
                id: id.to_string(),
                version: 1,
                title: title.to_string(),
                kits: all.clone(),
                section_type: None,
                render,
            },
        );
    }
    plugins
}

/// data をセクションJSONとして描画する
fn render_section_cell(data: &Value, ctx: &RenderContext) -> RenderNode {
    match serde_json::from_value::<AppPageSection>(data.clone()) {
        Ok(section) => render_section(&section, ctx),
        Err(e) => {
            warn!("Cell data is not a section: {}", e);
            RenderNode::Empty
        }
    }
}

fn render_spacer(data: &Value, _ctx: &RenderContext) -> RenderNode {
    let height = data.get("height").and_then(Value::as_u64).unwrap_or(32);
    Element::new("div")
        .class("pk-spacer")
        .attr("style", format!("height:{}px", height))
        .into()
}

fn render_text(data: &Value, _ctx: &RenderContext) -> RenderNode {
    let text = data.get("text").and_then(Value::as_str).unwrap_or_default();
    Element::new("p").class("pk-text").text(text).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderMode;
    use crate::ui::viewport::Viewport;
    use serde_json::json;

    fn ctx() -> RenderContext {
        RenderContext::new(Viewport::Desktop, RenderMode::ReadOnly)
    }

    #[test]
    fn test_builtin_plugins_cover_section_types() {
        for ty in SectionType::ALL {
            let plugin = find_plugin(&section_plugin_id(*ty)).unwrap();
            assert_eq!(plugin.section_type, Some(*ty));
        }
        assert!(find_plugin("pagekit/spacer").is_some());
    }

    #[test]
    fn test_kit_filtering() {
        let swap: Vec<String> = plugins_for_kit(BuilderKit::Swap).into_iter().map(|p| p.id).collect();
        assert!(swap.contains(&"pagekit/swap".to_string()));
        assert!(!swap.contains(&"pagekit/collection".to_string()));
        assert!(swap.contains(&"pagekit/text".to_string()));
    }

    #[test]
    fn test_register_custom_plugin() {
        register_cell_plugin(CellPlugin {
            id: "acme/banner".into(),
            version: 2,
            title: "Banner".into(),
            kits: vec![BuilderKit::Nft],
            section_type: None,
            render: render_text,
        });
        assert_eq!(find_plugin("acme/banner").map(|p| p.version), Some(2));
        assert!(plugins_for_kit(BuilderKit::Nft).iter().any(|p| p.id == "acme/banner"));
        assert!(!plugins_for_kit(BuilderKit::Swap).iter().any(|p| p.id == "acme/banner"));
    }

    #[test]
    fn test_section_cell_renders_section() {
        let plugin = find_plugin("pagekit/markdown").unwrap();
        let node = (plugin.render)(&json!({ "type": "markdown", "data": "**hi**" }), &ctx());
        assert_eq!(node.find_by_class("pk-section--markdown").len(), 1);
        assert!(matches!((plugin.render)(&json!("oops"), &ctx()), RenderNode::Empty));
    }

    #[test]
    fn test_spacer_height() {
        let node = render_spacer(&json!({ "height": 10 }), &ctx());
        assert_eq!(node.find_by_class("pk-spacer")[0].get_attr("style"), Some("height:10px"));
    }
}
