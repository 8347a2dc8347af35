// WASM専用のエントリーポイント

use wasm_bindgen::prelude::*;

use crate::analysis::analyze_config;
use crate::model::app_config::AppConfig;
use crate::model::section::AppPageSection;
use crate::render::html::HtmlRenderer;
use crate::render::page::{PageRenderOptions, render_page_tree};
use crate::render::{RenderContext, RenderMode};
use crate::ui::composer::compose_sections;
use crate::ui::tabs::TabState;
use crate::ui::viewport::Viewport;

const PORTAL_ROOT_ID: &str = "pk-portal-root";

#[wasm_bindgen(start)]
pub fn main() {
    // パニック時のエラーメッセージをブラウザコンソールに表示
    console_error_panic_hook::set_once();

    if console_log::init_with_level(log::Level::Debug).is_err() {
        web_sys::console::warn_1(&"logger already initialized".into());
    }
    crate::registry::initialize_cell_plugins();

    log::info!("pagekit WASM ready");
}

fn document() -> Result<web_sys::Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("No document available"))
}

/// ウィンドウ幅からビューポートを決める
fn current_viewport() -> Viewport {
    let width = web_sys::window()
        .and_then(|w| w.inner_width().ok())
        .and_then(|v| v.as_f64())
        .unwrap_or(1280.0);
    Viewport::from_width(width as f32)
}

/// 描画結果をコンテナに流し込み、ポータルは body 末尾へ置く
fn mount(container_id: &str, renderer: &HtmlRenderer) -> Result<(), JsValue> {
    let document = document()?;
    let container = document
        .get_element_by_id(container_id)
        .ok_or_else(|| JsValue::from_str(&format!("Container '{}' not found", container_id)))?;
    container.set_inner_html(&renderer.body_html());

    if let Some(old) = document.get_element_by_id(PORTAL_ROOT_ID) {
        old.remove();
    }
    let portals = renderer.portal_html();
    if !portals.is_empty() {
        let body = document.body().ok_or_else(|| JsValue::from_str("No <body> element"))?;
        body.insert_adjacent_html(
            "beforeend",
            &format!(r#"<div id="{}">{}</div>"#, PORTAL_ROOT_ID, portals),
        )?;
    }
    Ok(())
}

/// 設定JSONの1ページをコンテナに描画する
#[wasm_bindgen]
pub fn render_page_into(container_id: &str, config_json: &str, page_key: &str, editable: bool) -> Result<(), JsValue> {
    let config = AppConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e))?;
    let mode = if editable { RenderMode::Editable } else { RenderMode::ReadOnly };
    let options = PageRenderOptions::new(RenderContext::new(current_viewport(), mode));
    let tree = render_page_tree(&config, page_key, &options).map_err(|e| JsValue::from_str(&e))?;

    let mut renderer = HtmlRenderer::new();
    renderer.render(&tree);
    mount(container_id, &renderer)
}

/// 編集ダイアログのプレビューペイン用。本番と同じ合成処理を使う。
#[wasm_bindgen]
pub fn render_section_preview(container_id: &str, section_json: &str, mobile: bool) -> Result<(), JsValue> {
    let section: AppPageSection =
        serde_json::from_str(section_json).map_err(|e| JsValue::from_str(&format!("Invalid section: {}", e)))?;
    let viewport = if mobile { Viewport::Mobile } else { Viewport::Desktop };
    let ctx = RenderContext::new(viewport, RenderMode::ReadOnly);
    let tree = compose_sections(std::slice::from_ref(&section), None, &ctx, &TabState::new());

    let mut renderer = HtmlRenderer::new();
    renderer.render(&tree);
    let document = document()?;
    let container = document
        .get_element_by_id(container_id)
        .ok_or_else(|| JsValue::from_str(&format!("Container '{}' not found", container_id)))?;
    container.set_inner_html(&renderer.fragment_html());
    Ok(())
}

/// 設定の診断結果を "level: message (location)" の配列で返す
#[wasm_bindgen]
pub fn lint_config(config_json: &str) -> Result<Vec<String>, JsValue> {
    let config = AppConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e))?;
    Ok(analyze_config(&config)
        .diagnostics
        .iter()
        .map(|d| d.to_string())
        .collect())
}
