// ========================================
// ページ全体の組み立て
// ========================================

use log::debug;

use super::html::{HtmlRenderer, escape_attr, escape_text};
use super::navigation::{render_footer, render_navbar};
use super::node::{Element, RenderNode};
use super::theme::resolve_theme;
use super::RenderContext;
use crate::model::app_config::AppConfig;
use crate::ui::composer::compose_sections;
use crate::ui::tabs::TabState;

#[derive(Debug, Clone)]
pub struct PageRenderOptions {
    pub ctx: RenderContext,
    pub tabs: TabState,
    /// ナビバーとフッターを含めるか（プレビューペインでは省略）
    pub with_chrome: bool,
}

impl PageRenderOptions {
    pub fn new(ctx: RenderContext) -> Self {
        Self {
            ctx,
            tabs: TabState::new(),
            with_chrome: true,
        }
    }
}

/// ページ本体（<body> の中身）の描画ツリー
pub fn render_page_tree(config: &AppConfig, page_key: &str, options: &PageRenderOptions) -> Result<RenderNode, String> {
    let page = config
        .page(page_key)
        .ok_or_else(|| format!("Page '{}' is not defined in app config", page_key))?;
    debug!(
        "Rendering page '{}' ({} sections) for {}",
        page_key,
        page.sections.len(),
        options.ctx.viewport
    );

    let main = Element::new("main")
        .class("pk-page")
        .attr("data-page", page_key)
        .attr("data-viewport", options.ctx.viewport.as_str())
        .child(compose_sections(&page.sections, page.layout.as_ref(), &options.ctx, &options.tabs));

    if !options.with_chrome {
        return Ok(main.into());
    }

    let active_href = AppConfig::page_href(page_key);
    Ok(RenderNode::Fragment(vec![
        render_navbar(config, Some(active_href.as_str()), &options.ctx),
        main.into(),
        render_footer(config, &options.ctx),
    ]))
}

/// <head> の中身（SEO・テーマ）
fn render_head(config: &AppConfig, page_key: &str) -> String {
    let page_title = config.page(page_key).and_then(|p| p.title.clone());
    let seo = config.seo_for(page_key);
    let title = seo
        .map(|s| s.title.clone())
        .filter(|t| !t.is_empty())
        .or(page_title)
        .unwrap_or_else(|| config.name.clone());

    let mut head = vec![format!("    <title>{}</title>", escape_text(&title))];
    if let Some(seo) = seo {
        if !seo.description.is_empty() {
            head.push(format!(
                r#"    <meta name="description" content="{}">"#,
                escape_attr(&seo.description)
            ));
        }
        if let Some(image) = seo.images.first() {
            head.push(format!(r#"    <meta property="og:image" content="{}">"#, escape_attr(image)));
        }
    }
    if let Some(favicon) = &config.favicon_url {
        head.push(format!(r#"    <link rel="icon" href="{}">"#, escape_attr(favicon)));
    }
    head.push(format!("    <style>{}</style>", resolve_theme(config).to_css_variables()));
    head.join("\n")
}

/// 完全なHTMLドキュメントとして描画する
pub fn render_page(config: &AppConfig, page_key: &str, options: &PageRenderOptions) -> Result<String, String> {
    let tree = render_page_tree(config, page_key, options)?;
    let mut renderer = HtmlRenderer::new();
    renderer.render(&tree);
    let lang = config.locale.as_deref().unwrap_or("en");
    Ok(renderer.document(&render_head(config, page_key), lang))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderMode;
    use crate::ui::viewport::Viewport;
    use serde_json::json;

    fn config() -> AppConfig {
        serde_json::from_value(json!({
            "name": "Demo <Shop>",
            "theme": "default-theme",
            "menuTree": [{ "name": "Home", "type": "Page", "href": "/" }],
            "pages": {
                "home": {
                    "title": "Home",
                    "layout": { "type": "tabs", "layout": { "mobile": { "position": "bottom" }, "desktop": { "position": "top" } } },
                    "sections": [
                        { "type": "markdown", "name": "About", "data": "hi" },
                        { "type": "swap", "name": "Swap", "config": {} }
                    ]
                }
            },
            "seo": { "home": { "title": "Demo Home", "description": "A \"demo\"", "images": ["https://x/og.png"] } }
        }))
        .unwrap()
    }

    #[test]
    fn test_missing_page_is_error() {
        let options = PageRenderOptions::new(RenderContext::new(Viewport::Desktop, RenderMode::ReadOnly));
        assert!(render_page(&config(), "nowhere", &options).is_err());
    }

    #[test]
    fn test_document_has_seo_and_theme() {
        let options = PageRenderOptions::new(RenderContext::new(Viewport::Desktop, RenderMode::ReadOnly));
        let html = render_page(&config(), "home", &options).unwrap();
        assert!(html.contains("<title>Demo Home</title>"));
        assert!(html.contains(r#"content="A &quot;demo&quot;""#));
        assert!(html.contains("--pk-primary"));
        assert!(html.contains("pk-navbar"));
        assert!(html.contains("pk-footer"));
    }

    #[test]
    fn test_mobile_bottom_nav_lands_after_main() {
        let options = PageRenderOptions::new(RenderContext::new(Viewport::Mobile, RenderMode::ReadOnly));
        let html = render_page(&config(), "home", &options).unwrap();
        let main_end = html.find("</main>").unwrap();
        let footer_end = html.find("</footer>").unwrap();
        let nav = html.find("pk-bottom-nav").unwrap();
        assert!(nav > main_end);
        assert!(nav > footer_end);
    }

    #[test]
    fn test_without_chrome_renders_only_main() {
        let mut options = PageRenderOptions::new(RenderContext::new(Viewport::Desktop, RenderMode::ReadOnly));
        options.with_chrome = false;
        let tree = render_page_tree(&config(), "home", &options).unwrap();
        assert!(tree.find_by_class("pk-navbar").is_empty());
        assert_eq!(tree.find_by_class("pk-page").len(), 1);
    }
}
