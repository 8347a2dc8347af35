// ========================================
// セクションレンダラー
// ========================================
//
// セクション型ごとに SectionRenderer を実装し、型付きの列挙で振り分ける。
// 未登録の型は何も描画しない（エラーにもしない）。

use lazy_static::lazy_static;
use log::{debug, warn};
use pulldown_cmark::{Event, Options, Parser, html};
use regex::Regex;
use serde::Serialize;

use super::node::{Element, RenderNode};
use super::{RenderContext, RenderMode};
use crate::model::section::*;
use crate::ui::viewport::Viewport;

pub trait SectionRenderer {
    fn render(&self, ctx: &RenderContext) -> RenderNode;
}

/// 1セクションを描画する。未登録の型は RenderNode::Empty。
pub fn render_section(section: &AppPageSection, ctx: &RenderContext) -> RenderNode {
    let body = match &section.kind {
        SectionKind::Swap(s) => s.render(ctx),
        SectionKind::Exchange(s) => s.render(ctx),
        SectionKind::Wallet(s) => s.render(ctx),
        SectionKind::Markdown(s) => s.render(ctx),
        SectionKind::Collection(s) => s.render(ctx),
        SectionKind::Showcase(s) => s.render(ctx),
        SectionKind::Carousel(s) => s.render(ctx),
        SectionKind::Commerce(s) => s.render(ctx),
        SectionKind::Referral(s) => s.render(ctx),
        SectionKind::Ranking(s) => s.render(ctx),
        SectionKind::Video(s) => s.render(ctx),
        SectionKind::CallToAction(s) => s.render(ctx),
        SectionKind::Featured(s) => s.render(ctx),
        SectionKind::CodePage(s) => s.render(ctx),
        SectionKind::Unknown { type_name, .. } => {
            debug!("Section type '{}' is not registered, skipping", type_name);
            return RenderNode::Empty;
        }
    };

    let mut wrapper = Element::new("section")
        .class("pk-section")
        .class(&format!("pk-section--{}", section.type_name()))
        .attr("data-section-type", section.type_name());
    if let Some(title) = section.title.as_deref().filter(|t| !t.is_empty()) {
        wrapper = wrapper.child(Element::new("h2").class("pk-section__title").text(title));
    }
    wrapper.child(body).into()
}

// ========================================
// 共通ヘルパー
// ========================================

/// ブロックチェーン依存のウィジェットはマウントポイントだけを出力し、
/// 設定を data-config に載せてクライアント側でハイドレートする
fn widget_mount<T: Serialize>(widget: &str, config: &T, ctx: &RenderContext) -> RenderNode {
    let config_json = serde_json::to_string(config).unwrap_or_else(|e| {
        log::error!("Failed to serialize {} widget config: {}", widget, e);
        "{}".to_string()
    });
    let mut el = Element::new("div")
        .class("pk-widget")
        .class(&format!("pk-widget--{}", widget))
        .attr("data-widget", widget)
        .attr("data-config", config_json)
        .attr("data-viewport", ctx.viewport.as_str());
    if ctx.mode == RenderMode::Editable {
        // 編集中はウィジェットを操作不能にする
        el = el.attr("data-inert", "true");
    }
    el.into()
}

fn link_card(item: &LinkItem) -> Element {
    let mut card = Element::new("a").class("pk-card");
    if let Some(url) = &item.url {
        card = card.attr("href", url.as_str());
    }
    if let Some(image) = &item.image_url {
        card = card.child(
            Element::new("img")
                .class("pk-card__image")
                .attr("src", image.as_str())
                .attr("alt", item.title.clone().unwrap_or_default()),
        );
    }
    if let Some(title) = &item.title {
        card = card.child(Element::new("h3").class("pk-card__title").text(title.as_str()));
    }
    if let Some(subtitle) = &item.subtitle {
        card = card.child(Element::new("p").class("pk-card__subtitle").text(subtitle.as_str()));
    }
    card
}

fn card_grid(items: &[LinkItem], ctx: &RenderContext) -> Element {
    let columns = match ctx.viewport {
        Viewport::Mobile => 1,
        Viewport::Desktop => 3,
    };
    Element::new("div")
        .class("pk-grid")
        .attr("style", format!("--pk-columns: {}", columns))
        .children(items.iter().map(link_card))
}

/// url('...') に埋め込んでも宣言を抜け出せない文字列か
fn is_css_safe(url: &str) -> bool {
    !url.is_empty()
        && !url
            .chars()
            .any(|c| matches!(c, '\'' | '"' | '(' | ')' | ';' | '<' | '>' | '\\' | '{' | '}') || c.is_control())
}

fn action_button(button: &ActionButton) -> Element {
    let mut link = Element::new("a").class("pk-button");
    if let Some(url) = &button.url {
        link = link.attr("href", url.as_str());
    }
    if let Some(title) = &button.title {
        link = link.text(title.as_str());
    }
    if button.open_in_new_page.unwrap_or(false) {
        link = link.attr("target", "_blank").attr("rel", "noopener noreferrer");
    }
    link
}

// ========================================
// ウィジェット系
// ========================================

impl SectionRenderer for SwapSection {
    fn render(&self, ctx: &RenderContext) -> RenderNode {
        widget_mount("swap", &self.config, ctx)
    }
}

impl SectionRenderer for ExchangeSection {
    fn render(&self, ctx: &RenderContext) -> RenderNode {
        widget_mount("exchange", &self.settings, ctx)
    }
}

impl SectionRenderer for WalletSection {
    fn render(&self, ctx: &RenderContext) -> RenderNode {
        widget_mount("wallet", &self.config, ctx)
    }
}

impl SectionRenderer for CollectionSection {
    fn render(&self, ctx: &RenderContext) -> RenderNode {
        widget_mount("collection", &self.config, ctx)
    }
}

impl SectionRenderer for CommerceSection {
    fn render(&self, ctx: &RenderContext) -> RenderNode {
        widget_mount("commerce", &self.settings, ctx)
    }
}

impl SectionRenderer for ReferralSection {
    fn render(&self, ctx: &RenderContext) -> RenderNode {
        let mut el = Element::new("div").class("pk-referral");
        if let Some(title) = &self.config.title {
            el = el.child(Element::new("h3").text(title.as_str()));
        }
        if let Some(subtitle) = &self.config.subtitle {
            el = el.child(Element::new("p").text(subtitle.as_str()));
        }
        el.child(widget_mount("referral", &self.config, ctx)).into()
    }
}

impl SectionRenderer for RankingSection {
    fn render(&self, ctx: &RenderContext) -> RenderNode {
        widget_mount("ranking", &self.settings, ctx)
    }
}

// ========================================
// コンテンツ系
// ========================================

impl SectionRenderer for MarkdownSection {
    fn render(&self, _ctx: &RenderContext) -> RenderNode {
        Element::new("div")
            .class("pk-markdown")
            .child(RenderNode::RawHtml(markdown_to_html(&self.data)))
            .into()
    }
}

pub fn markdown_to_html(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    // 生のHTMLはテキストとしてエスケープする
    let parser = Parser::new_ext(source, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

impl SectionRenderer for ShowcaseSection {
    fn render(&self, ctx: &RenderContext) -> RenderNode {
        let settings = &self.settings;
        let mut el = Element::new("div").class("pk-showcase");
        if let Some(alignment) = &settings.alignment {
            el = el.attr("data-align", alignment.as_str());
        }
        if let Some(title) = &settings.title {
            el = el.child(Element::new("h3").text(title.as_str()));
        }
        if let Some(subtitle) = &settings.subtitle {
            el = el.child(Element::new("p").text(subtitle.as_str()));
        }
        el.child(card_grid(&settings.items, ctx)).into()
    }
}

impl SectionRenderer for FeaturedSection {
    fn render(&self, ctx: &RenderContext) -> RenderNode {
        Element::new("div")
            .class("pk-featured")
            .child(card_grid(&self.items, ctx))
            .into()
    }
}

impl SectionRenderer for CarouselSection {
    fn render(&self, ctx: &RenderContext) -> RenderNode {
        let settings = &self.settings;
        let height = settings.height.as_ref().and_then(|h| match ctx.viewport {
            Viewport::Mobile => h.mobile,
            Viewport::Desktop => h.desktop,
        });

        let mut el = Element::new("div")
            .class("pk-carousel")
            .attr("data-interval", settings.interval.unwrap_or(5000).to_string());
        if let Some(height) = height {
            el = el.attr("style", format!("height: {}px", height));
        }

        let slides = settings.slides.iter().enumerate().map(|(i, slide)| {
            let mut s = Element::new("div")
                .class("pk-carousel__slide")
                .attr("data-slide", i.to_string());
            if i == 0 {
                s = s.class("pk-carousel__slide--active");
            }
            match slide.image_url.as_deref() {
                Some(image) if is_css_safe(image) => {
                    s = s.attr("style", format!("background-image: url('{}')", image));
                }
                Some(image) => warn!("Slide {} image url '{}' is not usable in CSS", i, image),
                None => {}
            }
            if let Some(title) = &slide.title {
                s = s.child(Element::new("h3").text(title.as_str()));
            }
            if let Some(subtitle) = &slide.subtitle {
                s = s.child(Element::new("p").text(subtitle.as_str()));
            }
            if let Some(action) = &slide.action {
                s = s.child(action_button(action));
            }
            s
        });
        el.children(slides).into()
    }
}

lazy_static! {
    static ref YOUTUBE_ID: Regex =
        Regex::new(r"(?:youtube\.com/(?:watch\?(?:.*&)?v=|embed/|shorts/)|youtu\.be/)([A-Za-z0-9_-]{6,})")
            .expect("valid youtube regex");
    static ref VIMEO_ID: Regex = Regex::new(r"vimeo\.com/(?:video/)?(\d+)").expect("valid vimeo regex");
}

/// 動画URLを埋め込み用URLに変換する
pub fn video_embed_url(embed_type: Option<&str>, url: &str) -> Option<String> {
    let youtube = || {
        YOUTUBE_ID
            .captures(url)
            .map(|c| format!("https://www.youtube.com/embed/{}", &c[1]))
    };
    let vimeo = || {
        VIMEO_ID
            .captures(url)
            .map(|c| format!("https://player.vimeo.com/video/{}", &c[1]))
    };
    match embed_type {
        Some("youtube") => youtube(),
        Some("vimeo") => vimeo(),
        _ => youtube().or_else(vimeo),
    }
}

impl SectionRenderer for VideoSection {
    fn render(&self, _ctx: &RenderContext) -> RenderNode {
        match video_embed_url(self.embed_type.as_deref(), &self.video_url) {
            Some(src) => Element::new("div")
                .class("pk-video")
                .child(
                    Element::new("iframe")
                        .attr("src", src)
                        .attr("allowfullscreen", "true")
                        .attr("loading", "lazy"),
                )
                .into(),
            None => {
                debug!("Video url '{}' is not embeddable", self.video_url);
                RenderNode::Empty
            }
        }
    }
}

impl SectionRenderer for CallToActionSection {
    fn render(&self, ctx: &RenderContext) -> RenderNode {
        let mut el = Element::new("div")
            .class("pk-cta")
            .attr("data-variant", self.variant.clone().unwrap_or_else(|| "light".to_string()));
        if let Some(subtitle) = &self.subtitle {
            el = el.child(Element::new("p").class("pk-cta__subtitle").text(subtitle.as_str()));
        }
        if let Some(button) = &self.button {
            el = el.child(action_button(button));
        }
        if !self.items.is_empty() {
            el = el.child(card_grid(&self.items, ctx));
        }
        el.into()
    }
}

impl SectionRenderer for CodePageSection {
    fn render(&self, ctx: &RenderContext) -> RenderNode {
        let config = &self.config;
        let mut el = Element::new("div").class("pk-code-page");
        if let Some(css) = &config.css {
            el = el.child(Element::new("style").child(RenderNode::RawHtml(css.clone())));
        }
        if let Some(markup) = &config.html {
            el = el.child(RenderNode::RawHtml(markup.clone()));
        }
        // スクリプトは公開ページでのみ実行する
        if let (Some(js), RenderMode::ReadOnly) = (&config.js, ctx.mode) {
            el = el.child(Element::new("script").child(RenderNode::RawHtml(js.clone())));
        }
        el.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx(viewport: Viewport) -> RenderContext {
        RenderContext::new(viewport, RenderMode::ReadOnly)
    }

    fn section(value: serde_json::Value) -> AppPageSection {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_unknown_type_renders_nothing() {
        let s = section(json!({ "type": "hologram", "settings": {} }));
        assert_eq!(render_section(&s, &ctx(Viewport::Desktop)), RenderNode::Empty);
    }

    #[test]
    fn test_swap_renders_mount_point_with_config() {
        let s = section(json!({ "type": "swap", "title": "Swap", "config": { "defaultChainId": 1 } }));
        let node = render_section(&s, &ctx(Viewport::Desktop));
        let widgets = node.find_by_class("pk-widget--swap");
        assert_eq!(widgets.len(), 1);
        assert_eq!(widgets[0].get_attr("data-config"), Some(r#"{"defaultChainId":1}"#));
        assert_eq!(node.text_content(), "Swap");
    }

    #[test]
    fn test_markdown_is_converted() {
        let s = section(json!({ "type": "markdown", "data": "# Title\n\nbody" }));
        let html = super::super::html::render_to_string(&render_section(&s, &ctx(Viewport::Mobile)));
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<p>body</p>"));
    }

    #[test]
    fn test_markdown_escapes_raw_html() {
        let html = markdown_to_html("hi <script>alert(1)</script>\n\n<img src=x onerror=alert(1)>");
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<img"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&lt;img src=x onerror=alert(1)&gt;"));
    }

    #[test]
    fn test_carousel_skips_image_urls_unsafe_for_css() {
        let s = section(json!({
            "type": "carousel",
            "settings": { "slides": [
                { "imageUrl": "https://cdn.example.com/a.png" },
                { "imageUrl": "x'); background: url(https://evil" }
            ] }
        }));
        let node = render_section(&s, &ctx(Viewport::Desktop));
        let slides = node.find_by_class("pk-carousel__slide");
        assert_eq!(
            slides[0].get_attr("style"),
            Some("background-image: url('https://cdn.example.com/a.png')")
        );
        assert_eq!(slides[1].get_attr("style"), None);
    }

    #[test]
    fn test_action_button_without_title() {
        let s = section(json!({
            "type": "call-to-action",
            "button": { "url": "/go", "caption": "Go" }
        }));
        let node = render_section(&s, &ctx(Viewport::Desktop));
        let buttons = node.find_by_class("pk-button");
        assert_eq!(buttons[0].get_attr("href"), Some("/go"));
        assert_eq!(node.text_content(), "");
    }

    #[test]
    fn test_carousel_height_follows_viewport() {
        let s = section(json!({
            "type": "carousel",
            "settings": { "height": { "mobile": 250, "desktop": 500 }, "slides": [{ "title": "A" }, { "title": "B" }] }
        }));
        let mobile = render_section(&s, &ctx(Viewport::Mobile));
        let desktop = render_section(&s, &ctx(Viewport::Desktop));
        assert_eq!(mobile.find_by_class("pk-carousel")[0].get_attr("style"), Some("height: 250px"));
        assert_eq!(desktop.find_by_class("pk-carousel")[0].get_attr("style"), Some("height: 500px"));
        assert_eq!(desktop.find_by_class("pk-carousel__slide").len(), 2);
    }

    #[test]
    fn test_video_embed_urls() {
        assert_eq!(
            video_embed_url(None, "https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("https://www.youtube.com/embed/dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            video_embed_url(Some("youtube"), "https://youtu.be/dQw4w9WgXcQ"),
            Some("https://www.youtube.com/embed/dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            video_embed_url(Some("vimeo"), "https://vimeo.com/76979871"),
            Some("https://player.vimeo.com/video/76979871".to_string())
        );
        assert_eq!(video_embed_url(Some("vimeo"), "https://example.com/clip"), None);
    }

    #[test]
    fn test_code_page_scripts_only_in_read_only_mode() {
        let s = section(json!({ "type": "code-page-section", "config": { "html": "<b>x</b>", "js": "run()" } }));
        let live = render_section(&s, &ctx(Viewport::Desktop));
        let editing = render_section(&s, &RenderContext::new(Viewport::Desktop, RenderMode::Editable));
        let has_script = |node: &RenderNode| {
            let mut found = false;
            node.visit_elements(&mut |el| found |= el.tag == "script");
            found
        };
        assert!(has_script(&live));
        assert!(!has_script(&editing));
    }
}
