// ========================================
// ナビゲーション（ナビバー・サイドバー・フッター）
// ========================================

use super::node::{Element, RenderNode};
use super::RenderContext;
use crate::model::app_config::AppConfig;
use crate::model::menu::{MenuItemType, MenuTree};
use crate::ui::viewport::Viewport;

fn menu_link(item: &MenuTree, active_href: Option<&str>) -> Element {
    let href = item.href.clone().unwrap_or_else(|| "#".to_string());
    let mut link = Element::new("a").class("pk-menu__link").attr("href", href.as_str());
    if item.item_type == MenuItemType::External {
        link = link.attr("target", "_blank").attr("rel", "noopener noreferrer");
    }
    if active_href == Some(href.as_str()) {
        link = link.class("pk-menu__link--active").attr("aria-current", "page");
    }
    link.text(item.name.as_str())
}

fn menu_item(item: &MenuTree, active_href: Option<&str>) -> Element {
    let li = Element::new("li").class("pk-menu__item");
    match item.item_type {
        MenuItemType::Menu => li.class("pk-menu__item--group").child(
            Element::new("details")
                .child(Element::new("summary").text(item.name.as_str()))
                .child(menu_list(item.children(), active_href)),
        ),
        MenuItemType::Page | MenuItemType::External => li.child(menu_link(item, active_href)),
    }
}

fn menu_list(items: &[MenuTree], active_href: Option<&str>) -> Element {
    Element::new("ul")
        .class("pk-menu")
        .children(items.iter().map(|item| menu_item(item, active_href)))
}

fn brand(config: &AppConfig) -> Element {
    let mut home = Element::new("a").class("pk-brand").attr("href", "/");
    match &config.logo {
        Some(logo) => {
            let mut img = Element::new("img")
                .attr("src", logo.url.as_str())
                .attr("alt", config.name.as_str());
            if let Some(w) = logo.width {
                img = img.attr("width", w.to_string());
            }
            if let Some(h) = logo.height {
                img = img.attr("height", h.to_string());
            }
            home = home.child(img);
        }
        None => home = home.text(config.name.as_str()),
    }
    home
}

/// ヘッダーナビゲーション。menuSettings.layout.type が sidebar の場合は
/// デスクトップで側面メニューになる。モバイルでは常にドロワー。
pub fn render_navbar(config: &AppConfig, active_href: Option<&str>, ctx: &RenderContext) -> RenderNode {
    let menu = config.menu_tree();
    let sidebar = config
        .menu_settings
        .as_ref()
        .and_then(|s| s.layout.as_ref())
        .map(|l| l.layout_type == "sidebar")
        .unwrap_or(false);

    match ctx.viewport {
        Viewport::Mobile => Element::new("header")
            .class("pk-navbar")
            .class("pk-navbar--mobile")
            .child(brand(config))
            .child(
                Element::new("details")
                    .class("pk-drawer")
                    .child(Element::new("summary").attr("aria-label", "menu").text("☰"))
                    .child(menu_list(menu, active_href)),
            )
            .into(),
        Viewport::Desktop if sidebar => Element::new("aside")
            .class("pk-sidebar")
            .child(brand(config))
            .child(Element::new("nav").child(menu_list(menu, active_href)))
            .into(),
        Viewport::Desktop => Element::new("header")
            .class("pk-navbar")
            .child(brand(config))
            .child(Element::new("nav").child(menu_list(menu, active_href)))
            .into(),
    }
}

/// フッター。最上位の Menu はリンク列の見出しになる。
pub fn render_footer(config: &AppConfig, _ctx: &RenderContext) -> RenderNode {
    let items = config.footer_menu_tree();
    if items.is_empty() {
        return Element::new("footer").class("pk-footer").text(config.name.as_str()).into();
    }
    let columns = items.iter().map(|item| match item.item_type {
        MenuItemType::Menu => Element::new("div")
            .class("pk-footer__column")
            .child(Element::new("h4").text(item.name.as_str()))
            .child(menu_list(item.children(), None)),
        _ => Element::new("div").class("pk-footer__column").child(menu_link(item, None)),
    });
    Element::new("footer").class("pk-footer").children(columns).into()
}
