// ========================================
// レイアウト合成
// ========================================
//
// セクション列とレイアウト記述子から描画ツリーを組み立てる。
// 編集ダイアログのプレビューも本番表示もこの関数を通る。

use log::trace;

use super::tabs::{TabState, tab_value};
use super::viewport::Viewport;
use crate::model::layout::{PageSectionsLayout, TabPosition};
use crate::model::section::AppPageSection;
use crate::render::node::{Element, PortalTarget, RenderNode};
use crate::render::section_renderer::render_section;
use crate::render::RenderContext;

/// サイドレールの列幅（12分割グリッド）
pub const SIDE_RAIL_COLUMNS: u8 = 3;

/// 現在のビューポートで表示されるセクション（元のインデックス付き）
pub fn visible_sections(sections: &[AppPageSection], viewport: Viewport) -> Vec<(usize, &AppPageSection)> {
    sections
        .iter()
        .enumerate()
        .filter(|(_, s)| !s.is_hidden_on(viewport))
        .collect()
}

/// セクション列を合成する
pub fn compose_sections(
    sections: &[AppPageSection],
    layout: Option<&PageSectionsLayout>,
    ctx: &RenderContext,
    tabs: &TabState,
) -> RenderNode {
    let visible = visible_sections(sections, ctx.viewport);
    trace!(
        "compose {} of {} sections for {} (tabs: {})",
        visible.len(),
        sections.len(),
        ctx.viewport,
        layout.map(|l| l.is_tabs()).unwrap_or(false)
    );

    match layout {
        Some(layout) if layout.is_tabs() => compose_tabs(&visible, layout, ctx, tabs),
        _ => compose_stack(&visible, ctx),
    }
}

fn render_entry(index: usize, section: &AppPageSection, ctx: &RenderContext) -> RenderNode {
    let rendered = render_section(section, ctx);
    if ctx.is_editable() {
        editor_frame(index, section, rendered)
    } else {
        rendered
    }
}

/// 編集モードで各セクションを囲む枠（操作ボタン付き）
fn editor_frame(index: usize, section: &AppPageSection, rendered: RenderNode) -> RenderNode {
    let idx = index.to_string();
    let button = |action: &str, label: &str| {
        Element::new("button")
            .class("pk-editor-frame__action")
            .attr("type", "button")
            .attr("data-action", action)
            .attr("data-section-index", idx.as_str())
            .text(label)
    };
    let mut frame = Element::new("div")
        .class("pk-editor-frame")
        .attr("data-section-index", idx.as_str())
        .attr("data-section-type", section.type_name())
        .child(
            Element::new("div")
                .class("pk-editor-frame__toolbar")
                .child(Element::new("span").class("pk-editor-frame__label").text(tab_label(section)))
                .child(button("move-up", "↑"))
                .child(button("move-down", "↓"))
                .child(button("edit", "Edit"))
                .child(button("remove", "Remove")),
        );
    if rendered.is_empty() {
        frame = frame.class("pk-editor-frame--unrendered");
    }
    frame.child(rendered).into()
}

fn compose_stack(visible: &[(usize, &AppPageSection)], ctx: &RenderContext) -> RenderNode {
    Element::new("div")
        .class("pk-stack")
        .children(visible.iter().map(|(i, s)| render_entry(*i, s, ctx)))
        .into()
}

/// タブのラベル（name → title → 型の表示名）
pub fn tab_label(section: &AppPageSection) -> String {
    match section.label() {
        Some(label) => label.to_string(),
        None => match section.section_type() {
            Some(ty) => ty.info().title.to_string(),
            None => section.type_name().to_string(),
        },
    }
}

#[derive(Clone, Copy, PartialEq)]
enum StripOrientation {
    Horizontal,
    Vertical,
}

fn tab_strip(
    visible: &[(usize, &AppPageSection)],
    selected: usize,
    orientation: StripOrientation,
) -> Element {
    let strip = Element::new("div")
        .class("pk-tabs")
        .attr("role", "tablist")
        .attr(
            "aria-orientation",
            match orientation {
                StripOrientation::Horizontal => "horizontal",
                StripOrientation::Vertical => "vertical",
            },
        );
    let strip = match orientation {
        StripOrientation::Horizontal => strip,
        StripOrientation::Vertical => strip.class("pk-tabs--vertical"),
    };
    strip.children(visible.iter().enumerate().map(|(i, (_, section))| {
        let value = tab_value(i);
        let mut tab = Element::new("button")
            .class("pk-tab")
            .attr("role", "tab")
            .attr("type", "button")
            .attr("id", value.as_str())
            .attr("data-tab", value.as_str())
            .attr("aria-selected", if i == selected { "true" } else { "false" })
            .text(tab_label(section));
        if i == selected {
            tab = tab.class("pk-tab--selected");
        }
        tab
    }))
}

/// モバイル下部のスティッキーナビゲーション（body へポータル）
fn bottom_navigation(visible: &[(usize, &AppPageSection)], selected: usize) -> RenderNode {
    let nav = Element::new("nav")
        .class("pk-bottom-nav")
        .attr("role", "tablist")
        .attr("style", "position: sticky; bottom: 0")
        .children(visible.iter().enumerate().map(|(i, (_, section))| {
            let value = tab_value(i);
            let mut action = Element::new("button")
                .class("pk-bottom-nav__action")
                .attr("role", "tab")
                .attr("type", "button")
                .attr("data-tab", value.as_str())
                .attr("aria-selected", if i == selected { "true" } else { "false" })
                .text(tab_label(section));
            if i == selected {
                action = action.class("pk-bottom-nav__action--selected");
            }
            action
        }));
    RenderNode::Portal {
        target: PortalTarget::Body,
        children: vec![nav.into()],
    }
}

fn compose_tabs(
    visible: &[(usize, &AppPageSection)],
    layout: &PageSectionsLayout,
    ctx: &RenderContext,
    tabs: &TabState,
) -> RenderNode {
    let selected = tabs.selected_index(visible.len());
    let panel: RenderNode = match visible.get(selected) {
        Some((index, section)) => Element::new("div")
            .class("pk-tab-panel")
            .attr("role", "tabpanel")
            .attr("aria-labelledby", tab_value(selected))
            .child(render_entry(*index, section, ctx))
            .into(),
        None => RenderNode::Empty,
    };

    let container = Element::new("div").class("pk-tabs-layout");
    let position = layout.position_for(ctx.viewport);
    match (position, ctx.viewport) {
        (Some(TabPosition::Top), _) | (Some(TabPosition::Side), Viewport::Mobile) => container
            .child(tab_strip(visible, selected, StripOrientation::Horizontal))
            .child(panel)
            .into(),
        (Some(TabPosition::Bottom), Viewport::Mobile) => container
            .class("pk-tabs-layout--bottom-nav")
            .child(panel)
            .child(bottom_navigation(visible, selected))
            .into(),
        (Some(TabPosition::Bottom), Viewport::Desktop) => container
            .child(panel)
            .child(tab_strip(visible, selected, StripOrientation::Horizontal))
            .into(),
        (Some(TabPosition::Side), Viewport::Desktop) => container
            .class("pk-tabs-layout--side")
            .child(
                Element::new("div")
                    .class("pk-col")
                    .attr("data-columns", SIDE_RAIL_COLUMNS.to_string())
                    .child(tab_strip(visible, selected, StripOrientation::Vertical)),
            )
            .child(
                Element::new("div")
                    .class("pk-col")
                    .attr("data-columns", (12 - SIDE_RAIL_COLUMNS).to_string())
                    .child(panel),
            )
            .into(),
        // 位置未設定のブレークポイントはタブ列を出さない
        (None, _) => container.child(panel).into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::section::SectionType;
    use crate::render::RenderMode;
    use crate::render::html::HtmlRenderer;
    use serde_json::json;

    fn ctx(viewport: Viewport) -> RenderContext {
        RenderContext::new(viewport, RenderMode::ReadOnly)
    }

    fn sections() -> Vec<AppPageSection> {
        serde_json::from_value(json!([
            { "type": "markdown", "name": "Intro", "data": "hello" },
            { "type": "swap", "title": "Trade", "hideMobile": true, "config": {} },
            { "type": "wallet", "hideDesktop": true, "config": {} },
            { "type": "featured", "items": [] }
        ]))
        .unwrap()
    }

    #[test]
    fn test_stack_count_equals_input_minus_hidden() {
        let list = sections();
        for viewport in Viewport::ALL {
            let hidden = list.iter().filter(|s| s.is_hidden_on(viewport)).count();
            let node = compose_sections(&list, None, &ctx(viewport), &TabState::new());
            assert_eq!(node.find_by_class("pk-section").len(), list.len() - hidden);
        }
    }

    #[test]
    fn test_hide_flags_per_viewport() {
        let list = sections();
        let mobile = compose_sections(&list, None, &ctx(Viewport::Mobile), &TabState::new());
        let desktop = compose_sections(&list, None, &ctx(Viewport::Desktop), &TabState::new());

        let types = |node: &RenderNode| -> Vec<String> {
            node.find_by_attr("data-section-type")
                .iter()
                .filter_map(|el| el.get_attr("data-section-type").map(str::to_string))
                .collect()
        };
        assert_eq!(types(&mobile), vec!["markdown", "wallet", "featured"]);
        assert_eq!(types(&desktop), vec!["markdown", "swap", "featured"]);
    }

    #[test]
    fn test_non_tabs_layout_is_a_stack() {
        let list = sections();
        let layout = PageSectionsLayout::stack();
        let node = compose_sections(&list, Some(&layout), &ctx(Viewport::Desktop), &TabState::new());
        assert_eq!(node.find_by_class("pk-stack").len(), 1);
        assert!(node.find_by_class("pk-tabs").is_empty());
    }

    #[test]
    fn test_tabs_labels_and_selected_panel() {
        let list = sections();
        let layout = PageSectionsLayout::tabs(Some(TabPosition::Top), Some(TabPosition::Top));
        let mut state = TabState::new();
        state.select(1);
        let node = compose_sections(&list, Some(&layout), &ctx(Viewport::Desktop), &state);

        let labels: Vec<String> = node
            .find_by_class("pk-tab")
            .iter()
            .map(|el| RenderNode::Element((*el).clone()).text_content())
            .collect();
        assert_eq!(labels, vec!["Intro", "Trade", "Featured"]);

        let panels = node.find_by_class("pk-tab-panel");
        assert_eq!(panels.len(), 1);
        assert_eq!(
            RenderNode::Element(panels[0].clone()).find_by_class("pk-section--swap").len(),
            1
        );
    }

    #[test]
    fn test_mobile_bottom_position_portals_bottom_nav() {
        let list = sections();
        let layout = PageSectionsLayout::tabs(Some(TabPosition::Bottom), Some(TabPosition::Top));
        let node = compose_sections(&list, Some(&layout), &ctx(Viewport::Mobile), &TabState::new());

        assert_eq!(node.portals().len(), 1);
        assert_eq!(node.find_by_class("pk-bottom-nav").len(), 1);
        assert!(node.find_by_class("pk-tabs").is_empty());

        let mut renderer = HtmlRenderer::new();
        renderer.render(&node);
        assert!(!renderer.body_html().contains("pk-bottom-nav"));
        assert!(renderer.portal_html().contains("pk-bottom-nav"));
    }

    #[test]
    fn test_desktop_side_position_renders_rail_column() {
        let list = sections();
        let layout = PageSectionsLayout::tabs(Some(TabPosition::Bottom), Some(TabPosition::Side));
        let node = compose_sections(&list, Some(&layout), &ctx(Viewport::Desktop), &TabState::new());

        let rail = node.find_by_class("pk-tabs--vertical");
        assert_eq!(rail.len(), 1);
        let columns: Vec<&str> = node
            .find_by_class("pk-col")
            .iter()
            .filter_map(|el| el.get_attr("data-columns"))
            .collect();
        assert_eq!(columns, vec!["3", "9"]);
        assert!(node.portals().is_empty());
    }

    #[test]
    fn test_unset_position_renders_no_strip() {
        let list = sections();
        let layout = PageSectionsLayout::tabs(None, Some(TabPosition::Top));
        let node = compose_sections(&list, Some(&layout), &ctx(Viewport::Mobile), &TabState::new());
        assert!(node.find_by_class("pk-tabs").is_empty());
        assert!(node.find_by_class("pk-bottom-nav").is_empty());
        assert_eq!(node.find_by_class("pk-tab-panel").len(), 1);
    }

    #[test]
    fn test_editable_mode_frames_sections_with_original_index() {
        let list = sections();
        let ctx = RenderContext::new(Viewport::Mobile, RenderMode::Editable);
        let node = compose_sections(&list, None, &ctx, &TabState::new());
        let indices: Vec<&str> = node
            .find_by_class("pk-editor-frame")
            .iter()
            .filter_map(|el| el.get_attr("data-section-index"))
            .collect();
        assert_eq!(indices, vec!["0", "2", "3"]);
    }

    #[test]
    fn test_tab_label_falls_back_to_type_title() {
        let section = AppPageSection::blank(SectionType::Swap);
        assert_eq!(tab_label(&section), SectionType::Swap.info().title);
    }
}
