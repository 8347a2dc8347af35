use std::collections::HashMap;

use super::error::Diagnostic;
use crate::model::app_config::AppConfig;
use crate::model::fee::{MAX_FEES, total_percentage};
use crate::model::menu::{MenuItemType, MenuTree};
use crate::model::section::{SectionKind, SectionType};
use crate::ui::viewport::Viewport;
use crate::wizard::fees::is_valid_address;

pub fn run_lints(config: &AppConfig) -> Vec<Diagnostic> {
    let mut diags = Vec::new();

    // ページとセクション
    for (key, page) in &config.pages {
        if page.sections.is_empty() {
            diags.push(Diagnostic::info(format!("Page '{}' has no sections", key)).at(format!("pages.{}", key)));
        }

        for (i, section) in page.sections.iter().enumerate() {
            let location = format!("pages.{}.sections[{}]", key, i);
            if let SectionKind::Unknown { type_name, .. } = &section.kind {
                let message = if type_name.parse::<SectionType>().is_ok() {
                    format!("Section '{}' has settings that cannot be read and renders nothing", type_name)
                } else {
                    format!("Section type '{}' is not registered and renders nothing", type_name)
                };
                diags.push(Diagnostic::warning(message).at(location));
                continue;
            }
            if section.hide_mobile == Some(true) && section.hide_desktop == Some(true) {
                diags.push(Diagnostic::info("Section is hidden on every viewport").at(location.clone()));
            }
            let (Some(ty), Ok(value)) = (section.section_type(), section.to_value()) else {
                continue;
            };
            if let Err(errors) = ty.form_schema().validate(&value) {
                for e in errors {
                    diags.push(Diagnostic::warning(format!("Invalid {} settings: {}", ty, e)).at(location.clone()));
                }
            }
        }

        // タブの位置が未設定のビューポート
        if let Some(layout) = page.layout.as_ref().filter(|l| l.is_tabs()) {
            for viewport in Viewport::ALL {
                if layout.position_for(viewport).is_none() {
                    diags.push(
                        Diagnostic::info(format!(
                            "Tabs layout has no {} position; the tab strip is not shown there",
                            viewport
                        ))
                        .at(format!("pages.{}.layout", key)),
                    );
                }
            }
        }
    }

    // メニューのリンク先
    for (field, tree) in [("menuTree", config.menu_tree()), ("footerMenuTree", config.footer_menu_tree())] {
        for (i, root) in tree.iter().enumerate() {
            check_menu_links(config, root, &format!("{}[{}]", field, i), &mut diags);
        }
    }

    // 手数料
    let fees = config.fees();
    let total = total_percentage(fees);
    if total > MAX_FEES {
        diags.push(
            Diagnostic::warning(format!("Fees add up to {}%, above the {}% limit", total, MAX_FEES)).at("fees"),
        );
    }
    let mut recipients = HashMap::<String, usize>::new();
    for (i, fee) in fees.iter().enumerate() {
        if !is_valid_address(&fee.recipient) {
            diags.push(
                Diagnostic::error(format!("Fee recipient '{}' is not a valid address", fee.recipient))
                    .at(format!("fees[{}]", i)),
            );
        }
        *recipients.entry(fee.recipient.to_ascii_lowercase()).or_insert(0) += 1;
    }
    let mut duplicated: Vec<_> = recipients.into_iter().filter(|(_, count)| *count > 1).collect();
    duplicated.sort();
    for (recipient, count) in duplicated {
        diags.push(
            Diagnostic::error(format!("Fee recipient {} appears {} times", recipient, count)).at("fees"),
        );
    }

    // SEO
    if let Some(seo) = &config.seo {
        for key in seo.keys() {
            if config.page(key).is_none() {
                diags.push(
                    Diagnostic::warning(format!("SEO settings exist for undefined page '{}'", key))
                        .at(format!("seo.{}", key)),
                );
            }
        }
    }

    diags
}

fn check_menu_links(config: &AppConfig, item: &MenuTree, location: &str, diags: &mut Vec<Diagnostic>) {
    if item.item_type == MenuItemType::Page {
        match item.href.as_deref() {
            Some(href) if config.page_key_for_href(href).is_some() => {}
            Some(href) => diags.push(
                Diagnostic::warning(format!("Menu item '{}' links to '{}' but no such page exists", item.name, href))
                    .at(location),
            ),
            None => diags.push(Diagnostic::warning(format!("Menu item '{}' has no link", item.name)).at(location)),
        }
    }
    for (i, child) in item.children().iter().enumerate() {
        check_menu_links(config, child, &format!("{}.children[{}]", location, i), diags);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze_config;
    use crate::analysis::error::DiagnosticLevel;
    use serde_json::json;

    fn config(value: serde_json::Value) -> AppConfig {
        serde_json::from_value(value).unwrap()
    }

    fn messages(config: &AppConfig) -> Vec<String> {
        run_lints(config).into_iter().map(|d| d.message).collect()
    }

    #[test]
    fn test_clean_config_has_no_findings() {
        let config = config(json!({
            "name": "Shop",
            "menuTree": [{ "name": "Home", "type": "Page", "href": "/" }],
            "pages": { "home": { "sections": [{ "type": "markdown", "data": "hi" }] } },
            "fees": [{ "recipient": "0x1111111111111111111111111111111111111111", "amountPercentage": 2 }]
        }));
        assert!(run_lints(&config).is_empty());
    }

    #[test]
    fn test_unknown_section_and_empty_page() {
        let config = config(json!({
            "pages": {
                "home": { "sections": [{ "type": "hologram" }] },
                "about": { "sections": [] }
            }
        }));
        let diags = run_lints(&config);
        assert!(diags.iter().any(|d| d.message.contains("'hologram'")
            && d.location.as_deref() == Some("pages.home.sections[0]")));
        assert!(diags.iter().any(|d| d.level == DiagnosticLevel::Info && d.message.contains("'about'")));
    }

    #[test]
    fn test_unreadable_known_section() {
        let config = config(json!({
            "pages": { "home": { "sections": [{ "type": "markdown", "data": null }] } }
        }));
        assert_eq!(
            messages(&config),
            vec!["Section 'markdown' has settings that cannot be read and renders nothing".to_string()]
        );
    }

    #[test]
    fn test_tabs_with_unset_position() {
        let config = config(json!({
            "pages": { "home": {
                "layout": { "type": "tabs", "layout": { "desktop": { "position": "side" } } },
                "sections": [{ "type": "swap", "config": {} }]
            } }
        }));
        let msgs = messages(&config);
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].contains("mobile"));
    }

    #[test]
    fn test_menu_links_to_missing_page() {
        let config = config(json!({
            "menuTree": [{ "name": "More", "type": "Menu", "children": [
                { "name": "Docs", "type": "Page", "href": "/docs" }
            ] }],
            "pages": { "home": { "sections": [{ "type": "markdown", "data": "x" }] } }
        }));
        let diags = run_lints(&config);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].location.as_deref(), Some("menuTree[0].children[0]"));
    }

    #[test]
    fn test_fee_findings() {
        let config = config(json!({
            "fees": [
                { "recipient": "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA", "amountPercentage": 6 },
                { "recipient": "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "amountPercentage": 6 },
                { "recipient": "nobody", "amountPercentage": 1 }
            ]
        }));
        let result = analyze_config(&config);
        assert_eq!(result.count(DiagnosticLevel::Error), 2);
        assert_eq!(result.count(DiagnosticLevel::Warning), 1);
        assert!(result.has_errors());
    }

    #[test]
    fn test_seo_for_missing_page() {
        let config = config(json!({
            "pages": { "home": { "sections": [{ "type": "markdown", "data": "x" }] } },
            "seo": { "blog": { "title": "Blog" } }
        }));
        assert_eq!(messages(&config), vec!["SEO settings exist for undefined page 'blog'".to_string()]);
    }

    #[test]
    fn test_invalid_settings_are_reported() {
        let config = config(json!({
            "pages": { "home": { "sections": [{ "type": "video", "videoUrl": "" }] } }
        }));
        let msgs = messages(&config);
        assert_eq!(msgs, vec!["Invalid video settings: 'videoUrl' is required".to_string()]);
    }
}
