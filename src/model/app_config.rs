// ========================================
// AppConfig: サイト全体の設定ドキュメント
// ========================================

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

use super::fee::FeeForm;
use super::layout::PageSectionsLayout;
use super::menu::MenuTree;
use super::section::AppPageSection;

/// 1サイト分の永続化ドキュメント。保存時は常に全体を送信する。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_theme_light: Option<ThemePalette>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_theme_dark: Option<ThemePalette>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_theme_mode: Option<ThemeMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<Logo>,
    #[serde(default, rename = "favicon_url", skip_serializing_if = "Option::is_none")]
    pub favicon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu_tree: Option<Vec<MenuTree>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer_menu_tree: Option<Vec<MenuTree>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu_settings: Option<MenuSettings>,
    #[serde(default)]
    pub pages: BTreeMap<String, AppPage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fees: Option<Vec<FeeForm>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo: Option<BTreeMap<String, SeoForm>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_theme() -> String {
    "default-theme".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppPage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<PageSectionsLayout>,
    #[serde(default)]
    pub sections: Vec<AppPageSection>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemePalette {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paper: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Logo {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MenuSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<MenuLayout>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuLayout {
    /// "navbar" / "sidebar"
    #[serde(rename = "type")]
    pub layout_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AppConfig {
    pub fn from_json(source: &str) -> Result<Self, String> {
        serde_json::from_str(source).map_err(|e| format!("Failed to parse app config: {}", e))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        Self::from_json(&source)
    }

    pub fn to_json_pretty(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self).map_err(|e| format!("Failed to serialize app config: {}", e))
    }

    pub fn page(&self, key: &str) -> Option<&AppPage> {
        self.pages.get(key)
    }

    pub fn page_mut(&mut self, key: &str) -> Option<&mut AppPage> {
        self.pages.get_mut(key)
    }

    pub fn fees(&self) -> &[FeeForm] {
        self.fees.as_deref().unwrap_or(&[])
    }

    pub fn menu_tree(&self) -> &[MenuTree] {
        self.menu_tree.as_deref().unwrap_or(&[])
    }

    pub fn footer_menu_tree(&self) -> &[MenuTree] {
        self.footer_menu_tree.as_deref().unwrap_or(&[])
    }

    pub fn seo_for(&self, page_key: &str) -> Option<&SeoForm> {
        self.seo.as_ref().and_then(|seo| seo.get(page_key))
    }

    /// ページキーからURLパスを求める（"home" はルート）
    pub fn page_href(page_key: &str) -> String {
        if page_key == "home" {
            "/".to_string()
        } else {
            format!("/{}", page_key)
        }
    }

    /// URLパスに対応するページキー
    pub fn page_key_for_href(&self, href: &str) -> Option<&str> {
        let path = href.split(['?', '#']).next().unwrap_or(href);
        self.pages
            .keys()
            .find(|key| Self::page_href(key) == path)
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "name": "Demo",
            "theme": "cyberpunk",
            "menuTree": [{ "name": "Home", "type": "Page", "href": "/" }],
            "pages": {
                "home": {
                    "title": "Home",
                    "sections": [
                        { "type": "markdown", "data": "# Hi" },
                        { "type": "mystery", "payload": 1 }
                    ]
                },
                "swap": { "sections": [] }
            },
            "fees": [{ "recipient": "0x0000000000000000000000000000000000000001", "amountPercentage": 1 }],
            "seo": { "home": { "title": "Demo", "description": "demo site" } },
            "currency": "USD"
        })
    }

    #[test]
    fn test_roundtrip_preserves_document() {
        let raw = sample();
        let config: AppConfig = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(config.pages["home"].sections.len(), 2);
        assert_eq!(config.extra.get("currency"), Some(&json!("USD")));

        let again = serde_json::to_value(&config).unwrap();
        let reparsed: AppConfig = serde_json::from_value(again.clone()).unwrap();
        assert_eq!(reparsed, config);
        assert_eq!(again["pages"]["home"]["sections"][1], json!({ "type": "mystery", "payload": 1 }));
    }

    #[test]
    fn test_page_href_lookup() {
        let config: AppConfig = serde_json::from_value(sample()).unwrap();
        assert_eq!(config.page_key_for_href("/"), Some("home"));
        assert_eq!(config.page_key_for_href("/swap?chain=1"), Some("swap"));
        assert_eq!(config.page_key_for_href("/missing"), None);
    }

    #[test]
    fn test_invalid_json_reports_error() {
        let err = AppConfig::from_json("{ not json").unwrap_err();
        assert!(err.starts_with("Failed to parse app config"));
    }

    #[test]
    fn test_nested_settings_keep_unknown_fields() {
        let raw = json!({
            "logo": { "url": "/l.png", "width": 48, "widthMobile": 32, "heightMobile": 32 },
            "menuSettings": {
                "layout": { "type": "navbar", "variant": "glass", "sticky": true },
                "drawer": "left"
            },
            "seo": { "home": { "title": "T", "description": "D", "keywords": ["a"] } }
        });
        let config: AppConfig = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(config.logo.as_ref().map(|l| l.width), Some(Some(48)));
        let again = serde_json::to_value(&config).unwrap();
        assert_eq!(again["logo"], raw["logo"]);
        assert_eq!(again["menuSettings"], raw["menuSettings"]);
        assert_eq!(again["seo"], raw["seo"]);
    }
}
