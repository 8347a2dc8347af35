// ========================================
// セクションレイアウト記述子
// ========================================
//
// { "type": "tabs", "layout": { "mobile": { "position": "bottom" }, "desktop": { "position": "side" } } }
// type が "tabs" 以外なら通常の縦積み。

use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::ui::viewport::Viewport;

pub const TABS_LAYOUT: &str = "tabs";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSectionsLayout {
    #[serde(rename = "type")]
    pub layout_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<TabsLayoutSettings>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabsLayoutSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<BreakpointSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desktop: Option<BreakpointSettings>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 未知の position 文字列は extra に残し、未設定として扱う
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BreakpointSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<TabPosition>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BreakpointSettings {
    pub fn at(position: Option<TabPosition>) -> Self {
        Self {
            position,
            extra: Map::new(),
        }
    }
}

impl<'de> Deserialize<'de> for BreakpointSettings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut extra = Map::<String, Value>::deserialize(deserializer)?;
        let position = match extra.remove("position") {
            None | Some(Value::Null) => None,
            Some(raw) => match serde_json::from_value::<TabPosition>(raw.clone()) {
                Ok(position) => Some(position),
                Err(_) => {
                    warn!("Unknown tab position {}; treated as unset", raw);
                    extra.insert("position".to_string(), raw);
                    None
                }
            },
        };
        Ok(Self { position, extra })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabPosition {
    Top,
    Bottom,
    Side,
}

impl PageSectionsLayout {
    /// ブレークポイントごとのタブ位置を指定したタブレイアウト
    pub fn tabs(mobile: Option<TabPosition>, desktop: Option<TabPosition>) -> Self {
        Self {
            layout_type: TABS_LAYOUT.to_string(),
            layout: Some(TabsLayoutSettings {
                mobile: Some(BreakpointSettings::at(mobile)),
                desktop: Some(BreakpointSettings::at(desktop)),
                extra: Map::new(),
            }),
            extra: Map::new(),
        }
    }

    pub fn stack() -> Self {
        Self {
            layout_type: "list".to_string(),
            layout: None,
            extra: Map::new(),
        }
    }

    pub fn is_tabs(&self) -> bool {
        self.layout_type == TABS_LAYOUT
    }

    /// ビューポートごとに独立して解決されるタブ位置（未設定なら None）
    pub fn position_for(&self, viewport: Viewport) -> Option<TabPosition> {
        let settings = self.layout.as_ref()?;
        let breakpoint = match viewport {
            Viewport::Mobile => settings.mobile.as_ref(),
            Viewport::Desktop => settings.desktop.as_ref(),
        };
        breakpoint.and_then(|b| b.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_positions_resolve_per_breakpoint() {
        let layout: PageSectionsLayout = serde_json::from_value(json!({
            "type": "tabs",
            "layout": { "mobile": { "position": "bottom" }, "desktop": {} }
        }))
        .unwrap();
        assert!(layout.is_tabs());
        assert_eq!(layout.position_for(Viewport::Mobile), Some(TabPosition::Bottom));
        assert_eq!(layout.position_for(Viewport::Desktop), None);
    }

    #[test]
    fn test_non_tabs_type() {
        let layout: PageSectionsLayout = serde_json::from_value(json!({ "type": "list" })).unwrap();
        assert!(!layout.is_tabs());
        assert_eq!(layout.position_for(Viewport::Mobile), None);
    }

    #[test]
    fn test_unknown_position_is_unset_but_preserved() {
        let raw = json!({
            "type": "tabs",
            "layout": {
                "mobile": { "position": "left", "sticky": true },
                "desktop": { "position": "side" },
                "tablet": { "position": "top" }
            }
        });
        let layout: PageSectionsLayout = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(layout.position_for(Viewport::Mobile), None);
        assert_eq!(layout.position_for(Viewport::Desktop), Some(TabPosition::Side));
        assert_eq!(serde_json::to_value(&layout).unwrap(), raw);
    }
}
