// ========================================
// ナビゲーションメニューツリー
// ========================================

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MenuItemType {
    Page,
    External,
    Menu,
}

/// 再帰的なメニューノード。子を持てるのは Menu のみ。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuTree {
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: MenuItemType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<MenuTree>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MenuTree {
    pub fn page(name: &str, href: &str) -> Self {
        Self::with_type(name, MenuItemType::Page, Some(href))
    }

    pub fn external(name: &str, href: &str) -> Self {
        Self::with_type(name, MenuItemType::External, Some(href))
    }

    pub fn menu(name: &str, children: Vec<MenuTree>) -> Self {
        let mut node = Self::with_type(name, MenuItemType::Menu, None);
        node.children = Some(children);
        node
    }

    fn with_type(name: &str, item_type: MenuItemType, href: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            item_type,
            href: href.map(str::to_string),
            data: None,
            children: None,
            extra: Map::new(),
        }
    }

    pub fn children(&self) -> &[MenuTree] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// 自身を含む木の深さ
    pub fn depth(&self) -> usize {
        1 + self.children().iter().map(MenuTree::depth).max().unwrap_or(0)
    }

    /// 深さ優先で全ノードを訪問
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a MenuTree)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_tree() -> Vec<MenuTree> {
        vec![
            MenuTree::page("Home", "/"),
            MenuTree::menu(
                "More",
                vec![
                    MenuTree::page("Swap", "/swap"),
                    MenuTree::menu("Docs", vec![MenuTree::external("Guide", "https://docs.example.com")]),
                ],
            ),
        ]
    }

    #[test]
    fn test_serialize_deserialize_is_idempotent_to_depth_three() {
        let tree = sample_tree();
        assert_eq!(tree[1].depth(), 3);

        let first = serde_json::to_string(&tree).unwrap();
        let parsed: Vec<MenuTree> = serde_json::from_str(&first).unwrap();
        let second = serde_json::to_string(&parsed).unwrap();

        assert_eq!(parsed, tree);
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_fields_survive_roundtrip() {
        let raw = json!([{
            "name": "Shop",
            "type": "Menu",
            "icon": "cart",
            "children": []
        }]);
        let parsed: Vec<MenuTree> = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(parsed[0].children, Some(vec![]));
        assert_eq!(serde_json::to_value(&parsed).unwrap(), raw);
    }

    #[test]
    fn test_walk_visits_every_node() {
        let mut names = Vec::new();
        for node in &sample_tree() {
            node.walk(&mut |n| names.push(n.name.clone()));
        }
        assert_eq!(names, vec!["Home", "More", "Swap", "Docs", "Guide"]);
    }
}
