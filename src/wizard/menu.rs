// ========================================
// ナビゲーションメニューエディタ
// ========================================
//
// メニューはインデックスパスで指定する。[] が最上位の一覧、[2, 0] は
// 3番目の項目の最初の子。子を持てるのは Menu 型のみ。

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use std::fmt;

use super::store::{ConfigAction, ConfigStore};
use crate::model::app_config::AppConfig;
use crate::model::menu::{MenuItemType, MenuTree};

pub const MAX_MENU_DEPTH: usize = 3;

lazy_static! {
    static ref EXTERNAL_URL: Regex = Regex::new(r"^https?://[^\s/]+[^\s]*$").expect("valid url regex");
}

#[derive(Debug, Clone, PartialEq)]
pub enum MenuError {
    EmptyName,
    InvalidPageHref(Option<String>),
    InvalidExternalUrl(Option<String>),
    ChildrenNotAllowed(String),
    TooDeep { depth: usize, max: usize },
    PathNotFound(Vec<usize>),
    IndexOutOfRange(usize),
}

impl fmt::Display for MenuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuError::EmptyName => write!(f, "Menu item name is required"),
            MenuError::InvalidPageHref(href) => {
                write!(f, "Page link must start with '/' (got {:?})", href.as_deref().unwrap_or(""))
            }
            MenuError::InvalidExternalUrl(href) => {
                write!(f, "External link must be an http(s) URL (got {:?})", href.as_deref().unwrap_or(""))
            }
            MenuError::ChildrenNotAllowed(name) => write!(f, "'{}' is not a menu and cannot have children", name),
            MenuError::TooDeep { depth, max } => write!(f, "Menu depth {} exceeds the limit of {}", depth, max),
            MenuError::PathNotFound(path) => write!(f, "No menu item at {:?}", path),
            MenuError::IndexOutOfRange(i) => write!(f, "Position {} is out of range", i),
        }
    }
}

impl std::error::Error for MenuError {}

/// 1項目（と子孫）の検証
pub fn validate_item(item: &MenuTree) -> Result<(), MenuError> {
    if item.name.trim().is_empty() {
        return Err(MenuError::EmptyName);
    }
    match item.item_type {
        MenuItemType::Page => {
            if !item.href.as_deref().is_some_and(|h| h.starts_with('/')) {
                return Err(MenuError::InvalidPageHref(item.href.clone()));
            }
        }
        MenuItemType::External => {
            if !item.href.as_deref().is_some_and(|h| EXTERNAL_URL.is_match(h)) {
                return Err(MenuError::InvalidExternalUrl(item.href.clone()));
            }
        }
        MenuItemType::Menu => {}
    }
    if item.item_type != MenuItemType::Menu && !item.children().is_empty() {
        return Err(MenuError::ChildrenNotAllowed(item.name.clone()));
    }
    item.children().iter().try_for_each(validate_item)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuTarget {
    Navbar,
    Footer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuEditor {
    target: MenuTarget,
    items: Vec<MenuTree>,
}

impl MenuEditor {
    pub fn new(target: MenuTarget, items: Vec<MenuTree>) -> Self {
        Self { target, items }
    }

    pub fn from_config(config: &AppConfig, target: MenuTarget) -> Self {
        let items = match target {
            MenuTarget::Navbar => config.menu_tree(),
            MenuTarget::Footer => config.footer_menu_tree(),
        };
        Self::new(target, items.to_vec())
    }

    pub fn items(&self) -> &[MenuTree] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, path: &[usize]) -> Option<&MenuTree> {
        let (&first, rest) = path.split_first()?;
        rest.iter()
            .try_fold(self.items.get(first)?, |node, &i| node.children().get(i))
    }

    /// parent_path の子一覧（Menu 以外は不可）
    fn list(&self, parent_path: &[usize]) -> Result<&[MenuTree], MenuError> {
        let mut list = self.items.as_slice();
        for (depth, &index) in parent_path.iter().enumerate() {
            let node = list
                .get(index)
                .ok_or_else(|| MenuError::PathNotFound(parent_path[..=depth].to_vec()))?;
            if node.item_type != MenuItemType::Menu {
                return Err(MenuError::ChildrenNotAllowed(node.name.clone()));
            }
            list = node.children();
        }
        Ok(list)
    }

    /// 書き込み用。空の children を作るので、検証が済んでから呼ぶ
    fn list_mut(&mut self, parent_path: &[usize]) -> Result<&mut Vec<MenuTree>, MenuError> {
        let mut list = &mut self.items;
        for (depth, &index) in parent_path.iter().enumerate() {
            let node = list
                .get_mut(index)
                .ok_or_else(|| MenuError::PathNotFound(parent_path[..=depth].to_vec()))?;
            if node.item_type != MenuItemType::Menu {
                return Err(MenuError::ChildrenNotAllowed(node.name.clone()));
            }
            list = node.children.get_or_insert_with(Vec::new);
        }
        Ok(list)
    }

    fn check_depth(parent_path: &[usize], item: &MenuTree) -> Result<(), MenuError> {
        let depth = parent_path.len() + item.depth();
        if depth > MAX_MENU_DEPTH {
            return Err(MenuError::TooDeep {
                depth,
                max: MAX_MENU_DEPTH,
            });
        }
        Ok(())
    }

    pub fn add(&mut self, parent_path: &[usize], item: MenuTree) -> Result<(), MenuError> {
        validate_item(&item)?;
        Self::check_depth(parent_path, &item)?;
        let list = self.list_mut(parent_path)?;
        debug!("Menu item '{}' added under {:?}", item.name, parent_path);
        list.push(item);
        Ok(())
    }

    pub fn insert(&mut self, parent_path: &[usize], index: usize, item: MenuTree) -> Result<(), MenuError> {
        validate_item(&item)?;
        Self::check_depth(parent_path, &item)?;
        if index > self.list(parent_path)?.len() {
            return Err(MenuError::IndexOutOfRange(index));
        }
        self.list_mut(parent_path)?.insert(index, item);
        Ok(())
    }

    fn split(path: &[usize]) -> Result<(&[usize], usize), MenuError> {
        path.split_last()
            .map(|(&last, parent)| (parent, last))
            .ok_or_else(|| MenuError::PathNotFound(path.to_vec()))
    }

    pub fn remove(&mut self, path: &[usize]) -> Result<MenuTree, MenuError> {
        let (parent, index) = Self::split(path)?;
        if index >= self.list(parent)?.len() {
            return Err(MenuError::PathNotFound(path.to_vec()));
        }
        Ok(self.list_mut(parent)?.remove(index))
    }

    /// 同じ階層の other_index と入れ替える
    pub fn swap(&mut self, path: &[usize], other_index: usize) -> Result<(), MenuError> {
        let (parent, index) = Self::split(path)?;
        let len = self.list(parent)?.len();
        if index >= len {
            return Err(MenuError::PathNotFound(path.to_vec()));
        }
        if other_index >= len {
            return Err(MenuError::IndexOutOfRange(other_index));
        }
        self.list_mut(parent)?.swap(index, other_index);
        Ok(())
    }

    pub fn move_up(&mut self, path: &[usize]) -> Result<(), MenuError> {
        let (_, index) = Self::split(path)?;
        match index.checked_sub(1) {
            Some(above) => self.swap(path, above),
            None => Ok(()),
        }
    }

    pub fn move_down(&mut self, path: &[usize]) -> Result<(), MenuError> {
        let (parent, index) = Self::split(path)?;
        let len = self.list(parent)?.len();
        match index.checked_add(1) {
            Some(below) if below < len => self.swap(path, below),
            _ => Ok(()),
        }
    }

    /// 項目を置き換える。Menu のまま子が省略されていれば既存の子を残す。
    pub fn update(&mut self, path: &[usize], mut item: MenuTree) -> Result<(), MenuError> {
        let (parent, index) = Self::split(path)?;
        let existing = self.get(path).ok_or_else(|| MenuError::PathNotFound(path.to_vec()))?;
        if item.item_type == MenuItemType::Menu && item.children.is_none() {
            item.children = existing.children.clone();
        }
        validate_item(&item)?;
        Self::check_depth(parent, &item)?;
        let list = self.list_mut(parent)?;
        list[index] = item;
        Ok(())
    }

    pub fn commit(&self, config: &AppConfig) -> AppConfig {
        let mut next = config.clone();
        match self.target {
            MenuTarget::Navbar => next.menu_tree = Some(self.items.clone()),
            MenuTarget::Footer => next.footer_menu_tree = Some(self.items.clone()),
        }
        next
    }

    pub fn commit_to(&self, store: &mut ConfigStore) -> Result<(), String> {
        let action = match self.target {
            MenuTarget::Navbar => ConfigAction::SetMenuTree(self.items.clone()),
            MenuTarget::Footer => ConfigAction::SetFooterMenuTree(self.items.clone()),
        };
        store.dispatch(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor() -> MenuEditor {
        MenuEditor::new(MenuTarget::Navbar, Vec::new())
    }

    #[test]
    fn test_add_page_to_empty_menu() {
        let mut menu = editor();
        menu.add(&[], MenuTree::page("Home", "/")).unwrap();
        assert_eq!(menu.len(), 1);
        assert_eq!(menu.items()[0].item_type, MenuItemType::Page);
    }

    #[test]
    fn test_validation() {
        let mut menu = editor();
        assert_eq!(
            menu.add(&[], MenuTree::page("Shop", "shop")),
            Err(MenuError::InvalidPageHref(Some("shop".into())))
        );
        assert!(matches!(
            menu.add(&[], MenuTree::external("Docs", "ftp://docs")),
            Err(MenuError::InvalidExternalUrl(_))
        ));
        assert_eq!(menu.add(&[], MenuTree::page(" ", "/")), Err(MenuError::EmptyName));
        assert!(menu.is_empty());
    }

    #[test]
    fn test_children_only_under_menu() {
        let mut menu = editor();
        menu.add(&[], MenuTree::page("Home", "/")).unwrap();
        assert_eq!(
            menu.add(&[0], MenuTree::page("Sub", "/sub")),
            Err(MenuError::ChildrenNotAllowed("Home".into()))
        );
        menu.add(&[], MenuTree::menu("More", vec![])).unwrap();
        menu.add(&[1], MenuTree::external("Blog", "https://blog.example.com")).unwrap();
        assert_eq!(menu.get(&[1, 0]).map(|m| m.name.as_str()), Some("Blog"));
    }

    #[test]
    fn test_depth_limit() {
        let mut menu = editor();
        menu.add(&[], MenuTree::menu("A", vec![MenuTree::menu("B", vec![])])).unwrap();
        menu.add(&[0, 0], MenuTree::page("C", "/c")).unwrap();
        assert_eq!(
            menu.add(&[0, 0], MenuTree::menu("D", vec![MenuTree::page("E", "/e")])),
            Err(MenuError::TooDeep { depth: 4, max: 3 })
        );
    }

    #[test]
    fn test_reorder_and_remove() {
        let mut menu = editor();
        for name in ["a", "b", "c"] {
            menu.add(&[], MenuTree::page(name, &format!("/{}", name))).unwrap();
        }
        menu.move_down(&[0]).unwrap();
        menu.move_up(&[2]).unwrap();
        let names: Vec<&str> = menu.items().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c", "a"]);
        menu.move_up(&[0]).unwrap();
        menu.move_down(&[2]).unwrap();
        assert_eq!(menu.remove(&[1]).unwrap().name, "c");
        assert_eq!(menu.remove(&[5]), Err(MenuError::PathNotFound(vec![5])));
        assert_eq!(menu.swap(&[0], 9), Err(MenuError::IndexOutOfRange(9)));
    }

    #[test]
    fn test_update_keeps_children() {
        let mut menu = editor();
        menu.add(&[], MenuTree::menu("More", vec![MenuTree::page("Faq", "/faq")])).unwrap();
        let mut renamed = MenuTree::menu("Extra", vec![]);
        renamed.children = None;
        menu.update(&[0], renamed).unwrap();
        assert_eq!(menu.items()[0].name, "Extra");
        assert_eq!(menu.items()[0].children().len(), 1);
    }

    #[test]
    fn test_commit_targets_footer() {
        let mut menu = MenuEditor::new(MenuTarget::Footer, Vec::new());
        menu.add(&[], MenuTree::page("Terms", "/terms")).unwrap();
        let mut store = ConfigStore::new(AppConfig::default());
        menu.commit_to(&mut store).unwrap();
        assert_eq!(store.config().footer_menu_tree().len(), 1);
        assert!(store.config().menu_tree().is_empty());
        assert_eq!(menu.commit(&AppConfig::default()).footer_menu_tree().len(), 1);
    }

    #[test]
    fn test_failed_edits_leave_childless_menu_untouched() {
        let mut more = MenuTree::menu("More", vec![]);
        more.children = None;
        let mut menu = MenuEditor::new(MenuTarget::Navbar, vec![more]);
        let before = serde_json::to_value(menu.items()).unwrap();

        assert!(menu.remove(&[0, 5]).is_err());
        assert!(menu.swap(&[0, 0], 1).is_err());
        assert!(menu.insert(&[0], 3, MenuTree::page("Faq", "/faq")).is_err());
        assert!(menu.move_down(&[0, 0]).is_ok());
        assert!(menu.move_down(&[0, usize::MAX]).is_ok());
        assert_eq!(serde_json::to_value(menu.items()).unwrap(), before);
        assert_eq!(menu.items()[0].children, None);

        menu.add(&[0], MenuTree::page("Faq", "/faq")).unwrap();
        assert_eq!(menu.items()[0].children().len(), 1);
    }
}
