// ========================================
// ConfigStore: 作業中の AppConfig と唯一の更新関数
// ========================================
//
// 各エディタは ConfigAction を dispatch するだけで AppConfig を直接触らない。
// reduce は元の設定を変更せず、新しい設定を返す。

use log::{debug, info, warn};
use std::fmt;

use crate::api::ConfigBackend;
use crate::model::app_config::{AppConfig, AppPage, SeoForm, ThemeMode};
use crate::model::fee::FeeForm;
use crate::model::layout::PageSectionsLayout;
use crate::model::menu::MenuTree;
use crate::model::section::AppPageSection;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigAction {
    SetMenuTree(Vec<MenuTree>),
    SetFooterMenuTree(Vec<MenuTree>),
    SetFees(Vec<FeeForm>),
    AddSection { page: String, section: AppPageSection },
    UpdateSection { page: String, index: usize, section: AppPageSection },
    RemoveSection { page: String, index: usize },
    SwapSections { page: String, a: usize, b: usize },
    SetPageLayout { page: String, layout: Option<PageSectionsLayout> },
    AddPage { key: String, page: AppPage },
    RemovePage { key: String },
    SetTheme { theme: String, mode: Option<ThemeMode> },
    SetSeo { page: String, seo: SeoForm },
}

impl ConfigAction {
    pub fn name(&self) -> &'static str {
        match self {
            ConfigAction::SetMenuTree(_) => "SetMenuTree",
            ConfigAction::SetFooterMenuTree(_) => "SetFooterMenuTree",
            ConfigAction::SetFees(_) => "SetFees",
            ConfigAction::AddSection { .. } => "AddSection",
            ConfigAction::UpdateSection { .. } => "UpdateSection",
            ConfigAction::RemoveSection { .. } => "RemoveSection",
            ConfigAction::SwapSections { .. } => "SwapSections",
            ConfigAction::SetPageLayout { .. } => "SetPageLayout",
            ConfigAction::AddPage { .. } => "AddPage",
            ConfigAction::RemovePage { .. } => "RemovePage",
            ConfigAction::SetTheme { .. } => "SetTheme",
            ConfigAction::SetSeo { .. } => "SetSeo",
        }
    }
}

fn page_mut<'a>(config: &'a mut AppConfig, key: &str) -> Result<&'a mut AppPage, String> {
    config
        .page_mut(key)
        .ok_or_else(|| format!("Page '{}' does not exist", key))
}

fn check_index(page: &AppPage, key: &str, index: usize) -> Result<(), String> {
    if index >= page.sections.len() {
        return Err(format!(
            "Section index {} is out of range for page '{}' ({} sections)",
            index,
            key,
            page.sections.len()
        ));
    }
    Ok(())
}

/// 1アクションを適用した新しい設定を返す
pub fn reduce(config: &AppConfig, action: &ConfigAction) -> Result<AppConfig, String> {
    let mut next = config.clone();
    match action {
        ConfigAction::SetMenuTree(tree) => next.menu_tree = Some(tree.clone()),
        ConfigAction::SetFooterMenuTree(tree) => next.footer_menu_tree = Some(tree.clone()),
        ConfigAction::SetFees(fees) => next.fees = Some(fees.clone()),
        ConfigAction::AddSection { page, section } => {
            page_mut(&mut next, page)?.sections.push(section.clone());
        }
        ConfigAction::UpdateSection { page, index, section } => {
            let target = page_mut(&mut next, page)?;
            check_index(target, page, *index)?;
            target.sections[*index] = section.clone();
        }
        ConfigAction::RemoveSection { page, index } => {
            let target = page_mut(&mut next, page)?;
            check_index(target, page, *index)?;
            target.sections.remove(*index);
        }
        ConfigAction::SwapSections { page, a, b } => {
            let target = page_mut(&mut next, page)?;
            check_index(target, page, *a)?;
            check_index(target, page, *b)?;
            target.sections.swap(*a, *b);
        }
        ConfigAction::SetPageLayout { page, layout } => {
            page_mut(&mut next, page)?.layout = layout.clone();
        }
        ConfigAction::AddPage { key, page } => {
            if key.is_empty() {
                return Err("Page key must not be empty".to_string());
            }
            if next.pages.contains_key(key) {
                return Err(format!("Page '{}' already exists", key));
            }
            next.pages.insert(key.clone(), page.clone());
        }
        ConfigAction::RemovePage { key } => {
            if next.pages.remove(key).is_none() {
                return Err(format!("Page '{}' does not exist", key));
            }
            if let Some(seo) = next.seo.as_mut() {
                seo.remove(key);
            }
        }
        ConfigAction::SetTheme { theme, mode } => {
            next.theme = theme.clone();
            next.default_theme_mode = *mode;
        }
        ConfigAction::SetSeo { page, seo } => {
            if !next.pages.contains_key(page) {
                return Err(format!("Page '{}' does not exist", page));
            }
            next.seo.get_or_insert_with(Default::default).insert(page.clone(), seo.clone());
        }
    }
    Ok(next)
}

type Listener = Box<dyn FnMut(&AppConfig, &ConfigAction)>;

pub struct ConfigStore {
    config: AppConfig,
    dirty: bool,
    listeners: Vec<Listener>,
}

impl fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigStore")
            .field("config", &self.config.name)
            .field("dirty", &self.dirty)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl ConfigStore {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            dirty: false,
            listeners: Vec::new(),
        }
    }

    pub fn load(backend: &dyn ConfigBackend) -> Result<Self, String> {
        Ok(Self::new(backend.load()?))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// 適用後に呼ばれるリスナーを登録
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&AppConfig, &ConfigAction) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// 唯一の更新経路。失敗したアクションは設定を変えない。
    pub fn dispatch(&mut self, action: ConfigAction) -> Result<(), String> {
        let next = reduce(&self.config, &action).map_err(|e| {
            warn!("{} rejected: {}", action.name(), e);
            e
        })?;
        debug!("{} applied", action.name());
        self.config = next;
        self.dirty = true;
        for listener in self.listeners.iter_mut() {
            listener(&self.config, &action);
        }
        Ok(())
    }

    /// ドキュメント全体を保存する
    pub fn save(&mut self, backend: &dyn ConfigBackend) -> Result<(), String> {
        backend.save(&self.config)?;
        self.dirty = false;
        info!("App config '{}' saved", self.config.name);
        Ok(())
    }
}
