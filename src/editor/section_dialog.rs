// ========================================
// セクション編集ダイアログ
// ========================================
//
// 状態遷移:
//   SelectingType -> EditingSettings <-> Previewing -> Saved | Cancelled
//
// プレビューは本番と同じ compose_sections を通して描画する。

use log::{debug, error, info, warn};
use serde_json::Value;

use crate::model::section::{AppPageSection, SectionType};
use crate::registry::form_schema::{FormError, FormSchema};
use crate::registry::section_types::{SectionTypeInfo, section_selector};
use crate::registry::BuilderKit;
use crate::render::node::RenderNode;
use crate::render::{RenderContext, RenderMode};
use crate::ui::composer::compose_sections;
use crate::ui::tabs::TabState;
use crate::ui::viewport::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    SelectingType,
    EditingSettings,
    Previewing,
    Saved,
    Cancelled,
}

impl DialogState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DialogState::Saved | DialogState::Cancelled)
    }
}

/// ダイアログ本体に表示する内容
#[derive(Debug, Clone, PartialEq)]
pub enum DialogView {
    SelectorGrid(Vec<SectionTypeInfo>),
    SettingsForm { schema: FormSchema, settings: Value },
    /// 型が未登録のセクションは生JSONのまま編集する
    RawSettings(Value),
    Closed,
}

#[derive(Debug, Clone)]
pub struct EditSectionDialog {
    state: DialogState,
    kit: BuilderKit,
    is_edit: bool,
    /// 最後に保存された値（新規なら None）
    saved: Option<Value>,
    changed_section: Option<AppPageSection>,
    name_override: Option<String>,
    has_changes: bool,
    errors: Vec<FormError>,
}

impl EditSectionDialog {
    pub fn open(section: Option<AppPageSection>, is_edit: bool) -> Self {
        let state = if !is_edit && section.is_none() {
            DialogState::SelectingType
        } else {
            DialogState::EditingSettings
        };
        // 新規セクションには比較元がない。型付きで開かれたら最初から変更あり
        let saved = if is_edit { section.as_ref().and_then(snapshot) } else { None };
        let has_changes = !is_edit && section.is_some();
        debug!("Section dialog opened in {:?} (edit: {})", state, is_edit);
        Self {
            state,
            kit: BuilderKit::General,
            is_edit,
            saved,
            changed_section: section,
            name_override: None,
            has_changes,
            errors: Vec::new(),
        }
    }

    pub fn with_kit(mut self, kit: BuilderKit) -> Self {
        self.kit = kit;
        self
    }

    pub fn state(&self) -> DialogState {
        self.state
    }

    pub fn is_edit(&self) -> bool {
        self.is_edit
    }

    pub fn has_changes(&self) -> bool {
        self.has_changes
    }

    pub fn changed_section(&self) -> Option<&AppPageSection> {
        self.changed_section.as_ref()
    }

    /// 直前の保存で見つかった検証エラー
    pub fn errors(&self) -> &[FormError] {
        &self.errors
    }

    fn ignore_if_closed(&self, op: &str) -> bool {
        if self.state.is_terminal() {
            warn!("Ignored '{}' on a closed section dialog ({:?})", op, self.state);
            return true;
        }
        false
    }

    /// 型を選ぶと空の設定で編集に進む
    pub fn select_type(&mut self, section_type: SectionType) {
        if self.ignore_if_closed("select_type") {
            return;
        }
        if self.state != DialogState::SelectingType {
            warn!("select_type is only valid while selecting a type (state: {:?})", self.state);
            return;
        }
        self.changed_section = Some(AppPageSection::blank(section_type));
        self.state = DialogState::EditingSettings;
        self.recompute_changes();
    }

    pub fn on_change(&mut self, section: AppPageSection) {
        if self.ignore_if_closed("on_change") {
            return;
        }
        if self.state == DialogState::SelectingType {
            warn!("Settings changed before a section type was chosen");
            return;
        }
        self.changed_section = Some(section);
        self.errors.clear();
        self.recompute_changes();
    }

    pub fn set_name(&mut self, name: &str) {
        if self.ignore_if_closed("set_name") {
            return;
        }
        self.name_override = Some(name.to_string());
        self.recompute_changes();
    }

    pub fn toggle_preview(&mut self) {
        if self.ignore_if_closed("toggle_preview") {
            return;
        }
        self.state = match self.state {
            DialogState::EditingSettings => DialogState::Previewing,
            DialogState::Previewing => DialogState::EditingSettings,
            other => other,
        };
    }

    /// 名前の上書きを反映した最終的なセクション
    fn final_section(&self) -> Option<AppPageSection> {
        let mut section = self.changed_section.clone()?;
        if let Some(name) = &self.name_override {
            section.name = Some(name.clone());
        }
        Some(section)
    }

    fn recompute_changes(&mut self) {
        self.has_changes = match self.final_section() {
            None => false,
            Some(section) => match (&self.saved, snapshot(&section)) {
                (Some(saved), Some(current)) => *saved != current,
                _ => true,
            },
        };
    }

    /// 本番と同じ合成処理でプレビューを描画
    pub fn preview(&self, viewport: Viewport) -> RenderNode {
        let Some(section) = self.final_section() else {
            return RenderNode::Empty;
        };
        let ctx = RenderContext::new(viewport, RenderMode::ReadOnly);
        compose_sections(std::slice::from_ref(&section), None, &ctx, &TabState::new())
    }

    pub fn view(&self) -> DialogView {
        match self.state {
            DialogState::Saved | DialogState::Cancelled => DialogView::Closed,
            DialogState::SelectingType => DialogView::SelectorGrid(section_selector(self.kit)),
            DialogState::EditingSettings | DialogState::Previewing => {
                let Some(section) = self.final_section() else {
                    return DialogView::SelectorGrid(section_selector(self.kit));
                };
                let settings = snapshot(&section).unwrap_or(Value::Null);
                match section.section_type() {
                    Some(ty) => DialogView::SettingsForm {
                        schema: ty.form_schema(),
                        settings,
                    },
                    None => DialogView::RawSettings(settings),
                }
            }
        }
    }

    /// 変更がなければ何も返さずに閉じる。検証エラーがあれば編集に留まる。
    pub fn save(&mut self) -> Option<AppPageSection> {
        if self.ignore_if_closed("save") {
            return None;
        }
        if !self.has_changes {
            debug!("Section dialog closed without changes");
            self.state = DialogState::Saved;
            return None;
        }
        let section = self.final_section()?;

        if let (Some(ty), Some(value)) = (section.section_type(), snapshot(&section)) {
            if let Err(errors) = ty.form_schema().validate(&value) {
                warn!("Section '{}' has {} invalid field(s)", ty, errors.len());
                self.errors = errors;
                self.state = DialogState::EditingSettings;
                return None;
            }
        }

        info!("Saved {} section{}", section.type_name(), section.label().map(|l| format!(" '{}'", l)).unwrap_or_default());
        self.saved = snapshot(&section);
        self.has_changes = false;
        self.errors.clear();
        self.state = DialogState::Saved;
        Some(section)
    }

    pub fn cancel(&mut self) {
        if self.ignore_if_closed("cancel") {
            return;
        }
        self.state = DialogState::Cancelled;
    }
}

fn snapshot(section: &AppPageSection) -> Option<Value> {
    section
        .to_value()
        .map_err(|e| error!("Failed to serialize section: {}", e))
        .ok()
}
