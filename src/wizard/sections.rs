// ========================================
// ページセクションエディタ
// ========================================
//
// 1ページ分のセクション一覧を編集する。追加・編集は EditSectionDialog、
// 反映は ConfigStore::dispatch を通す。

use log::debug;

use super::store::{ConfigAction, ConfigStore};
use crate::editor::section_dialog::{DialogState, EditSectionDialog};
use crate::model::layout::PageSectionsLayout;
use crate::model::section::AppPageSection;
use crate::registry::BuilderKit;
use crate::render::node::RenderNode;
use crate::render::{RenderContext, RenderMode};
use crate::ui::composer::compose_sections;
use crate::ui::tabs::TabState;
use crate::ui::viewport::Viewport;

#[derive(Debug)]
struct OpenDialog {
    dialog: EditSectionDialog,
    /// 編集中のセクション位置（新規なら None）
    index: Option<usize>,
}

#[derive(Debug)]
pub struct SectionsEditor {
    page: String,
    kit: BuilderKit,
    open: Option<OpenDialog>,
    pub tabs: TabState,
}

impl SectionsEditor {
    pub fn new(page: &str, kit: BuilderKit) -> Self {
        Self {
            page: page.to_string(),
            kit,
            open: None,
            tabs: TabState::new(),
        }
    }

    pub fn page(&self) -> &str {
        &self.page
    }

    pub fn sections<'a>(&self, store: &'a ConfigStore) -> &'a [AppPageSection] {
        store
            .config()
            .page(&self.page)
            .map(|p| p.sections.as_slice())
            .unwrap_or(&[])
    }

    pub fn dialog(&self) -> Option<&EditSectionDialog> {
        self.open.as_ref().map(|o| &o.dialog)
    }

    pub fn dialog_mut(&mut self) -> Option<&mut EditSectionDialog> {
        self.open.as_mut().map(|o| &mut o.dialog)
    }

    pub fn open_new(&mut self) -> &mut EditSectionDialog {
        let dialog = EditSectionDialog::open(None, false).with_kit(self.kit);
        &mut self.open.insert(OpenDialog { dialog, index: None }).dialog
    }

    pub fn open_edit(&mut self, store: &ConfigStore, index: usize) -> Result<&mut EditSectionDialog, String> {
        let section = self
            .sections(store)
            .get(index)
            .cloned()
            .ok_or_else(|| format!("No section {} on page '{}'", index, self.page))?;
        let dialog = EditSectionDialog::open(Some(section), true).with_kit(self.kit);
        Ok(&mut self
            .open
            .insert(OpenDialog {
                dialog,
                index: Some(index),
            })
            .dialog)
    }

    /// ダイアログを保存してストアへ反映する。反映したら true。
    pub fn save_dialog(&mut self, store: &mut ConfigStore) -> Result<bool, String> {
        let Some(open) = self.open.as_mut() else {
            return Ok(false);
        };
        let saved = open.dialog.save();
        if open.dialog.state() != DialogState::Saved {
            // 検証エラー。ダイアログは開いたまま
            return Ok(false);
        }
        let index = open.index;
        self.open = None;

        let Some(section) = saved else {
            return Ok(false);
        };
        let action = match index {
            Some(index) => ConfigAction::UpdateSection {
                page: self.page.clone(),
                index,
                section,
            },
            None => ConfigAction::AddSection {
                page: self.page.clone(),
                section,
            },
        };
        store.dispatch(action)?;
        Ok(true)
    }

    pub fn cancel_dialog(&mut self) {
        if let Some(mut open) = self.open.take() {
            open.dialog.cancel();
            debug!("Section dialog cancelled on page '{}'", self.page);
        }
    }

    pub fn remove(&self, store: &mut ConfigStore, index: usize) -> Result<(), String> {
        store.dispatch(ConfigAction::RemoveSection {
            page: self.page.clone(),
            index,
        })
    }

    pub fn swap(&self, store: &mut ConfigStore, a: usize, b: usize) -> Result<(), String> {
        store.dispatch(ConfigAction::SwapSections {
            page: self.page.clone(),
            a,
            b,
        })
    }

    pub fn move_up(&self, store: &mut ConfigStore, index: usize) -> Result<(), String> {
        match index.checked_sub(1) {
            Some(above) => self.swap(store, index, above),
            None => Ok(()),
        }
    }

    pub fn move_down(&self, store: &mut ConfigStore, index: usize) -> Result<(), String> {
        match index.checked_add(1) {
            Some(below) if below < self.sections(store).len() => self.swap(store, index, below),
            _ => Ok(()),
        }
    }

    pub fn set_layout(&self, store: &mut ConfigStore, layout: Option<PageSectionsLayout>) -> Result<(), String> {
        store.dispatch(ConfigAction::SetPageLayout {
            page: self.page.clone(),
            layout,
        })
    }

    /// 編集フレーム付きでページを合成する
    pub fn render(&self, store: &ConfigStore, viewport: Viewport) -> RenderNode {
        let Some(page) = store.config().page(&self.page) else {
            return RenderNode::Empty;
        };
        let ctx = RenderContext::new(viewport, RenderMode::Editable);
        compose_sections(&page.sections, page.layout.as_ref(), &ctx, &self.tabs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::app_config::{AppConfig, AppPage};
    use crate::model::section::{MarkdownSection, SectionKind, SectionType};

    fn store() -> ConfigStore {
        let mut config = AppConfig::default();
        config.pages.insert("home".into(), AppPage::default());
        ConfigStore::new(config)
    }

    fn markdown(text: &str) -> AppPageSection {
        AppPageSection::new(SectionKind::Markdown(MarkdownSection {
            data: text.into(),
            ..Default::default()
        }))
    }

    #[test]
    fn test_add_section_through_dialog() {
        let mut store = store();
        let mut editor = SectionsEditor::new("home", BuilderKit::Swap);
        let dialog = editor.open_new();
        dialog.select_type(SectionType::Swap);
        dialog.set_name("Trade");
        assert!(editor.save_dialog(&mut store).unwrap());
        assert!(editor.dialog().is_none());

        let sections = editor.sections(&store);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].name.as_deref(), Some("Trade"));
    }

    #[test]
    fn test_invalid_section_keeps_dialog_open() {
        let mut store = store();
        let mut editor = SectionsEditor::new("home", BuilderKit::General);
        editor.open_new().select_type(SectionType::Markdown);
        assert!(!editor.save_dialog(&mut store).unwrap());
        assert!(editor.dialog().is_some());
        assert!(!store.is_dirty());

        editor.dialog_mut().unwrap().on_change(markdown("Hello"));
        assert!(editor.save_dialog(&mut store).unwrap());
        assert_eq!(editor.sections(&store).len(), 1);
    }

    #[test]
    fn test_edit_and_reorder() {
        let mut store = store();
        for text in ["one", "two"] {
            store
                .dispatch(ConfigAction::AddSection {
                    page: "home".into(),
                    section: markdown(text),
                })
                .unwrap();
        }
        let mut editor = SectionsEditor::new("home", BuilderKit::General);
        editor.open_edit(&store, 1).unwrap().on_change(markdown("deux"));
        assert!(editor.save_dialog(&mut store).unwrap());

        editor.move_up(&mut store, 1).unwrap();
        let texts: Vec<String> = editor
            .sections(&store)
            .iter()
            .map(|s| match &s.kind {
                SectionKind::Markdown(m) => m.data.clone(),
                _ => String::new(),
            })
            .collect();
        assert_eq!(texts, vec!["deux", "one"]);

        editor.move_down(&mut store, usize::MAX).unwrap();
        editor.move_down(&mut store, 1).unwrap();
        editor.remove(&mut store, 0).unwrap();
        assert_eq!(editor.sections(&store).len(), 1);
        assert!(editor.open_edit(&store, 4).is_err());
    }

    #[test]
    fn test_unchanged_edit_is_not_dispatched() {
        let mut store = store();
        store
            .dispatch(ConfigAction::AddSection {
                page: "home".into(),
                section: markdown("same"),
            })
            .unwrap();
        let backend = crate::api::MemoryBackend::default();
        store.save(&backend).unwrap();

        let mut editor = SectionsEditor::new("home", BuilderKit::General);
        editor.open_edit(&store, 0).unwrap();
        assert!(!editor.save_dialog(&mut store).unwrap());
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_render_uses_editor_frames() {
        let mut store = store();
        store
            .dispatch(ConfigAction::AddSection {
                page: "home".into(),
                section: markdown("x"),
            })
            .unwrap();
        let editor = SectionsEditor::new("home", BuilderKit::General);
        let tree = editor.render(&store, Viewport::Desktop);
        assert_eq!(tree.find_by_class("pk-editor-frame").len(), 1);
    }
}
