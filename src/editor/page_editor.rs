// ========================================
// ページ/セルエディタ
// ========================================
//
// 行とセルの入れ子グリッドを JSON 文書として保持する。
// 差分プロトコルは持たず、編集のたびに文書全体を再シリアライズして
// on_change に渡す。

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::registry::cell_plugins::find_plugin;
use crate::registry::BuilderKit;
use crate::render::node::{Element, RenderNode};
use crate::render::{RenderContext, RenderMode};
use crate::ui::viewport::Viewport;

pub const GRID_COLUMNS: u8 = 12;

static NEXT_ID: AtomicUsize = AtomicUsize::new(1);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginRef {
    pub id: String,
    #[serde(default = "default_version")]
    pub version: u32,
}

fn default_version() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorCell {
    pub id: String,
    #[serde(default = "full_width")]
    pub size: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin: Option<PluginRef>,
    /// { "default": {...} } 形式のプラグインデータ
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_i18n: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<EditorRow>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn full_width() -> u8 {
    GRID_COLUMNS
}

impl EditorCell {
    /// 既定ロケールのデータ
    pub fn data(&self) -> Option<&Value> {
        self.data_i18n.as_ref().and_then(|d| d.get("default"))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EditorRow {
    pub id: String,
    #[serde(default)]
    pub cells: Vec<EditorCell>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorDocument {
    pub id: String,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub rows: Vec<EditorRow>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EditorDocument {
    pub fn empty() -> Self {
        Self {
            id: next_id("doc"),
            version: 1,
            rows: Vec::new(),
            extra: Map::new(),
        }
    }

    fn contains_id(&self, id: &str) -> bool {
        fn in_rows(rows: &[EditorRow], id: &str) -> bool {
            rows.iter().any(|row| {
                row.id == id
                    || row
                        .cells
                        .iter()
                        .any(|c| c.id == id || c.rows.as_deref().is_some_and(|r| in_rows(r, id)))
            })
        }
        self.id == id || in_rows(&self.rows, id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditorError {
    Parse(String),
    Serialize(String),
    RowNotFound(Vec<usize>),
    CellNotFound(String),
    PluginNotFound(String),
    PluginNotInKit { plugin: String, kit: BuilderKit },
}

impl fmt::Display for EditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorError::Parse(e) => write!(f, "Invalid editor document: {}", e),
            EditorError::Serialize(e) => write!(f, "Failed to serialize editor document: {}", e),
            EditorError::RowNotFound(path) => write!(f, "No row at path {:?}", path),
            EditorError::CellNotFound(id) => write!(f, "No cell with id '{}'", id),
            EditorError::PluginNotFound(id) => write!(f, "Plugin '{}' is not registered", id),
            EditorError::PluginNotInKit { plugin, kit } => {
                write!(f, "Plugin '{}' is not available in the {} kit", plugin, kit)
            }
        }
    }
}

impl std::error::Error for EditorError {}

fn next_id(prefix: &str) -> String {
    format!("{}-{}", prefix, NEXT_ID.fetch_add(1, Ordering::Relaxed))
}

type ChangeCallback = Box<dyn FnMut(&str)>;

pub struct PageEditor {
    document: EditorDocument,
    kit: BuilderKit,
    on_change: ChangeCallback,
}

impl fmt::Debug for PageEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageEditor")
            .field("document", &self.document)
            .field("kit", &self.kit)
            .finish()
    }
}

impl PageEditor {
    /// value が None・空文字・"null" なら空の文書で開始する
    pub fn new<F>(value: Option<&str>, kit: BuilderKit, on_change: F) -> Result<Self, EditorError>
    where
        F: FnMut(&str) + 'static,
    {
        let document = match value.map(str::trim) {
            None | Some("") | Some("null") => EditorDocument::empty(),
            Some(source) => serde_json::from_str(source).map_err(|e| EditorError::Parse(e.to_string()))?,
        };
        debug!("Page editor opened with {} rows ({} kit)", document.rows.len(), kit);
        Ok(Self {
            document,
            kit,
            on_change: Box::new(on_change),
        })
    }

    pub fn document(&self) -> &EditorDocument {
        &self.document
    }

    pub fn kit(&self) -> BuilderKit {
        self.kit
    }

    pub fn to_json(&self) -> Result<String, EditorError> {
        serde_json::to_string(&self.document).map_err(|e| EditorError::Serialize(e.to_string()))
    }

    fn unique_id(&self, prefix: &str) -> String {
        loop {
            let id = next_id(prefix);
            if !self.document.contains_id(&id) {
                return id;
            }
        }
    }

    /// 文書全体を再シリアライズして通知する
    fn emit(&mut self) -> Result<(), EditorError> {
        let json = self.to_json()?;
        (self.on_change)(&json);
        Ok(())
    }

    /// 最上位に空の行を追加し、その ID を返す
    pub fn add_row(&mut self) -> Result<String, EditorError> {
        let id = self.unique_id("row");
        self.document.rows.push(EditorRow {
            id: id.clone(),
            cells: Vec::new(),
            extra: Map::new(),
        });
        self.emit()?;
        Ok(id)
    }

    /// セルの中に入れ子の行を追加する
    pub fn add_row_in(&mut self, cell_id: &str) -> Result<String, EditorError> {
        let id = self.unique_id("row");
        let cell = cell_mut(&mut self.document.rows, cell_id).ok_or_else(|| EditorError::CellNotFound(cell_id.to_string()))?;
        cell.rows.get_or_insert_with(Vec::new).push(EditorRow {
            id: id.clone(),
            cells: Vec::new(),
            extra: Map::new(),
        });
        self.emit()?;
        Ok(id)
    }

    /// row_path は [行, セル, 行, セル, 行, ...] の交互のインデックス列
    pub fn insert_cell(
        &mut self,
        row_path: &[usize],
        index: usize,
        plugin_id: &str,
        data: Value,
    ) -> Result<String, EditorError> {
        let plugin = find_plugin(plugin_id).ok_or_else(|| EditorError::PluginNotFound(plugin_id.to_string()))?;
        if !plugin.supports(self.kit) {
            warn!("Rejected plugin '{}' outside the {} kit", plugin_id, self.kit);
            return Err(EditorError::PluginNotInKit {
                plugin: plugin_id.to_string(),
                kit: self.kit,
            });
        }

        let id = self.unique_id("cell");
        let row = row_at(&mut self.document.rows, row_path).ok_or_else(|| EditorError::RowNotFound(row_path.to_vec()))?;
        let cell = EditorCell {
            id: id.clone(),
            size: GRID_COLUMNS,
            plugin: Some(PluginRef {
                id: plugin.id,
                version: plugin.version,
            }),
            data_i18n: Some(json!({ "default": data })),
            rows: None,
            extra: Map::new(),
        };
        let index = index.min(row.cells.len());
        row.cells.insert(index, cell);
        self.emit()?;
        Ok(id)
    }

    pub fn update_cell_data(&mut self, cell_id: &str, data: Value) -> Result<(), EditorError> {
        let cell = cell_mut(&mut self.document.rows, cell_id).ok_or_else(|| EditorError::CellNotFound(cell_id.to_string()))?;
        match cell.data_i18n.as_mut().and_then(Value::as_object_mut) {
            Some(locales) => {
                locales.insert("default".to_string(), data);
            }
            None => cell.data_i18n = Some(json!({ "default": data })),
        }
        self.emit()
    }

    /// サイズは 1..=12 に丸める
    pub fn resize_cell(&mut self, cell_id: &str, size: u8) -> Result<(), EditorError> {
        let cell = cell_mut(&mut self.document.rows, cell_id).ok_or_else(|| EditorError::CellNotFound(cell_id.to_string()))?;
        cell.size = size.clamp(1, GRID_COLUMNS);
        self.emit()
    }

    pub fn remove_cell(&mut self, cell_id: &str) -> Result<EditorCell, EditorError> {
        let (cells, index) =
            parent_cells(&mut self.document.rows, cell_id).ok_or_else(|| EditorError::CellNotFound(cell_id.to_string()))?;
        let removed = cells.remove(index);
        self.emit()?;
        Ok(removed)
    }

    /// 同じ行の中で delta だけ移動（端で止まる）
    pub fn move_cell(&mut self, cell_id: &str, delta: isize) -> Result<(), EditorError> {
        let (cells, index) =
            parent_cells(&mut self.document.rows, cell_id).ok_or_else(|| EditorError::CellNotFound(cell_id.to_string()))?;
        let last = cells.len().saturating_sub(1) as isize;
        let target = (index as isize + delta).clamp(0, last) as usize;
        if target == index {
            return Ok(());
        }
        let cell = cells.remove(index);
        cells.insert(target, cell);
        self.emit()
    }

    // ========================================
    // 描画
    // ========================================

    /// 12カラムグリッドとして描画（モバイルではセルを縦積み）
    pub fn render(&self, viewport: Viewport) -> RenderNode {
        let ctx = RenderContext::new(viewport, RenderMode::Editable);
        Element::new("div")
            .class("pk-editor-document")
            .attr("data-document", self.document.id.as_str())
            .children(self.document.rows.iter().map(|row| self.render_row(row, &ctx)))
            .into()
    }

    fn render_row(&self, row: &EditorRow, ctx: &RenderContext) -> RenderNode {
        Element::new("div")
            .class("pk-row")
            .attr("data-row", row.id.as_str())
            .children(row.cells.iter().map(|cell| self.render_cell(cell, ctx)))
            .into()
    }

    fn render_cell(&self, cell: &EditorCell, ctx: &RenderContext) -> RenderNode {
        let span = match ctx.viewport {
            Viewport::Mobile => GRID_COLUMNS,
            Viewport::Desktop => cell.size.clamp(1, GRID_COLUMNS),
        };
        let mut el = Element::new("div")
            .class("pk-cell")
            .attr("data-cell", cell.id.as_str())
            .attr("data-size", span.to_string())
            .attr("style", format!("grid-column:span {}", span));

        if let Some(plugin_ref) = &cell.plugin {
            match find_plugin(&plugin_ref.id).filter(|p| p.supports(self.kit)) {
                Some(plugin) => {
                    let data = cell.data().cloned().unwrap_or(Value::Null);
                    el = el.child((plugin.render)(&data, ctx));
                }
                None => warn!("Cell '{}' uses unavailable plugin '{}'", cell.id, plugin_ref.id),
            }
        }
        if let Some(rows) = &cell.rows {
            el = el.children(rows.iter().map(|row| self.render_row(row, ctx)));
        }
        el.into()
    }
}

// ========================================
// 文書ツリーの探索
// ========================================

fn row_at<'a>(rows: &'a mut [EditorRow], path: &[usize]) -> Option<&'a mut EditorRow> {
    let (&first, rest) = path.split_first()?;
    let row = rows.get_mut(first)?;
    match rest {
        [] => Some(row),
        [cell, tail @ ..] => {
            let nested = row.cells.get_mut(*cell)?.rows.as_mut()?;
            row_at(nested, tail)
        }
    }
}

fn cell_mut<'a>(rows: &'a mut [EditorRow], id: &str) -> Option<&'a mut EditorCell> {
    for row in rows.iter_mut() {
        for cell in row.cells.iter_mut() {
            if cell.id == id {
                return Some(cell);
            }
            if let Some(nested) = cell.rows.as_mut() {
                if let Some(found) = cell_mut(nested, id) {
                    return Some(found);
                }
            }
        }
    }
    None
}

fn parent_cells<'a>(rows: &'a mut [EditorRow], id: &str) -> Option<(&'a mut Vec<EditorCell>, usize)> {
    for row in rows.iter_mut() {
        if let Some(index) = row.cells.iter().position(|c| c.id == id) {
            return Some((&mut row.cells, index));
        }
        for cell in row.cells.iter_mut() {
            if let Some(nested) = cell.rows.as_mut() {
                if let Some(found) = parent_cells(nested, id) {
                    return Some(found);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn editor(kit: BuilderKit) -> (PageEditor, Rc<RefCell<Vec<String>>>) {
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = changes.clone();
        let editor = PageEditor::new(None, kit, move |json| sink.borrow_mut().push(json.to_string())).unwrap();
        (editor, changes)
    }

    #[test]
    fn test_null_and_empty_values_start_empty() {
        for value in [None, Some(""), Some("null")] {
            let editor = PageEditor::new(value, BuilderKit::General, |_| {}).unwrap();
            assert!(editor.document().rows.is_empty());
        }
        assert!(matches!(
            PageEditor::new(Some("{oops"), BuilderKit::General, |_| {}),
            Err(EditorError::Parse(_))
        ));
    }

    #[test]
    fn test_every_edit_emits_whole_document() {
        let (mut editor, changes) = editor(BuilderKit::General);
        editor.add_row().unwrap();
        let cell = editor
            .insert_cell(&[0], 0, "pagekit/text", json!({ "text": "hello" }))
            .unwrap();
        editor.update_cell_data(&cell, json!({ "text": "bye" })).unwrap();

        let changes = changes.borrow();
        assert_eq!(changes.len(), 3);
        let last: EditorDocument = serde_json::from_str(&changes[2]).unwrap();
        assert_eq!(&last, editor.document());
        assert_eq!(last.rows[0].cells[0].data(), Some(&json!({ "text": "bye" })));
    }

    #[test]
    fn test_plugin_outside_kit_is_rejected() {
        let (mut editor, changes) = editor(BuilderKit::Swap);
        editor.add_row().unwrap();
        let err = editor
            .insert_cell(&[0], 0, "pagekit/collection", json!({}))
            .unwrap_err();
        assert_eq!(
            err,
            EditorError::PluginNotInKit {
                plugin: "pagekit/collection".into(),
                kit: BuilderKit::Swap
            }
        );
        assert_eq!(changes.borrow().len(), 1);
    }

    #[test]
    fn test_resize_is_clamped() {
        let (mut editor, _) = editor(BuilderKit::General);
        editor.add_row().unwrap();
        let cell = editor.insert_cell(&[0], 0, "pagekit/spacer", json!({})).unwrap();
        editor.resize_cell(&cell, 40).unwrap();
        assert_eq!(editor.document().rows[0].cells[0].size, 12);
        editor.resize_cell(&cell, 0).unwrap();
        assert_eq!(editor.document().rows[0].cells[0].size, 1);
    }

    #[test]
    fn test_move_and_remove_cells() {
        let (mut editor, _) = editor(BuilderKit::General);
        editor.add_row().unwrap();
        let a = editor.insert_cell(&[0], 0, "pagekit/text", json!({ "text": "a" })).unwrap();
        let b = editor.insert_cell(&[0], 1, "pagekit/text", json!({ "text": "b" })).unwrap();
        editor.move_cell(&b, -5).unwrap();
        let ids: Vec<&str> = editor.document().rows[0].cells.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec![b.as_str(), a.as_str()]);

        editor.remove_cell(&b).unwrap();
        assert_eq!(editor.document().rows[0].cells.len(), 1);
        assert_eq!(editor.remove_cell(&b), Err(EditorError::CellNotFound(b.clone())));
    }

    #[test]
    fn test_nested_rows_and_render() {
        let (mut editor, _) = editor(BuilderKit::General);
        editor.add_row().unwrap();
        let outer = editor.insert_cell(&[0], 0, "pagekit/spacer", json!({})).unwrap();
        let inner = editor
            .insert_cell(&[0, 0, 0], 0, "pagekit/text", json!({ "text": "deep" }))
            .unwrap_err();
        // ネストした行はまだ存在しない
        assert_eq!(inner, EditorError::RowNotFound(vec![0, 0, 0]));

        assert_eq!(
            editor.add_row_in("missing").unwrap_err(),
            EditorError::CellNotFound("missing".into())
        );
        let nested_row = editor.add_row_in(&outer).unwrap();
        assert_eq!(editor.document().rows[0].cells[0].rows.as_ref().unwrap()[0].id, nested_row);
        let inner = editor
            .insert_cell(&[0, 0, 0], 0, "pagekit/text", json!({ "text": "deep" }))
            .unwrap();
        editor.resize_cell(&inner, 6).unwrap();

        let desktop = editor.render(Viewport::Desktop);
        assert_eq!(desktop.find_by_class("pk-row").len(), 2);
        let inner_el = desktop.find_by_attr("data-cell").into_iter().find(|e| e.get_attr("data-cell") == Some(inner.as_str())).unwrap();
        assert_eq!(inner_el.get_attr("data-size"), Some("6"));
        assert!(desktop.text_content().contains("deep"));

        let mobile = editor.render(Viewport::Mobile);
        let inner_el = mobile.find_by_attr("data-cell").into_iter().find(|e| e.get_attr("data-cell") == Some(inner.as_str())).unwrap();
        assert_eq!(inner_el.get_attr("data-size"), Some("12"));
    }

    #[test]
    fn test_unknown_fields_survive_reserialization() {
        let source = r#"{"id":"d","version":3,"meta":{"a":1},"rows":[{"id":"r","cells":[{"id":"c","size":4,"plugin":{"id":"gone/plugin","version":1},"layout":"x"}]}]}"#;
        let mut editor = PageEditor::new(Some(source), BuilderKit::General, |_| {}).unwrap();
        editor.resize_cell("c", 5).unwrap();
        let out: Value = serde_json::from_str(&editor.to_json().unwrap()).unwrap();
        assert_eq!(out["meta"], json!({ "a": 1 }));
        assert_eq!(out["rows"][0]["cells"][0]["layout"], json!("x"));
        // 未登録プラグインのセルは何も描画しない
        let tree = editor.render(Viewport::Desktop);
        assert_eq!(tree.find_by_class("pk-cell").len(), 1);
        assert!(tree.text_content().is_empty());
    }
}
