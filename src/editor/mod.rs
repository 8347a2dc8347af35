pub mod page_editor;
pub mod section_dialog;

pub use page_editor::{EditorCell, EditorDocument, EditorError, EditorRow, PageEditor, PluginRef};
pub use section_dialog::{DialogState, DialogView, EditSectionDialog};
