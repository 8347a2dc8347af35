pub mod fees;
pub mod menu;
pub mod sections;
pub mod store;

pub use fees::{FeeAlert, FeeEditor, FeeError, is_valid_address};
pub use menu::{MAX_MENU_DEPTH, MenuEditor, MenuError, MenuTarget};
pub use sections::SectionsEditor;
pub use store::{ConfigAction, ConfigStore, reduce};
