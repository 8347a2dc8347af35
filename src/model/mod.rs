// ========================================
// pagekit データモデル
// ========================================
//
// 永続化されるサイト設定ドキュメント（AppConfig）とその構成要素。
// JSONのフィールド名は管理APIのワイヤーフォーマットに合わせてcamelCase。

pub mod app_config;
pub mod fee;
pub mod layout;
pub mod menu;
pub mod section;

pub use app_config::{AppConfig, AppPage, Logo, MenuLayout, MenuSettings, SeoForm, ThemeMode, ThemePalette};
pub use fee::{FeeForm, MAX_FEES};
pub use layout::{BreakpointSettings, PageSectionsLayout, TabPosition, TabsLayoutSettings};
pub use menu::{MenuItemType, MenuTree};
pub use section::{AppPageSection, SectionKind, SectionType};
