pub mod cell_plugins;
pub mod form_schema;
pub mod section_types;

use std::fmt;
use std::str::FromStr;

pub use cell_plugins::{CellPlugin, find_plugin, initialize_cell_plugins, plugins_for_kit, register_cell_plugin};
pub use form_schema::{FieldKind, FieldSpec, FormError, FormSchema};
pub use section_types::{SectionCategory, SectionTypeInfo, section_selector};

/// ビルダーの種類。エディタに並ぶセクション型とプラグインが変わる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BuilderKit {
    #[default]
    General,
    Nft,
    Swap,
}

impl BuilderKit {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuilderKit::General => "general",
            BuilderKit::Nft => "nft",
            BuilderKit::Swap => "swap",
        }
    }
}

impl fmt::Display for BuilderKit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuilderKit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "general" => Ok(BuilderKit::General),
            "nft" => Ok(BuilderKit::Nft),
            "swap" => Ok(BuilderKit::Swap),
            other => Err(format!("Unknown builder kit '{}' (expected general, nft or swap)", other)),
        }
    }
}
