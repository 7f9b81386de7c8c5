pub mod assets;
pub mod character;
pub mod loaders;
pub mod page;
pub mod pinyin;

pub use assets::CharacterAssets;
pub use character::{is_chinese_char, CharacterRequest};
pub use loaders::{resolve_characters, ResolvedInput};
pub use page::{ImagePlacement, Page, PageBackground, Rect, TextBlock};
