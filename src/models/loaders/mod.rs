pub mod character_loader;

pub use character_loader::{read_characters_from_file, resolve_characters, ResolvedInput};
