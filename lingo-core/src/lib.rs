pub mod csv;
pub mod error;
pub mod language;
pub mod settings;
pub mod yaml;

pub use error::{Error, Result};
pub use language::Language;
pub use settings::{ArgMode, LocaleSettings, LogSettings, SupportedLanguage};
