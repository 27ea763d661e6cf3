pub mod binding;
pub mod catalog;
pub mod diagnostic;
pub mod format;
pub mod logging;
pub mod notifier;
pub mod provider;
pub mod sprite;
pub mod store;

pub use binding::{
    LanguageOption, LanguagePicker, LocaleSprite, LocaleText, SpriteDisplay, TextDisplay,
};
pub use catalog::{Catalog, LocaleTable};
pub use diagnostic::{Diagnostic, DiagnosticSink, TracingSink};
pub use notifier::{DispatchState, Observer, ObserverId};
pub use provider::{AssetProvider, DirProvider, EmbeddedProvider, MemoryProvider, TextSource};
pub use sprite::SpriteHandle;
pub use store::{LoadReport, LocaleStore, LocaleStoreBuilder};

pub use lingo_core::{ArgMode, Error, Language, LocaleSettings, Result};
