use std::rc::Rc;
use std::sync::Arc;

use lingo_core::csv::parse_with;
use lingo_core::{ArgMode, Error, Language, LocaleSettings, Result};
use tracing::{debug, info};

use crate::catalog::{Catalog, LocaleTable};
use crate::diagnostic::{Diagnostic, DiagnosticSink, TracingSink};
use crate::format::substitute;
use crate::notifier::{DispatchState, Notifier, Observer, ObserverId};
use crate::provider::{AssetProvider, TextSource};
use crate::sprite::{SpriteCache, SpriteHandle, sprite_path};

/// 一次加载的结果
#[derive(Debug, Default)]
pub struct LoadReport {
    /// 成功合并的数据源
    pub loaded: Vec<String>,
    /// 被拒绝的数据源及原因
    pub rejected: Vec<(String, Error)>,
}

/// 本地化数据存储
///
/// 持有全部语言表与当前语言。语言表是不可变快照，重新加载时整体替换。
pub struct LocaleStore {
    settings: LocaleSettings,
    provider: Box<dyn AssetProvider>,
    sink: Box<dyn DiagnosticSink>,
    catalog: Arc<Catalog>,
    current: Language,
    notifier: Notifier,
    sprites: SpriteCache,
    report: LoadReport,
    host_locale: Option<String>,
}

pub struct LocaleStoreBuilder {
    settings: LocaleSettings,
    provider: Box<dyn AssetProvider>,
    sink: Box<dyn DiagnosticSink>,
    host_locale: Option<String>,
}

impl LocaleStoreBuilder {
    pub fn settings(mut self, settings: LocaleSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn diagnostics(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// 宿主的语言偏好，形如 `zh-TW` 或 `zh-TW,en;q=0.8`；不设置时读取系统区域设置
    pub fn host_locale(mut self, locale: impl Into<String>) -> Self {
        self.host_locale = Some(locale.into());
        self
    }

    pub fn build(self) -> Result<LocaleStore> {
        let (catalog, report) =
            load_catalog(self.provider.as_ref(), &self.settings, self.sink.as_ref())?;

        let host_locale = self.host_locale.or_else(sys_locale::get_locale);
        let current = initial_language(&catalog, &self.settings, host_locale.as_deref())
            .ok_or(Error::NoLanguagesLoaded)?;
        info!(
            language = %current,
            languages = catalog.languages().len(),
            "Locale store initialized"
        );

        Ok(LocaleStore {
            settings: self.settings,
            provider: self.provider,
            sink: self.sink,
            catalog: Arc::new(catalog),
            current,
            notifier: Notifier::default(),
            sprites: SpriteCache::default(),
            report,
            host_locale,
        })
    }
}

fn load_source(
    catalog: &mut Catalog,
    source: &TextSource,
    settings: &LocaleSettings,
) -> Result<Vec<Diagnostic>> {
    let table = parse_with(&source.bytes, settings.parse_options())?;
    catalog.merge(&source.name, &table, settings.strict_headers)
}

fn load_catalog(
    provider: &dyn AssetProvider,
    settings: &LocaleSettings,
    sink: &dyn DiagnosticSink,
) -> Result<(Catalog, LoadReport)> {
    let sources = provider.list_text_sources(&settings.text_path)?;
    let mut catalog = Catalog::new();
    let mut report = LoadReport::default();

    for source in &sources {
        match load_source(&mut catalog, source, settings) {
            Ok(diagnostics) => {
                diagnostics.iter().for_each(|d| sink.report(d));
                debug!(source = %source.name, "Locale source merged");
                report.loaded.push(source.name.clone());
            }
            Err(err) => {
                sink.report(&Diagnostic::SourceRejected {
                    source: source.name.clone(),
                    reason: err.to_string(),
                });
                report.rejected.push((source.name.clone(), err));
            }
        }
    }

    if catalog.is_empty() {
        return Err(Error::NoLanguagesLoaded);
    }
    Ok((catalog, report))
}

/// 初始语言：设置中指定的、宿主偏好的，否则取加载顺序中的第一个
fn initial_language(
    catalog: &Catalog,
    settings: &LocaleSettings,
    host_locale: Option<&str>,
) -> Option<Language> {
    let available = catalog.languages();
    settings
        .preferred_language
        .filter(|lang| catalog.contains_language(*lang))
        .or_else(|| host_locale.and_then(|locale| Language::preferred(locale, available)))
        .or_else(|| available.first().copied())
}

impl LocaleStore {
    pub fn builder(provider: impl AssetProvider + 'static) -> LocaleStoreBuilder {
        LocaleStoreBuilder {
            settings: LocaleSettings::default(),
            provider: Box::new(provider),
            sink: Box::new(TracingSink),
            host_locale: None,
        }
    }

    pub fn settings(&self) -> &LocaleSettings {
        &self.settings
    }

    pub fn catalog(&self) -> Arc<Catalog> {
        self.catalog.clone()
    }

    pub fn load_report(&self) -> &LoadReport {
        &self.report
    }

    pub fn current_language(&self) -> Language {
        self.current
    }

    /// 已加载的语言，按加载顺序
    pub fn languages(&self) -> &[Language] {
        self.catalog.languages()
    }

    fn active_table(&self) -> Option<&LocaleTable> {
        self.catalog.table(self.current)
    }

    /// 切换当前语言并开始通知观察者
    ///
    /// 语言未加载时返回 `UnsupportedLanguage` 且不做任何修改；
    /// 与当前语言相同时不做任何事并返回 `Ok(false)`。
    pub fn set_active_language(&mut self, language: Language) -> Result<bool> {
        if !self.catalog.contains_language(language) {
            return Err(Error::UnsupportedLanguage(language.to_string()));
        }
        if language == self.current {
            return Ok(false);
        }

        info!(from = %self.current, to = %language, "Switching language");
        self.current = language;
        self.notifier.start(language);
        Ok(true)
    }

    /// 取当前语言的文本，找不到时返回 key 本身
    pub fn text(&self, key: &str) -> String {
        self.get_text(key, &[])
    }

    /// 取当前语言的文本并将 `<i>` 替换为 `args[i]`，找不到时返回 key 本身
    pub fn get_text(&self, key: &str, args: &[&str]) -> String {
        let Some(table) = self.active_table() else {
            return key.to_string();
        };
        let Some(text) = table.get(key) else {
            self.sink.report(&Diagnostic::MissingKey {
                language: self.current,
                key: key.to_string(),
            });
            return key.to_string();
        };

        let args: Vec<&str> = match self.settings.arg_mode {
            ArgMode::Literal => args.to_vec(),
            ArgMode::ResolveKeys => args
                .iter()
                .map(|&arg| table.get(arg).unwrap_or(arg))
                .collect(),
        };
        substitute(text, &args).into_owned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.active_table().is_some_and(|table| table.contains_key(key))
    }

    pub fn count_keys_with_prefix(&self, prefix: &str) -> usize {
        self.active_table()
            .map_or(0, |table| table.keys_with_prefix(prefix).count())
    }

    /// 当前语言下 key 对应的图片路径
    pub fn sprite_path(&self, key: &str) -> String {
        sprite_path(
            &self.settings.sprite_template,
            &self.settings.image_path,
            key,
            self.current,
        )
    }

    /// 当前语言下 key 对应的图片，加载结果（包括找不到）会被缓存
    pub fn get_sprite(&self, key: &str) -> Option<SpriteHandle> {
        let path = self.sprite_path(key);
        let sprite = self
            .sprites
            .get_or_load(&path, |p| self.provider.load_sprite(p));
        if sprite.is_none() {
            self.sink.report(&Diagnostic::MissingAsset { path });
        }
        sprite
    }

    pub fn register(&mut self, observer: Rc<dyn Observer>) -> ObserverId {
        self.notifier.register(observer)
    }

    pub fn deregister(&mut self, id: ObserverId) -> bool {
        self.notifier.deregister(id)
    }

    pub fn observer_count(&self) -> usize {
        self.notifier.len()
    }

    pub fn dispatch_state(&self) -> DispatchState {
        self.notifier.state()
    }

    /// 通知下一个观察者，没有待通知的观察者时返回 `false`
    ///
    /// 宿主在每次调度（每帧、每个 tick）中调用一次。
    pub fn step(&mut self) -> bool {
        let Some(observer) = self.notifier.next() else {
            return false;
        };
        observer.localize(self);
        true
    }

    /// 立即通知所有待通知的观察者，返回通知的数量
    pub fn flush(&mut self) -> usize {
        let mut notified = 0;
        while self.step() {
            notified += 1;
        }
        notified
    }

    /// 在异步运行时中完成分发，每通知一个观察者让出一次执行权
    pub async fn dispatch(&mut self) -> usize {
        let mut notified = 0;
        while self.step() {
            notified += 1;
            tokio::task::yield_now().await;
        }
        notified
    }

    /// 重新读取全部数据源并整体替换语言表
    ///
    /// 加载失败时保留原有数据。当前语言不再存在时重新选择初始语言。
    /// 成功后清空图片缓存并重新通知全部观察者。
    pub fn reload(&mut self) -> Result<()> {
        let (catalog, report) =
            load_catalog(self.provider.as_ref(), &self.settings, self.sink.as_ref())?;

        if !catalog.contains_language(self.current) {
            let host_locale = self.host_locale.as_deref();
            if let Some(language) = initial_language(&catalog, &self.settings, host_locale) {
                info!(from = %self.current, to = %language, "Active language dropped by reload");
                self.current = language;
            }
        }

        self.catalog = Arc::new(catalog);
        self.report = report;
        self.sprites.clear();
        self.notifier.start(self.current);
        Ok(())
    }
}
