use std::cell::{Cell, RefCell};
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use lingo_core::LogSettings;
use lingo_store::logging::init_logging;
use lingo_store::{
    ArgMode, AssetProvider, Diagnostic, DirProvider, DispatchState, Error, Language,
    LocaleSettings, LocaleStore, MemoryProvider, Observer, SpriteHandle, TextSource,
};

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/locales")
}

fn fixture_store(host: &str) -> LocaleStore {
    LocaleStore::builder(DirProvider::new(fixtures()))
        .host_locale(host)
        .build()
        .unwrap()
}

type Log = Rc<RefCell<Vec<(String, String)>>>;

/// 记录每次刷新时读到的标题
struct Recorder {
    name: &'static str,
    log: Log,
}

impl Observer for Recorder {
    fn localize(&self, store: &LocaleStore) {
        self.log
            .borrow_mut()
            .push((self.name.to_string(), store.text("title")));
    }
}

fn recorders(store: &mut LocaleStore, names: &[&'static str]) -> Log {
    let log: Log = Rc::default();
    for &name in names {
        store.register(Rc::new(Recorder { name, log: log.clone() }));
    }
    log
}

fn names(log: &Log) -> Vec<String> {
    log.borrow().iter().map(|(name, _)| name.clone()).collect()
}

#[test]
fn test_loads_fixture_directory() {
    let store = fixture_store("zh-TW");

    assert_eq!(
        store.languages(),
        &[Language::English, Language::ChineseTraditional, Language::Japanese]
    );
    assert_eq!(store.current_language(), Language::ChineseTraditional);
    assert_eq!(store.load_report().loaded, vec!["ui.csv", "welcome.csv"]);
    assert!(store.load_report().rejected.is_empty());

    assert_eq!(store.get_text("greet", &["Ann"]), "Ann，你好！");
    assert_eq!(store.text("title"), "標題");
}

#[test]
fn test_quoted_fields_survive_loading() {
    let store = fixture_store("en-US");

    assert_eq!(store.current_language(), Language::English);
    assert_eq!(store.get_text("greet", &["Ann"]), "Hello, Ann!");
    assert_eq!(store.text("notice"), "Line one\nLine two");
}

#[test]
fn test_host_priority_list_skips_unloaded() {
    let store = fixture_store("de-DE,ja;q=0.9,en;q=0.8");
    assert_eq!(store.current_language(), Language::Japanese);
    assert_eq!(store.get_text("welcome", &["Ann"]), "ようこそAnn");
}

#[test]
fn test_unknown_host_falls_back_to_first_loaded() {
    let store = fixture_store("sw-KE");
    assert_eq!(store.current_language(), Language::English);
}

#[test]
fn test_configured_language_wins_over_host() {
    let settings = LocaleSettings {
        preferred_language: Some(Language::Japanese),
        ..LocaleSettings::default()
    };
    let store = LocaleStore::builder(DirProvider::new(fixtures()))
        .settings(settings)
        .host_locale("zh-TW")
        .build()
        .unwrap();
    assert_eq!(store.current_language(), Language::Japanese);
}

#[test]
fn test_missing_key_returns_key_and_reports() {
    let seen: Rc<RefCell<Vec<Diagnostic>>> = Rc::default();
    let sink = seen.clone();
    let store = LocaleStore::builder(DirProvider::new(fixtures()))
        .host_locale("en")
        .diagnostics(move |d: &Diagnostic| sink.borrow_mut().push(d.clone()))
        .build()
        .unwrap();
    seen.borrow_mut().clear();

    assert_eq!(store.get_text("no.such.key", &["x"]), "no.such.key");
    assert_eq!(
        *seen.borrow(),
        vec![Diagnostic::MissingKey {
            language: Language::English,
            key: "no.such.key".to_string(),
        }]
    );
}

#[test]
fn test_key_queries_follow_active_language() {
    let mut store = fixture_store("en");

    assert!(store.contains_key("menu_start"));
    assert!(!store.contains_key("welcome_missing"));
    assert_eq!(store.count_keys_with_prefix("menu_"), 2);
    assert_eq!(store.count_keys_with_prefix(""), 6);

    // welcome.csv 只提供日语中的 welcome
    store.set_active_language(Language::Japanese).unwrap();
    assert!(!store.contains_key("menu_start"));
    assert_eq!(store.count_keys_with_prefix("menu_"), 0);
    assert_eq!(store.count_keys_with_prefix(""), 1);
}

#[test]
fn test_switch_notifies_in_registration_order() {
    let mut store = fixture_store("en");
    let log = recorders(&mut store, &["a", "b", "c"]);

    assert!(store.set_active_language(Language::ChineseTraditional).unwrap());
    assert_eq!(
        store.dispatch_state(),
        DispatchState::Dispatching {
            language: Language::ChineseTraditional,
            remaining: 3,
        }
    );

    assert!(store.step());
    assert_eq!(names(&log), vec!["a"]);
    assert_eq!(store.flush(), 2);
    assert!(!store.step());

    assert_eq!(
        *log.borrow(),
        vec![
            ("a".to_string(), "標題".to_string()),
            ("b".to_string(), "標題".to_string()),
            ("c".to_string(), "標題".to_string()),
        ]
    );
    assert_eq!(store.dispatch_state(), DispatchState::Idle);
}

#[test]
fn test_unloaded_language_is_rejected() {
    let mut store = fixture_store("en");
    let log = recorders(&mut store, &["a"]);

    let err = store.set_active_language(Language::Korean).unwrap_err();
    assert!(matches!(err, Error::UnsupportedLanguage(ref name) if name == "Korean"));
    assert_eq!(store.current_language(), Language::English);
    assert_eq!(store.dispatch_state(), DispatchState::Idle);
    assert_eq!(store.flush(), 0);
    assert!(log.borrow().is_empty());
}

#[test]
fn test_same_language_is_noop() {
    let mut store = fixture_store("en");
    let log = recorders(&mut store, &["a", "b"]);

    assert!(!store.set_active_language(Language::English).unwrap());
    assert_eq!(store.dispatch_state(), DispatchState::Idle);
    assert_eq!(store.flush(), 0);
    assert!(log.borrow().is_empty());
}

#[test]
fn test_switch_during_dispatch_restarts() {
    let mut store = fixture_store("en");
    let log = recorders(&mut store, &["a", "b", "c"]);

    store.set_active_language(Language::ChineseTraditional).unwrap();
    store.step();
    store.set_active_language(Language::Japanese).unwrap();
    assert_eq!(store.flush(), 3);

    assert_eq!(names(&log), vec!["a", "a", "b", "c"]);
    // 日语中没有 title，回退为 key
    assert!(log.borrow()[1..].iter().all(|(_, title)| title == "title"));
}

#[test]
fn test_deregistered_observer_is_skipped() {
    let mut store = fixture_store("en");
    let log: Log = Rc::default();
    let a = store.register(Rc::new(Recorder { name: "a", log: log.clone() }));
    let b = store.register(Rc::new(Recorder { name: "b", log: log.clone() }));
    store.register(Rc::new(Recorder { name: "c", log: log.clone() }));

    store.set_active_language(Language::Japanese).unwrap();
    store.step();
    assert!(store.deregister(b));
    assert!(store.deregister(a));
    assert_eq!(store.flush(), 1);

    assert_eq!(names(&log), vec!["a", "c"]);
    assert_eq!(store.observer_count(), 1);
}

#[test]
fn test_registered_twice_notified_once() {
    let mut store = fixture_store("en");
    let log: Log = Rc::default();
    let observer: Rc<dyn Observer> = Rc::new(Recorder { name: "a", log: log.clone() });

    let first = store.register(observer.clone());
    assert_eq!(store.register(observer), first);
    store.set_active_language(Language::Japanese).unwrap();
    store.flush();

    assert_eq!(names(&log), vec!["a"]);
}

#[tokio::test]
async fn test_async_dispatch_drains_queue() {
    let mut store = fixture_store("en");
    let log = recorders(&mut store, &["a", "b"]);

    store.set_active_language(Language::ChineseTraditional).unwrap();
    assert_eq!(store.dispatch().await, 2);
    assert_eq!(names(&log), vec!["a", "b"]);
    assert_eq!(store.dispatch_state(), DispatchState::Idle);
}

#[test]
fn test_resolve_keys_mode() {
    let source = "KEY,English\nhello,Hello <0> and <1>\nplayer,Hero\n";
    let build = |arg_mode| {
        LocaleStore::builder(MemoryProvider::new().with_source("ui.csv", source.as_bytes()))
            .settings(LocaleSettings {
                arg_mode,
                ..LocaleSettings::default()
            })
            .host_locale("en")
            .build()
            .unwrap()
    };

    let literal = build(ArgMode::Literal);
    assert_eq!(literal.get_text("hello", &["player", "you"]), "Hello player and you");

    let resolved = build(ArgMode::ResolveKeys);
    assert_eq!(resolved.get_text("hello", &["player", "you"]), "Hello Hero and you");
}

/// 统计加载次数的资源来源
struct CountingProvider {
    inner: MemoryProvider,
    loads: Rc<Cell<usize>>,
}

impl AssetProvider for CountingProvider {
    fn list_text_sources(&self, base_path: &str) -> anyhow::Result<Vec<TextSource>> {
        self.inner.list_text_sources(base_path)
    }

    fn load_sprite(&self, path: &str) -> Option<SpriteHandle> {
        self.loads.set(self.loads.get() + 1);
        self.inner.load_sprite(path)
    }
}

#[test]
fn test_sprite_loads_are_cached_per_path() {
    let loads = Rc::new(Cell::new(0));
    let provider = CountingProvider {
        inner: MemoryProvider::new()
            .with_source("ui.csv", &b"KEY,English,Japanese\nok,OK,OK\n"[..])
            .with_sprite(
                "Localization/Image/logo_English",
                SpriteHandle::from_bytes("Localization/Image/logo_English", b"en".to_vec()),
            ),
        loads: loads.clone(),
    };
    let seen: Rc<RefCell<Vec<Diagnostic>>> = Rc::default();
    let sink = seen.clone();
    let mut store = LocaleStore::builder(provider)
        .host_locale("en")
        .diagnostics(move |d: &Diagnostic| sink.borrow_mut().push(d.clone()))
        .build()
        .unwrap();

    assert_eq!(store.sprite_path("logo"), "Localization/Image/logo_English");
    let first = store.get_sprite("logo").unwrap();
    let second = store.get_sprite("logo").unwrap();
    assert!(first.same_resource(&second));
    assert_eq!(loads.get(), 1);

    store.set_active_language(Language::Japanese).unwrap();
    assert!(store.get_sprite("logo").is_none());
    assert!(store.get_sprite("logo").is_none());
    assert_eq!(loads.get(), 2);

    let missing: Vec<Diagnostic> = seen
        .borrow()
        .iter()
        .filter(|d| matches!(d, Diagnostic::MissingAsset { .. }))
        .cloned()
        .collect();
    let expected = Diagnostic::MissingAsset {
        path: "Localization/Image/logo_Japanese".to_string(),
    };
    assert_eq!(missing, vec![expected.clone(), expected]);
}

#[test]
fn test_sprite_from_fixture_directory() {
    let store = fixture_store("en");
    let sprite = store.get_sprite("logo").unwrap();
    assert_eq!(sprite.bytes(), Some(&b"\x89PNG"[..]));
}

#[test]
fn test_rejected_source_is_reported() {
    let seen: Rc<RefCell<Vec<Diagnostic>>> = Rc::default();
    let sink = seen.clone();
    let provider = MemoryProvider::new()
        .with_source("good.csv", &b"KEY,English\nok,OK\n"[..])
        .with_source("bad.csv", &b"KEY,English,Klingon\nok,Overwritten,Qapla\n"[..]);
    let store = LocaleStore::builder(provider)
        .host_locale("en")
        .diagnostics(move |d: &Diagnostic| sink.borrow_mut().push(d.clone()))
        .build()
        .unwrap();

    let report = store.load_report();
    assert_eq!(report.loaded, vec!["good.csv"]);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].0, "bad.csv");
    assert!(matches!(report.rejected[0].1, Error::UnsupportedLanguage(_)));

    // 被拒绝的文件不会留下任何数据
    assert_eq!(store.text("ok"), "OK");
    assert!(
        seen.borrow()
            .iter()
            .any(|d| matches!(d, Diagnostic::SourceRejected { source, .. } if source == "bad.csv"))
    );
}

#[test]
fn test_lenient_headers_skip_column() {
    let settings = LocaleSettings {
        strict_headers: false,
        ..LocaleSettings::default()
    };
    let seen: Rc<RefCell<Vec<Diagnostic>>> = Rc::default();
    let sink = seen.clone();
    let provider =
        MemoryProvider::new().with_source("ui.csv", &b"KEY,Klingon,English\nok,Qapla,OK\n"[..]);
    let store = LocaleStore::builder(provider)
        .settings(settings)
        .host_locale("en")
        .diagnostics(move |d: &Diagnostic| sink.borrow_mut().push(d.clone()))
        .build()
        .unwrap();

    assert_eq!(store.languages(), &[Language::English]);
    assert_eq!(store.text("ok"), "OK");
    assert!(seen.borrow().contains(&Diagnostic::SkippedColumn {
        source: "ui.csv".to_string(),
        column: 1,
        code: "Klingon".to_string(),
    }));
}

#[test]
fn test_no_sources_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = LocaleStore::builder(DirProvider::new(dir.path()))
        .host_locale("en")
        .build();
    assert!(matches!(result, Err(Error::NoLanguagesLoaded)));

    let only_bad = MemoryProvider::new().with_source("bad.csv", &b""[..]);
    let result = LocaleStore::builder(only_bad).host_locale("en").build();
    assert!(matches!(result, Err(Error::NoLanguagesLoaded)));
}

#[test]
fn test_unreadable_text_dir_is_a_provider_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("Text"), "not a directory").unwrap();

    let settings = LocaleSettings {
        text_path: "Text".to_string(),
        ..LocaleSettings::default()
    };
    let result = LocaleStore::builder(DirProvider::new(dir.path()))
        .settings(settings)
        .host_locale("en")
        .build();
    assert!(matches!(result, Err(Error::Provider(_))));
}

#[test]
fn test_reload_replaces_catalog_and_renotifies() {
    let dir = tempfile::tempdir().unwrap();
    let text = dir.path().join("Localization/Text");
    fs::create_dir_all(&text).unwrap();
    fs::write(text.join("ui.csv"), "KEY,English,Japanese\ntitle,Title,タイトル\n").unwrap();

    let mut store = LocaleStore::builder(DirProvider::new(dir.path()))
        .host_locale("ja")
        .build()
        .unwrap();
    let log = recorders(&mut store, &["a", "b"]);
    assert_eq!(store.text("title"), "タイトル");
    let before = store.catalog();

    fs::write(text.join("ui.csv"), "KEY,English\ntitle,New Title\n").unwrap();
    store.reload().unwrap();

    // 日语已不存在，按宿主偏好重新挑选后回到第一个语言
    assert_eq!(store.current_language(), Language::English);
    assert_eq!(store.flush(), 2);
    assert_eq!(
        *log.borrow(),
        vec![
            ("a".to_string(), "New Title".to_string()),
            ("b".to_string(), "New Title".to_string()),
        ]
    );
    // 旧快照不受影响
    assert_eq!(
        before.table(Language::Japanese).unwrap().get("title"),
        Some("タイトル")
    );
}

#[test]
fn test_failed_reload_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let text = dir.path().join("Localization/Text");
    fs::create_dir_all(&text).unwrap();
    fs::write(text.join("ui.csv"), "KEY,English\ntitle,Title\n").unwrap();

    let mut store = LocaleStore::builder(DirProvider::new(dir.path()))
        .host_locale("en")
        .build()
        .unwrap();

    fs::remove_file(text.join("ui.csv")).unwrap();
    assert!(matches!(store.reload(), Err(Error::NoLanguagesLoaded)));
    assert_eq!(store.text("title"), "Title");
}

#[test]
fn test_settings_file_drives_store() {
    let dir = tempfile::tempdir().unwrap();
    let settings_path = dir.path().join("locale.yaml");
    fs::write(
        &settings_path,
        concat!(
            "text_path: Localization/Text\n",
            "preferred_language: ChineseTraditional\n",
            "sprite_template: \"{base}/{tag}/{key}\"\n",
        ),
    )
    .unwrap();

    let settings = LocaleSettings::load(&settings_path).unwrap();
    let store = LocaleStore::builder(DirProvider::new(fixtures()))
        .settings(settings)
        .host_locale("en")
        .build()
        .unwrap();

    assert_eq!(store.current_language(), Language::ChineseTraditional);
    assert_eq!(store.sprite_path("logo"), "Localization/Image/zh-TW/logo");
}

#[test]
fn test_init_logging_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let settings = LogSettings {
        console: false,
        file: true,
        dir: dir.path().to_path_buf(),
        ..LogSettings::default()
    };

    let guard = init_logging(&settings);
    assert!(guard.is_some());
    tracing::info!("logging initialized for test");
    drop(guard);

    let entries = fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(entries, 1);
}
