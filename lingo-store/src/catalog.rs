//! 由 CSV 表格构建的多语言键值表
//!
//! 表头第 1 列起是语言标识，每行第 0 列是 key。多份表格合并进同一个 [`Catalog`]，
//! 同一语言同一 key 以后加载的为准。

use std::collections::HashMap;

use lingo_core::csv::{ParseWarning, Table};
use lingo_core::{Error, Language, Result};

use crate::diagnostic::{Diagnostic, DiagnosticSink, TracingSink};

const KEY_SENTINEL: &str = "KEY";

/// 单一语言的 key -> 文本
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleTable {
    entries: HashMap<String, String>,
}

impl LocaleTable {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn keys_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> {
        self.keys().filter(move |k| k.starts_with(prefix))
    }

    fn insert(&mut self, key: &str, text: &str) {
        self.entries.insert(key.to_string(), text.to_string());
    }
}

/// 全部语言的键值表，语言按首次出现的顺序记录
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    tables: HashMap<Language, LocaleTable>,
    order: Vec<Language>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, language: Language) -> Option<&LocaleTable> {
        self.tables.get(&language)
    }

    pub fn contains_language(&self, language: Language) -> bool {
        self.tables.contains_key(&language)
    }

    /// 按加载顺序排列的语言
    pub fn languages(&self) -> &[Language] {
        &self.order
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// 将一份表格合并进来
    ///
    /// 严格模式下，任何一列语言无法识别都会拒绝整份表格，且不修改已有内容；
    /// 非严格模式下只跳过该列。返回值是过程中发现的非致命问题。
    pub fn merge(
        &mut self,
        source: &str,
        table: &Table,
        strict: bool,
    ) -> Result<Vec<Diagnostic>> {
        let mut diagnostics: Vec<Diagnostic> = table
            .warnings()
            .iter()
            .map(|warning| match *warning {
                ParseWarning::QuotedHeader { field } => Diagnostic::QuotedHeader {
                    source: source.to_string(),
                    field,
                },
                ParseWarning::UnterminatedQuote { row } => Diagnostic::UnterminatedQuote {
                    source: source.to_string(),
                    row,
                },
            })
            .collect();

        let sentinel = table.cell(0, 0).unwrap_or_default().trim();
        if !sentinel.eq_ignore_ascii_case(KEY_SENTINEL) {
            diagnostics.push(Diagnostic::MissingKeySentinel {
                source: source.to_string(),
                found: sentinel.to_string(),
            });
        }

        // 先解析全部语言列，严格模式下失败时不能留下半份数据
        let mut columns = Vec::with_capacity(table.columns().saturating_sub(1));
        for (column, code) in table.header().iter().enumerate().skip(1) {
            match code.parse::<Language>() {
                Ok(language) => columns.push((column, language)),
                Err(err) if strict => return Err(err),
                Err(_) => diagnostics.push(Diagnostic::SkippedColumn {
                    source: source.to_string(),
                    column,
                    code: code.trim().to_string(),
                }),
            }
        }

        for &(_, language) in &columns {
            if !self.tables.contains_key(&language) {
                self.order.push(language);
                self.tables.insert(language, LocaleTable::default());
            }
        }

        for (row, cells) in table.iter_rows().enumerate().skip(1) {
            let key = cells[0].as_str();
            if key.is_empty() {
                diagnostics.push(Diagnostic::EmptyKey {
                    source: source.to_string(),
                    row,
                });
                continue;
            }
            for &(column, language) in &columns {
                if let Some(locale) = self.tables.get_mut(&language) {
                    locale.insert(key, &cells[column]);
                }
            }
        }

        Ok(diagnostics)
    }
}

/// 用单份表格构建语言表（严格模式），非致命问题写入日志
pub fn build(table: &Table) -> Result<Catalog> {
    let mut catalog = Catalog::new();
    for diagnostic in catalog.merge("<table>", table, true)? {
        TracingSink.report(&diagnostic);
    }
    if catalog.is_empty() {
        return Err(Error::NoLanguagesLoaded);
    }
    Ok(catalog)
}
