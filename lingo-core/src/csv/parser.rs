//! 逐行扫描的 CSV 解析器
//!
//! 只支持本地化表格需要的方言：逗号分隔、双引号包裹、引号内 `""` 表示一个引号、
//! 引号内允许换行。第一行的字段数决定整张表的列数，之后缺少尾部空字段的行会被补齐。

use std::borrow::Cow;
use std::mem;

use super::escape::unescape;
use super::table::{ParseWarning, Table};
use crate::error::{Error, Result};

const BOM: char = '\u{feff}';

/// 解析选项
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// 扫描前先解码每一物理行中的反斜杠转义（`\n`、`\uXXXX` 等）
    pub unescape: bool,
}

/// 使用默认选项解析
pub fn parse(bytes: &[u8]) -> Result<Table> {
    parse_with(bytes, ParseOptions::default())
}

pub fn parse_with(bytes: &[u8], options: ParseOptions) -> Result<Table> {
    let mut lines = LineReader::new(bytes);
    let mut scanner = Scanner::default();
    let mut seen_line = false;

    while let Some(line) = lines.next_line(scanner.inside_quotes) {
        seen_line = true;
        let line = if options.unescape {
            Cow::Owned(unescape(&line))
        } else {
            line
        };
        scanner.scan_line(&line);
    }

    if !seen_line {
        return Err(Error::EmptySource);
    }

    let table = scanner.finish();
    if table.columns() == 0 {
        return Err(Error::NoColumns);
    }

    log::debug!(
        "Parsed CSV table: {} rows x {} columns",
        table.rows(),
        table.columns()
    );
    Ok(table)
}

/// 按 `\n` / `\r` 切分物理行，`\r\n` 视作一个换行
struct LineReader<'a> {
    bytes: &'a [u8],
    offset: usize,
    first: bool,
}

impl<'a> LineReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            offset: 0,
            first: true,
        }
    }

    /// 读取下一物理行；不在引号中时先跳过所有控制字节（空行、缩进用的制表符等）
    fn next_line(&mut self, inside_quotes: bool) -> Option<Cow<'a, str>> {
        let bytes = self.bytes;
        if !inside_quotes {
            while self.offset < bytes.len() && bytes[self.offset] < 32 {
                self.offset += 1;
            }
        }
        if self.offset >= bytes.len() {
            return None;
        }

        let start = self.offset;
        let end = bytes[start..]
            .iter()
            .position(|&b| b == b'\n' || b == b'\r')
            .map_or(bytes.len(), |pos| start + pos);

        self.offset = end;
        if bytes.get(self.offset) == Some(&b'\r') {
            self.offset += 1;
        }
        if bytes.get(self.offset) == Some(&b'\n') {
            self.offset += 1;
        }

        let mut line = String::from_utf8_lossy(&bytes[start..end]);
        if mem::take(&mut self.first) {
            if let Some(stripped) = line.strip_prefix(BOM) {
                line = Cow::Owned(stripped.to_string());
            }
        }
        Some(line)
    }
}

/// 字段扫描状态机，跨物理行保留引号状态
#[derive(Default)]
struct Scanner {
    cells: Vec<String>,
    field: String,
    inside_quotes: bool,
    columns: usize,
    warnings: Vec<ParseWarning>,
}

impl Scanner {
    fn scan_line(&mut self, line: &str) {
        // 引号内换行：这一行是上一个字段的延续
        if self.inside_quotes {
            self.field.push('\n');
        }

        let mut chars = line.chars().peekable();
        while let Some(ch) = chars.next() {
            let last = chars.peek().is_none();
            let mut finished = false;

            match ch {
                ',' if self.inside_quotes => self.field.push(ch),
                ',' => finished = true,
                '"' if !self.inside_quotes => {
                    self.inside_quotes = true;
                    if self.columns == 0 {
                        log::warn!("Quoted content in CSV header, language columns may be misread");
                        self.warnings.push(ParseWarning::QuotedHeader {
                            field: self.cells.len(),
                        });
                    }
                }
                '"' => match chars.peek() {
                    None => finished = true,
                    Some('"') => {
                        self.field.push('"');
                        chars.next();
                    }
                    Some(&next) => {
                        finished = true;
                        if next == ',' {
                            chars.next();
                        }
                    }
                },
                _ => {
                    self.field.push(ch);
                    if last && !self.inside_quotes {
                        finished = true;
                    }
                }
            }

            if finished {
                self.finish_field();
                if self.columns == 0 && chars.peek().is_none() {
                    self.columns = self.cells.len();
                }
            }
        }

        if !self.inside_quotes {
            self.pad_row();
        }
    }

    fn finish_field(&mut self) {
        self.cells.push(mem::take(&mut self.field));
        self.inside_quotes = false;
    }

    /// 补齐被省略的行尾空字段
    fn pad_row(&mut self) {
        if self.columns == 0 {
            return;
        }
        while self.cells.len() % self.columns != 0 {
            self.cells.push(String::new());
        }
    }

    fn finish(mut self) -> Table {
        if self.inside_quotes {
            let row = if self.columns == 0 {
                0
            } else {
                self.cells.len() / self.columns
            };
            log::warn!("CSV ended inside a quoted field at row {}", row);
            self.warnings.push(ParseWarning::UnterminatedQuote { row });
            self.finish_field();
            if self.columns == 0 {
                self.columns = self.cells.len();
            }
            self.pad_row();
        }
        Table::new(self.cells, self.columns, self.warnings)
    }
}
