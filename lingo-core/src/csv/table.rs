use std::ops::Index;

/// 解析过程中发现、但不影响继续解析的问题
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// 表头中出现了引号，语言/键的解析结果可能不可靠
    QuotedHeader { field: usize },
    /// 数据在引号未闭合时结束，最后一个字段按已读内容收尾
    UnterminatedQuote { row: usize },
}

/// 一份按行优先顺序存放的表格
///
/// 第 0 行是表头，每行第 0 列是键。构造后不可变。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    cells: Vec<String>,
    columns: usize,
    warnings: Vec<ParseWarning>,
}

impl Table {
    pub(crate) fn new(cells: Vec<String>, columns: usize, warnings: Vec<ParseWarning>) -> Self {
        debug_assert!(columns == 0 || cells.len() % columns == 0);
        Self {
            cells,
            columns,
            warnings,
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        if self.columns == 0 {
            0
        } else {
            self.cells.len() / self.columns
        }
    }

    /// 取 (row, col) 处的内容，越界时返回 `None`
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        if col >= self.columns {
            return None;
        }
        self.cells.get(row * self.columns + col).map(String::as_str)
    }

    /// 取整行
    pub fn row(&self, row: usize) -> Option<&[String]> {
        let start = row.checked_mul(self.columns)?;
        self.cells.get(start..start + self.columns)
    }

    /// 按行遍历
    pub fn iter_rows(&self) -> impl Iterator<Item = &[String]> {
        self.cells.chunks(self.columns.max(1))
    }

    /// 表头行
    pub fn header(&self) -> &[String] {
        self.row(0).unwrap_or(&[])
    }

    /// 全部单元格，行优先
    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }
}

impl Index<(usize, usize)> for Table {
    type Output = str;

    fn index(&self, (row, col): (usize, usize)) -> &str {
        assert!(col < self.columns, "column {} out of range ({})", col, self.columns);
        &self.cells[row * self.columns + col]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let cells = ["KEY", "English", "hello", "Hello", "bye", "Bye"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        Table::new(cells, 2, Vec::new())
    }

    #[test]
    fn test_indexing() {
        let table = sample();
        assert_eq!(table.rows(), 3);
        assert_eq!(table.columns(), 2);
        assert_eq!(table.cell(1, 1), Some("Hello"));
        assert_eq!(&table[(2, 0)], "bye");
        assert_eq!(table.cell(3, 0), None);
        assert_eq!(table.cell(0, 2), None);
        assert_eq!(table.header(), &["KEY".to_string(), "English".to_string()]);
        assert_eq!(table.row(2).map(|r| r.len()), Some(2));
        assert_eq!(table.iter_rows().count(), 3);
    }

    #[test]
    fn test_empty_table() {
        let table = Table::default();
        assert_eq!(table.rows(), 0);
        assert!(table.header().is_empty());
        assert_eq!(table.iter_rows().count(), 0);
    }
}
