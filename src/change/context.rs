//! Shared emission context.
//!
//! Formatting is advisory: the unformatted output defines correctness, and the
//! knobs only affect whitespace and keyword casing. When the format is
//! disabled every helper degenerates to identity / comma-space joins.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeywordCase {
    #[default]
    Preserve,
    Upper,
    Lower,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommaStyle {
    #[default]
    Trailing,
    Leading,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlFormat {
    pub enabled: bool,
    pub keyword_case: KeywordCase,
    pub line_width: usize,
    pub indent_width: usize,
    pub comma_style: CommaStyle,
    pub align_columns: bool,
}

impl Default for SqlFormat {
    fn default() -> Self {
        Self {
            enabled: false,
            keyword_case: KeywordCase::Preserve,
            line_width: 80,
            indent_width: 4,
            comma_style: CommaStyle::Trailing,
            align_columns: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EmitContext {
    pub format: SqlFormat,
}

impl EmitContext {
    /// Unformatted output: identity keywords, comma-space lists, inline parens.
    pub fn plain() -> Self {
        Self::default()
    }

    pub fn formatted(format: SqlFormat) -> Self {
        Self { format }
    }

    /// Applies the configured keyword case. Source keywords are written in
    /// upper case, so `Preserve` keeps them upper.
    pub fn kw(&self, keyword: &str) -> String {
        if !self.format.enabled {
            return keyword.to_string();
        }
        match self.format.keyword_case {
            KeywordCase::Preserve => keyword.to_string(),
            KeywordCase::Upper => keyword.to_ascii_uppercase(),
            KeywordCase::Lower => keyword.to_ascii_lowercase(),
        }
    }

    fn indent(&self) -> String {
        " ".repeat(self.format.indent_width)
    }

    /// Joins list items, breaking one-per-line when the format is enabled and
    /// the inline rendering would overflow the configured width.
    pub fn list(&self, items: &[String]) -> String {
        let inline = items.join(", ");
        if !self.format.enabled || inline.len() <= self.format.line_width {
            return inline;
        }
        let indent = self.indent();
        match self.format.comma_style {
            CommaStyle::Trailing => items
                .iter()
                .map(|item| format!("{indent}{item}"))
                .collect::<Vec<_>>()
                .join(",\n"),
            CommaStyle::Leading => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    if i == 0 {
                        format!("{indent}{item}")
                    } else {
                        format!("{indent}, {item}")
                    }
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Parenthesized list: inline when unformatted or short, otherwise broken
    /// across lines with the closing paren on its own line.
    pub fn paren_list(&self, items: &[String]) -> String {
        let inline = format!("({})", items.join(", "));
        if !self.format.enabled || inline.len() <= self.format.line_width {
            return inline;
        }
        format!("(\n{}\n)", self.list(items))
    }

    /// Pads tabular rows to per-column maxima when column alignment is on,
    /// then joins each row with single spaces.
    pub fn aligned_rows(&self, rows: &[Vec<String>]) -> Vec<String> {
        if !self.format.enabled || !self.format.align_columns || rows.is_empty() {
            return rows
                .iter()
                .map(|row| {
                    row.iter()
                        .filter(|cell| !cell.is_empty())
                        .cloned()
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .collect();
        }

        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut widths = vec![0usize; columns];
        for row in rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.len());
            }
        }

        rows.iter()
            .map(|row| {
                let mut out = String::new();
                for (i, cell) in row.iter().enumerate() {
                    if cell.is_empty() && i + 1 == row.len() {
                        continue;
                    }
                    if !out.is_empty() {
                        out.push(' ');
                    }
                    if i + 1 < row.len() {
                        out.push_str(&format!("{cell:<width$}", width = widths[i]));
                    } else {
                        out.push_str(cell);
                    }
                }
                out.trim_end().to_string()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled(comma_style: CommaStyle) -> EmitContext {
        EmitContext::formatted(SqlFormat {
            enabled: true,
            keyword_case: KeywordCase::Lower,
            line_width: 10,
            indent_width: 2,
            comma_style,
            align_columns: true,
        })
    }

    #[test]
    fn test_disabled_format_is_identity() {
        let ctx = EmitContext::plain();
        assert_eq!(ctx.kw("CREATE TABLE"), "CREATE TABLE");
        assert_eq!(
            ctx.paren_list(&["a".into(), "b".into()]),
            "(a, b)".to_string()
        );
    }

    #[test]
    fn test_keyword_casing() {
        let ctx = enabled(CommaStyle::Trailing);
        assert_eq!(ctx.kw("CREATE TABLE"), "create table");
    }

    #[test]
    fn test_list_breaking_trailing_and_leading() {
        let items = vec!["alpha".to_string(), "bravo".to_string()];
        let trailing = enabled(CommaStyle::Trailing);
        assert_eq!(trailing.list(&items), "  alpha,\n  bravo");

        let leading = enabled(CommaStyle::Leading);
        assert_eq!(leading.list(&items), "  alpha\n  , bravo");
    }

    #[test]
    fn test_aligned_rows() {
        let ctx = enabled(CommaStyle::Trailing);
        let rows = vec![
            vec!["id".to_string(), "bigint".to_string(), "NOT NULL".to_string()],
            vec!["email".to_string(), "text".to_string(), String::new()],
        ];
        let aligned = ctx.aligned_rows(&rows);
        assert_eq!(aligned[0], "id    bigint NOT NULL");
        assert_eq!(aligned[1], "email text");
    }
}
