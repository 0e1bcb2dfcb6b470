use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

/// A deduplicated set of zero-based page indices, iterated in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PageSet(BTreeSet<u32>);

impl PageSet {
    pub fn new() -> Self {
        PageSet(BTreeSet::new())
    }

    /// Every page of a document with `total_pages` pages.
    pub fn all(total_pages: u32) -> Self {
        (0..total_pages).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, index: u32) -> bool {
        self.0.contains(&index)
    }

    pub fn insert(&mut self, index: u32) -> bool {
        self.0.insert(index)
    }

    /// Highest selected index, if any.
    pub fn last(&self) -> Option<u32> {
        self.0.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }

    pub fn union(&self, other: &PageSet) -> PageSet {
        self.0.union(&other.0).copied().collect()
    }

    /// Every index in `[0, total_pages)` that is not in this set.
    pub fn complement(&self, total_pages: u32) -> PageSet {
        (0..total_pages).filter(|i| !self.contains(*i)).collect()
    }

    /// 1-based page numbers, ascending.
    pub fn to_page_numbers(&self) -> Vec<u32> {
        self.iter().map(|i| i + 1).collect()
    }

    /// Insert the inclusive span `[start, end]`, clamped to the document.
    fn insert_span(&mut self, start: i64, end: i64, total_pages: u32) {
        let start = start.max(0);
        let end = end.min(i64::from(total_pages) - 1);
        if start > end {
            return;
        }
        // Both bounds now lie in [0, total_pages).
        for index in start..=end {
            self.0.insert(index as u32);
        }
    }
}

impl FromIterator<u32> for PageSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        PageSet(iter.into_iter().collect())
    }
}

impl IntoIterator for PageSet {
    type Item = u32;
    type IntoIter = std::collections::btree_set::IntoIter<u32>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a PageSet {
    type Item = u32;
    type IntoIter = std::iter::Copied<std::collections::btree_set::Iter<'a, u32>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}

/// Renders 1-based page numbers with consecutive runs collapsed, e.g. `1, 3-5, 10`.
impl fmt::Display for PageSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut runs: Vec<(u32, u32)> = Vec::new();
        for page in self.iter().map(|i| i + 1) {
            match runs.last_mut() {
                Some((_, end)) if *end + 1 == page => *end = page,
                _ => runs.push((page, page)),
            }
        }

        for (i, (start, end)) in runs.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if start == end {
                write!(f, "{}", start)?;
            } else {
                write!(f, "{}-{}", start, end)?;
            }
        }
        Ok(())
    }
}

/// A selection expression after lexing, before it is applied to a document.
///
/// The alternatives are tried in order: `first n` / `last n`, then the `-n`
/// shorthand, then a comma-separated token list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// `first n`
    Leading(i64),
    /// `last n` or `-n`
    Trailing(i64),
    Tokens(Vec<Token>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A 1-based page number.
    Page(i64),
    Range { start: Bound, end: Bound },
    Unrecognized(String),
}

/// One side of a `a-b` range token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bound {
    Open,
    Last,
    /// A 1-based page number.
    Page(i64),
    /// Not a number; resolves like `Open`.
    Garbled(String),
}

impl Selection {
    /// Lex a selection expression. Never fails: anything that cannot be
    /// understood becomes a token that selects nothing.
    pub fn parse(expr: &str) -> Self {
        let expr = expr.trim().to_lowercase();

        if let Some(selection) = parse_edge_keyword(&expr) {
            return selection;
        }

        if let Some(count) = parse_negative_shorthand(&expr) {
            return Selection::Trailing(count);
        }

        let tokens = expr
            .split(',')
            .map(str::trim)
            .filter(|tok| !tok.is_empty())
            .map(Token::parse)
            .collect();
        Selection::Tokens(tokens)
    }

    /// Apply the selection to a document with `total_pages` pages.
    pub fn resolve(&self, total_pages: u32) -> PageSet {
        let total = i64::from(total_pages);
        let last = total - 1;
        let mut pages = PageSet::new();

        match self {
            Selection::Leading(count) => {
                pages.insert_span(0, (*count).min(total).saturating_sub(1), total_pages);
            }
            Selection::Trailing(count) => {
                pages.insert_span(total.saturating_sub(*count), last, total_pages);
            }
            Selection::Tokens(tokens) => {
                for token in tokens {
                    match token {
                        Token::Page(page) => {
                            let index = page.saturating_sub(1);
                            if (0..total).contains(&index) {
                                pages.insert(index as u32);
                            }
                        }
                        Token::Range { start, end } => {
                            let start = match start {
                                Bound::Open => 0,
                                Bound::Garbled(text) => {
                                    debug!(bound = %text, "unparseable range start, using page 1");
                                    0
                                }
                                Bound::Last => last,
                                Bound::Page(page) => page.saturating_sub(1),
                            };
                            let end = match end {
                                Bound::Open | Bound::Last => last,
                                Bound::Garbled(text) => {
                                    debug!(bound = %text, "unparseable range end, using last page");
                                    last
                                }
                                Bound::Page(page) => page.saturating_sub(1),
                            };
                            pages.insert_span(start, end, total_pages);
                        }
                        Token::Unrecognized(tok) => {
                            debug!(token = %tok, "skipping unrecognized page selection token");
                        }
                    }
                }
            }
        }

        pages
    }
}

impl Token {
    fn parse(tok: &str) -> Self {
        if let Some(page) = parse_int(tok) {
            return Token::Page(page);
        }

        let mut sides = tok.split('-');
        match (sides.next(), sides.next(), sides.next()) {
            (Some(start), Some(end), None) => Token::Range {
                start: Bound::parse(start),
                end: Bound::parse(end),
            },
            _ => Token::Unrecognized(tok.to_string()),
        }
    }
}

impl Bound {
    fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() {
            Bound::Open
        } else if s == "last" {
            Bound::Last
        } else if let Some(page) = parse_int(s) {
            Bound::Page(page)
        } else {
            Bound::Garbled(s.to_string())
        }
    }
}

/// Resolve `expr` against a document with `total_pages` pages.
pub fn select(expr: &str, total_pages: u32) -> PageSet {
    Selection::parse(expr).resolve(total_pages)
}

fn is_keyword_separator(c: char) -> bool {
    c == ':' || c == '=' || c.is_whitespace()
}

/// `first n` / `last n`, with an optional `:`, `=` or whitespace separator.
/// Text after the count is ignored: `first 3 pages` is `first 3`.
fn parse_edge_keyword(expr: &str) -> Option<Selection> {
    let (rest, edge): (&str, fn(i64) -> Selection) = if let Some(rest) = expr.strip_prefix("first")
    {
        (rest, Selection::Leading)
    } else if let Some(rest) = expr.strip_prefix("last") {
        (rest, Selection::Trailing)
    } else {
        return None;
    };

    let after = rest.trim_start_matches(is_keyword_separator);
    // Without a separator only digits may follow, so `last-3` stays a range.
    if after.len() == rest.len() && !after.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    // Only the word right after the keyword counts; anything past it is ignored.
    let count = after.split(is_keyword_separator).next().unwrap_or("");
    parse_int(count).map(edge)
}

/// `-n`, equivalent to `last n`.
fn parse_negative_shorthand(expr: &str) -> Option<i64> {
    let digits = expr.strip_prefix('-')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    parse_int(digits)
}

/// An optionally signed run of ASCII digits. Out-of-range values saturate.
fn parse_int(s: &str) -> Option<i64> {
    let digits = s.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(s.parse().unwrap_or(if s.starts_with('-') {
        i64::MIN
    } else {
        i64::MAX
    }))
}
