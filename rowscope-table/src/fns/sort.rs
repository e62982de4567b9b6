use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::Value;

/// A caller-supplied comparator over two cell values.
pub type SortCompareFn = Arc<dyn Fn(&Value, &Value) -> Ordering + Send + Sync>;

/// Built-in comparators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuiltinSort {
    /// Natural order, case-insensitive: `item2` before `item10`.
    Alphanumeric,
    AlphanumericCaseSensitive,
    /// Lexical order, case-insensitive.
    Text,
    TextCaseSensitive,
    Datetime,
    /// [`Value::cmp_basic`].
    Basic,
}

impl BuiltinSort {
    pub const ALL: [BuiltinSort; 6] = [
        Self::Alphanumeric,
        Self::AlphanumericCaseSensitive,
        Self::Text,
        Self::TextCaseSensitive,
        Self::Datetime,
        Self::Basic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Alphanumeric => "alphanumeric",
            Self::AlphanumericCaseSensitive => "alphanumericCaseSensitive",
            Self::Text => "text",
            Self::TextCaseSensitive => "textCaseSensitive",
            Self::Datetime => "datetime",
            Self::Basic => "basic",
        }
    }

    pub fn compare(self, a: &Value, b: &Value) -> Ordering {
        match self {
            Self::Alphanumeric => compare_alphanumeric(
                &a.sort_text().to_lowercase(),
                &b.sort_text().to_lowercase(),
            ),
            Self::AlphanumericCaseSensitive => compare_alphanumeric(&a.sort_text(), &b.sort_text()),
            Self::Text => a.sort_text().to_lowercase().cmp(&b.sort_text().to_lowercase()),
            Self::TextCaseSensitive => a.sort_text().cmp(&b.sort_text()),
            Self::Datetime => match (a, b) {
                (Value::Date(a), Value::Date(b)) => a.cmp(b),
                _ => a.cmp_basic(b),
            },
            Self::Basic => a.cmp_basic(b),
        }
    }

    /// Picks a comparator from sample values: any date → `Datetime`, text containing a digit
    /// run → `Alphanumeric`, other text → `Text`, otherwise `Basic`.
    pub fn auto_for<'a>(samples: impl IntoIterator<Item = &'a Value>) -> Self {
        let mut saw_text = false;
        for value in samples {
            match value {
                Value::Date(_) => return Self::Datetime,
                Value::Text(s) => {
                    saw_text = true;
                    if s.bytes().any(|b| b.is_ascii_digit()) {
                        return Self::Alphanumeric;
                    }
                }
                _ => {}
            }
        }
        if saw_text { Self::Text } else { Self::Basic }
    }
}

impl fmt::Display for BuiltinSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BuiltinSort {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|f| f.name() == s).ok_or(())
    }
}

/// Splits `s` at digit-run boundaries: `"v10b"` → `["v", "10", "b"]`.
fn split_digit_runs(s: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut prev_digit = None;
    for (i, c) in s.char_indices() {
        let digit = c.is_ascii_digit();
        if prev_digit.is_some_and(|p| p != digit) {
            tokens.push(&s[start..i]);
            start = i;
        }
        prev_digit = Some(digit);
    }
    if start < s.len() {
        tokens.push(&s[start..]);
    }
    tokens
}

fn is_digit_run(token: &str) -> bool {
    token.bytes().next().is_some_and(|b| b.is_ascii_digit())
}

/// Numeric comparison of two digit runs of any length.
fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Natural-order comparison: digit runs compare numerically, text runs lexically, a text run
/// sorts before a digit run, and a string that runs out of tokens first sorts first.
pub fn compare_alphanumeric(a: &str, b: &str) -> Ordering {
    let a_tokens = split_digit_runs(a);
    let b_tokens = split_digit_runs(b);
    for (x, y) in a_tokens.iter().zip(&b_tokens) {
        let ord = match (is_digit_run(x), is_digit_run(y)) {
            (true, true) => cmp_digit_runs(x, y),
            (false, false) => x.cmp(y),
            (false, true) => Ordering::Less,
            (true, false) => Ordering::Greater,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a_tokens.len().cmp(&b_tokens.len())
}

#[derive(Clone)]
pub(crate) enum ResolvedSort {
    Builtin(BuiltinSort),
    Custom(SortCompareFn),
}

impl ResolvedSort {
    pub(crate) fn compare(&self, a: &Value, b: &Value) -> Ordering {
        match self {
            Self::Builtin(f) => f.compare(a, b),
            Self::Custom(f) => f(a, b),
        }
    }
}

impl fmt::Debug for ResolvedSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(s) => f.debug_tuple("Builtin").field(s).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
