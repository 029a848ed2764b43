//! Natural ("human") ordering of file names.
//!
//! Names are split into alternating runs of non-digits and ASCII digits.
//! Digit runs compare by numeric value, text runs compare case-insensitively,
//! so `slide2.png` sorts before `slide10.png`.

use std::cmp::Ordering;

/// One run of a split file name.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    /// Lower-cased non-digit run (possibly empty at the start of a name).
    Text(String),
    /// Digit run with leading zeros stripped; compared by value.
    Number(String),
}

impl Ord for Token {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Token::Number(a), Token::Number(b)) => compare_digits(a, b),
            (Token::Text(a), Token::Text(b)) => a.cmp(b),
            // Runs alternate from a leading text run, so two keys never put
            // different kinds at the same position. Numbers first keeps the
            // order total regardless.
            (Token::Number(_), Token::Text(_)) => Ordering::Less,
            (Token::Text(_), Token::Number(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Token {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compare two digit strings (no leading zeros) by numeric value.
///
/// Works for runs of any length: a longer run is a larger number.
fn compare_digits(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Composite sort key for a file name.
///
/// Keys compare run by run; when one key is a prefix of the other the shorter
/// one sorts first. Ties are broken by the original string so the ordering is
/// total.
///
/// Only ASCII `0`-`9` form numeric runs. Other Unicode decimal digits (for
/// example Arabic-Indic `٣` or fullwidth `３`) are treated as text, so
/// `page٣` and `page3` do not compare as equal numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NaturalKey {
    tokens: Vec<Token>,
    original: String,
}

impl NaturalKey {
    /// Split `name` into its key.
    pub fn new(name: &str) -> Self {
        let mut tokens = Vec::new();
        let mut rest = name;

        // Always begin with a text run, even if it is empty.
        loop {
            let text_end = rest
                .find(|c: char| c.is_ascii_digit())
                .unwrap_or(rest.len());
            tokens.push(Token::Text(rest[..text_end].to_lowercase()));
            rest = &rest[text_end..];
            if rest.is_empty() {
                break;
            }

            let digits_end = rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len());
            let digits = rest[..digits_end].trim_start_matches('0');
            tokens.push(Token::Number(digits.to_string()));
            rest = &rest[digits_end..];
        }

        Self {
            tokens,
            original: name.to_string(),
        }
    }

    /// Number of runs in the key.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Keys always hold at least the leading text run.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Ord for NaturalKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.tokens
            .cmp(&other.tokens)
            .then_with(|| self.original.cmp(&other.original))
    }
}

impl PartialOrd for NaturalKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compare two names in natural order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    NaturalKey::new(a).cmp(&NaturalKey::new(b))
}

/// Return `names` in ascending natural order.
///
/// Exact duplicates keep their input order.
pub fn natural_sort<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
    names.sort_by_cached_key(|name| NaturalKey::new(name));
    names
}

// =============================================================================
// Tests
// =============================================================================
