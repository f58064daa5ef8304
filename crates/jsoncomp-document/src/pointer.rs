//! Document pointers
//!
//! Provides [`Pointer`] for structural addressing of nodes within a document,
//! using RFC 6901 syntax for its textual form.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Pointer token used to append to a sequence
pub const APPEND_TOKEN: &str = "-";

/// Single pointer segment
///
/// Tokens compare by their textual form, so `Index(0)` equals `Key("0")`.
/// Whether a token addresses a mapping key or a sequence slot is decided by
/// the container it is resolved against.
#[derive(Debug, Clone)]
pub enum Token {
    /// Mapping key (or textual sequence index)
    Key(String),
    /// Sequence index; negative values are representable but never resolve
    Index(i64),
}

/// How a token addresses a sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceToken {
    /// Valid non-negative index
    Index(usize),
    /// The append token `-`
    Append,
    /// Negative or unrepresentable index
    OutOfRange,
    /// Not an index at all
    NotIndex,
}

impl Token {
    /// Textual (unescaped) form
    #[inline]
    #[must_use]
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Key(k) => Cow::Borrowed(k),
            Self::Index(i) => Cow::Owned(i.to_string()),
        }
    }

    /// Interpret the token against a sequence
    ///
    /// Textual keys are indices only in canonical form (`0` or no leading zeros).
    #[must_use]
    pub fn as_sequence_token(&self) -> SequenceToken {
        match self {
            Self::Index(i) => usize::try_from(*i).map_or(SequenceToken::OutOfRange, SequenceToken::Index),
            Self::Key(k) if k == APPEND_TOKEN => SequenceToken::Append,
            Self::Key(k) => {
                let (negative, digits) = match k.strip_prefix('-') {
                    Some(rest) => (true, rest),
                    None => (false, k.as_str()),
                };
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return SequenceToken::NotIndex;
                }
                if negative {
                    return SequenceToken::OutOfRange;
                }
                if digits.len() > 1 && digits.starts_with('0') {
                    return SequenceToken::NotIndex;
                }
                digits
                    .parse::<usize>()
                    .map_or(SequenceToken::OutOfRange, SequenceToken::Index)
            }
        }
    }

    fn escaped(&self) -> String {
        self.as_text().replace('~', "~0").replace('/', "~1")
    }

    fn unescape(raw: &str) -> String {
        raw.replace("~1", "/").replace("~0", "~")
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.as_text() == other.as_text()
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_text().hash(state);
    }
}

impl PartialOrd for Token {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Token {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_text().cmp(&other.as_text())
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for Token {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for Token {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<i64> for Token {
    fn from(index: i64) -> Self {
        Self::Index(index)
    }
}

impl From<i32> for Token {
    fn from(index: i32) -> Self {
        Self::Index(i64::from(index))
    }
}

impl From<usize> for Token {
    fn from(index: usize) -> Self {
        Self::Index(i64::try_from(index).unwrap_or(i64::MAX))
    }
}

/// Path from the document root to a node
///
/// # Examples
/// - `[]` -> `""` (root)
/// - `["a", "b", 0]` -> `/a/b/0`
/// - `["a/b", "m~n"]` -> `/a~1b/m~0n`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Pointer(Vec<Token>);

impl Pointer {
    /// Create pointer from tokens
    #[inline]
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self(tokens)
    }

    /// Create pointer from anything convertible into tokens
    #[must_use]
    pub fn from_tokens<I, T>(tokens: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Token>,
    {
        Self(tokens.into_iter().map(Into::into).collect())
    }

    /// Root pointer (whole document)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Parse RFC 6901 textual pointer
    ///
    /// # Errors
    /// Returns error if the string is neither empty nor starts with `/`
    pub fn parse(s: &str) -> Result<Self, PointerError> {
        if s.is_empty() {
            return Ok(Self::root());
        }
        let Some(rest) = s.strip_prefix('/') else {
            return Err(PointerError::MissingLeadingSlash(s.to_string()));
        };
        Ok(Self(
            rest.split('/')
                .map(|raw| Token::Key(Token::unescape(raw)))
                .collect(),
        ))
    }

    /// Check that a string has pointer syntax (empty or starting with `/`)
    #[inline]
    #[must_use]
    pub fn is_pointer_syntax(s: &str) -> bool {
        s.is_empty() || s.starts_with('/')
    }

    /// Get tokens
    #[inline]
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.0
    }

    /// Get number of tokens
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if pointer is the root
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Check if pointer is empty (root)
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get parent pointer (if not root)
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Get last token (if not root)
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&Token> {
        self.0.last()
    }

    /// Append a token, returning new pointer
    #[inline]
    #[must_use]
    pub fn child(&self, token: impl Into<Token>) -> Self {
        let mut new = self.clone();
        new.0.push(token.into());
        new
    }

    /// Resolve a pointer relative to this one into an absolute pointer
    #[inline]
    #[must_use]
    pub fn join(&self, relative: &Self) -> Self {
        let mut new = self.clone();
        new.0.extend(relative.0.iter().cloned());
        new
    }

    /// Check if this pointer is a prefix of another (or equal)
    #[inline]
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        if self.0.len() > other.0.len() {
            return false;
        }
        self.0 == other.0[..self.0.len()]
    }

    /// Check if this pointer is a strict ancestor of another
    #[inline]
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        self.0.len() < other.0.len() && self.is_prefix_of(other)
    }

    /// Get relative pointer from ancestor
    ///
    /// # Errors
    /// Returns error if `self` is not a descendant of `ancestor`
    pub fn relative_to(&self, ancestor: &Self) -> Result<Self, PointerError> {
        if !ancestor.is_prefix_of(self) {
            return Err(PointerError::NotDescendant {
                pointer: self.to_string(),
                ancestor: ancestor.to_string(),
            });
        }
        Ok(Self(self.0[ancestor.0.len()..].to_vec()))
    }

    /// Iterator over tokens from root to leaf
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.0.iter()
    }
}

impl Display for Pointer {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for token in &self.0 {
            write!(f, "/{}", token.escaped())?;
        }
        Ok(())
    }
}

impl FromStr for Pointer {
    type Err = PointerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Vec<Token>> for Pointer {
    fn from(tokens: Vec<Token>) -> Self {
        Self(tokens)
    }
}

impl<'a> IntoIterator for &'a Pointer {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Errors related to pointers
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PointerError {
    /// Non-root pointer without leading slash
    #[error("invalid pointer \"{0}\": must be empty or start with \"/\" (e.g. \"/a/b/c\")")]
    MissingLeadingSlash(String),

    /// Not a descendant pointer
    #[error("pointer '{pointer}' is not a descendant of '{ancestor}'")]
    NotDescendant { pointer: String, ancestor: String },
}
