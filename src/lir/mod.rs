use crate::analyzer::PropertySet;
use crate::{mir, parser};

/// A comparison against an ordered field value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Ordered<T: Ord> {
    Equal(T),
    GreaterEqual(T),
    LessEqual(T),
}

impl<T: Ord> Ordered<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Self::Equal(expected) => value == expected,
            Self::GreaterEqual(min) => value >= min,
            Self::LessEqual(max) => value <= max,
        }
    }

    pub fn map<U, F>(self, f: F) -> Ordered<U>
    where
        U: Ord,
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Equal(value) => Ordered::Equal(f(value)),
            Self::GreaterEqual(value) => Ordered::GreaterEqual(f(value)),
            Self::LessEqual(value) => Ordered::LessEqual(f(value)),
        }
    }
}

/// A single field constraint.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Constraint {
    Palindrome(bool),
    Length(Ordered<usize>),
    WordCount(Ordered<usize>),
    UniqueCharacters(Ordered<usize>),
    /// The character occurs at least once (case-sensitive).
    ContainsCharacter(char),
}

impl Constraint {
    pub fn matches(&self, properties: &PropertySet) -> bool {
        match self {
            Self::Palindrome(expected) => properties.is_palindrome == *expected,
            Self::Length(ordered) => ordered.matches(&properties.length),
            Self::WordCount(ordered) => ordered.matches(&properties.word_count),
            Self::UniqueCharacters(ordered) => ordered.matches(&properties.unique_characters),
            Self::ContainsCharacter(c) => properties.character_frequency.contains_key(c),
        }
    }
}

/// A conjunction of constraints. The empty predicate matches everything.
///
/// Two predicates are equal when they hold the same constraints, in any order.
#[derive(Clone, Debug, Default, Eq)]
pub struct Predicate {
    constraints: Vec<Constraint>,
}

impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        self.constraints.len() == other.constraints.len()
            && self
                .constraints
                .iter()
                .all(|c| other.constraints.contains(c))
    }
}

impl Predicate {
    pub const fn new() -> Self {
        Self {
            constraints: vec![],
        }
    }

    /// Add a constraint, unless an identical one is already present.
    pub fn push(&mut self, constraint: Constraint) {
        if !self.constraints.contains(&constraint) {
            self.constraints.push(constraint);
        }
    }

    pub fn and(mut self, constraint: Constraint) -> Self {
        self.push(constraint);
        self
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn matches(&self, properties: &PropertySet) -> bool {
        self.constraints.iter().all(|c| c.matches(properties))
    }

    /// Translate an English phrase into a predicate.
    ///
    /// A phrase which doesn't trigger a single rule is an error, never an empty predicate.
    pub fn parse(phrase: &str) -> Result<Self, Error> {
        let tokens = parser::tokenize(phrase)?;
        let matches = mir::translate(&tokens);

        if matches.is_empty() {
            return Err(Error::Unrecognized(phrase.to_string()));
        }

        for m in &matches {
            log::debug!("rule '{}' at {}: {:?}", m.rule, m.position, m.constraint);
        }

        Ok(matches.into_iter().map(|m| m.constraint).collect())
    }
}

impl FromIterator<Constraint> for Predicate {
    fn from_iter<I: IntoIterator<Item = Constraint>>(iter: I) -> Self {
        let mut result = Self::new();
        result.extend(iter);
        result
    }
}

impl Extend<Constraint> for Predicate {
    fn extend<I: IntoIterator<Item = Constraint>>(&mut self, iter: I) {
        for constraint in iter {
            self.push(constraint);
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parser(#[from] parser::Error),
    #[error("Unable to parse natural language query: '{0}'")]
    Unrecognized(String),
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::analyzer::analyze;

    #[test]
    fn test_ordered() {
        assert!(Ordered::Equal(3).matches(&3));
        assert!(!Ordered::Equal(3).matches(&4));
        assert!(Ordered::GreaterEqual(3).matches(&3));
        assert!(!Ordered::GreaterEqual(3).matches(&2));
        assert!(Ordered::LessEqual(3).matches(&3));
        assert!(!Ordered::LessEqual(3).matches(&4));
    }

    #[test]
    fn test_empty_matches_all() {
        let predicate = Predicate::new();

        assert!(predicate.is_empty());
        assert!(predicate.matches(&analyze("")));
        assert!(predicate.matches(&analyze("anything at all")));
    }

    #[test]
    fn test_range() {
        let predicate = Predicate::new()
            .and(Constraint::Length(Ordered::GreaterEqual(3)))
            .and(Constraint::Length(Ordered::LessEqual(5)));

        assert!(!predicate.matches(&analyze("ab")));
        assert!(predicate.matches(&analyze("abc")));
        assert!(predicate.matches(&analyze("abcde")));
        assert!(!predicate.matches(&analyze("abcdef")));
    }

    #[test]
    fn test_conflicting_bounds_match_nothing() {
        let predicate = Predicate::new()
            .and(Constraint::Length(Ordered::GreaterEqual(5)))
            .and(Constraint::Length(Ordered::LessEqual(3)));

        for value in ["", "abc", "abcd", "abcdef"] {
            assert!(!predicate.matches(&analyze(value)));
        }
    }

    #[test]
    fn test_contains_character_is_case_sensitive() {
        let predicate = Predicate::new().and(Constraint::ContainsCharacter('z'));

        assert!(predicate.matches(&analyze("zebra")));
        assert!(!predicate.matches(&analyze("Zebra")));
    }

    #[test]
    fn test_push_deduplicates() {
        let predicate = Predicate::new()
            .and(Constraint::Palindrome(true))
            .and(Constraint::Palindrome(true));

        assert_eq!(predicate.constraints().len(), 1);
    }

    #[test]
    fn test_equality_ignores_order() {
        let a = Predicate::new()
            .and(Constraint::Palindrome(true))
            .and(Constraint::WordCount(Ordered::Equal(1)));
        let b = Predicate::new()
            .and(Constraint::WordCount(Ordered::Equal(1)))
            .and(Constraint::Palindrome(true));

        assert_eq!(a, b);
        assert_ne!(a, Predicate::new().and(Constraint::Palindrome(true)));
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            Predicate::parse("all single word palindromic strings").unwrap(),
            Predicate::new()
                .and(Constraint::WordCount(Ordered::Equal(1)))
                .and(Constraint::Palindrome(true))
        );
    }

    #[test]
    fn test_parse_unrecognized() {
        assert_eq!(
            Predicate::parse("gibberish xyz"),
            Err(Error::Unrecognized("gibberish xyz".into()))
        );
        assert!(Predicate::parse("").is_err());
    }
}
