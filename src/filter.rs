use crate::analyzer::{AnalyzedRecord, PropertySet};
use crate::lir::{Constraint, Ordered, Predicate};
use serde::{Deserialize, Serialize};
use serde_json::{map::Entry, Map, Value};

/// Anything carrying a property set.
pub trait Properties {
    fn properties(&self) -> &PropertySet;
}

impl Properties for PropertySet {
    fn properties(&self) -> &PropertySet {
        self
    }
}

impl Properties for AnalyzedRecord {
    fn properties(&self) -> &PropertySet {
        &self.properties
    }
}

impl<T: Properties + ?Sized> Properties for &T {
    fn properties(&self) -> &PropertySet {
        (**self).properties()
    }
}

/// Keep the records matching every constraint of the predicate, in input order.
pub fn evaluate<I, R>(predicate: &Predicate, records: I) -> Vec<R>
where
    I: IntoIterator<Item = R>,
    R: Properties,
{
    records
        .into_iter()
        .filter(|record| predicate.matches(record.properties()))
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("contains_character must be a single character, got '{0}'")]
    InvalidCharacter(String),
}

/// The structured filter vocabulary, as accepted on the query string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_palindrome: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_word_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_word_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_characters: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_unique_characters: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_unique_characters: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains_character: Option<String>,
}

impl FilterParams {
    /// Build the predicate directly, without going through the phrase parser.
    ///
    /// Bounds are not checked against each other: `min_length > max_length` is a valid
    /// predicate which matches nothing.
    pub fn to_predicate(&self) -> Result<Predicate, Error> {
        let mut result = Predicate::new();

        if let Some(value) = self.is_palindrome {
            result.push(Constraint::Palindrome(value));
        }

        ordered(&mut result, Constraint::Length, self.length, self.min_length, self.max_length);
        ordered(
            &mut result,
            Constraint::WordCount,
            self.word_count,
            self.min_word_count,
            self.max_word_count,
        );
        ordered(
            &mut result,
            Constraint::UniqueCharacters,
            self.unique_characters,
            self.min_unique_characters,
            self.max_unique_characters,
        );

        if let Some(value) = &self.contains_character {
            let mut chars = value.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => result.push(Constraint::ContainsCharacter(c)),
                _ => return Err(Error::InvalidCharacter(value.clone())),
            }
        }

        Ok(result)
    }
}

fn ordered<F>(
    predicate: &mut Predicate,
    constraint: F,
    equal: Option<usize>,
    min: Option<usize>,
    max: Option<usize>,
) where
    F: Fn(Ordered<usize>) -> Constraint,
{
    if let Some(value) = equal {
        predicate.push(constraint(Ordered::Equal(value)));
    }
    if let Some(value) = min {
        predicate.push(constraint(Ordered::GreaterEqual(value)));
    }
    if let Some(value) = max {
        predicate.push(constraint(Ordered::LessEqual(value)));
    }
}

enum Merge {
    /// Distinct values are collected into an array.
    Same,
    Max,
    Min,
}

fn parameter(constraint: &Constraint) -> (&'static str, Value, Merge) {
    fn bound(names: [&'static str; 3], ordered: &Ordered<usize>) -> (&'static str, Value, Merge) {
        match ordered {
            Ordered::Equal(value) => (names[0], Value::from(*value), Merge::Same),
            Ordered::GreaterEqual(value) => (names[1], Value::from(*value), Merge::Max),
            Ordered::LessEqual(value) => (names[2], Value::from(*value), Merge::Min),
        }
    }

    match constraint {
        Constraint::Palindrome(value) => ("is_palindrome", Value::Bool(*value), Merge::Same),
        Constraint::Length(o) => bound(["length", "min_length", "max_length"], o),
        Constraint::WordCount(o) => bound(["word_count", "min_word_count", "max_word_count"], o),
        Constraint::UniqueCharacters(o) => bound(
            [
                "unique_characters",
                "min_unique_characters",
                "max_unique_characters",
            ],
            o,
        ),
        Constraint::ContainsCharacter(c) => (
            "contains_character",
            Value::String(c.to_string()),
            Merge::Same,
        ),
    }
}

/// Render a predicate in the structured filter vocabulary.
///
/// Lower bounds on the same field keep the largest, upper bounds the smallest value. Conflicting
/// exact values are all kept, as an array.
pub fn describe(predicate: &Predicate) -> Map<String, Value> {
    let mut result = Map::new();

    for constraint in predicate.constraints() {
        let (name, value, merge) = parameter(constraint);

        let existing = match result.entry(name) {
            Entry::Vacant(entry) => {
                entry.insert(value);
                continue;
            }
            Entry::Occupied(entry) => entry.into_mut(),
        };

        match merge {
            Merge::Max => {
                if value.as_u64() > existing.as_u64() {
                    *existing = value;
                }
            }
            Merge::Min => {
                if value.as_u64() < existing.as_u64() {
                    *existing = value;
                }
            }
            Merge::Same => match existing {
                Value::Array(values) => {
                    if !values.contains(&value) {
                        values.push(value);
                    }
                }
                current if *current != value => {
                    *current = Value::Array(vec![current.take(), value]);
                }
                _ => {}
            },
        }
    }

    result
}
