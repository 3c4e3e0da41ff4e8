//! The rule table translating a token stream into constraints.
//!
//! Every [`Rule`] is independent: it is tried at every position of the phrase, and each match
//! contributes one constraint. Adding a rule never changes what the existing rules match.

use crate::hir::{Phrase, Token};
use crate::lir::{Constraint, Ordered};

const PALINDROME: &[&str] = &["palindrome", "palindromes", "palindromic"];
const NEGATIONS: &[&str] = &["not", "non", "no"];
const ARTICLES: &[&str] = &["a", "an", "the"];
const CHARACTERS: &[&str] = &["character", "characters", "char", "chars", "letters"];
const WORDS: &[&str] = &["word", "words"];
const UNIQUE: &[&str] = &["unique", "distinct", "different"];
const HAVING: &[&str] = &["with", "having", "has", "containing", "contain", "contains"];
/// Words which turn a following count into a bound, handled by their own rules.
const COMPARATIVES: &[&str] = &["than", "least", "most", "exactly", "over", "under"];

const NUMBER_WORDS: &[&str] = &[
    "zero",
    "one",
    "two",
    "three",
    "four",
    "five",
    "six",
    "seven",
    "eight",
    "nine",
    "ten",
    "eleven",
    "twelve",
    "thirteen",
    "fourteen",
    "fifteen",
    "sixteen",
    "seventeen",
    "eighteen",
    "nineteen",
    "twenty",
];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Pattern {
    /// Exactly one of the listed words.
    Word(&'static [&'static str]),
    /// Any number of the listed words, including none.
    Filler(&'static [&'static str]),
    /// An integer, written as digits or as a number word. Captured.
    Number,
    /// A word consisting of a single letter. Captured.
    Letter,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Captures {
    pub numbers: Vec<usize>,
    pub letters: Vec<char>,
    /// Only ever set for negatable rules.
    pub negated: bool,
}

impl Captures {
    pub fn number(&self) -> Option<usize> {
        self.numbers.first().copied()
    }

    pub fn letter(&self) -> Option<char> {
        self.letters.first().copied()
    }
}

pub struct Rule {
    pub name: &'static str,
    pub pattern: &'static [Pattern],
    /// A negation right before the match flips its meaning.
    pub negatable: bool,
    /// The rule doesn't fire when directly preceded by one of these words.
    pub excluded_after: &'static [&'static str],
    /// Build the constraint. Returning `None` means the captured values have no meaning for
    /// this rule, and the match is dropped.
    pub build: fn(&Captures) -> Option<Constraint>,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("pattern", &self.pattern)
            .field("negatable", &self.negatable)
            .field("excluded_after", &self.excluded_after)
            .finish()
    }
}

use Pattern::{Filler, Letter, Number, Word};

pub static RULES: &[Rule] = &[
    Rule {
        name: "palindrome",
        pattern: &[Word(PALINDROME)],
        negatable: true,
        excluded_after: &[],
        build: |c| Some(Constraint::Palindrome(!c.negated)),
    },
    Rule {
        name: "single word",
        pattern: &[Word(&["single", "one"]), Word(WORDS)],
        negatable: false,
        excluded_after: COMPARATIVES,
        build: |_| Some(Constraint::WordCount(Ordered::Equal(1))),
    },
    Rule {
        name: "multi word",
        pattern: &[Word(&["multi", "multiple", "many", "several"]), Word(WORDS)],
        negatable: false,
        excluded_after: &[],
        build: |_| Some(Constraint::WordCount(Ordered::GreaterEqual(2))),
    },
    Rule {
        name: "longer than",
        pattern: &[Word(&["longer", "larger", "bigger"]), Word(&["than"]), Number],
        negatable: false,
        excluded_after: &[],
        build: |c| Some(Constraint::Length(above(c.number()?))),
    },
    Rule {
        name: "shorter than",
        pattern: &[Word(&["shorter", "smaller"]), Word(&["than"]), Number],
        negatable: false,
        excluded_after: &[],
        build: |c| Some(Constraint::Length(below(c.number()?)?)),
    },
    Rule {
        name: "more than characters",
        pattern: &[
            Word(&["more", "over", "greater"]),
            Filler(&["than"]),
            Number,
            Word(CHARACTERS),
        ],
        negatable: false,
        excluded_after: &[],
        build: |c| Some(Constraint::Length(above(c.number()?))),
    },
    Rule {
        name: "more than words",
        pattern: &[
            Word(&["more", "over", "greater"]),
            Filler(&["than"]),
            Number,
            Word(WORDS),
        ],
        negatable: false,
        excluded_after: &[],
        build: |c| Some(Constraint::WordCount(above(c.number()?))),
    },
    Rule {
        name: "fewer than characters",
        pattern: &[
            Word(&["fewer", "less", "under"]),
            Filler(&["than"]),
            Number,
            Word(CHARACTERS),
        ],
        negatable: false,
        excluded_after: &[],
        build: |c| Some(Constraint::Length(below(c.number()?)?)),
    },
    Rule {
        name: "fewer than words",
        pattern: &[
            Word(&["fewer", "less", "under"]),
            Filler(&["than"]),
            Number,
            Word(WORDS),
        ],
        negatable: false,
        excluded_after: &[],
        build: |c| Some(Constraint::WordCount(below(c.number()?)?)),
    },
    Rule {
        name: "at least characters",
        pattern: &[Word(&["at"]), Word(&["least"]), Number, Word(CHARACTERS)],
        negatable: false,
        excluded_after: &[],
        build: |c| Some(Constraint::Length(Ordered::GreaterEqual(c.number()?))),
    },
    Rule {
        name: "at least words",
        pattern: &[Word(&["at"]), Word(&["least"]), Number, Word(WORDS)],
        negatable: false,
        excluded_after: &[],
        build: |c| Some(Constraint::WordCount(Ordered::GreaterEqual(c.number()?))),
    },
    Rule {
        name: "at least unique characters",
        pattern: &[
            Word(&["at"]),
            Word(&["least"]),
            Number,
            Word(UNIQUE),
            Word(CHARACTERS),
        ],
        negatable: false,
        excluded_after: &[],
        build: |c| {
            Some(Constraint::UniqueCharacters(Ordered::GreaterEqual(
                c.number()?,
            )))
        },
    },
    Rule {
        name: "at most characters",
        pattern: &[Word(&["at"]), Word(&["most"]), Number, Word(CHARACTERS)],
        negatable: false,
        excluded_after: &[],
        build: |c| Some(Constraint::Length(Ordered::LessEqual(c.number()?))),
    },
    Rule {
        name: "at most words",
        pattern: &[Word(&["at"]), Word(&["most"]), Number, Word(WORDS)],
        negatable: false,
        excluded_after: &[],
        build: |c| Some(Constraint::WordCount(Ordered::LessEqual(c.number()?))),
    },
    Rule {
        name: "at most unique characters",
        pattern: &[
            Word(&["at"]),
            Word(&["most"]),
            Number,
            Word(UNIQUE),
            Word(CHARACTERS),
        ],
        negatable: false,
        excluded_after: &[],
        build: |c| Some(Constraint::UniqueCharacters(Ordered::LessEqual(c.number()?))),
    },
    Rule {
        name: "exactly characters",
        pattern: &[Word(&["exactly"]), Number, Word(CHARACTERS)],
        negatable: false,
        excluded_after: &[],
        build: |c| Some(Constraint::Length(Ordered::Equal(c.number()?))),
    },
    Rule {
        name: "exactly words",
        pattern: &[Word(&["exactly"]), Number, Word(WORDS)],
        negatable: false,
        excluded_after: &[],
        build: |c| Some(Constraint::WordCount(Ordered::Equal(c.number()?))),
    },
    Rule {
        name: "length",
        pattern: &[
            Word(&["length"]),
            Filler(&["of", "is", "equal", "equals", "to", "exactly"]),
            Number,
        ],
        negatable: false,
        excluded_after: &[],
        build: |c| Some(Constraint::Length(Ordered::Equal(c.number()?))),
    },
    Rule {
        name: "characters long",
        pattern: &[Number, Word(CHARACTERS), Word(&["long"])],
        negatable: false,
        excluded_after: COMPARATIVES,
        build: |c| Some(Constraint::Length(Ordered::Equal(c.number()?))),
    },
    Rule {
        name: "words long",
        pattern: &[Number, Word(WORDS), Word(&["long"])],
        negatable: false,
        excluded_after: COMPARATIVES,
        build: |c| Some(Constraint::WordCount(Ordered::Equal(c.number()?))),
    },
    Rule {
        name: "with characters",
        pattern: &[Word(HAVING), Number, Word(CHARACTERS)],
        negatable: false,
        excluded_after: &[],
        build: |c| Some(Constraint::Length(Ordered::Equal(c.number()?))),
    },
    Rule {
        name: "with words",
        pattern: &[Word(HAVING), Number, Word(WORDS)],
        negatable: false,
        excluded_after: &[],
        build: |c| Some(Constraint::WordCount(Ordered::Equal(c.number()?))),
    },
    Rule {
        name: "with unique characters",
        pattern: &[Word(HAVING), Number, Word(UNIQUE), Word(CHARACTERS)],
        negatable: false,
        excluded_after: &[],
        build: |c| Some(Constraint::UniqueCharacters(Ordered::Equal(c.number()?))),
    },
    Rule {
        name: "containing letter",
        pattern: &[
            Word(HAVING),
            Filler(ARTICLES),
            Word(&["letter", "character", "char"]),
            Letter,
        ],
        negatable: false,
        excluded_after: NEGATIONS,
        build: |c| Some(Constraint::ContainsCharacter(c.letter()?)),
    },
    Rule {
        name: "contains letter",
        pattern: &[Word(&["contain", "contains", "containing"]), Letter],
        negatable: false,
        excluded_after: NEGATIONS,
        // the "a" in "containing a palindrome" is an article
        build: |c| {
            c.letter()
                .filter(|letter| *letter != 'a')
                .map(Constraint::ContainsCharacter)
        },
    },
    Rule {
        name: "first vowel",
        pattern: &[Word(&["first"]), Word(&["vowel"])],
        negatable: false,
        excluded_after: &[],
        build: |_| Some(Constraint::ContainsCharacter('a')),
    },
];

fn above(n: usize) -> Ordered<usize> {
    Ordered::GreaterEqual(n.saturating_add(1))
}

/// Nothing is shorter than zero, so there is no bound for it.
fn below(n: usize) -> Option<Ordered<usize>> {
    n.checked_sub(1).map(Ordered::LessEqual)
}

/// A rule which fired.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Match {
    pub rule: &'static str,
    /// Index of the first token of the match.
    pub position: usize,
    pub constraint: Constraint,
}

/// Run the full rule table against a phrase.
pub fn translate(phrase: &Phrase) -> Vec<Match> {
    translate_with(RULES, phrase)
}

pub fn translate_with(rules: &'static [Rule], phrase: &Phrase) -> Vec<Match> {
    let tokens = phrase.tokens.as_slice();
    let mut result = Vec::new();

    for rule in rules {
        for position in 0..tokens.len() {
            let before = &tokens[..position];
            if previous_word(before).is_some_and(|word| rule.excluded_after.contains(&word)) {
                continue;
            }

            let mut captures = Captures::default();
            if !match_at(&tokens[position..], rule.pattern, &mut captures) {
                continue;
            }
            captures.negated = rule.negatable && is_negated(before);

            if let Some(constraint) = (rule.build)(&captures) {
                result.push(Match {
                    rule: rule.name,
                    position,
                    constraint,
                });
            }
        }
    }

    result
}

/// The closest preceding word, skipping articles. `None` if that token is a number.
fn previous_word(before: &[Token]) -> Option<&str> {
    before
        .iter()
        .rev()
        .find(|token| !matches!(token.word(), Some(word) if ARTICLES.contains(&word)))
        .and_then(Token::word)
}

fn is_negated(before: &[Token]) -> bool {
    previous_word(before).is_some_and(|word| NEGATIONS.contains(&word))
}

fn number(token: &Token) -> Option<usize> {
    match token {
        Token::Number(n) => Some(*n),
        Token::Word(word) => NUMBER_WORDS.iter().position(|w| w == word),
    }
}

fn letter(token: &Token) -> Option<char> {
    let mut chars = token.word()?.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Match `pattern` at the start of `tokens`.
///
/// When this returns `false`, `captures` is left as it was.
fn match_at(tokens: &[Token], pattern: &[Pattern], captures: &mut Captures) -> bool {
    let Some((head, rest)) = pattern.split_first() else {
        return true;
    };

    match head {
        Word(words) => match tokens.split_first() {
            Some((Token::Word(word), tail)) if words.contains(&word.as_str()) => {
                match_at(tail, rest, captures)
            }
            _ => false,
        },
        Filler(words) => {
            if let Some((Token::Word(word), tail)) = tokens.split_first() {
                if words.contains(&word.as_str()) && match_at(tail, pattern, captures) {
                    return true;
                }
            }
            match_at(tokens, rest, captures)
        }
        Number => {
            let Some((n, tail)) = tokens
                .split_first()
                .and_then(|(token, tail)| Some((number(token)?, tail)))
            else {
                return false;
            };
            captures.numbers.push(n);
            if match_at(tail, rest, captures) {
                return true;
            }
            captures.numbers.pop();
            false
        }
        Letter => {
            let Some((c, tail)) = tokens
                .split_first()
                .and_then(|(token, tail)| Some((letter(token)?, tail)))
            else {
                return false;
            };
            captures.letters.push(c);
            if match_at(tail, rest, captures) {
                return true;
            }
            captures.letters.pop();
            false
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::tokenize;

    fn constraints(phrase: &str) -> Vec<Constraint> {
        translate(&tokenize(phrase).unwrap())
            .into_iter()
            .map(|m| m.constraint)
            .collect()
    }

    fn assert_constraints(phrase: &str, mut expected: Vec<Constraint>) {
        let mut result = constraints(phrase);
        let key = |c: &Constraint| format!("{c:?}");
        result.sort_by_key(key);
        expected.sort_by_key(key);

        assert_eq!(result, expected, "phrase: {phrase}");
    }

    #[test]
    fn test_palindrome() {
        assert_constraints("palindromic strings", vec![Constraint::Palindrome(true)]);
        assert_constraints("all palindromes", vec![Constraint::Palindrome(true)]);
    }

    #[test]
    fn test_negated_palindrome() {
        assert_constraints("non-palindromic strings", vec![Constraint::Palindrome(false)]);
        assert_constraints("not palindrome", vec![Constraint::Palindrome(false)]);
        assert_constraints(
            "strings that are not a palindrome",
            vec![Constraint::Palindrome(false)],
        );
    }

    #[test]
    fn test_negation_only_applies_to_palindrome() {
        assert_constraints(
            "not longer than 5",
            vec![Constraint::Length(Ordered::GreaterEqual(6))],
        );
    }

    #[test]
    fn test_word_count() {
        assert_constraints("single word", vec![Constraint::WordCount(Ordered::Equal(1))]);
        assert_constraints("one word", vec![Constraint::WordCount(Ordered::Equal(1))]);
        assert_constraints(
            "multi-word strings",
            vec![Constraint::WordCount(Ordered::GreaterEqual(2))],
        );
        assert_constraints(
            "multiple words",
            vec![Constraint::WordCount(Ordered::GreaterEqual(2))],
        );
    }

    #[test]
    fn test_more_than_one_word() {
        assert_constraints(
            "more than one word",
            vec![Constraint::WordCount(Ordered::GreaterEqual(2))],
        );
        assert_constraints("more than a single word", vec![]);
        assert_constraints("at least a single word", vec![]);
    }

    #[test]
    fn test_length() {
        assert_constraints(
            "longer than 10",
            vec![Constraint::Length(Ordered::GreaterEqual(11))],
        );
        assert_constraints(
            "shorter than 10",
            vec![Constraint::Length(Ordered::LessEqual(9))],
        );
        assert_constraints(
            "at least 5 characters",
            vec![Constraint::Length(Ordered::GreaterEqual(5))],
        );
        assert_constraints("length 7", vec![Constraint::Length(Ordered::Equal(7))]);
        assert_constraints(
            "length of exactly 7",
            vec![Constraint::Length(Ordered::Equal(7))],
        );
        assert_constraints(
            "7 characters long",
            vec![Constraint::Length(Ordered::Equal(7))],
        );
    }

    #[test]
    fn test_bound_with_long_suffix() {
        assert_constraints(
            "at least 5 characters long",
            vec![Constraint::Length(Ordered::GreaterEqual(5))],
        );
    }

    #[test]
    fn test_shorter_than_zero() {
        assert_constraints("shorter than 0", vec![]);
    }

    #[test]
    fn test_missing_number_falls_through() {
        assert_constraints("longer than ever", vec![]);
        assert_constraints("at least some characters", vec![]);
    }

    #[test]
    fn test_unique_characters() {
        assert_constraints(
            "with 3 unique characters",
            vec![Constraint::UniqueCharacters(Ordered::Equal(3))],
        );
        assert_constraints(
            "at least five distinct characters",
            vec![Constraint::UniqueCharacters(Ordered::GreaterEqual(5))],
        );
    }

    #[test]
    fn test_containing_letter() {
        assert_constraints(
            "strings containing the letter z",
            vec![Constraint::ContainsCharacter('z')],
        );
        assert_constraints("words containing q", vec![Constraint::ContainsCharacter('q')]);
        assert_constraints("strings that do not contain the letter z", vec![]);
        assert_constraints("not containing q", vec![]);
        assert_constraints(
            "palindromes which do not contain the letter x",
            vec![Constraint::Palindrome(true)],
        );
        assert_constraints(
            "strings containing a palindrome",
            vec![Constraint::Palindrome(true)],
        );
        assert_constraints(
            "palindromic strings that contain the first vowel",
            vec![
                Constraint::Palindrome(true),
                Constraint::ContainsCharacter('a'),
            ],
        );
    }

    #[test]
    fn test_combined() {
        assert_constraints(
            "single word palindromic strings longer than 3 and shorter than 10",
            vec![
                Constraint::WordCount(Ordered::Equal(1)),
                Constraint::Palindrome(true),
                Constraint::Length(Ordered::GreaterEqual(4)),
                Constraint::Length(Ordered::LessEqual(9)),
            ],
        );
    }

    #[test]
    fn test_nothing() {
        assert_constraints("gibberish xyz", vec![]);
        assert_constraints("", vec![]);
    }

    #[test]
    fn test_positions() {
        let matches = translate(&tokenize("strings longer than 2").unwrap());

        assert_eq!(
            matches,
            vec![Match {
                rule: "longer than",
                position: 1,
                constraint: Constraint::Length(Ordered::GreaterEqual(3)),
            }]
        );
    }

    #[test]
    fn test_custom_table() {
        static TABLE: &[Rule] = &[Rule {
            name: "short",
            pattern: &[Word(&["short"])],
            negatable: true,
            excluded_after: &[],
            build: |c| {
                Some(match c.negated {
                    false => Constraint::Length(Ordered::LessEqual(5)),
                    true => Constraint::Length(Ordered::GreaterEqual(6)),
                })
            },
        }];

        let matches = translate_with(TABLE, &tokenize("not short").unwrap());
        assert_eq!(
            matches[0].constraint,
            Constraint::Length(Ordered::GreaterEqual(6))
        );
    }
}
