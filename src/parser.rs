use crate::hir::{Phrase, Token};
use chumsky::prelude::*;

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("Unable to tokenize phrase: {0}")]
pub struct Error(pub String);

pub fn word<'a>() -> impl Parser<'a, &'a str, Token, extra::Err<Simple<'a, char>>> {
    any()
        .filter(|c: &char| c.is_alphabetic())
        .repeated()
        .at_least(1)
        .collect::<String>()
        .map(Token::Word)
}

/// A run of ASCII digits. Values which don't fit a `usize` stay words.
pub fn number<'a>() -> impl Parser<'a, &'a str, Token, extra::Err<Simple<'a, char>>> {
    any()
        .filter(|c: &char| c.is_ascii_digit())
        .repeated()
        .at_least(1)
        .collect::<String>()
        .map(|digits: String| match digits.parse::<usize>() {
            Ok(n) => Token::Number(n),
            Err(_) => Token::Word(digits),
        })
}

pub fn separator<'a>() -> impl Parser<'a, &'a str, (), extra::Err<Simple<'a, char>>> {
    any()
        .filter(|c: &char| !(c.is_alphabetic() || c.is_ascii_digit()))
        .ignored()
}

pub fn token<'a>() -> impl Parser<'a, &'a str, Token, extra::Err<Simple<'a, char>>> {
    word().or(number())
}

pub fn parser<'a>() -> impl Parser<'a, &'a str, Phrase, extra::Err<Simple<'a, char>>> {
    separator()
        .repeated()
        .ignore_then(
            token()
                .then_ignore(separator().repeated())
                .repeated()
                .collect::<Vec<_>>(),
        )
        .then_ignore(end())
        .map(|tokens| Phrase { tokens })
}

/// Lowercase and tokenize a phrase.
pub fn tokenize(phrase: &str) -> Result<Phrase, Error> {
    let phrase = phrase.to_lowercase();
    // bound first: the parse output borrows `phrase`
    let result = parser().parse(phrase.as_str()).into_result().map_err(|errs| {
        Error(
            errs.iter()
                .map(|err| format!("{err:?}"))
                .collect::<Vec<_>>()
                .join(", "),
        )
    });
    result
}
