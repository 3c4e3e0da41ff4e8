use std::fmt::{Display, Formatter};

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Token {
    Word(String),
    Number(usize),
}

impl Token {
    pub fn word(&self) -> Option<&str> {
        match self {
            Self::Word(word) => Some(word),
            Self::Number(_) => None,
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Word(word) => f.write_str(word),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self::Word(value.to_string())
    }
}

impl From<usize> for Token {
    fn from(value: usize) -> Self {
        Self::Number(value)
    }
}

/// A lowercased phrase, split into words and numbers.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Phrase {
    pub tokens: Vec<Token>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_display() {
        let phrase = ["longer", "than"]
            .into_iter()
            .map(Token::from)
            .chain([Token::from(10)])
            .map(|token| token.to_string())
            .collect::<Vec<_>>();

        assert_eq!(phrase, vec!["longer", "than", "10"]);
    }
}
