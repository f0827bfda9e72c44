//! Surname/name hint at the start of a report, used to link a new sender to
//! an existing ledger row ("Сунко Анна обед").

use super::lexicon::{self, EXCUSE_PHRASES, MEAL_WORDS, NOT_A_NAME};

/// A leading `Surname [Name]` pair, lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameHint {
    pub surname: String,
    pub name: Option<String>,
}

fn is_name_word(word: &str) -> bool {
    word.chars().count() >= 2
        && word.chars().all(|c| c.is_alphabetic() || c == '-')
        && !lexicon::contains_any(word, MEAL_WORDS)
        && !NOT_A_NAME.contains(&word)
        && !EXCUSE_PHRASES.contains(&word)
}

/// First word as surname, second as given name when it looks like one.
/// `None` when the text does not start with a name.
pub fn name_hint(text: &str) -> Option<NameHint> {
    let lower = text.to_lowercase();
    let mut words = lower.split_whitespace();
    let surname = words.next().filter(|w| is_name_word(w))?;
    let name = words.next().filter(|w| is_name_word(w));
    Some(NameHint {
        surname: surname.to_string(),
        name: name.map(str::to_string),
    })
}
