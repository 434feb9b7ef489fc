//! Phrase list
//!
//! The payload streamed to the peer: an ordered, non-empty list of lines that
//! never changes once built. Transmission order is list order, wrapping back
//! to the first entry after the last.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{Error, Result};

/// Built-in payload, in transmission order.
///
/// Duplicates are intentional and part of the stream.
pub const DEFAULT_PHRASES: &[&str] = &[
    "hello world",
    "this is a test",
    "spark streaming with socke",
    "structured streaming example",
    "La souris cherche la pomme",
    "Le chien déteste le ballon",
    "Le chien mange la maison",
    "Le professeur construit le jardin",
    "Le garçon voit le ballon",
    "L'éléphant aime le jardin",
    "Le chien voit le travail",
    "L'éléphant mange le fromage",
    "Le chien déteste le travail",
    "La souris enseigne le fromage",
    "L'étudiant apprend la musique",
    "L'étudiant aime le livre",
    "La fille mange le fromage",
    "La voiture apprend l'école",
    "L'éléphant aime la musique",
    "L'étudiant aime le livre",
    "La voiture construit le livre",
    "La voiture cherche le film",
    "La souris aime le fromage",
    "La souris détruit le jardin",
    "L'oiseau cherche le travail",
    "Le professeur cherche le livre",
    "Le professeur mange l'école",
    "L'étudiant apprend le film",
    "La fille voit la maison",
    "Le professeur construit le ballon",
    "L'étudiant aime le ballon",
    "L'oiseau mange la maison",
    "Le garçon cherche le film",
    "L'éléphant enseigne le film",
    "La fille cherche le film",
    "L'éléphant détruit le fromage",
    "Le garçon apprend la pomme",
    "La voiture aime la musique",
    "L'éléphant détruit le ballon",
    "Le chien mange le film",
    "Le professeur déteste le film",
    "Le chien déteste le travail",
    "L'étudiant détruit le ballon",
    "L'éléphant trouve la pomme",
    "Le chat construit le livre",
    "L'oiseau apprend le jardin",
    "La souris aime le jardin",
    "Le professeur enseigne le film",
    "Le professeur construit le jardin",
    "Le chat voit la musique",
    "L'étudiant déteste le fromage",
    "La voiture apprend la pomme",
    "L'étudiant construit la musique",
    "Le garçon construit le livre",
    "Le chat voit le ballon",
    "Le chien construit le travail",
    "L'étudiant construit le livre",
    "L'éléphant enseigne le film",
    "L'étudiant apprend le film",
    "Le chat mange la maison",
    "La fille construit le fromage",
    "L'étudiant mange la maison",
    "Le garçon enseigne le jardin",
    "Le professeur apprend le fromage",
    "Le chien détruit l'école",
    "L'étudiant déteste la pomme",
    "L'éléphant trouve le travail",
    "Le chat apprend le jardin",
    "Le professeur mange le jardin",
    "L'éléphant déteste la musique",
    "La voiture trouve la maison",
    "Le professeur détruit la maison",
    "Le chat mange la pomme",
    "La voiture déteste la pomme",
    "L'étudiant enseigne le jardin",
    "L'étudiant détruit le film",
    "Le chien voit le ballon",
    "L'oiseau trouve le film",
    "L'oiseau détruit la musique",
    "L'éléphant construit le jardin",
    "L'éléphant apprend la maison",
    "La souris déteste le travail",
    "La souris aime la musique",
    "La voiture déteste le jardin",
    "Le garçon apprend l'école",
    "L'éléphant cherche le jardin",
    "La souris apprend le travail",
    "La fille mange la pomme",
    "La souris déteste le fromage",
    "La voiture apprend le ballon",
    "L'oiseau apprend l'école",
    "Le chien enseigne l'école",
    "La voiture trouve la pomme",
    "Le professeur cherche la musique",
    "Le chat trouve la musique",
    "La voiture détruit le fromage",
    "L'éléphant enseigne le jardin",
    "L'oiseau voit le jardin",
    "L'éléphant enseigne le livre",
    "L'étudiant enseigne le film",
    "Le chat détruit le livre",
    "Le chat aime le jardin",
    "Le chat apprend le livre",
    "L'étudiant construit le livre",
];

/// Ordered, immutable, non-empty list of phrases
///
/// Cloning is cheap; all clones share the same storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct PhraseList {
    phrases: Arc<[String]>,
}

impl PhraseList {
    /// Build a phrase list
    ///
    /// Fails if `phrases` is empty or any entry contains a line break, which
    /// would split it into several lines on the wire.
    pub fn new<I, S>(phrases: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let phrases: Vec<String> = phrases.into_iter().map(Into::into).collect();

        if phrases.is_empty() {
            return Err(Error::config("Phrase list cannot be empty"));
        }

        if let Some((index, phrase)) = phrases
            .iter()
            .enumerate()
            .find(|(_, p)| p.contains(['\n', '\r']))
        {
            return Err(Error::config(format!(
                "Phrase {index} contains a line break: {phrase:?}"
            )));
        }

        Ok(Self {
            phrases: phrases.into(),
        })
    }

    /// Number of phrases (always at least 1)
    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// Phrase at `index`, if in range
    pub fn get(&self, index: usize) -> Option<&str> {
        self.phrases.get(index).map(String::as_str)
    }

    /// Iterate phrases in transmission order (one pass, no wrap)
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.phrases.iter().map(String::as_str)
    }

    /// Return the phrase at `index` and the index of the phrase after it
    ///
    /// `index` is taken modulo the list length, so any cursor value is valid.
    /// The returned index wraps to 0 after the last phrase.
    pub fn next_phrase(&self, index: usize) -> (&str, usize) {
        let index = index % self.phrases.len();
        let next = (index + 1) % self.phrases.len();
        (&self.phrases[index], next)
    }

    /// Phrase carried by the `seq`-th message (1-based), wrapping
    pub fn phrase_for_message(&self, seq: u64) -> &str {
        let len = self.phrases.len() as u64;
        let index = (seq.saturating_sub(1) % len) as usize;
        &self.phrases[index]
    }
}

impl Default for PhraseList {
    fn default() -> Self {
        Self {
            phrases: DEFAULT_PHRASES.iter().map(|p| (*p).to_string()).collect(),
        }
    }
}

impl TryFrom<Vec<String>> for PhraseList {
    type Error = Error;

    fn try_from(phrases: Vec<String>) -> Result<Self> {
        Self::new(phrases)
    }
}

impl From<PhraseList> for Vec<String> {
    fn from(list: PhraseList) -> Self {
        list.phrases.to_vec()
    }
}

/// Encode a phrase as one wire line: UTF-8 bytes followed by a single `\n`
pub fn encode_line(phrase: &str) -> Vec<u8> {
    let mut line = Vec::with_capacity(phrase.len() + 1);
    line.extend_from_slice(phrase.as_bytes());
    line.push(b'\n');
    line
}
