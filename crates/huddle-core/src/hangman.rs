//! Per-channel hangman, driven by `/hangman` and `/guess X` message commands.

use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

pub const MAX_STRIKES: usize = 9;

const WELCOME: &str = "Welcome to hangman!";
const PROMPT: &str = "Guess a letter!";
const WON: &str = "YOU WON!";
const LOST: &str = "GAME OVER!";

const WORDS: &[&str] = &[
    "awkward", "bagpipes", "banjo", "bungler", "croquet", "crypt", "dwarves", "fervid",
    "fishhook", "fjord", "gazebo", "gypsy", "haiku", "haphazard", "hyphen", "ivory",
    "jazzy", "jiffy", "jinx", "jukebox", "kayak", "kiosk", "klutz", "memento", "mystify",
    "numbskull", "ostracize", "oxygen", "pajama", "phlegm", "pixel", "polka", "quad",
    "quip", "rhythmic", "rogue", "sphinx", "squawk", "swivel", "toady", "twelfth",
    "unzip", "waxy", "wildebeest", "yacht", "zealous", "zigzag", "zippy", "zombie",
];

const GALLOWS: [&str; MAX_STRIKES + 1] = [
    "===========",
    "===========\n|\n|\n|\n|\n|",
    "===========\n| /\n|/\n|\n|\n|",
    "===========\n| /       |\n|/\n|\n|\n|",
    "===========\n| /       |\n|/        O\n|\n|\n|",
    "===========\n| /       |\n|/        O\n|         |\n|\n|",
    "===========\n| /       |\n|/        O\n|        /|\n|\n|",
    "===========\n| /       |\n|/        O\n|        /|\\\n|\n|",
    "===========\n| /       |\n|/        O\n|        /|\\\n|        /\n|",
    "===========\n| /       |\n|/        O\n|        /|\\\n|        / \\\n|",
];

/// A message body that drives the game instead of being posted verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HangmanCommand {
    Start,
    Guess(String),
}

impl HangmanCommand {
    pub fn parse(body: &str) -> Option<Self> {
        if body.contains("/hangman") {
            return Some(Self::Start);
        }
        let idx = body.find("/guess ")?;
        let guess = body[idx + "/guess ".len()..]
            .split_whitespace()
            .next()
            .unwrap_or_default();
        Some(Self::Guess(guess.to_string()))
    }
}

/// Pick a word longer than five letters.
pub fn random_word() -> &'static str {
    let long: Vec<&'static str> = WORDS.iter().copied().filter(|w| w.len() > 5).collect();
    long.choose(&mut rand::rng()).copied().unwrap_or("wildebeest")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Hangman {
    word: Option<String>,
    display: Vec<char>,
    guesses: String,
    strikes: usize,
    status: String,
}

impl Hangman {
    pub fn start(&mut self, word: &str) {
        let word = word.to_lowercase();
        self.display = vec!['_'; word.chars().count()];
        self.word = Some(word);
        self.guesses.clear();
        self.strikes = 0;
        self.status = WELCOME.to_string();
    }

    pub fn is_finished(&self) -> bool {
        self.status == WON || self.status == LOST
    }

    pub fn strikes(&self) -> usize {
        self.strikes
    }

    pub fn guess(&mut self, raw: &str) -> Result<()> {
        let Some(word) = self.word.clone() else {
            return Err(CoreError::invalid("start hangman to play"));
        };
        if self.is_finished() {
            return Err(CoreError::invalid(
                "hangman game has finished, start a new game",
            ));
        }

        let letter = parse_letter(raw)?;
        if self.guesses.contains(letter) {
            return Err(CoreError::invalid("letter has already been guessed"));
        }

        self.status = PROMPT.to_string();
        self.guesses.push(letter);

        if word.contains(letter) {
            for (slot, c) in self.display.iter_mut().zip(word.chars()) {
                if c == letter {
                    *slot = c;
                }
            }
        } else {
            self.strikes += 1;
        }

        if !self.display.contains(&'_') {
            self.status = WON.to_string();
        } else if self.strikes >= MAX_STRIKES {
            self.display = word.chars().collect();
            self.status = LOST.to_string();
        }
        Ok(())
    }

    /// The progress message posted after every step.
    pub fn render(&self) -> String {
        let display = self
            .display
            .iter()
            .map(char::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        let guesses = self
            .guesses
            .chars()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "{}\n{}\n{}\nYou have guessed: {}",
            self.status,
            display,
            GALLOWS[self.strikes.min(MAX_STRIKES)],
            guesses
        )
    }
}

fn parse_letter(raw: &str) -> Result<char> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Ok(c.to_ascii_lowercase()),
        _ => Err(CoreError::invalid("enter a letter from a to z")),
    }
}
