//! Global word dictionary used by riddle mouths and the say-word condition.

use mapscript_data::DictionaryDef;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
    words: Vec<String>,
}

impl Dictionary {
    pub fn new(words: Vec<String>) -> Self {
        Self { words }
    }

    pub fn word(&self, index: u16) -> Option<&str> {
        self.words.get(usize::from(index)).map(String::as_str)
    }

    /// Index of `input`, ignoring case and surrounding whitespace.
    pub fn find(&self, input: &str) -> Option<u16> {
        let input = input.trim();
        self.words
            .iter()
            .position(|word| word.eq_ignore_ascii_case(input))
            .and_then(|index| u16::try_from(index).ok())
    }

    /// Whether `input` spells the word at `index`.
    pub fn matches(&self, index: u16, input: &str) -> bool {
        self.word(index).is_some_and(|word| word.eq_ignore_ascii_case(input.trim()))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl From<DictionaryDef> for Dictionary {
    fn from(def: DictionaryDef) -> Self {
        Self::new(def.words)
    }
}
