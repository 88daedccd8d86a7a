//! WordPiece tokenizer for the text embedding model
//!
//! Produces the `{input_ids, attention_mask}` instance the hosted BERT-style
//! model expects. Normalization follows BERT's basic tokenizer: control
//! characters dropped, CJK ideographs split into single tokens, optional
//! lower-casing with NFD accent stripping (uncased models), and every Unicode
//! punctuation character split out. Words are then split greedily
//! longest-match-first against the vocabulary, wrapped in `[CLS]`/`[SEP]`,
//! truncated and padded to `max_len`.

use edupath_common::{Error, Result};
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use unicode_normalization::UnicodeNormalization;

const CLS: &str = "[CLS]";
const SEP: &str = "[SEP]";
const PAD: &str = "[PAD]";
const UNK: &str = "[UNK]";

/// Words longer than this map straight to `[UNK]`
const MAX_CHARS_PER_WORD: usize = 100;

/// One model instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Encoding {
    pub input_ids: Vec<i64>,
    pub attention_mask: Vec<i64>,
}

pub struct WordPieceTokenizer {
    vocab: HashMap<String, i64>,
    max_len: usize,
    lowercase: bool,
    cls_id: i64,
    sep_id: i64,
    pad_id: i64,
    unk_id: i64,
    punctuation: Regex,
    control: Regex,
    nonspacing_mark: Regex,
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| Error::Internal(format!("Invalid tokenizer pattern {}: {}", pattern, e)))
}

fn char_matches(re: &Regex, c: char) -> bool {
    let mut buf = [0u8; 4];
    re.is_match(c.encode_utf8(&mut buf))
}

/// CJK Unified Ideographs blocks (not Hangul, Hiragana or Katakana)
fn is_cjk(c: char) -> bool {
    matches!(
        c as u32,
        0x4E00..=0x9FFF
            | 0x3400..=0x4DBF
            | 0x20000..=0x2A6DF
            | 0x2A700..=0x2B73F
            | 0x2B740..=0x2B81F
            | 0x2B820..=0x2CEAF
            | 0xF900..=0xFAFF
            | 0x2F800..=0x2FA1F
    )
}

impl WordPieceTokenizer {
    /// Load `vocab.txt` (one token per line, id = line number)
    pub fn from_file(path: &Path, max_len: usize, lowercase: bool) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read tokenizer vocab {}: {}", path.display(), e))
        })?;
        Self::from_vocab(content.lines().map(str::to_string), max_len, lowercase)
    }

    pub fn from_vocab(
        tokens: impl IntoIterator<Item = String>,
        max_len: usize,
        lowercase: bool,
    ) -> Result<Self> {
        if max_len < 2 {
            return Err(Error::Config("Tokenizer max_len must be at least 2".to_string()));
        }

        let vocab: HashMap<String, i64> = tokens
            .into_iter()
            .enumerate()
            .map(|(id, token)| (token, id as i64))
            .collect();

        let special = |token: &str| {
            vocab
                .get(token)
                .copied()
                .ok_or_else(|| Error::Config(format!("Tokenizer vocab is missing {}", token)))
        };

        Ok(Self {
            cls_id: special(CLS)?,
            sep_id: special(SEP)?,
            pad_id: special(PAD)?,
            unk_id: special(UNK)?,
            max_len,
            lowercase,
            vocab,
            punctuation: compile(r"\p{P}")?,
            control: compile(r"[\p{Cc}\p{Cf}]")?,
            nonspacing_mark: compile(r"\p{Mn}")?,
        })
    }

    /// Encode one text into exactly `max_len` ids
    pub fn encode(&self, text: &str) -> Encoding {
        let mut ids: Vec<i64> = self
            .basic_tokenize(text)
            .iter()
            .flat_map(|word| self.wordpiece(word))
            .collect();
        ids.truncate(self.max_len - 2);

        let mut input_ids = Vec::with_capacity(self.max_len);
        input_ids.push(self.cls_id);
        input_ids.extend(ids);
        input_ids.push(self.sep_id);

        let real = input_ids.len();
        let mut attention_mask = vec![1; real];
        input_ids.resize(self.max_len, self.pad_id);
        attention_mask.resize(self.max_len, 0);

        Encoding {
            input_ids,
            attention_mask,
        }
    }

    /// Clean, split on whitespace and punctuation, normalize case and accents
    fn basic_tokenize(&self, text: &str) -> Vec<String> {
        let mut cleaned = String::with_capacity(text.len());
        for c in text.chars() {
            if c.is_whitespace() {
                cleaned.push(' ');
            } else if c == '\0' || c == '\u{FFFD}' || char_matches(&self.control, c) {
                continue;
            } else if is_cjk(c) {
                cleaned.push(' ');
                cleaned.push(c);
                cleaned.push(' ');
            } else {
                cleaned.push(c);
            }
        }

        let mut words = Vec::new();
        for token in cleaned.split_whitespace() {
            let token = if self.lowercase {
                self.strip_accents(&token.to_lowercase())
            } else {
                token.to_string()
            };

            let mut current = String::new();
            for c in token.chars() {
                if self.is_punctuation(c) {
                    if !current.is_empty() {
                        words.push(std::mem::take(&mut current));
                    }
                    words.push(c.to_string());
                } else {
                    current.push(c);
                }
            }
            if !current.is_empty() {
                words.push(current);
            }
        }
        words
    }

    /// ASCII symbols count as punctuation too (`$`, `+`, `^`, ...)
    fn is_punctuation(&self, c: char) -> bool {
        c.is_ascii_punctuation() || char_matches(&self.punctuation, c)
    }

    fn strip_accents(&self, word: &str) -> String {
        let decomposed: String = word.nfd().collect();
        self.nonspacing_mark.replace_all(&decomposed, "").into_owned()
    }

    /// Greedy longest-match-first split of one word
    fn wordpiece(&self, word: &str) -> Vec<i64> {
        let chars: Vec<char> = word.chars().collect();
        if chars.len() > MAX_CHARS_PER_WORD {
            return vec![self.unk_id];
        }

        let mut pieces = Vec::new();
        let mut start = 0;
        while start < chars.len() {
            let mut end = chars.len();
            let mut found = None;
            while start < end {
                let mut candidate: String = chars[start..end].iter().collect();
                if start > 0 {
                    candidate.insert_str(0, "##");
                }
                if let Some(&id) = self.vocab.get(&candidate) {
                    found = Some(id);
                    break;
                }
                end -= 1;
            }

            match found {
                Some(id) => {
                    pieces.push(id);
                    start = end;
                }
                // Whole word becomes [UNK] if any piece is unknown
                None => return vec![self.unk_id],
            }
        }
        pieces
    }
}
