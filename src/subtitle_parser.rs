use std::fmt;
use regex::Regex;
use once_cell::sync::Lazy;
use anyhow::{Result, Context, anyhow};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::SubtitleError;

// @module: SRT parsing, cleanup and validation

// @const: Blank-line boundary between SRT blocks
static BLOCK_SEPARATOR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\n\s*\n").unwrap()
});

// @const: SRT timestamp line
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2}:\d{2}:\d{2},\d{3})\s*-->\s*(\d{2}:\d{2}:\d{2},\d{3})").unwrap()
});

// @const: HTML-like formatting tags
static TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<[^>]*>").unwrap()
});

// @const: Speaker annotations in full-width or ASCII parentheses
static SPEAKER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[（(][^)）]*[)）]").unwrap()
});

static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").unwrap()
});

// @const: Hiragana, Katakana or CJK ideograph
static JAPANESE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x{3040}-\x{309F}\x{30A0}-\x{30FF}\x{4E00}-\x{9FAF}]").unwrap()
});

// @struct: Single subtitle entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleEntry {
    // @field: Sequence number as written in the file
    pub sequence: u32,

    // @field: Start timestamp, HH:MM:SS,mmm
    pub start_time: String,

    // @field: End timestamp, HH:MM:SS,mmm
    pub end_time: String,

    // @field: Subtitle text, lines joined with '\n'
    pub text: String,
}

impl SubtitleEntry {
    pub fn new(sequence: u32, start_time: &str, end_time: &str, text: &str) -> Self {
        SubtitleEntry {
            sequence,
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            text: text.to_string(),
        }
    }

    /// Start time in milliseconds
    pub fn start_time_ms(&self) -> Result<u64> {
        Self::parse_timestamp(&self.start_time)
    }

    /// End time in milliseconds
    pub fn end_time_ms(&self) -> Result<u64> {
        Self::parse_timestamp(&self.end_time)
    }

    /// Parse an SRT timestamp to milliseconds
    pub fn parse_timestamp(timestamp: &str) -> Result<u64> {
        let parts: Vec<&str> = timestamp.trim().split(&[':', ','][..]).collect();

        if parts.len() != 4 {
            return Err(anyhow!("Invalid timestamp format: {}", timestamp));
        }

        let hours: u64 = parts[0].parse().context("Failed to parse hours")?;
        let minutes: u64 = parts[1].parse().context("Failed to parse minutes")?;
        let seconds: u64 = parts[2].parse().context("Failed to parse seconds")?;
        let millis: u64 = parts[3].parse().context("Failed to parse milliseconds")?;

        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return Err(anyhow!("Invalid time components in timestamp: {}", timestamp));
        }

        Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.sequence)?;
        writeln!(f, "{} --> {}", self.start_time, self.end_time)?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Parse SRT content into entries, in file order.
///
/// Entry text is stored cleaned (see [`clean_text`]). Malformed blocks (fewer than three lines, non-numeric sequence,
/// missing timestamp line) are skipped and never abort the parse.
pub fn parse(content: &str) -> Vec<SubtitleEntry> {
    let normalized = content
        .trim_start_matches('\u{feff}')
        .replace("\r\n", "\n")
        .replace('\r', "\n");

    let mut entries = Vec::new();

    for (block_index, block) in BLOCK_SEPARATOR_REGEX.split(normalized.trim()).enumerate() {
        let lines: Vec<&str> = block.trim().lines().collect();

        if lines.len() < 3 {
            debug!("Skipping block {}: expected at least 3 lines, found {}", block_index, lines.len());
            continue;
        }

        let sequence = match lines[0].trim().parse::<u32>() {
            Ok(seq) => seq,
            Err(_) => {
                debug!("Skipping block {}: invalid sequence line '{}'", block_index, lines[0]);
                continue;
            }
        };

        let Some(caps) = TIMESTAMP_REGEX.captures(lines[1]) else {
            debug!("Skipping block {}: invalid timestamp line '{}'", block_index, lines[1]);
            continue;
        };

        let text = clean_text(&lines[2..].join("\n"));

        entries.push(SubtitleEntry {
            sequence,
            start_time: caps[1].to_string(),
            end_time: caps[2].to_string(),
            text,
        });
    }

    entries
}

/// Strip formatting tags and speaker annotations, then collapse whitespace
pub fn clean_text(text: &str) -> String {
    let without_tags = TAG_REGEX.replace_all(text, "");
    let without_speakers = SPEAKER_REGEX.replace_all(&without_tags, "");
    WHITESPACE_REGEX
        .replace_all(&without_speakers, " ")
        .trim()
        .to_string()
}

/// True when the text contains at least one Hiragana, Katakana or Kanji character
pub fn contains_japanese(text: &str) -> bool {
    JAPANESE_REGEX.is_match(text)
}

/// Text of every entry that contains Japanese, one entry per line
pub fn extract_japanese_text(entries: &[SubtitleEntry]) -> String {
    entries
        .iter()
        .filter(|entry| contains_japanese(&entry.text))
        .map(|entry| clean_text(&entry.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check that the content is a non-empty SRT file with Japanese text
pub fn validate(content: &str) -> std::result::Result<(), SubtitleError> {
    if content.trim_start_matches('\u{feff}').trim().is_empty() {
        return Err(SubtitleError::EmptyInput);
    }

    let entries = parse(content);
    if entries.is_empty() {
        return Err(SubtitleError::NoEntries);
    }

    if !entries.iter().any(|entry| contains_japanese(&entry.text)) {
        return Err(SubtitleError::NoJapaneseContent);
    }

    Ok(())
}
