use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use regex::Regex;
use once_cell::sync::Lazy;
use log::{debug, error, warn};

use crate::charset;
use crate::errors::SubtitleError;

// @module: Subtitle parsing and SRT emission

// @const: SRT timestamp line, either `,` or `.` before the milliseconds
static TIMESTAMP_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2}:\d{2}:\d{2}[,.]\d{3})\s*-->\s*(\d{2}:\d{2}:\d{2}[,.]\d{3})$").unwrap()
});

// @const: Canonical SRT timestamp
static CANONICAL_TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{2}:\d{2}:\d{2},\d{3}$").unwrap()
});

// @struct: Single subtitle entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    // @field: Sequence number
    pub seq_num: u32,

    // @field: Start time, `HH:MM:SS,mmm`
    pub start_time: String,

    // @field: End time, `HH:MM:SS,mmm`
    pub end_time: String,

    // @field: Source text, lines joined by `\n`
    pub text: String,

    // @field: Translation, possibly ending in an error marker
    pub translated_text: Option<String>,
}

impl SubtitleEntry {
    /// Creates a new untranslated entry
    pub fn new(seq_num: u32, start_time: impl Into<String>, end_time: impl Into<String>, text: impl Into<String>) -> Self {
        SubtitleEntry {
            seq_num,
            start_time: start_time.into(),
            end_time: end_time.into(),
            text: text.into(),
            translated_text: None,
        }
    }

    /// Copy of this entry carrying the given translation; `self` is left untouched
    pub fn with_translation(&self, translated_text: impl Into<String>) -> Self {
        SubtitleEntry {
            translated_text: Some(translated_text.into()),
            ..self.clone()
        }
    }

    /// Copy of this entry whose translation is the source text plus an error marker
    pub fn with_marker(&self, marker: &str) -> Self {
        self.with_translation(format!("{}{}", self.text, marker))
    }

    /// Text written to SRT output: the translation when present, the source otherwise
    pub fn output_text(&self) -> &str {
        self.translated_text.as_deref().unwrap_or(&self.text)
    }

    /// Normalize an SRT timestamp to the `HH:MM:SS,mmm` form
    pub fn normalize_timestamp(timestamp: &str) -> String {
        timestamp.replace('.', ",")
    }

    /// Check a timestamp against the canonical `HH:MM:SS,mmm` form
    pub fn is_valid_srt_time(time: &str) -> bool {
        CANONICAL_TIMESTAMP_REGEX.is_match(time)
    }

    /// Whether this entry can be emitted in validation mode
    pub fn is_valid_srt_entry(&self) -> bool {
        self.seq_num > 0
            && Self::is_valid_srt_time(&self.start_time)
            && Self::is_valid_srt_time(&self.end_time)
            && self.translated_text.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(f, "{} --> {}", self.start_time, self.end_time)?;
        writeln!(f, "{}", self.output_text())?;
        writeln!(f)
    }
}

/// Parser state, one variant per position within an SRT block
#[derive(Debug)]
enum ParseState {
    SeekingSequence,
    SeekingTimestamp {
        seq_num: u32,
    },
    CollectingText {
        seq_num: u32,
        start_time: String,
        end_time: String,
        lines: Vec<String>,
    },
}

impl ParseState {
    /// Emit the in-flight entry if it has text
    fn finish(self, entries: &mut Vec<SubtitleEntry>) {
        if let ParseState::CollectingText { seq_num, start_time, end_time, lines } = self {
            let text = lines.join("\n").trim().to_string();
            if text.is_empty() {
                debug!("Dropping entry {} with empty text", seq_num);
                return;
            }
            entries.push(SubtitleEntry {
                seq_num,
                start_time,
                end_time,
                text,
                translated_text: None,
            });
        }
    }
}

/// Collection of subtitle entries with metadata
#[derive(Debug)]
pub struct SubtitleCollection {
    /// Source filename
    pub source_file: PathBuf,

    /// List of subtitle entries
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleCollection {
    /// Create a new subtitle collection
    pub fn new(source_file: PathBuf) -> Self {
        SubtitleCollection {
            source_file,
            entries: Vec::new(),
        }
    }

    /// Load and parse an SRT file
    pub fn from_srt_file<P: AsRef<Path>>(path: P) -> Result<Self, SubtitleError> {
        let path = path.as_ref();
        let entries = Self::parse_srt_file(path)?;
        Ok(SubtitleCollection {
            source_file: path.to_path_buf(),
            entries,
        })
    }

    /// Read an SRT file from disk, detecting its charset
    ///
    /// Directories yield `SubtitleError::Skipped`, zero-length files
    /// `SubtitleError::EmptyInput`, unreadable paths `SubtitleError::IoFailure`.
    pub fn parse_srt_file(path: &Path) -> Result<Vec<SubtitleEntry>, SubtitleError> {
        if path.is_dir() {
            warn!("Skipping directory: {}", path.display());
            return Err(SubtitleError::Skipped { path: path.display().to_string() });
        }

        let bytes = fs::read(path).map_err(|e| SubtitleError::IoFailure {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let name = path.file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        Self::parse_srt_bytes(&bytes, &name)
    }

    /// Parse a raw SRT blob; `name` only appears in errors and logs
    pub fn parse_srt_bytes(bytes: &[u8], name: &str) -> Result<Vec<SubtitleEntry>, SubtitleError> {
        if bytes.is_empty() {
            return Err(SubtitleError::EmptyInput { name: name.to_string() });
        }

        debug!("Parsing {} as {}", name, charset::detect_charset(bytes));
        let content = charset::decode(bytes);
        let entries = Self::parse_srt_string(&content);
        debug!("Parsed {} entries from {}", entries.len(), name);
        Ok(entries)
    }

    /// Parse decoded SRT text into entries, in file order
    ///
    /// Stray lines before a sequence number are discarded, a malformed
    /// timestamp abandons the current block, and blocks without text are dropped.
    pub fn parse_srt_string(content: &str) -> Vec<SubtitleEntry> {
        let mut entries = Vec::new();
        let mut state = ParseState::SeekingSequence;

        for line in content.lines() {
            let trimmed = line.trim();

            state = match state {
                ParseState::SeekingSequence => {
                    match Self::parse_sequence_number(trimmed) {
                        Some(seq_num) => ParseState::SeekingTimestamp { seq_num },
                        None => ParseState::SeekingSequence,
                    }
                },
                ParseState::SeekingTimestamp { seq_num } => {
                    if trimmed.is_empty() {
                        ParseState::SeekingTimestamp { seq_num }
                    } else if let Some(caps) = TIMESTAMP_LINE_REGEX.captures(trimmed) {
                        ParseState::CollectingText {
                            seq_num,
                            start_time: SubtitleEntry::normalize_timestamp(&caps[1]),
                            end_time: SubtitleEntry::normalize_timestamp(&caps[2]),
                            lines: Vec::new(),
                        }
                    } else {
                        debug!("Malformed timestamp for entry {}: {:?}", seq_num, trimmed);
                        ParseState::SeekingSequence
                    }
                },
                ParseState::CollectingText { seq_num, start_time, end_time, mut lines } => {
                    if trimmed.is_empty() {
                        let complete = ParseState::CollectingText { seq_num, start_time, end_time, lines };
                        complete.finish(&mut entries);
                        ParseState::SeekingSequence
                    } else {
                        lines.push(line.trim_end().to_string());
                        ParseState::CollectingText { seq_num, start_time, end_time, lines }
                    }
                },
            };
        }

        state.finish(&mut entries);
        entries
    }

    // Digits only: `+5` or `-5` is a stray line, not a sequence number
    fn parse_sequence_number(line: &str) -> Option<u32> {
        if line.is_empty() || !line.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        line.parse::<u32>().ok().filter(|&seq_num| seq_num > 0)
    }

    /// Parse several files, logging and skipping the ones that fail
    pub fn parse_many<P: AsRef<Path>>(paths: &[P]) -> Vec<SubtitleEntry> {
        let mut all_entries = Vec::new();
        for path in paths {
            let path = path.as_ref();
            match Self::parse_srt_file(path) {
                Ok(entries) => all_entries.extend(entries),
                Err(SubtitleError::Skipped { .. }) => {},
                Err(e) => error!("Error parsing file {}: {}", path.display(), e),
            }
        }
        all_entries
    }

    /// Serialize entries to SRT, writing whatever text is present
    pub fn to_srt_string(entries: &[SubtitleEntry]) -> String {
        entries.iter().map(|entry| entry.to_string()).collect()
    }

    /// Serialize entries to SRT after checking every entry is well-formed and translated
    pub fn generate_with_validation(entries: &[SubtitleEntry]) -> Result<String, SubtitleError> {
        if let Some(invalid) = entries.iter().find(|entry| !entry.is_valid_srt_entry()) {
            return Err(SubtitleError::InvalidEntry { sequence: invalid.seq_num });
        }
        Ok(Self::to_srt_string(entries))
    }

    /// Write SRT content to a file, creating missing parent directories
    pub fn save_srt<P: AsRef<Path>>(content: &str, path: P) -> Result<(), SubtitleError> {
        let path = path.as_ref();
        let io_failure = |e: std::io::Error| SubtitleError::IoFailure {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_failure)?;
            }
        }
        fs::write(path, content.as_bytes()).map_err(io_failure)
    }

    /// Write this collection's entries to an SRT file
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P, validate: bool) -> Result<(), SubtitleError> {
        let content = if validate {
            Self::generate_with_validation(&self.entries)?
        } else {
            Self::to_srt_string(&self.entries)
        };
        Self::save_srt(&content, path)
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for entry in &self.entries {
            write!(f, "{}", entry)?;
        }
        Ok(())
    }
}
