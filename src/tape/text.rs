//! Whitespace-delimited text file tape.

use std::fs;
use std::io::{self, prelude::*, SeekFrom};
use std::path::{Path, PathBuf};

use super::{check_write, pause, Tape, TapeDelays, TapeError};

/// Location of a value token in the tape file.
#[derive(Debug, Clone, Copy)]
struct Span {
    start: u64,
    len: usize,
}

/// Tape stored in a file as decimal integers separated by whitespace.
///
/// The file is scanned once on opening to index token locations, values are parsed on every read.
/// Appended values are separated from the previous one by a single space. Overwriting a value with
/// a representation of a different length shifts the rest of the file.
pub struct TextFileTape {
    file: fs::File,
    path: PathBuf,
    spans: Vec<Span>,
    file_len: u64,
    head: usize,
    delays: TapeDelays,
}

impl TextFileTape {
    /// Opens a tape, creating the file if it does not exist.
    /// Fails if the existing file contains a token that is not an `i32`.
    ///
    /// # Arguments
    /// * `path` - Tape file path
    /// * `delays` - Tape operation delays
    pub fn open(path: &Path, delays: TapeDelays) -> Result<Self, TapeError> {
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;

        let (spans, file_len) = Self::index(&file)?;
        log::trace!("{}: indexed {} values", path.display(), spans.len());

        return Ok(TextFileTape {
            file,
            path: path.into(),
            spans,
            file_len,
            head: 0,
            delays,
        });
    }

    /// Returns the tape file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn index(file: &fs::File) -> Result<(Vec<Span>, u64), TapeError> {
        let mut spans = Vec::new();
        let mut token = Vec::new();
        let mut offset: u64 = 0;

        let mut push_token = |token: &mut Vec<u8>, end: u64| -> Result<(), TapeError> {
            let index = spans.len();
            parse_token(token, index)?;
            spans.push(Span {
                start: end - token.len() as u64,
                len: token.len(),
            });
            token.clear();

            return Ok(());
        };

        for byte in io::BufReader::new(file).bytes() {
            let byte = byte?;
            if byte.is_ascii_whitespace() {
                if !token.is_empty() {
                    push_token(&mut token, offset)?;
                }
            } else {
                token.push(byte);
            }
            offset += 1;
        }
        if !token.is_empty() {
            push_token(&mut token, offset)?;
        }

        return Ok((spans, offset));
    }

    fn append(&mut self, text: &[u8]) -> Result<(), TapeError> {
        let separator: &[u8] = if self.spans.is_empty() { b"" } else { b" " };

        self.file.seek(SeekFrom::Start(self.file_len))?;
        self.file.write_all(separator)?;
        self.file.write_all(text)?;

        let start = self.file_len + separator.len() as u64;
        self.spans.push(Span { start, len: text.len() });
        self.file_len = start + text.len() as u64;

        return Ok(());
    }

    fn overwrite(&mut self, index: usize, text: &[u8]) -> Result<(), TapeError> {
        let span = self.spans[index];
        if span.len == text.len() {
            self.file.seek(SeekFrom::Start(span.start))?;
            self.file.write_all(text)?;
            return Ok(());
        }

        let tail_start = span.start + span.len as u64;
        let mut tail = Vec::with_capacity((self.file_len - tail_start) as usize);
        self.file.seek(SeekFrom::Start(tail_start))?;
        (&self.file).take(self.file_len - tail_start).read_to_end(&mut tail)?;

        self.file.seek(SeekFrom::Start(span.start))?;
        self.file.write_all(text)?;
        self.file.write_all(&tail)?;

        let new_len = span.start + text.len() as u64 + tail.len() as u64;
        self.file.set_len(new_len)?;

        let grown = text.len() as i64 - span.len as i64;
        self.spans[index].len = text.len();
        for next in &mut self.spans[index + 1..] {
            next.start = (next.start as i64 + grown) as u64;
        }
        self.file_len = new_len;

        return Ok(());
    }
}

fn parse_token(token: &[u8], index: usize) -> Result<i32, TapeError> {
    std::str::from_utf8(token)
        .ok()
        .and_then(|token| token.parse().ok())
        .ok_or_else(|| TapeError::Parse {
            index,
            token: String::from_utf8_lossy(token).into_owned(),
        })
}

impl Tape for TextFileTape {
    fn read(&mut self) -> Result<i32, TapeError> {
        pause(self.delays.read);

        let span = match self.spans.get(self.head) {
            Some(span) => *span,
            None => {
                return Err(TapeError::OutOfRange {
                    position: self.head,
                    size: self.spans.len(),
                })
            }
        };

        let mut token = vec![0u8; span.len];
        self.file.seek(SeekFrom::Start(span.start))?;
        self.file.read_exact(&mut token)?;

        return parse_token(&token, self.head);
    }

    fn write(&mut self, value: i32) -> Result<(), TapeError> {
        pause(self.delays.write);
        check_write(self.head, self.spans.len(), None)?;

        let text = value.to_string();
        if self.head == self.spans.len() {
            self.append(text.as_bytes())
        } else {
            self.overwrite(self.head, text.as_bytes())
        }
    }

    fn move_left(&mut self) -> Result<(), TapeError> {
        pause(self.delays.shift);
        self.head = self.head.saturating_sub(1);

        return Ok(());
    }

    fn move_right(&mut self) -> Result<(), TapeError> {
        pause(self.delays.shift);
        if self.head < self.spans.len() {
            self.head += 1;
        }

        return Ok(());
    }

    fn rewind(&mut self) -> Result<(), TapeError> {
        pause(self.delays.rewind);
        self.head = 0;

        return Ok(());
    }

    fn position(&self) -> usize {
        self.head
    }

    fn size(&self) -> usize {
        self.spans.len()
    }
}
