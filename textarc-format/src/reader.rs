//! Sequential, bounded-memory access to an archive read from a byte
//! stream.

use std::io::{self, Read};

use crate::de::{marker_name, MARKER_PREFIX};
use crate::File;

/// Default capacity of the internal line buffer.
const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Smallest usable buffer: the marker probe needs room for the prefix, the
/// suffix and at least one name byte.
const MIN_BUFFER_SIZE: usize = 16;

/// The header of an archive entry, as yielded by [`StreamReader::next_file`].
/// The entry's content is read from the [`StreamReader`] itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub name: String,
}

/// Error returned by [`StreamReader::read_comment`].
#[derive(Debug, thiserror::Error)]
pub enum ReadCommentError {
    /// The reader has already advanced to an entry; the comment can only be
    /// read before the first [`StreamReader::next_file`] call.
    #[error("the reader has advanced past the comment")]
    Advanced,

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// How a line taken from the source ended.
enum LineEnd {
    /// A `\n` terminator was found.
    Terminated,
    /// The source ended before a terminator.
    SourceEnd,
    /// The line outgrew the internal buffer before a terminator was found.
    /// Such a line is never a marker.
    Overflow,
}

/// Reads an archive incrementally from a byte source, one entry at a time,
/// using a bounded internal buffer regardless of archive size.
///
/// Content reads before the first [`next_file`](StreamReader::next_file)
/// call yield the comment. After that, [`Read`] serves the current entry's
/// body, reporting end-of-file (`Ok(0)`) at the next marker line; the
/// marker itself never appears in any body.
pub struct StreamReader<R> {
    source: R,
    buf: Box<[u8]>,
    pos: usize,
    filled: usize,
    source_eof: bool,
    /// Whether the next byte to serve begins a fresh line. Marker
    /// recognition only applies at line boundaries.
    at_line_start: bool,
    /// Bytes pulled from the source for a marker probe but not yet
    /// delivered. Served before anything else is pulled.
    pending: Vec<u8>,
    pending_pos: usize,
    /// A header discovered while serving content, owed to the next
    /// `next_file` call.
    queued: Option<FileHeader>,
    /// Set once `next_file` has been called; closes the comment window.
    advanced: bool,
}

impl<R: Read> StreamReader<R> {
    pub fn new(source: R) -> StreamReader<R> {
        StreamReader::with_capacity(DEFAULT_BUFFER_SIZE, source)
    }

    /// `capacity` bounds marker recognition: a `-- `-prefixed line longer
    /// than the buffer is conservatively treated as content.
    pub fn with_capacity(capacity: usize, source: R) -> StreamReader<R> {
        StreamReader {
            source,
            buf: vec![0; capacity.max(MIN_BUFFER_SIZE)].into_boxed_slice(),
            pos: 0,
            filled: 0,
            source_eof: false,
            at_line_start: true,
            pending: Vec::new(),
            pending_pos: 0,
            queued: None,
            advanced: false,
        }
    }

    /// Read the remainder of the comment: everything before the first
    /// marker line. Only available while the reader has not yet advanced to
    /// an entry.
    pub fn read_comment(&mut self) -> Result<Vec<u8>, ReadCommentError> {
        if self.advanced {
            return Err(ReadCommentError::Advanced);
        }
        let mut comment = Vec::new();
        self.read_to_end(&mut comment)?;
        Ok(comment)
    }

    /// Advance to the next entry and return its header, or `None` at the
    /// end of the archive.
    ///
    /// Any unread content of the current entry (or of the comment) is
    /// silently discarded first, so repeated calls walk the headers without
    /// manual draining. Read the content you need before advancing.
    pub fn next_file(&mut self) -> io::Result<Option<FileHeader>> {
        self.advanced = true;

        if let Some(header) = self.queued.take() {
            return Ok(Some(header));
        }

        // Discarding the rest of the current entry is what discovers the
        // next marker, if there is one.
        io::copy(self, &mut io::sink())?;

        Ok(self.queued.take())
    }

    /// Iterate over the remaining entry headers, skipping content.
    pub fn headers(&mut self) -> Headers<'_, R> {
        Headers {
            reader: self,
            done: false,
        }
    }

    /// Iterate over the remaining entries, reading each body into memory
    /// before yielding it.
    pub fn files(&mut self) -> Files<'_, R> {
        Files {
            reader: self,
            done: false,
        }
    }

    /// Make up to `want` bytes visible at the front of the buffer without
    /// consuming them. Returns fewer only at end of input.
    fn peek(&mut self, want: usize) -> io::Result<&[u8]> {
        debug_assert!(want <= self.buf.len());
        if self.filled - self.pos < want && !self.source_eof {
            self.buf.copy_within(self.pos..self.filled, 0);
            self.filled -= self.pos;
            self.pos = 0;
            while self.filled < want && !self.source_eof {
                match self.source.read(&mut self.buf[self.filled..]) {
                    Ok(0) => self.source_eof = true,
                    Ok(n) => self.filled += n,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                    Err(e) => return Err(e),
                }
            }
        }
        let end = (self.pos + want).min(self.filled);
        Ok(&self.buf[self.pos..end])
    }

    /// Refill the buffer window if it is empty. Returns whether any bytes
    /// are available.
    fn fill(&mut self) -> io::Result<bool> {
        if self.pos < self.filled {
            return Ok(true);
        }
        if self.source_eof {
            return Ok(false);
        }
        self.pos = 0;
        self.filled = 0;
        loop {
            match self.source.read(&mut self.buf) {
                Ok(0) => {
                    self.source_eof = true;
                    return Ok(false);
                }
                Ok(n) => {
                    self.filled = n;
                    return Ok(true);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }

    /// Consume one line, terminator included, into a fresh buffer. Bounded
    /// by the internal buffer's capacity.
    fn take_line(&mut self) -> io::Result<(Vec<u8>, LineEnd)> {
        let cap = self.buf.len();
        let mut line = Vec::new();
        loop {
            if !self.fill()? {
                return Ok((line, LineEnd::SourceEnd));
            }
            let window = &self.buf[self.pos..self.filled];
            let limit = cap - line.len();
            match window.iter().position(|&b| b == b'\n') {
                Some(i) if i < limit => {
                    line.extend_from_slice(&window[..=i]);
                    self.pos += i + 1;
                    return Ok((line, LineEnd::Terminated));
                }
                _ => {
                    let take = window.len().min(limit);
                    line.extend_from_slice(&window[..take]);
                    self.pos += take;
                    if line.len() >= cap {
                        return Ok((line, LineEnd::Overflow));
                    }
                }
            }
        }
    }

    /// Serve already-probed bytes. The caller guarantees `out` is non-empty
    /// and pending bytes remain.
    fn serve_pending(&mut self, out: &mut [u8]) -> usize {
        let rest = &self.pending[self.pending_pos..];
        let n = rest.len().min(out.len());
        out[..n].copy_from_slice(&rest[..n]);
        self.pending_pos += n;
        self.at_line_start = self.pending[self.pending_pos - 1] == b'\n';
        if self.pending_pos == self.pending.len() {
            self.pending.clear();
            self.pending_pos = 0;
        }
        n
    }
}

impl<R: Read> Read for StreamReader<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }

        // A queued header ends the current entry; nothing more is served
        // until `next_file` hands the header over.
        if self.queued.is_some() {
            return Ok(0);
        }

        // Bytes left over from a marker probe go out first.
        if self.pending_pos < self.pending.len() {
            return Ok(self.serve_pending(out));
        }

        // Marker lines are recognized only at a line boundary.
        if self.at_line_start && self.peek(MARKER_PREFIX.len())? == MARKER_PREFIX {
            let (line, end) = self.take_line()?;
            if !matches!(end, LineEnd::Overflow) {
                if let Some(name) = marker_name(&line) {
                    tracing::debug!(name, "queued next entry header");
                    self.queued = Some(FileHeader {
                        name: name.to_string(),
                    });
                    self.at_line_start = true;
                    return Ok(0);
                }
            }
            // Not a marker after all (or too long to ever be one): the
            // probed line is ordinary content.
            self.pending = line;
            self.pending_pos = 0;
            return Ok(self.serve_pending(out));
        }

        // Ordinary content. Serve up to and including the next terminator
        // so the following call re-checks for a marker at the line start.
        if !self.fill()? {
            return Ok(0);
        }
        let window = &self.buf[self.pos..self.filled];
        let line_len = match window.iter().position(|&b| b == b'\n') {
            Some(i) => i + 1,
            None => window.len(),
        };
        let n = line_len.min(out.len());
        out[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.pos += n;
        self.at_line_start = self.buf[self.pos - 1] == b'\n';
        Ok(n)
    }
}

/// Iterator over entry headers; content is skipped between steps. Fuses
/// after the first error.
pub struct Headers<'a, R> {
    reader: &'a mut StreamReader<R>,
    done: bool,
}

impl<R: Read> Iterator for Headers<'_, R> {
    type Item = io::Result<FileHeader>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.next_file() {
            Ok(Some(header)) => Some(Ok(header)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Iterator over complete entries. Trades the streaming property for
/// convenience: each yielded [`File`] is independently complete. Fuses
/// after the first error.
pub struct Files<'a, R> {
    reader: &'a mut StreamReader<R>,
    done: bool,
}

impl<R: Read> Iterator for Files<'_, R> {
    type Item = io::Result<File>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let header = match self.reader.next_file() {
            Ok(Some(header)) => header,
            Ok(None) => {
                self.done = true;
                return None;
            }
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };
        let mut data = Vec::new();
        if let Err(e) = self.reader.read_to_end(&mut data) {
            self.done = true;
            return Some(Err(e));
        }
        Some(Ok(File {
            name: header.name,
            data,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse, Archive};

    fn read_all<R: Read>(r: &mut StreamReader<R>) -> Vec<u8> {
        let mut out = Vec::new();
        r.read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn walks_entries_in_order() {
        let text = b"comment1\ncomment2\n\
            -- file1 --\nFile 1 text.\n-- foo ---\nMore file 1 text.\n\
            -- file 2 --\nFile 2 text.\n\
            -- empty --\n\
            -- noNL --\nhello world\n\
            -- empty filename line --\nsome content\n-- --";
        let mut r = StreamReader::new(&text[..]);

        assert_eq!(read_all(&mut r), b"comment1\ncomment2\n");

        let f = r.next_file().unwrap().unwrap();
        assert_eq!(f.name, "file1");
        assert_eq!(
            read_all(&mut r),
            b"File 1 text.\n-- foo ---\nMore file 1 text.\n"
        );

        let f = r.next_file().unwrap().unwrap();
        assert_eq!(f.name, "file 2");
        assert_eq!(read_all(&mut r), b"File 2 text.\n");

        let f = r.next_file().unwrap().unwrap();
        assert_eq!(f.name, "empty");
        assert_eq!(read_all(&mut r), b"");

        let f = r.next_file().unwrap().unwrap();
        assert_eq!(f.name, "noNL");
        assert_eq!(read_all(&mut r), b"hello world\n");

        let f = r.next_file().unwrap().unwrap();
        assert_eq!(f.name, "empty filename line");
        // `-- --` has an empty name, so it belongs to the body.
        assert_eq!(read_all(&mut r), b"some content\n-- --");

        assert!(r.next_file().unwrap().is_none());
    }

    #[test]
    fn empty_comment() {
        let mut r = StreamReader::new(&b"-- file1 --\ncontent"[..]);
        assert_eq!(read_all(&mut r), b"");
        let f = r.next_file().unwrap().unwrap();
        assert_eq!(f.name, "file1");
        assert_eq!(read_all(&mut r), b"content");
    }

    #[test]
    fn skipping_the_comment_is_legal() {
        let mut r = StreamReader::new(&b"comment\n-- file1 --\ncontent"[..]);
        let f = r.next_file().unwrap().unwrap();
        assert_eq!(f.name, "file1");
        assert_eq!(read_all(&mut r), b"content");
    }

    #[test]
    fn small_destination_buffers() {
        let mut r = StreamReader::new(&b"comment\n-- file1 --\ncontent of file1"[..]);
        let f = r.next_file().unwrap().unwrap();
        assert_eq!(f.name, "file1");

        let mut collected = Vec::new();
        let mut buf = [0u8; 3];
        loop {
            let n = r.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            collected.extend_from_slice(&buf[..n]);
        }
        assert_eq!(collected, b"content of file1");
    }

    #[test]
    fn comment_window_closes_after_advancing() {
        let mut r = StreamReader::new(&b"comment line 1\ncomment line 2\n-- file1 --\ndata1\n"[..]);
        let comment = r.read_comment().unwrap();
        assert_eq!(comment, b"comment line 1\ncomment line 2\n");

        let f = r.next_file().unwrap().unwrap();
        assert_eq!(f.name, "file1");

        let mut r = StreamReader::new(&b"-- file1 --\ndata1\n"[..]);
        r.next_file().unwrap().unwrap();
        assert!(matches!(
            r.read_comment(),
            Err(ReadCommentError::Advanced)
        ));
    }

    #[test]
    fn final_marker_without_newline_is_an_empty_entry() {
        let mut r = StreamReader::new(&b"-- a --\nx\n-- b --"[..]);
        assert_eq!(r.next_file().unwrap().unwrap().name, "a");
        assert_eq!(read_all(&mut r), b"x\n");
        assert_eq!(r.next_file().unwrap().unwrap().name, "b");
        assert_eq!(read_all(&mut r), b"");
        assert!(r.next_file().unwrap().is_none());
    }

    #[test]
    fn oversized_prefixed_line_is_never_a_marker() {
        let mut text = Vec::new();
        text.extend_from_slice(b"-- a --\n");
        let mut long_line = b"-- ".to_vec();
        long_line.extend(std::iter::repeat(b'x').take(100));
        long_line.extend_from_slice(b" --\n");
        text.extend_from_slice(&long_line);
        text.extend_from_slice(b"tail\n");

        // The long line would be a valid marker; a 64-byte buffer must
        // refuse to recognize it.
        let mut r = StreamReader::with_capacity(64, &text[..]);
        assert_eq!(r.next_file().unwrap().unwrap().name, "a");
        let mut body = long_line.clone();
        body.extend_from_slice(b"tail\n");
        assert_eq!(read_all(&mut r), body);
        assert!(r.next_file().unwrap().is_none());

        // A roomier reader sees the marker.
        let mut r = StreamReader::new(&text[..]);
        assert_eq!(r.next_file().unwrap().unwrap().name, "a");
        assert_eq!(
            r.next_file().unwrap().unwrap().name,
            String::from_utf8(long_line[3..long_line.len() - 4].to_vec()).unwrap()
        );
    }

    #[test]
    fn headers_iterator_skips_content() {
        let mut r = StreamReader::new(&b"-- file1 --\ncontent1\n-- file2 --\ncontent2"[..]);
        let names: Vec<String> = r
            .headers()
            .map(|h| h.unwrap().name)
            .collect();
        assert_eq!(names, ["file1", "file2"]);
    }

    #[test]
    fn files_iterator_reads_bodies() {
        let mut r = StreamReader::new(&b"-- file1 --\ncontent1\n-- file2 --\ncontent2"[..]);
        let files: Vec<File> = r.files().map(|f| f.unwrap()).collect();
        assert_eq!(
            files,
            [
                File {
                    name: "file1".to_string(),
                    data: b"content1\n".to_vec()
                },
                File {
                    name: "file2".to_string(),
                    data: b"content2".to_vec()
                },
            ]
        );
    }

    #[test]
    fn streaming_agrees_with_whole_buffer_parse() {
        let inputs: [&[u8]; 6] = [
            b"",
            b"comment without files",
            b"hdr\n-- one --\nA\n-- two --\nB",
            b"-- file --\nbody\n-- --",
            b"-- a --\r\ncrlf body\r\n-- b --\r\n",
            b"-- dup --\n1\n-- other --\n2\n-- dup --\n3\n",
        ];
        for input in inputs {
            let mut r = StreamReader::new(input);
            let mut streamed = Archive::new();
            streamed.comment = r.read_comment().unwrap();
            while let Some(header) = r.next_file().unwrap() {
                let mut data = Vec::new();
                r.read_to_end(&mut data).unwrap();
                streamed.set(header.name, data);
            }
            assert_eq!(streamed, parse(input), "input: {:?}", input);
        }
    }
}
