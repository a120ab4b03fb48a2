//! Incremental line framing over the debugger's stdout.
//!
//! Output arrives in chunks whose boundaries have nothing to do with line
//! boundaries. The framer buffers bytes and hands out complete lines as soon
//! as their `\n` arrives, keeping the unterminated tail for the next chunk.
//! A scan cursor remembers how far the buffer has been searched, so each
//! byte is inspected for a terminator once.

/// Splits a byte stream into lines.
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: Vec<u8>,
    /// Start of the first line not yet returned.
    start: usize,
    /// Bytes before this index are known to hold no terminator after `start`.
    scanned: usize,
}

impl LineFramer {
    /// Creates an empty framer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk of output.
    pub fn push(&mut self, chunk: &[u8]) {
        self.compact();
        self.buffer.extend_from_slice(chunk);
    }

    /// Returns the next complete, non-empty line.
    ///
    /// The `\n` terminator and a trailing `\r` are removed. Invalid UTF-8 is
    /// replaced rather than rejected. Returns `None` once no terminator
    /// remains; the tail stays buffered.
    pub fn next_line(&mut self) -> Option<String> {
        loop {
            let unscanned = self.buffer.get(self.scanned..)?;
            let Some(found) = unscanned.iter().position(|byte| *byte == b'\n') else {
                self.scanned = self.buffer.len();
                return None;
            };
            let end = self.scanned + found;
            let raw = self.buffer.get(self.start..end).unwrap_or_default();
            let trimmed = raw.strip_suffix(b"\r").unwrap_or(raw);
            let line = String::from_utf8_lossy(trimmed).into_owned();
            self.start = end + 1;
            self.scanned = self.start;
            if !line.is_empty() {
                return Some(line);
            }
        }
    }

    /// Iterates over the complete lines currently buffered.
    ///
    /// The iterator can be dropped early; remaining lines are returned by the
    /// next call.
    pub fn lines(&mut self) -> Lines<'_> {
        Lines { framer: self }
    }

    /// Bytes received after the last complete line.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        self.buffer.get(self.start..).unwrap_or_default()
    }

    fn compact(&mut self) {
        if self.start == 0 {
            return;
        }
        self.buffer.drain(..self.start);
        self.scanned -= self.start;
        self.start = 0;
    }
}

/// Iterator returned by [`LineFramer::lines`].
#[derive(Debug)]
pub struct Lines<'a> {
    framer: &'a mut LineFramer,
}

impl Iterator for Lines<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        self.framer.next_line()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn frame_all(chunks: &[&[u8]]) -> Vec<String> {
        let mut framer = LineFramer::new();
        let mut lines = Vec::new();
        for chunk in chunks {
            framer.push(chunk);
            lines.extend(framer.lines());
        }
        lines
    }

    #[rstest]
    fn joins_line_split_mid_token() {
        let lines = frame_all(&[b"^done,local", b"s=[]\n"]);

        assert_eq!(lines, vec!["^done,locals=[]".to_owned()]);
    }

    #[rstest]
    fn strips_carriage_return_and_drops_empty_lines() {
        let lines = frame_all(&[b"(gdb) \r\n\r\n\n~\"x\"\r\n"]);

        assert_eq!(lines, vec!["(gdb) ".to_owned(), "~\"x\"".to_owned()]);
    }

    #[rstest]
    fn retains_unterminated_tail() {
        let mut framer = LineFramer::new();
        framer.push(b"^done\n*stop");

        assert_eq!(framer.next_line().as_deref(), Some("^done"));
        assert_eq!(framer.next_line(), None);
        assert_eq!(framer.pending(), b"*stop");

        framer.push(b"ped\n");
        assert_eq!(framer.next_line().as_deref(), Some("*stopped"));
        assert!(framer.pending().is_empty());
    }

    #[rstest]
    fn carriage_return_split_from_newline_is_still_stripped() {
        let lines = frame_all(&[b"^done\r", b"\n"]);

        assert_eq!(lines, vec!["^done".to_owned()]);
    }

    #[rstest]
    fn iteration_can_resume_after_early_drop() {
        let mut framer = LineFramer::new();
        framer.push(b"a\nb\nc\n");

        let first = framer.lines().next();
        let rest: Vec<String> = framer.lines().collect();

        assert_eq!(first.as_deref(), Some("a"));
        assert_eq!(rest, vec!["b".to_owned(), "c".to_owned()]);
    }

    #[rstest]
    #[case(b"^done\n*running,thread-id=\"all\"\r\n(gdb) \n".as_slice())]
    #[case(b"\n\n~\"one\\n\"\n@\"two\"\r\n&\"th".as_slice())]
    #[case(b"no terminator at all".as_slice())]
    fn byte_at_a_time_matches_whole_input(#[case] input: &[u8]) {
        let whole = frame_all(&[input]);
        let single_bytes: Vec<&[u8]> = input.chunks(1).collect();

        assert_eq!(frame_all(&single_bytes), whole);
    }
}
