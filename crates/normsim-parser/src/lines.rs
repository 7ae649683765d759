//! Reassembles lines from arbitrarily split input chunks.
//!
//! Network bodies arrive in chunks that ignore line boundaries and may even
//! split a UTF-8 sequence. Bytes are held until a `\n` arrives; only then is
//! the line decoded. A newline byte never occurs inside a multi-byte UTF-8
//! sequence, so decoding at line boundaries is always safe.

/// Buffers the trailing partial line between chunks.
#[derive(Debug, Default)]
pub struct LineAssembler {
    pending: Vec<u8>,
}

impl LineAssembler {
    /// Create an empty assembler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a text chunk, returning every line it completes.
    pub fn push_str(&mut self, chunk: &str) -> Vec<String> {
        self.push_bytes(chunk.as_bytes())
    }

    /// Push a raw byte chunk, returning every line it completes.
    ///
    /// A trailing `\r` is stripped from each completed line.
    pub fn push_bytes(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        let mut rest = chunk;
        while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            let (head, tail) = rest.split_at(pos);
            self.pending.extend_from_slice(head);
            if self.pending.last() == Some(&b'\r') {
                self.pending.pop();
            }
            lines.push(String::from_utf8_lossy(&self.pending).into_owned());
            self.pending.clear();
            rest = tail.get(1..).unwrap_or_default();
        }
        self.pending.extend_from_slice(rest);
        lines
    }

    /// Take the unterminated final line, if any.
    pub fn flush(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let line = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        Some(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_complete_lines() {
        let mut asm = LineAssembler::new();
        assert_eq!(asm.push_str("a\nb\n"), vec!["a", "b"]);
        assert_eq!(asm.flush(), None);
    }

    #[test]
    fn holds_partial_line_across_chunks() {
        let mut asm = LineAssembler::new();
        assert!(asm.push_str("[USA] sa").is_empty());
        assert_eq!(asm.push_str("id: hi\n[Ch"), vec!["[USA] said: hi"]);
        assert_eq!(asm.flush().as_deref(), Some("[Ch"));
    }

    #[test]
    fn strips_carriage_returns() {
        let mut asm = LineAssembler::new();
        assert_eq!(asm.push_str("one\r\ntwo\r\n"), vec!["one", "two"]);
    }

    #[test]
    fn keeps_empty_lines() {
        let mut asm = LineAssembler::new();
        assert_eq!(asm.push_str("a\n\nb\n"), vec!["a", "", "b"]);
    }

    #[test]
    fn reassembles_split_utf8_sequences() {
        let text = "[EU] said: Zusammenarbeit für alle\n";
        let bytes = text.as_bytes();
        let split = text.find('ü').map_or(0, |i| i.saturating_add(1));
        let (first, second) = bytes.split_at(split);

        let mut asm = LineAssembler::new();
        assert!(asm.push_bytes(first).is_empty());
        assert_eq!(
            asm.push_bytes(second),
            vec!["[EU] said: Zusammenarbeit für alle"]
        );
    }
}
