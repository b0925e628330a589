use super::chunk::Chunk;

/// Partition `content` into line-aligned chunks of at most `max_chunk_chars`
/// characters each.
///
/// Lines are never split: a line longer than the limit becomes a chunk of its
/// own. The output depends only on the arguments, so chunk boundaries are
/// stable across processes for an unchanged file and limit.
pub fn split(content: &str, max_chunk_chars: usize) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut buffer = ChunkBuffer::new(1, 0);

    for (line_idx, line) in content.split_inclusive('\n').enumerate() {
        let line_number = line_idx + 1;
        let line_chars = line.chars().count();

        if !buffer.is_empty() && buffer.chars + line_chars > max_chunk_chars {
            let next = ChunkBuffer::new(line_number, buffer.end_byte());
            chunks.push(buffer.close(chunks.len()));
            buffer = next;
        }

        buffer.push(line, line_chars);
    }

    if !buffer.is_empty() {
        chunks.push(buffer.close(chunks.len()));
    }

    debug_assert!(chunks
        .windows(2)
        .all(|w| w[0].end_line + 1 == w[1].start_line && w[0].end_byte == w[1].start_byte));

    chunks
}

struct ChunkBuffer {
    text: String,
    chars: usize,
    lines: usize,
    start_line: usize,
    start_byte: usize,
}

impl ChunkBuffer {
    fn new(start_line: usize, start_byte: usize) -> Self {
        Self {
            text: String::new(),
            chars: 0,
            lines: 0,
            start_line,
            start_byte,
        }
    }

    fn is_empty(&self) -> bool {
        self.lines == 0
    }

    fn push(&mut self, line: &str, line_chars: usize) {
        self.text.push_str(line);
        self.chars += line_chars;
        self.lines += 1;
    }

    fn end_byte(&self) -> usize {
        self.start_byte + self.text.len()
    }

    fn close(self, index: usize) -> Chunk {
        let end_byte = self.end_byte();
        let mut content = self.text;
        let mut char_count = self.chars;
        if content.ends_with('\n') {
            content.pop();
            char_count -= 1;
        }

        Chunk {
            index,
            start_line: self.start_line,
            end_line: self.start_line + self.lines - 1,
            start_byte: self.start_byte,
            end_byte,
            content,
            char_count,
        }
    }
}
