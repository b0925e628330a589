use context_ingest::document::{split, Chunk};
use proptest::prelude::*;

fn rejoin(chunks: &[Chunk]) -> String {
    chunks
        .iter()
        .map(|c| c.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

fn fixed_width_lines(count: usize) -> String {
    let mut content = String::new();
    for i in 0..count {
        // 79 chars + newline
        content.push_str(&format!("{:05} {}\n", i, "x".repeat(73)));
    }
    content
}

#[test]
fn empty_content_has_no_chunks() {
    assert!(split("", 8000).is_empty());
}

#[test]
fn missing_trailing_newline_adds_no_empty_chunk() {
    let chunks = split("alpha\nbeta\ngamma", 11);

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].content, "alpha\nbeta");
    assert_eq!((chunks[0].start_line, chunks[0].end_line), (1, 2));
    assert_eq!(chunks[1].content, "gamma");
    assert_eq!((chunks[1].start_line, chunks[1].end_line), (3, 3));
    assert!(chunks.iter().all(|c| !c.content.is_empty()));
}

#[test]
fn trailing_newline_is_stripped_once() {
    let chunks = split("alpha\n\n\n", 8000);

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].content, "alpha\n\n");
    assert_eq!(chunks[0].end_line, 3);
    assert_eq!(chunks[0].char_count, 7);
}

#[test]
fn overlong_line_is_kept_whole() {
    let long = "y".repeat(50);
    let content = format!("short\n{long}\nafter\n");
    let chunks = split(&content, 20);

    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[1].content, long);
    assert_eq!(chunks[1].char_count, 50);
    assert_eq!((chunks[1].start_line, chunks[1].end_line), (2, 2));
    assert_eq!(chunks[2].content, "after");
}

#[test]
fn line_exactly_filling_the_limit_stays_in_chunk() {
    // "abcd\n" is 5 chars: two lines fill a limit of 10 exactly
    let chunks = split("abcd\nefgh\nijkl\n", 10);

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].content, "abcd\nefgh");
    assert_eq!(chunks[1].content, "ijkl");
}

#[test]
fn two_hundred_thousand_chars_make_twenty_five_chunks() {
    let content = fixed_width_lines(2500);
    assert_eq!(content.len(), 200_000);

    let chunks = split(&content, 8000);

    assert_eq!(chunks.len(), 25);
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.index, i);
        assert_eq!(chunk.start_line, i * 100 + 1);
        assert_eq!(chunk.end_line, (i + 1) * 100);
        assert_eq!(chunk.line_count(), 100);
        assert_eq!(chunk.start_byte, i * 8000);
        assert_eq!(chunk.end_byte, (i + 1) * 8000);
    }
}

#[test]
fn char_count_counts_characters_not_bytes() {
    let chunks = split("héllo\nwörld", 8000);

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].char_count, 11);
    assert_eq!(chunks[0].end_byte, "héllo\nwörld".len());
}

#[test]
fn splitting_is_deterministic() {
    let content = fixed_width_lines(300);
    assert_eq!(split(&content, 1234), split(&content, 1234));
}

proptest! {
    #[test]
    fn proptest_chunks_rejoin_to_original(
        lines in prop::collection::vec("[a-zé漢 \t]{0,40}", 0..60),
        trailing_newline in any::<bool>(),
        limit in 1usize..200,
    ) {
        let mut content = lines.join("\n");
        if trailing_newline && !content.is_empty() {
            content.push('\n');
        }

        let chunks = split(&content, limit);

        let expected = content.strip_suffix('\n').unwrap_or(&content);
        prop_assert_eq!(rejoin(&chunks), expected);

        for pair in chunks.windows(2) {
            prop_assert_eq!(pair[0].end_line + 1, pair[1].start_line);
            prop_assert_eq!(pair[0].end_byte, pair[1].start_byte);
        }

        for chunk in &chunks {
            prop_assert_eq!(chunk.char_count, chunk.content.chars().count());
            prop_assert!(content[chunk.start_byte..chunk.end_byte].starts_with(&chunk.content));
            // Only a lone over-long line may exceed the limit.
            prop_assert!(chunk.char_count <= limit || chunk.line_count() == 1);
        }
    }
}
