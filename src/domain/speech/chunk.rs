/// Split text into ordered chunks that stay under a provider's request
/// limit, closing chunks only at paragraph (newline) boundaries.
///
/// Joining the returned chunks with `"\n"` reproduces the input exactly. A
/// single paragraph longer than `max_length` is not split further and becomes
/// an oversized chunk on its own; every other chunk is at most `max_length`
/// bytes.
pub fn chunk(text: &str, max_length: usize) -> Vec<String> {
    if text.len() <= max_length {
        return vec![text.to_string()];
    }

    let mut chunks: Vec<String> = Vec::new();

    for paragraph in text.split('\n') {
        match chunks.last_mut() {
            // +1 accounts for the separator that re-joins the paragraphs
            Some(buffer) if buffer.len() + 1 + paragraph.len() <= max_length => {
                buffer.push('\n');
                buffer.push_str(paragraph);
            }
            _ => chunks.push(paragraph.to_string()),
        }
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn short_text_returns_a_single_unchanged_chunk() {
        let text = "a short paragraph\nand another one";
        assert_eq!(chunk(text, 1000), vec![text.to_string()]);
    }

    #[test]
    fn text_exactly_at_the_limit_is_not_split() {
        let text = "a".repeat(64);
        assert_eq!(chunk(&text, 64), vec![text]);
    }

    #[test]
    fn chunks_respect_the_limit_and_close_at_paragraph_boundaries() {
        let text = (0..40)
            .map(|i| format!("paragraph number {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        let chunks = chunk(&text, 100);

        assert!(chunks.len() > 1);
        for piece in &chunks {
            assert!(piece.len() <= 100, "chunk of {} bytes", piece.len());
            // no paragraph is cut in the middle
            for line in piece.split('\n') {
                assert!(line.starts_with("paragraph number "));
            }
        }
    }

    #[test]
    fn rejoining_chunks_reproduces_the_input() {
        let text = (0..100)
            .map(|i| format!("line {i} with some filler text"))
            .collect::<Vec<_>>()
            .join("\n");

        for max_length in [30, 80, 256, 1024] {
            let chunks = chunk(&text, max_length);
            assert_eq!(chunks.join("\n"), text, "max_length = {max_length}");
        }
    }

    #[test]
    fn empty_paragraphs_are_preserved() {
        let text = format!("{}\n\n{}", "a".repeat(50), "b".repeat(50));
        let chunks = chunk(&text, 60);
        assert_eq!(chunks.join("\n"), text);
    }

    #[test]
    fn an_oversized_paragraph_becomes_its_own_chunk() {
        let long = "x".repeat(500);
        let text = format!("short\n{long}\ntail");
        let chunks = chunk(&text, 100);

        assert_eq!(chunks, vec!["short".to_string(), long, "tail".to_string()]);
    }

    #[test]
    fn order_is_preserved_and_nothing_is_duplicated() {
        let text = (0..50)
            .map(|i| format!("p{i}"))
            .collect::<Vec<_>>()
            .join("\n");
        let chunks = chunk(&text, 16);

        let paragraphs: Vec<&str> = chunks.iter().flat_map(|c| c.split('\n')).collect();
        let expected: Vec<String> = (0..50).map(|i| format!("p{i}")).collect();
        assert_eq!(paragraphs, expected);
    }
}
