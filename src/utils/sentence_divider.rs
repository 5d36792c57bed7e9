use thiserror::Error;

/// Default chunk budget, in characters
pub const DEFAULT_MAX_CHUNK_LENGTH: usize = 500;

/// Sentence-terminal punctuation: Devanagari danda and double danda plus ASCII.
const SENTENCE_TERMINALS: [char; 5] = ['।', '॥', '.', '!', '?'];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SplitError {
    #[error("chunk length budget must be greater than zero")]
    ZeroBudget,
}

/// Split text into sentence fragments, keeping each terminal with its fragment.
///
/// Nothing is dropped: concatenating the fragments gives back the input.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut fragments = Vec::new();
    let mut start = 0;

    for (idx, ch) in text.char_indices() {
        if SENTENCE_TERMINALS.contains(&ch) {
            let end = idx + ch.len_utf8();
            fragments.push(&text[start..end]);
            start = end;
        }
    }

    if start < text.len() {
        fragments.push(&text[start..]);
    }

    fragments
}

/// Pack sentence fragments greedily into chunks of at most `max_length` characters.
///
/// A chunk is closed as soon as the next fragment would push it past the
/// budget. A single fragment longer than the budget becomes its own chunk and
/// is not split further.
pub fn split_into_chunks(text: &str, max_length: usize) -> Result<Vec<String>, SplitError> {
    if max_length == 0 {
        return Err(SplitError::ZeroBudget);
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for fragment in split_sentences(text) {
        let fragment_len = fragment.chars().count();
        if current_len + fragment_len <= max_length {
            current.push_str(fragment);
            current_len += fragment_len;
            continue;
        }

        push_trimmed(&mut chunks, &current);
        current.clear();
        current.push_str(fragment);
        current_len = fragment_len;
    }

    push_trimmed(&mut chunks, &current);
    Ok(chunks)
}

fn push_trimmed(chunks: &mut Vec<String>, chunk: &str) {
    let trimmed = chunk.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sentences_keeps_terminals() {
        let fragments = split_sentences("मैं घर जा रहा हूँ। क्या तुम आओगे? Yes!");
        assert_eq!(
            fragments,
            vec!["मैं घर जा रहा हूँ।", " क्या तुम आओगे?", " Yes!"]
        );
    }

    #[test]
    fn test_split_sentences_trailing_fragment() {
        let fragments = split_sentences("पहला वाक्य। दूसरा बिना विराम");
        assert_eq!(fragments, vec!["पहला वाक्य।", " दूसरा बिना विराम"]);
    }

    #[test]
    fn test_split_sentences_empty() {
        assert!(split_sentences("").is_empty());
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let chunks = split_into_chunks("यह एक परीक्षण वाक्य है।", DEFAULT_MAX_CHUNK_LENGTH).unwrap();
        assert_eq!(chunks, vec!["यह एक परीक्षण वाक्य है।"]);
    }

    #[test]
    fn test_chunks_respect_budget() {
        let text = "aaaa. bbbb. cccc. dddd.";
        let chunks = split_into_chunks(text, 12).unwrap();
        assert_eq!(chunks, vec!["aaaa. bbbb.", "cccc. dddd."]);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 12);
        }
    }

    #[test]
    fn test_budget_counts_characters_not_bytes() {
        // 15 chars, 45 bytes.
        let text = "नमस्ते। नमस्ते।";
        let chunks = split_into_chunks(text, 15).unwrap();
        assert_eq!(chunks, vec![text]);
    }

    #[test]
    fn test_long_sentence_kept_whole() {
        let long = "a".repeat(30) + ".";
        let text = format!("short. {} tail.", long);
        let chunks = split_into_chunks(&text, 10).unwrap();
        assert_eq!(chunks, vec!["short.".to_string(), long, "tail.".to_string()]);
    }

    #[test]
    fn test_chunks_reconstruct_input() {
        let text = "राम स्कूल गया। सीता बाजार गई। मोहन ने खाना खाया! क्या बारिश होगी? हाँ।";
        for budget in [5, 15, 30, 60, 500] {
            let chunks = split_into_chunks(text, budget).unwrap();
            assert_eq!(chunks.join(" "), text, "budget {}", budget);
            for chunk in &chunks {
                let single_sentence = split_sentences(chunk).len() == 1;
                assert!(chunk.chars().count() <= budget || single_sentence);
            }
        }
    }

    #[test]
    fn test_empty_text_has_no_chunks() {
        assert!(split_into_chunks("", 500).unwrap().is_empty());
    }

    #[test]
    fn test_zero_budget_is_error() {
        assert_eq!(split_into_chunks("text.", 0), Err(SplitError::ZeroBudget));
    }
}
