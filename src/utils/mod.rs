pub mod sentence_divider;
pub mod text_cleaner;
