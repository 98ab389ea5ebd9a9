//! Innotrend Ingest — abstract text processing.
//!
//! Cleans and tokenizes patent abstracts, counts bigrams over the filtered
//! token stream, and splits abstracts into semantically coherent chunks
//! before embedding.

pub mod chunking;
pub mod ngrams;
pub mod stopwords;
pub mod text;

pub use chunking::{split_sentences, SemanticChunker};
pub use ngrams::{bigrams, top_bigrams, BigramCounter};
pub use stopwords::StopWords;
pub use text::clean_and_tokenize;
