//! Abstract cleaning and tokenization.

use crate::stopwords::StopWords;

/// Lowercase, strip ASCII punctuation, split on whitespace and drop stopwords.
///
/// Numbers are kept. Token order follows the input text.
pub fn clean_and_tokenize(text: &str, stopwords: &StopWords) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect();
    cleaned
        .split_whitespace()
        .filter(|t| !stopwords.contains(t))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_and_tokenize() {
        let tokens = clean_and_tokenize(
            "A semiconductor-device, having 3 layers (and a gate)!",
            &StopWords::english(),
        );
        assert_eq!(tokens, vec!["semiconductordevice", "3", "layers", "gate"]);
    }

    #[test]
    fn test_contractions_lose_apostrophe() {
        // "don't" becomes "dont", which is not a stopword; "isn" alone is.
        let tokens = clean_and_tokenize("It don't isn", &StopWords::english());
        assert_eq!(tokens, vec!["dont"]);
    }
}
