//! Bigram counting over a filtered token stream.

use std::collections::HashMap;

/// Contiguous word pairs, joined by a single space, in stream order.
pub fn bigrams(tokens: &[String]) -> impl Iterator<Item = String> + '_ {
    tokens.windows(2).map(|pair| format!("{} {}", pair[0], pair[1]))
}

/// Frequency counter that remembers first-occurrence order.
#[derive(Debug, Default)]
pub struct BigramCounter {
    index: HashMap<String, usize>,
    counts: Vec<(String, usize)>,
}

impl BigramCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, bigram: String) {
        match self.index.get(&bigram) {
            Some(&slot) => self.counts[slot].1 += 1,
            None => {
                self.index.insert(bigram.clone(), self.counts.len());
                self.counts.push((bigram, 1));
            }
        }
    }

    pub fn extend_from_tokens(&mut self, tokens: &[String]) {
        for bigram in bigrams(tokens) {
            self.add(bigram);
        }
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// The `n` most frequent bigrams; equal counts keep first-occurrence order.
    pub fn most_common(&self, n: usize) -> Vec<(String, usize)> {
        let mut ranked = self.counts.clone();
        // stable sort keeps insertion order among ties
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}

/// Top `n` bigrams of a token stream, comma-joined.
pub fn top_bigrams(tokens: &[String], n: usize) -> String {
    let mut counter = BigramCounter::new();
    counter.extend_from_tokens(tokens);
    counter
        .most_common(n)
        .into_iter()
        .map(|(bigram, _)| bigram)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_bigrams_in_order() {
        let got: Vec<String> = bigrams(&toks("solar cell array module")).collect();
        assert_eq!(got, vec!["solar cell", "cell array", "array module"]);
        assert_eq!(bigrams(&toks("single")).count(), 0);
    }

    #[test]
    fn test_most_common_ties_by_first_occurrence() {
        let mut counter = BigramCounter::new();
        counter.extend_from_tokens(&toks("b c a b c d a b"));
        // "b c" x2, "a b" x2, "c a" x1, "c d" x1, "d a" x1
        let top = counter.most_common(3);
        assert_eq!(
            top,
            vec![
                ("b c".to_string(), 2),
                ("a b".to_string(), 2),
                ("c a".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_top_bigrams_is_deterministic() {
        let tokens = toks("fuel cell stack fuel cell membrane fuel cell");
        let first = top_bigrams(&tokens, 2);
        assert_eq!(first, "fuel cell,cell stack");
        assert_eq!(top_bigrams(&tokens, 2), first);
        assert_eq!(top_bigrams(&[], 5), "");
    }
}
