/*
    MIT License

    Copyright (c) 2020 Lars Krueger <lars_e_krueger@gmx.de>

    Permission is hereby granted, free of charge, to any person obtaining a copy
    of this software and associated documentation files (the "Software"), to deal
    in the Software without restriction, including without limitation the rights
    to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
    copies of the Software, and to permit persons to whom the Software is
    furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in all
    copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
    OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
    SOFTWARE.
*/

//! Straight-line grammar store and random-access decoding.
//!
//! The grammar is the output of a RePair-style compressor: every non-terminal expands
//! deterministically to exactly one sequence of symbols, and a distinguished start rule expands to
//! the whole original text. Neither the grammar nor the text it encodes is ever materialised in
//! full; `char_at` and `iter_from` decode on demand.

use crate::error::{GrammarError, Result};
use crate::stream::CharStream;

/// Terminals are byte values `0..FIRST_NONTERMINAL`. Anything at or above is a non-terminal id.
pub const FIRST_NONTERMINAL: u32 = 256;

/// A straight-line context-free grammar together with the index needed to decode it at arbitrary
/// text positions without expanding the text in full.
pub struct Grammar {
    /// `rules[r]` is the right-hand side of the non-terminal with id `r + FIRST_NONTERMINAL`.
    rules: Vec<Vec<u32>>,

    /// The distinguished start rule; expanding it in full yields the original text.
    start_rule: Vec<u32>,

    /// `expansion_size[r]` is the number of terminal characters produced by fully expanding the
    /// non-terminal with id `r + FIRST_NONTERMINAL`.
    expansion_size: Vec<usize>,

    /// Length of the text the start rule expands to.
    text_length: usize,

    /// `(pos, offset)` pairs, strictly increasing in `pos`, mapping a text position that is a
    /// symbol boundary in the start rule to that symbol's offset within it.
    position_index: Vec<(usize, usize)>,
}

impl Grammar {
    /// Assemble a grammar from already-parsed rules and start rule, deriving the position index
    /// and expansion sizes. Used by the format-specific loaders in [`crate::loader`].
    pub(crate) fn from_parts(rules: Vec<Vec<u32>>, start_rule: Vec<u32>) -> Self {
        let mut expansion_size = vec![0usize; rules.len()];
        for r in 0..rules.len() {
            expansion_size[r] = rules[r]
                .iter()
                .map(|&sym| Self::symbol_size(sym, &expansion_size))
                .sum();
        }

        let mut position_index = Vec::with_capacity(start_rule.len());
        let mut pos = 0usize;
        for (offset, &sym) in start_rule.iter().enumerate() {
            position_index.push((pos, offset));
            pos += Self::symbol_size(sym, &expansion_size);
        }
        let text_length = pos;

        Grammar {
            rules,
            start_rule,
            expansion_size,
            text_length,
            position_index,
        }
    }

    fn symbol_size(sym: u32, expansion_size: &[usize]) -> usize {
        if sym < FIRST_NONTERMINAL {
            1
        } else {
            expansion_size[(sym - FIRST_NONTERMINAL) as usize]
        }
    }

    /// Load a grammar from an MR-RePair `.out` text file.
    pub fn load_mrrepair<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        crate::loader::mrrepair::load(path.as_ref())
    }

    /// Load a grammar from a pair of Navarro `.C`/`.R` binary files.
    pub fn load_navarro<P: AsRef<std::path::Path>>(path_c: P, path_r: P) -> Result<Self> {
        crate::loader::navarro::load(path_c.as_ref(), path_r.as_ref())
    }

    /// Number of characters in the decoded text.
    pub fn text_length(&self) -> usize {
        self.text_length
    }

    /// Right-hand side of non-terminal `sym`. `sym` must be `>= FIRST_NONTERMINAL`.
    pub(crate) fn rule(&self, sym: u32) -> &[u32] {
        &self.rules[(sym - FIRST_NONTERMINAL) as usize]
    }

    pub(crate) fn start_symbols(&self) -> &[u32] {
        &self.start_rule
    }

    /// Largest indexed `pos` that is `<= q`, together with the start-rule offset it names.
    pub(crate) fn floor(&self, q: usize) -> (usize, usize) {
        let idx = self
            .position_index
            .partition_point(|&(pos, _)| pos <= q)
            .saturating_sub(1);
        self.position_index[idx]
    }

    /// Decode the byte at text position `q` in time proportional to grammar depth.
    pub fn char_at(&self, q: usize) -> Result<u8> {
        if q >= self.text_length {
            return Err(GrammarError::OutOfRange {
                pos: q,
                text_length: self.text_length,
            });
        }

        let (pos, offset) = self.floor(q);
        let mut remaining = q - pos;
        let mut stack: Vec<(&[u32], usize)> = Vec::new();
        let mut frame: (&[u32], usize) = (&self.start_rule, offset);

        loop {
            let (symbols, idx) = frame;
            if idx >= symbols.len() {
                frame = stack
                    .pop()
                    .expect("grammar decoder stack underflow: malformed grammar");
                continue;
            }
            let sym = symbols[idx];
            if sym < FIRST_NONTERMINAL {
                if remaining == 0 {
                    return Ok(sym as u8);
                }
                remaining -= 1;
                frame = (symbols, idx + 1);
            } else {
                stack.push((symbols, idx + 1));
                frame = (self.rule(sym), 0);
            }
        }
    }

    /// A lazy, forward-only stream of the decoded text starting at `pos`.
    ///
    /// `pos == text_length` yields an immediately-exhausted stream; larger values are an error.
    pub fn iter_from(&self, pos: usize) -> Result<CharStream<'_>> {
        CharStream::new(self, pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Builds the grammar S -> A A b, A -> a b, i.e. text "ababb".
    fn sample() -> Grammar {
        let a_rule = vec![b'a' as u32, b'b' as u32];
        let rules = vec![a_rule];
        let start_rule = vec![FIRST_NONTERMINAL, FIRST_NONTERMINAL, b'b' as u32];
        Grammar::from_parts(rules, start_rule)
    }

    #[test]
    fn text_length_matches_expansion() {
        let g = sample();
        assert_eq!(g.text_length(), 5);
    }

    #[test]
    fn char_at_matches_expected_text() {
        let g = sample();
        let expected = b"ababb";
        for (i, &c) in expected.iter().enumerate() {
            assert_eq!(g.char_at(i).unwrap(), c);
        }
    }

    #[test]
    fn char_at_out_of_range() {
        let g = sample();
        assert!(matches!(
            g.char_at(5),
            Err(GrammarError::OutOfRange {
                pos: 5,
                text_length: 5
            })
        ));
    }

    #[test]
    fn floor_query_lands_on_symbol_boundary() {
        let g = sample();
        // Position 0..2 fall in the first A (offset 0), 2..4 in the second A (offset 1),
        // position 4 is the trailing terminal b (offset 2).
        assert_eq!(g.floor(0), (0, 0));
        assert_eq!(g.floor(1), (0, 0));
        assert_eq!(g.floor(2), (2, 1));
        assert_eq!(g.floor(3), (2, 1));
        assert_eq!(g.floor(4), (4, 2));
    }
}
