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

//! Pattern search against a built CDAWG.

use crate::cdawg::Cdawg;
use crate::error::Result;

/// Does `pattern` occur as a substring of the text the CDAWG was built over?
///
/// Walks from the automaton's root, following the edge keyed by each unmatched pattern byte and
/// verifying the rest of the edge's label through the grammar. An empty pattern always matches.
pub(crate) fn contains(cdawg: &Cdawg, pattern: &[u8]) -> Result<bool> {
    if pattern.is_empty() {
        return Ok(true);
    }

    let mut node = cdawg.root();
    let mut i = 0usize;

    while i < pattern.len() {
        let c = pattern[i];
        let edge = match cdawg.nodes[node as usize].to.get(&c) {
            Some(edge) => *edge,
            None => return Ok(false),
        };

        let label_end = cdawg.edge_end(edge.end);
        let label_len = (label_end - edge.k as i64 + 1) as usize;

        let mut offset = 0usize;
        while offset < label_len && i < pattern.len() {
            let text_byte = cdawg.grammar.char_at(edge.k + offset)?;
            if text_byte != pattern[i] {
                return Ok(false);
            }
            i += 1;
            offset += 1;
        }

        if i == pattern.len() {
            return Ok(true);
        }
        node = edge.target;
    }

    Ok(true)
}

impl<'g> Cdawg<'g> {
    /// Does `pattern` occur as a substring of the indexed text?
    pub fn contains(&self, pattern: &[u8]) -> Result<bool> {
        contains(self, pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;

    fn literal_grammar(text: &[u8]) -> Grammar {
        let start_rule: Vec<u32> = text.iter().map(|&b| b as u32).collect();
        Grammar::from_parts(Vec::new(), start_rule)
    }

    #[test]
    fn empty_pattern_always_matches() {
        let g = literal_grammar(b"abcabc");
        let cdawg = Cdawg::build(&g).unwrap();
        assert!(cdawg.contains(b"").unwrap());
    }

    #[test]
    fn public_contains_matches_internal_helper() {
        let g = literal_grammar(b"abcabc");
        let cdawg = Cdawg::build(&g).unwrap();
        assert_eq!(cdawg.contains(b"bca").unwrap(), contains(&cdawg, b"bca").unwrap());
    }
}
