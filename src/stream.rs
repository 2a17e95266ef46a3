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

//! Lazy forward iteration over a grammar-compressed text.

use crate::error::{GrammarError, Result};
use crate::grammar::{Grammar, FIRST_NONTERMINAL};

/// Streams the decoded text starting from some position, one byte per `next()` call, without ever
/// materialising a prefix of the text.
///
/// Built by [`Grammar::iter_from`]. Not restartable: to decode from a different position, request
/// a fresh stream.
pub struct CharStream<'g> {
    grammar: &'g Grammar,
    stack: Vec<(&'g [u32], usize)>,
    frame: (&'g [u32], usize),
    /// Number of terminals still to discard before the first one is published; nonzero only while
    /// unwinding to the exact requested starting position inside its start-rule symbol.
    skip: usize,
    /// Absolute text position of the next byte to be returned.
    j: usize,
}

impl<'g> CharStream<'g> {
    pub(crate) fn new(grammar: &'g Grammar, pos: usize) -> Result<Self> {
        let text_length = grammar.text_length();
        if pos > text_length {
            return Err(GrammarError::OutOfRange { pos, text_length });
        }
        if pos == text_length {
            return Ok(CharStream {
                grammar,
                stack: Vec::new(),
                frame: (&[], 0),
                skip: 0,
                j: text_length,
            });
        }

        let (floor_pos, offset) = grammar.floor(pos);
        Ok(CharStream {
            grammar,
            stack: Vec::new(),
            frame: (grammar.start_symbols(), offset),
            skip: pos - floor_pos,
            j: pos,
        })
    }
}

impl<'g> Iterator for CharStream<'g> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.j >= self.grammar.text_length() {
            return None;
        }
        loop {
            let (symbols, idx) = self.frame;
            if idx >= symbols.len() {
                self.frame = self
                    .stack
                    .pop()
                    .expect("grammar stream stack underflow: malformed grammar");
                continue;
            }
            let sym = symbols[idx];
            self.frame = (symbols, idx + 1);
            if sym < FIRST_NONTERMINAL {
                if self.skip > 0 {
                    self.skip -= 1;
                    continue;
                }
                self.j += 1;
                return Some(sym as u8);
            } else {
                self.stack.push(self.frame);
                self.frame = (self.grammar.rule(sym), 0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Grammar {
        let a_rule = vec![b'a' as u32, b'b' as u32];
        let rules = vec![a_rule];
        let start_rule = vec![FIRST_NONTERMINAL, FIRST_NONTERMINAL, b'b' as u32];
        Grammar::from_parts(rules, start_rule)
    }

    #[test]
    fn streams_full_text_from_zero() {
        let g = sample();
        let decoded: Vec<u8> = g.iter_from(0).unwrap().collect();
        assert_eq!(decoded, b"ababb");
    }

    #[test]
    fn streams_suffix_from_arbitrary_position() {
        let g = sample();
        for pos in 0..g.text_length() {
            let decoded: Vec<u8> = g.iter_from(pos).unwrap().collect();
            assert_eq!(decoded, b"ababb"[pos..]);
        }
    }

    #[test]
    fn stream_at_text_length_is_empty() {
        let g = sample();
        let decoded: Vec<u8> = g.iter_from(g.text_length()).unwrap().collect();
        assert!(decoded.is_empty());
    }

    #[test]
    fn stream_past_text_length_errors() {
        let g = sample();
        assert!(g.iter_from(g.text_length() + 1).is_err());
    }
}
