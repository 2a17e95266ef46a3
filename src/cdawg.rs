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

//! Online construction of a Compact Directed Acyclic Word Graph (CDAWG) over a grammar-compressed
//! text, following Inenaga, Hoshino, Shinohara, Takeda, Takeda and Arikawa's algorithm.
//!
//! The automaton is built by streaming the text one character at a time while maintaining an
//! *active point*, a canonical reference pair `(s, (k, p))` naming the longest repeated suffix of
//! the prefix read so far. Every node lives in a single arena (`Vec<Node>`) addressed by a stable
//! `NodeId`, which turns the otherwise cyclic suffix-link / bottom-source-bottom graph into plain
//! indices instead of owning pointers.

use std::collections::HashMap;

use crate::error::Result;
use crate::grammar::Grammar;

pub(crate) type NodeId = u32;

const BOTTOM: NodeId = 0;
const SOURCE: NodeId = 1;
const SINK: NodeId = 2;

/// The upper bound of an edge label. `Open` edges grow with the text as it is streamed in; they
/// always point at `sink` and are resolved to a fixed position only once, after construction
/// finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EdgeEnd {
    Open,
    Closed(i64),
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Edge {
    /// Start of the label, as an absolute text position.
    pub(crate) k: usize,
    pub(crate) end: EdgeEnd,
    pub(crate) target: NodeId,
}

#[derive(Debug)]
pub(crate) struct Node {
    /// Length of the longest path from `source` to this node, in original text characters.
    /// `-1` for `bottom`, `0` for `source`.
    pub(crate) len: i64,
    pub(crate) suf: Option<NodeId>,
    pub(crate) to: HashMap<u8, Edge>,
}

impl Node {
    fn new() -> Self {
        Node {
            len: 0,
            suf: None,
            to: HashMap::new(),
        }
    }
}

/// A built CDAWG. Immutable: construction happens once, in [`Cdawg::build`].
///
/// The automaton never stores the decompressed text; edge labels are `[k, p]` pairs of text
/// positions, resolved back to bytes through the grammar whenever a traversal needs to compare
/// against a pattern.
pub struct Cdawg<'g> {
    pub(crate) nodes: Vec<Node>,
    pub(crate) grammar: &'g Grammar,
    text_length: usize,
}

impl<'g> Cdawg<'g> {
    /// Build the CDAWG for the text encoded by `grammar`.
    pub fn build(grammar: &'g Grammar) -> Result<Self> {
        let mut builder = Builder::new(grammar);
        let (mut s, mut k) = (SOURCE, 0usize);

        for i in 0..builder.text_length {
            let c = builder.byte_at(i)?;
            if !builder.nodes[BOTTOM as usize].to.contains_key(&c) {
                builder.nodes[BOTTOM as usize].to.insert(
                    c,
                    Edge {
                        k: i,
                        end: EdgeEnd::Closed(i as i64),
                        target: SOURCE,
                    },
                );
            }
            let (ns, nk) = builder.update(s, k, i, c)?;
            s = ns;
            k = nk;
        }

        builder.freeze_open_edges();

        let cdawg = Cdawg {
            nodes: builder.nodes,
            grammar,
            text_length: builder.text_length,
        };
        info!(
            "built CDAWG over {} characters: {} nodes, {} edges",
            cdawg.text_length,
            cdawg.node_count(),
            cdawg.edge_count()
        );
        Ok(cdawg)
    }

    /// Number of nodes in the automaton, including `bottom`, `source` and `sink`.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total number of edges across all nodes.
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.to.len()).sum()
    }

    pub(crate) fn edge_end(&self, end: EdgeEnd) -> i64 {
        match end {
            EdgeEnd::Closed(p) => p,
            EdgeEnd::Open => self.text_length as i64 - 1,
        }
    }

    pub(crate) fn root(&self) -> NodeId {
        SOURCE
    }
}

/// Transient state held only while the automaton is under construction.
struct Builder<'g> {
    nodes: Vec<Node>,
    grammar: &'g Grammar,
    text_length: usize,
}

impl<'g> Builder<'g> {
    fn new(grammar: &'g Grammar) -> Self {
        let mut bottom = Node::new();
        bottom.len = -1;
        let mut source = Node::new();
        source.suf = Some(BOTTOM);
        let sink = Node::new();

        Builder {
            nodes: vec![bottom, source, sink],
            grammar,
            text_length: grammar.text_length(),
        }
    }

    fn byte_at(&self, pos: usize) -> Result<u8> {
        self.grammar.char_at(pos)
    }

    fn suf_of(&self, node: NodeId) -> NodeId {
        self.nodes[node as usize]
            .suf
            .expect("cdawg builder: node is missing its suffix link")
    }

    fn edge_from(&self, node: NodeId, c: u8) -> Edge {
        *self.nodes[node as usize]
            .to
            .get(&c)
            .expect("cdawg builder: active point names a non-existent edge")
    }

    fn resolve(&self, end: EdgeEnd) -> i64 {
        match end {
            EdgeEnd::Closed(p) => p,
            EdgeEnd::Open => self.text_length as i64,
        }
    }

    /// `canonize(s, k, p)`: walk from `s` along the path spelled by `text[k..=p]`, replacing
    /// `(s, k)` by the node nearest to `p` and the remaining unwalked start position.
    fn canonize(&self, mut s: NodeId, mut k: usize, p: i64) -> Result<(NodeId, usize)> {
        if k as i64 > p {
            return Ok((s, k));
        }
        let c = self.byte_at(k)?;
        let mut edge = self.edge_from(s, c);
        while self.resolve(edge.end) - edge.k as i64 <= p - k as i64 {
            k += (self.resolve(edge.end) - edge.k as i64 + 1) as usize;
            s = edge.target;
            if k as i64 <= p {
                let c = self.byte_at(k)?;
                edge = self.edge_from(s, c);
            }
        }
        Ok((s, k))
    }

    /// `check_end_point(s, k, p, c)`: can `(s, (k, p))` be extended by `c` without creating a new
    /// edge or splitting an existing one?
    fn check_end_point(&self, s: NodeId, k: usize, p: i64, c: u8) -> Result<bool> {
        if k as i64 <= p {
            let k0 = self.byte_at(k)?;
            let edge = self.edge_from(s, k0);
            let next = self.byte_at((edge.k as i64 + p - k as i64 + 1) as usize)?;
            Ok(c == next)
        } else {
            Ok(self.nodes[s as usize].to.contains_key(&c))
        }
    }

    /// `extension(s, k, p)`: the node reached by following `(s, (k, p))` to its end, for a
    /// canonical reference pair.
    fn extension(&self, s: NodeId, k: usize, p: i64) -> Result<NodeId> {
        if k as i64 > p {
            return Ok(s);
        }
        let c = self.byte_at(k)?;
        Ok(self.edge_from(s, c).target)
    }

    /// Overwrite the `text[k]`-edge from `s` so that it now targets `r`, keeping its start but
    /// shrinking its label to end at `k + (p - k)`.
    fn redirect_edge(&mut self, s: NodeId, k: usize, p: i64, r: NodeId) -> Result<()> {
        let c = self.byte_at(k)?;
        let k1 = self.edge_from(s, c).k;
        self.nodes[s as usize].to.insert(
            c,
            Edge {
                k: k1,
                end: EdgeEnd::Closed(k1 as i64 + p - k as i64),
                target: r,
            },
        );
        Ok(())
    }

    /// Split the `text[k]`-edge from `s` at `p`, inserting a fresh node that inherits the tail of
    /// the edge (including its open/closed status).
    fn split_edge(&mut self, s: NodeId, k: usize, p: i64) -> Result<NodeId> {
        let c = self.byte_at(k)?;
        let edge = self.edge_from(s, c);
        let k1 = edge.k;
        let p1 = edge.end;
        let s1 = edge.target;

        let r = self.new_node();
        self.nodes[s as usize].to.insert(
            c,
            Edge {
                k: k1,
                end: EdgeEnd::Closed(k1 as i64 + p - k as i64),
                target: r,
            },
        );
        let tail_start = k1 as i64 + p - k as i64 + 1;
        let tail_key = self.byte_at(tail_start as usize)?;
        self.nodes[r as usize].to.insert(
            tail_key,
            Edge {
                k: tail_start as usize,
                end: p1,
                target: s1,
            },
        );
        self.nodes[r as usize].len = self.nodes[s as usize].len + (p - k as i64 + 1);
        Ok(r)
    }

    fn new_node(&mut self) -> NodeId {
        self.nodes.push(Node::new());
        (self.nodes.len() - 1) as NodeId
    }

    fn duplicate_node(&mut self, id: NodeId) -> NodeId {
        let to = self.nodes[id as usize].to.clone();
        let suf = self.nodes[id as usize].suf;
        let len = self.nodes[id as usize].len;
        self.nodes.push(Node { len, suf, to });
        (self.nodes.len() - 1) as NodeId
    }

    /// The main per-character step: extend the automaton so that it accepts `text[0..=p]`,
    /// returning the new active point.
    fn update(&mut self, mut s: NodeId, mut k: usize, i: usize, c: u8) -> Result<(NodeId, usize)> {
        if log_enabled!(log::Level::Debug) {
            debug!("update: active point ({}, {}), cursor {}, char {:?}", s, k, i, c as char);
        }
        let p = i as i64;
        let mut old_r: Option<NodeId> = None;
        let mut s1: Option<NodeId> = None;
        let mut r: NodeId = s;

        while !self.check_end_point(s, k, p - 1, c)? {
            if (k as i64) <= p - 1 {
                let ext = self.extension(s, k, p - 1)?;
                if s1 == Some(ext) {
                    self.redirect_edge(s, k, p - 1, r)?;
                    let suf = self.suf_of(s);
                    let (ns, nk) = self.canonize(suf, k, p - 1)?;
                    s = ns;
                    k = nk;
                    continue;
                } else {
                    s1 = Some(ext);
                    r = self.split_edge(s, k, p - 1)?;
                }
            } else {
                r = s;
            }

            self.nodes[r as usize].to.insert(
                c,
                Edge {
                    k: i,
                    end: EdgeEnd::Open,
                    target: SINK,
                },
            );
            if let Some(or) = old_r {
                self.nodes[or as usize].suf = Some(r);
            }
            old_r = Some(r);

            let suf = self.suf_of(s);
            let (ns, nk) = self.canonize(suf, k, p - 1)?;
            s = ns;
            k = nk;
        }

        if let Some(or) = old_r {
            self.nodes[or as usize].suf = Some(s);
        }
        self.separate_node(s, k, p)
    }

    /// Resolve the active point to a node, splitting a "non-solid" node into two when the
    /// canonical position doesn't already coincide with one.
    fn separate_node(&mut self, s: NodeId, k: usize, p: i64) -> Result<(NodeId, usize)> {
        let (s1, k1) = self.canonize(s, k, p)?;
        if (k1 as i64) <= p {
            return Ok((s1, k1));
        }
        if self.nodes[s1 as usize].len == self.nodes[s as usize].len + p - k as i64 + 1 {
            return Ok((s1, k1));
        }

        let r1 = self.duplicate_node(s1);
        self.nodes[r1 as usize].suf = self.nodes[s1 as usize].suf;
        self.nodes[s1 as usize].suf = Some(r1);
        self.nodes[r1 as usize].len = self.nodes[s as usize].len + p - k as i64 + 1;

        let target = (s1, k1);
        let mut cur_s = s;
        let mut cur_k = k;
        loop {
            let c = self.byte_at(cur_k)?;
            self.nodes[cur_s as usize].to.insert(
                c,
                Edge {
                    k: cur_k,
                    end: EdgeEnd::Closed(p),
                    target: r1,
                },
            );
            let suf = self.suf_of(cur_s);
            let (ns, nk) = self.canonize(suf, cur_k, p - 1)?;
            cur_s = ns;
            cur_k = nk;
            if self.canonize(cur_s, cur_k, p)? != target {
                break;
            }
        }
        Ok((r1, (p + 1) as usize))
    }

    fn freeze_open_edges(&mut self) {
        let last = self.text_length as i64 - 1;
        for node in self.nodes.iter_mut() {
            for edge in node.to.values_mut() {
                if edge.end == EdgeEnd::Open {
                    edge.end = EdgeEnd::Closed(last);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::FIRST_NONTERMINAL;

    fn literal_grammar(text: &[u8]) -> Grammar {
        let start_rule: Vec<u32> = text.iter().map(|&b| b as u32).collect();
        Grammar::from_parts(Vec::new(), start_rule)
    }

    fn contains(cdawg: &Cdawg, pattern: &[u8]) -> bool {
        crate::search::contains(cdawg, pattern).unwrap()
    }

    #[test]
    fn node_and_edge_counts_are_sane_for_tiny_text() {
        let g = literal_grammar(b"aaaaa");
        let cdawg = Cdawg::build(&g).unwrap();
        // bottom, source, sink plus at least one branching node.
        assert!(cdawg.node_count() >= 3);
        assert!(cdawg.edge_count() >= 1);
    }

    #[test]
    fn abcabc_scenarios() {
        let g = literal_grammar(b"abcabc");
        let cdawg = Cdawg::build(&g).unwrap();
        assert!(contains(&cdawg, b"abc"));
        assert!(contains(&cdawg, b"cab"));
        assert!(!contains(&cdawg, b"cba"));
    }

    #[test]
    fn aaaaa_scenarios() {
        let g = literal_grammar(b"aaaaa");
        let cdawg = Cdawg::build(&g).unwrap();
        assert!(contains(&cdawg, b"aaa"));
        assert!(!contains(&cdawg, b"aab"));
    }

    #[test]
    fn mississippi_scenario() {
        let g = literal_grammar(b"mississippi");
        let cdawg = Cdawg::build(&g).unwrap();
        assert!(contains(&cdawg, b"issi"));
    }

    #[test]
    fn completeness_over_all_substrings() {
        let text = b"mississippi";
        let g = literal_grammar(text);
        let cdawg = Cdawg::build(&g).unwrap();
        for start in 0..text.len() {
            for end in (start + 1)..=text.len() {
                assert!(contains(&cdawg, &text[start..end]));
            }
        }
    }

    #[test]
    fn suffix_links_reach_source_with_decreasing_len() {
        let g = literal_grammar(b"banana");
        let cdawg = Cdawg::build(&g).unwrap();
        for id in 0..cdawg.nodes.len() as NodeId {
            if id == BOTTOM || id == SOURCE {
                continue;
            }
            let mut cur = id;
            let mut steps = 0;
            let mut last_len = cdawg.nodes[cur as usize].len;
            while cur != SOURCE {
                let next = cdawg.nodes[cur as usize].suf.expect("node must have a suffix link");
                if next != BOTTOM {
                    assert!(cdawg.nodes[next as usize].len < last_len);
                    last_len = cdawg.nodes[next as usize].len;
                }
                cur = next;
                steps += 1;
                assert!(steps <= cdawg.nodes.len());
                if cur == BOTTOM {
                    break;
                }
            }
        }
    }

    #[test]
    fn grammar_with_real_nonterminal_builds_same_index() {
        // S -> A A b, A -> a b, i.e. text "ababb".
        let rules = vec![vec![b'a' as u32, b'b' as u32]];
        let start_rule = vec![FIRST_NONTERMINAL, FIRST_NONTERMINAL, b'b' as u32];
        let g = Grammar::from_parts(rules, start_rule);
        let cdawg = Cdawg::build(&g).unwrap();
        assert!(contains(&cdawg, b"abab"));
        assert!(contains(&cdawg, b"babb"));
        assert!(!contains(&cdawg, b"bba"));
    }
}
