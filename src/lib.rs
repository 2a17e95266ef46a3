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

//! Full-text pattern index over a grammar-compressed string.
//!
//! A [`Grammar`] is a straight-line context-free grammar produced by a RePair-style compressor;
//! it can be decoded at arbitrary positions (`char_at`) or streamed from a position forward
//! (`iter_from`) without ever expanding the whole text into memory. A [`Cdawg`] is built by
//! streaming a grammar's text through it once, and then answers substring membership queries.

#[macro_use]
extern crate log;

mod cdawg;
mod error;
mod grammar;
mod loader;
mod search;
mod stream;

pub use cdawg::Cdawg;
pub use error::GrammarError;
pub use grammar::Grammar;
pub use stream::CharStream;
