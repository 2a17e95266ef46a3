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

//! Error types shared by the grammar loaders, the decoder and the CDAWG builder

use std::path::PathBuf;

/// Errors that can occur while loading a grammar, decoding it or building an index over it.
///
/// `OutOfMemory` during CDAWG construction is not represented here: Rust has no portable way to
/// intercept global allocator failure, so an allocation failure aborts the process instead of
/// producing an `Err`.
#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    /// A grammar file could not be read.
    #[error("failed to read grammar file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The grammar file's content violates the format it claims to be in.
    #[error("malformed grammar in {path:?}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    /// A decoder operation was asked for a text position outside `[0, text_length)`.
    #[error("text position {pos} is out of range for a text of length {text_length}")]
    OutOfRange { pos: usize, text_length: usize },
}

pub type Result<T> = std::result::Result<T, GrammarError>;
