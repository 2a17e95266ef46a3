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

//! Loader for the MR-RePair `.out` text grammar format.
//!
//! Layout: `text_length`, `num_rules`, `start_size`, one line each, followed by `num_rules` rules
//! (each a newline-separated list of symbol codes terminated by `-1`), followed by `start_size`
//! start-rule symbol codes, one per line.

use std::io::BufRead;
use std::path::Path;

use super::FIRST_NONTERMINAL;
use crate::error::{GrammarError, Result};
use crate::grammar::Grammar;

const DUMMY_CODE: i64 = -1;

struct LineReader<B> {
    lines: std::io::Lines<B>,
    path: std::path::PathBuf,
}

impl<B: BufRead> LineReader<B> {
    fn next_line(&mut self) -> Result<String> {
        match self.lines.next() {
            Some(Ok(line)) => Ok(line),
            Some(Err(source)) => Err(GrammarError::Io {
                path: self.path.clone(),
                source,
            }),
            None => Err(GrammarError::Malformed {
                path: self.path.clone(),
                reason: "unexpected end of file".to_string(),
            }),
        }
    }

    fn next_int(&mut self) -> Result<i64> {
        let line = self.next_line()?;
        line.trim().parse::<i64>().map_err(|_| GrammarError::Malformed {
            path: self.path.clone(),
            reason: format!("expected an integer, found {:?}", line),
        })
    }
}

pub(crate) fn load(path: &Path) -> Result<Grammar> {
    let file = std::fs::File::open(path).map_err(|source| GrammarError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = LineReader {
        lines: std::io::BufReader::new(file).lines(),
        path: path.to_path_buf(),
    };

    let declared_text_length = reader.next_int()?;
    let num_rules = reader.next_int()?;
    let start_size = reader.next_int()?;
    if declared_text_length < 0 || num_rules < 0 || start_size < 0 {
        return Err(GrammarError::Malformed {
            path: path.to_path_buf(),
            reason: "text length, rule count and start size must be non-negative".to_string(),
        });
    }
    let num_rules = num_rules as usize;
    let start_size = start_size as usize;
    let max_nonterminal = FIRST_NONTERMINAL as i64 + num_rules as i64;

    let check_symbol = |sym: i64| -> Result<u32> {
        if sym < 0 || sym >= max_nonterminal {
            return Err(GrammarError::Malformed {
                path: path.to_path_buf(),
                reason: format!("symbol code {} is out of range", sym),
            });
        }
        Ok(sym as u32)
    };

    let mut rules: Vec<Vec<u32>> = Vec::with_capacity(num_rules);
    for _ in 0..num_rules {
        let mut rhs = Vec::new();
        loop {
            let code = reader.next_int()?;
            if code == DUMMY_CODE {
                break;
            }
            rhs.push(check_symbol(code)?);
        }
        if rhs.is_empty() {
            return Err(GrammarError::Malformed {
                path: path.to_path_buf(),
                reason: "a rule's right-hand side must not be empty".to_string(),
            });
        }
        rules.push(rhs);
    }

    let mut start_rule = Vec::with_capacity(start_size);
    for _ in 0..start_size {
        let code = reader.next_int()?;
        start_rule.push(check_symbol(code)?);
    }

    let grammar = Grammar::from_parts(rules, start_rule);
    if grammar.text_length() != declared_text_length as usize {
        return Err(GrammarError::Malformed {
            path: path.to_path_buf(),
            reason: format!(
                "declared text length {} disagrees with the start rule's expansion size {}",
                declared_text_length,
                grammar.text_length()
            ),
        });
    }
    info!(
        "loaded MR-RePair grammar from {:?}: {} rules, text length {}",
        path,
        num_rules,
        grammar.text_length()
    );
    Ok(grammar)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_fixture(contents: &str) -> tempfile_path::TempFile {
        tempfile_path::TempFile::with_contents(contents)
    }

    /// Minimal helper standing in for a temp-file crate: the loader only needs a path it can
    /// open, so a file under the process's temp directory with a unique name is enough.
    mod tempfile_path {
        use std::io::Write;

        pub struct TempFile {
            pub path: std::path::PathBuf,
        }

        impl TempFile {
            pub fn with_contents(contents: &str) -> Self {
                let mut path = std::env::temp_dir();
                let unique = format!(
                    "cdawg-index-test-{:?}-{}.out",
                    std::thread::current().id(),
                    contents.len()
                );
                path.push(unique);
                let mut file = std::fs::File::create(&path).expect("create fixture");
                file.write_all(contents.as_bytes()).expect("write fixture");
                TempFile { path }
            }
        }

        impl Drop for TempFile {
            fn drop(&mut self) {
                let _ = std::fs::remove_file(&self.path);
            }
        }
    }

    /// Grammar: S -> A A b, A -> a b (text "ababb"), in MR-RePair `.out` form.
    fn valid_fixture() -> String {
        "5\n1\n3\n97\n98\n-1\n256\n256\n98\n".to_string()
    }

    #[test]
    fn loads_a_well_formed_fixture() {
        let fixture = write_fixture(&valid_fixture());
        let grammar = load(&fixture.path).unwrap();
        assert_eq!(grammar.text_length(), 5);
        let decoded: Vec<u8> = grammar.iter_from(0).unwrap().collect();
        assert_eq!(decoded, b"ababb");
    }

    #[test]
    fn rejects_length_mismatch() {
        let bad = "999\n1\n3\n97\n98\n-1\n256\n256\n98\n".to_string();
        let fixture = write_fixture(&bad);
        assert!(matches!(
            load(&fixture.path),
            Err(GrammarError::Malformed { .. })
        ));
    }

    #[test]
    fn rejects_truncated_rule_list() {
        let bad = "5\n1\n3\n97\n98\n".to_string();
        let fixture = write_fixture(&bad);
        assert!(load(&fixture.path).is_err());
    }

    #[test]
    fn rejects_out_of_range_symbol() {
        let bad = "5\n1\n3\n97\n99999\n-1\n256\n256\n98\n".to_string();
        let fixture = write_fixture(&bad);
        assert!(matches!(
            load(&fixture.path),
            Err(GrammarError::Malformed { .. })
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            load(Path::new("/nonexistent/path/to/grammar.out")),
            Err(GrammarError::Io { .. })
        ));
    }
}
