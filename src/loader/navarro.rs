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

//! Loader for Navarro's binary `.C`/`.R` grammar format.
//!
//! `.R` holds the grammar's rules: a 4-byte alphabet size, that many bytes mapping compact
//! terminal indices to real byte values, then a stream of 4-byte groups. Two consecutive groups
//! make up one rule. Within a group, slot 0 is always a symbol; slots 1..3 are extra symbols
//! present only when non-zero. `.C` holds the start rule as the same kind of group stream, with no
//! rule boundaries — every group's symbols are appended to the start rule in file order.
//!
//! This reads both files directly as integers, not through the byte-by-byte intermediate text
//! file some deployments round-trip through; that variant is known to be unreliable.

use std::path::Path;

use super::FIRST_NONTERMINAL;
use crate::error::{GrammarError, Result};
use crate::grammar::Grammar;

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| GrammarError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn malformed(path: &Path, reason: impl Into<String>) -> GrammarError {
    GrammarError::Malformed {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

/// Decode one 4-byte group into its constituent symbols, given the terminal alphabet.
fn decode_group(group: &[u8; 4], alphabet: &[u8], path: &Path) -> Result<Vec<u32>> {
    let alphabet_size = alphabet.len();
    let mut symbols = Vec::with_capacity(4);
    for (slot, &raw) in group.iter().enumerate() {
        let v = raw as usize;
        if slot > 0 && v == 0 {
            continue;
        }
        let sym = if v < alphabet_size {
            alphabet[v] as u32
        } else {
            (v - alphabet_size) as u32 + FIRST_NONTERMINAL
        };
        symbols.push(sym);
    }
    if symbols.is_empty() {
        return Err(malformed(path, "a symbol group decoded to no symbols"));
    }
    Ok(symbols)
}

fn read_groups(bytes: &[u8], path: &Path) -> Result<Vec<[u8; 4]>> {
    if bytes.len() % 4 != 0 {
        return Err(malformed(
            path,
            format!("trailing {} bytes do not form a full 4-byte group", bytes.len() % 4),
        ));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| [c[0], c[1], c[2], c[3]])
        .collect())
}

fn read_alphabet(bytes: &[u8], path: &Path) -> Result<(usize, Vec<u8>)> {
    if bytes.len() < 4 {
        return Err(malformed(path, "file is shorter than the alphabet-size header"));
    }
    let alphabet_size = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
    if bytes.len() < 4 + alphabet_size {
        return Err(malformed(path, "file is shorter than its declared alphabet"));
    }
    let alphabet = bytes[4..4 + alphabet_size].to_vec();
    Ok((4 + alphabet_size, alphabet))
}

fn validate_symbols(symbols: &[u32], num_rules: usize, path: &Path) -> Result<()> {
    let max_nonterminal = FIRST_NONTERMINAL + num_rules as u32;
    for &sym in symbols {
        if sym >= max_nonterminal {
            return Err(malformed(path, format!("symbol id {} is out of range", sym)));
        }
    }
    Ok(())
}

pub(crate) fn load(path_c: &Path, path_r: &Path) -> Result<Grammar> {
    let r_bytes = read_file(path_r)?;
    let (header_len, alphabet) = read_alphabet(&r_bytes, path_r)?;
    let groups = read_groups(&r_bytes[header_len..], path_r)?;
    if groups.len() % 2 != 0 {
        return Err(malformed(path_r, "an odd number of symbol groups cannot pair into rules"));
    }

    let mut rules: Vec<Vec<u32>> = Vec::with_capacity(groups.len() / 2);
    for pair in groups.chunks_exact(2) {
        let mut rhs = decode_group(&pair[0], &alphabet, path_r)?;
        rhs.extend(decode_group(&pair[1], &alphabet, path_r)?);
        rules.push(rhs);
    }
    let num_rules = rules.len();
    for rhs in &rules {
        validate_symbols(rhs, num_rules, path_r)?;
    }

    let c_bytes = read_file(path_c)?;
    let start_groups = read_groups(&c_bytes, path_c)?;
    let mut start_rule = Vec::new();
    for group in &start_groups {
        start_rule.extend(decode_group(group, &alphabet, path_c)?);
    }
    validate_symbols(&start_rule, num_rules, path_c)?;

    let grammar = Grammar::from_parts(rules, start_rule);
    info!(
        "loaded Navarro grammar from {:?}/{:?}: {} rules, text length {}",
        path_c,
        path_r,
        num_rules,
        grammar.text_length()
    );
    Ok(grammar)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TempFile {
        path: std::path::PathBuf,
    }

    impl TempFile {
        fn with_contents(name: &str, bytes: &[u8]) -> Self {
            let mut path = std::env::temp_dir();
            path.push(format!(
                "cdawg-index-navarro-test-{:?}-{}",
                std::thread::current().id(),
                name
            ));
            std::fs::write(&path, bytes).expect("write fixture");
            TempFile { path }
        }
    }

    impl Drop for TempFile {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.path);
        }
    }

    /// Builds a ".R"/".C" fixture pair for the grammar `A -> a b`, start `A A b` (text "ababb"),
    /// with a two-entry alphabet {a, b}.
    fn fixture_pair() -> (TempFile, TempFile) {
        let mut r_bytes = vec![2, 0, 0, 0]; // alphabet_size = 2
        r_bytes.extend_from_slice(&[b'a', b'b']); // alphabet[0] = 'a', alphabet[1] = 'b'
        // rule A -> a b: group1 = [0,0,0,0] (terminal index 0 = 'a'), group2 = [1,0,0,0] ('b')
        r_bytes.extend_from_slice(&[0, 0, 0, 0]);
        r_bytes.extend_from_slice(&[1, 0, 0, 0]);

        // start rule A A b: non-terminal A has raw value alphabet_size + 0 = 2.
        let c_bytes: Vec<u8> = vec![2, 0, 0, 0, 2, 0, 0, 0, 1, 0, 0, 0];

        (
            TempFile::with_contents("c", &c_bytes),
            TempFile::with_contents("r", &r_bytes),
        )
    }

    #[test]
    fn loads_a_well_formed_fixture() {
        let (c, r) = fixture_pair();
        let grammar = load(&c.path, &r.path).unwrap();
        let decoded: Vec<u8> = grammar.iter_from(0).unwrap().collect();
        assert_eq!(decoded, b"ababb");
    }

    #[test]
    fn rejects_odd_group_count_in_rules() {
        let (c, _r) = fixture_pair();
        let bad_r = TempFile::with_contents("r-odd", &[2, 0, 0, 0, b'a', b'b', 0, 0, 0, 0]);
        assert!(load(&c.path, &bad_r.path).is_err());
    }

    #[test]
    fn rejects_truncated_group() {
        let (c, _r) = fixture_pair();
        let bad_r = TempFile::with_contents("r-trunc", &[2, 0, 0, 0, b'a', b'b', 0, 0, 0]);
        assert!(matches!(
            load(&c.path, &bad_r.path),
            Err(GrammarError::Malformed { .. })
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let missing = Path::new("/nonexistent/path/to/grammar");
        assert!(matches!(
            load(missing, missing),
            Err(GrammarError::Io { .. })
        ));
    }
}
