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

#[macro_use]
extern crate log;
extern crate flexi_logger;
extern crate itertools;

use std::path::{Path, PathBuf};
use std::time::Instant;

use itertools::Itertools;
use rand::Rng;
use structopt::StructOpt;

use cdawg_index::{Cdawg, Grammar, GrammarError};

#[derive(Debug, StructOpt)]
#[structopt(name = "cdawg-index", about = "Pattern index over grammar-compressed text")]
struct CommandLine {
    /// Increase logging verbosity: -v for info, -vv for debug.
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Build a CDAWG over a grammar and report its size.
    Index {
        #[structopt(possible_values = &["mrrepair", "navarro"])]
        grammar_type: String,
        #[structopt(parse(from_os_str))]
        filename: PathBuf,
    },
    /// Build a CDAWG over a grammar and search it for a pattern.
    Search {
        #[structopt(possible_values = &["mrrepair", "navarro"])]
        grammar_type: String,
        #[structopt(parse(from_os_str))]
        filename: PathBuf,
        pattern: String,
    },
    /// Build a CDAWG and measure average search time over random substrings of the text.
    Benchmark {
        #[structopt(possible_values = &["mrrepair", "navarro"])]
        grammar_type: String,
        #[structopt(parse(from_os_str))]
        filename: PathBuf,
        /// Number of random substrings to sample as queries.
        #[structopt(long, default_value = "100")]
        samples: usize,
        /// Length, in characters, of each sampled substring.
        #[structopt(long, default_value = "8")]
        length: usize,
    },
}

fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let spec = std::env::var("CDAWG_INDEX_LOG").unwrap_or_else(|_| default_level.to_string());
    let _ = flexi_logger::Logger::with_str(spec)
        .format(flexi_logger::with_thread)
        .log_to_file()
        .start();
    info!("logging is ready");
}

fn load_grammar(grammar_type: &str, filename: &Path) -> Result<Grammar, GrammarError> {
    match grammar_type {
        "mrrepair" => Grammar::load_mrrepair(filename),
        "navarro" => {
            let path_c = filename.with_extension("C");
            let path_r = filename.with_extension("R");
            Grammar::load_navarro(path_c, path_r)
        }
        other => {
            // structopt's possible_values already rejects anything else before we get here.
            unreachable!("unsupported grammar type {:?}", other);
        }
    }
}

fn run_index(grammar_type: &str, filename: &Path) -> Result<(), GrammarError> {
    let start = Instant::now();
    let grammar = load_grammar(grammar_type, filename)?;
    let cdawg = Cdawg::build(&grammar)?;
    let elapsed = start.elapsed();
    println!(
        "{} characters, {} nodes, {} edges, built in {:?}",
        grammar.text_length(),
        cdawg.node_count(),
        cdawg.edge_count(),
        elapsed
    );
    Ok(())
}

fn run_search(grammar_type: &str, filename: &Path, pattern: &str) -> Result<(), GrammarError> {
    let grammar = load_grammar(grammar_type, filename)?;
    let cdawg = Cdawg::build(&grammar)?;
    let start = Instant::now();
    let found = cdawg.contains(pattern.as_bytes())?;
    info!(
        "search for {:?}: {} in {:?}",
        pattern,
        if found { "found" } else { "not found" },
        start.elapsed()
    );
    println!("{}", if found { "found" } else { "not found" });
    Ok(())
}

fn run_benchmark(
    grammar_type: &str,
    filename: &Path,
    samples: usize,
    length: usize,
) -> Result<(), GrammarError> {
    let grammar = load_grammar(grammar_type, filename)?;
    let cdawg = Cdawg::build(&grammar)?;
    let text_length = grammar.text_length();

    if length == 0 || length > text_length {
        warn!(
            "sample length {} is outside [1, {}], nothing to benchmark",
            length, text_length
        );
        println!("sample length must be between 1 and {}", text_length);
        return Ok(());
    }

    let mut rng = rand::thread_rng();
    let offsets: Vec<usize> = (0..samples)
        .map(|_| rng.gen_range(0..=(text_length - length)))
        .sorted()
        .dedup()
        .collect();

    let mut total = std::time::Duration::default();
    let mut found_count = 0usize;
    for &offset in &offsets {
        let pattern: Vec<u8> = grammar.iter_from(offset)?.take(length).collect();
        let start = Instant::now();
        if cdawg.contains(&pattern)? {
            found_count += 1;
        }
        total += start.elapsed();
    }

    let avg = if offsets.is_empty() {
        std::time::Duration::default()
    } else {
        total / offsets.len() as u32
    };
    println!(
        "{} samples ({} duplicates removed), avg search time {:?}, {} found",
        offsets.len(),
        samples - offsets.len(),
        avg,
        found_count
    );
    Ok(())
}

fn main() {
    let cmd_line = CommandLine::from_args();
    init_logging(cmd_line.verbose);
    debug!("{:?}", cmd_line);

    let result = match &cmd_line.command {
        Command::Index {
            grammar_type,
            filename,
        } => run_index(grammar_type, filename),
        Command::Search {
            grammar_type,
            filename,
            pattern,
        } => run_search(grammar_type, filename, pattern),
        Command::Benchmark {
            grammar_type,
            filename,
            samples,
            length,
        } => run_benchmark(grammar_type, filename, *samples, *length),
    };

    if let Err(e) = result {
        error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
