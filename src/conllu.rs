//! CoNLL-U file parsing
//!
//! Builds a `Tree` per sentence from CoNLL-U input. Each token keeps its
//! FORM, UPOS and DEPREL, with its word ID as the lexical index. Multiword
//! token ranges and empty nodes carry no basic-tree edges and are skipped.
//!
//! CoNLL-U format: https://universaldependencies.org/format.html

use crate::tree::{Node, NodeId, Tree};
use flate2::read::MultiGzDecoder;
use rustc_hash::FxHashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;
use thiserror::Error;

/// Error during CoNLL-U parsing
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("parse error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("I/O error at line {line}: {source}")]
    Io {
        line: usize,
        #[source]
        source: std::io::Error,
    },
}

impl ParseError {
    fn syntax(line: usize, message: impl Into<String>) -> Self {
        ParseError::Syntax {
            line,
            message: message.into(),
        }
    }

    /// Line the error was detected on
    pub fn line(&self) -> usize {
        match self {
            ParseError::Syntax { line, .. } | ParseError::Io { line, .. } => *line,
        }
    }
}

/// Kind of row in the ID column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenId {
    Single(usize),
    /// Multiword token, e.g. `1-2`
    Range,
    /// Empty node, e.g. `2.1`
    Empty,
}

/// A token row before the tree is linked
struct Row {
    line: usize,
    word: usize,
    head: usize,
    node: Node,
}

/// CoNLL-U reader that iterates over sentences
pub struct CoNLLUReader<R: BufRead> {
    lines: Lines<R>,
    line_num: usize,
}

impl<R: BufRead> CoNLLUReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_num: 0,
        }
    }
}

impl CoNLLUReader<Box<dyn BufRead>> {
    /// Create a reader from a file path; `.gz` files are decompressed
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = File::open(path)?;
        let reader: Box<dyn BufRead> = if path.extension().is_some_and(|ext| ext == "gz") {
            Box::new(BufReader::new(MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };
        Ok(Self::new(reader))
    }
}

impl CoNLLUReader<BufReader<std::io::Cursor<String>>> {
    /// Create a reader from a string
    pub fn from_str(text: &str) -> Self {
        let cursor = std::io::Cursor::new(text.to_string());
        Self::new(BufReader::new(cursor))
    }
}

impl<R: BufRead> Iterator for CoNLLUReader<R> {
    type Item = Result<Tree, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut tree_lines = Vec::new();
        let mut metadata = FxHashMap::default();
        let mut sentence_text = None;

        // Read lines until we hit a blank line (sentence boundary) or EOF
        loop {
            self.line_num += 1;
            match self.lines.next() {
                None => {
                    if tree_lines.is_empty() {
                        return None;
                    }
                    // Last sentence without trailing blank line
                    break;
                }
                Some(Err(source)) => {
                    return Some(Err(ParseError::Io {
                        line: self.line_num,
                        source,
                    }));
                }
                Some(Ok(line)) => {
                    let line = line.trim_end_matches(['\r', '\n']);

                    if line.trim().is_empty() {
                        if !tree_lines.is_empty() {
                            break;
                        }
                        continue;
                    }

                    if let Some(comment) = line.strip_prefix('#') {
                        parse_comment(comment, &mut metadata, &mut sentence_text);
                        continue;
                    }

                    tree_lines.push((self.line_num, line.to_string()));
                }
            }
        }

        Some(parse_tree(tree_lines, sentence_text, metadata))
    }
}

/// Parse a comment line (without its leading `#`)
fn parse_comment(
    comment: &str,
    metadata: &mut FxHashMap<String, String>,
    sentence_text: &mut Option<String>,
) {
    let Some((key, value)) = comment.split_once('=') else {
        return;
    };
    let key = key.trim();
    let value = value.trim();

    if key == "text" {
        *sentence_text = Some(value.to_string());
    } else {
        metadata.insert(key.to_string(), value.to_string());
    }
}

/// Link the token rows of one sentence into a Tree
fn parse_tree(
    lines: Vec<(usize, String)>,
    sentence_text: Option<String>,
    metadata: FxHashMap<String, String>,
) -> Result<Tree, ParseError> {
    let mut rows = Vec::with_capacity(lines.len());
    for (line_num, line) in &lines {
        if let Some(row) = parse_line(line, *line_num)? {
            rows.push(row);
        }
    }

    let Some(first_line) = lines.first().map(|(line_num, _)| *line_num) else {
        return Err(ParseError::syntax(0, "empty sentence"));
    };
    if rows.is_empty() {
        return Err(ParseError::syntax(first_line, "sentence has no word rows"));
    }

    // Word ID -> node id, plus left/right dependent counts per word
    let mut ids: FxHashMap<usize, NodeId> = FxHashMap::default();
    let mut counts: FxHashMap<usize, (usize, usize)> = FxHashMap::default();
    for (i, row) in rows.iter().enumerate() {
        if ids.insert(row.word, i).is_some() {
            return Err(ParseError::syntax(
                row.line,
                format!("duplicate word ID {}", row.word),
            ));
        }
        if row.head != 0 {
            let entry = counts.entry(row.head).or_default();
            if row.word < row.head {
                entry.0 += 1;
            } else {
                entry.1 += 1;
            }
        }
    }

    let mut tree = Tree::with_metadata(sentence_text, metadata);
    let mut links = Vec::with_capacity(rows.len());
    for row in rows {
        let (n_lefts, n_rights) = counts.get(&row.word).copied().unwrap_or_default();
        let id = tree.add_node(row.node.with_counts(n_lefts, n_rights));
        links.push((id, row.head, row.line));
    }

    // Children are attached in word order
    for (id, head, line) in links {
        if head == 0 {
            if tree.root().is_some() {
                return Err(ParseError::syntax(line, "multiple roots"));
            }
            tree.set_root(id)
                .map_err(|e| ParseError::syntax(line, e.to_string()))?;
            continue;
        }
        let Some(&parent) = ids.get(&head) else {
            return Err(ParseError::syntax(line, format!("HEAD {} is not a word ID", head)));
        };
        tree.attach(id, parent)
            .map_err(|e| ParseError::syntax(line, e.to_string()))?;
    }

    if tree.root().is_none() {
        return Err(ParseError::syntax(first_line, "sentence has no root"));
    }

    Ok(tree)
}

/// Parse a single CoNLL-U line
///
/// Returns `None` for multiword tokens and empty nodes.
fn parse_line(line: &str, line_num: usize) -> Result<Option<Row>, ParseError> {
    let fields: Vec<&str> = line.split('\t').collect();

    if fields.len() != 10 {
        return Err(ParseError::syntax(
            line_num,
            format!("Expected 10 fields, found {}", fields.len()),
        ));
    }

    // Field 0: ID
    let word = match parse_id(fields[0], line_num)? {
        TokenId::Single(word) => word,
        TokenId::Range | TokenId::Empty => return Ok(None),
    };

    // Fields 1, 3, 6, 7: FORM, UPOS, HEAD, DEPREL
    let form = fields[1];
    let pos = fields[3];
    let head = parse_head(fields[6], line_num)?;
    let deprel = fields[7];

    Ok(Some(Row {
        line: line_num,
        word,
        head,
        node: Node::new(word, form, pos, deprel),
    }))
}

/// Parse ID field (can be integer, range, or decimal)
fn parse_id(s: &str, line_num: usize) -> Result<TokenId, ParseError> {
    let number = |part: &str| {
        part.parse::<usize>()
            .map_err(|_| ParseError::syntax(line_num, format!("Invalid ID: {}", s)))
    };

    if let Some((start, end)) = s.split_once('-') {
        number(start)?;
        number(end)?;
        Ok(TokenId::Range)
    } else if let Some((main, sub)) = s.split_once('.') {
        number(main)?;
        number(sub)?;
        Ok(TokenId::Empty)
    } else {
        let id = number(s)?;
        if id == 0 {
            return Err(ParseError::syntax(line_num, "word IDs start at 1"));
        }
        Ok(TokenId::Single(id))
    }
}

/// Parse HEAD field; 0 marks the root
fn parse_head(s: &str, line_num: usize) -> Result<usize, ParseError> {
    s.parse()
        .map_err(|_| ParseError::syntax(line_num, format!("Invalid HEAD: {}", s)))
}
