use regex::Regex;
use std::ops::Range;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Folders never descended into during a code search. Dependency and
/// build-output trees dwarf the sources and cannot contain function
/// declarations we care about.
const EXCLUDED_DIRS: &[&str] = &[".git", "node_modules", "obj", "target", ".vs", ".idea"];

/// A file located by [`find_first_match`] / [`find_all_matches`].
///
/// `offset`/`length` describe the content-regex match when one was
/// supplied, and are zero otherwise.
#[derive(Debug, Clone)]
pub struct FileMatch {
    pub file_path: PathBuf,
    pub content: String,
    pub offset: usize,
    pub length: usize,
}

fn is_excluded(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| EXCLUDED_DIRS.contains(&name))
}

fn match_file(path: &Path, content_regex: Option<&Regex>) -> Option<FileMatch> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            log::warn!("failed to read {}: {err}", path.display());
            return None;
        }
    };
    match content_regex {
        Some(regex) => {
            let m = regex.find(&content)?;
            let (offset, length) = (m.start(), m.len());
            Some(FileMatch {
                file_path: path.to_path_buf(),
                content,
                offset,
                length,
            })
        }
        None => Some(FileMatch {
            file_path: path.to_path_buf(),
            content,
            offset: 0,
            length: 0,
        }),
    }
}

fn walk_matches<'a>(
    root: &Path,
    name_regex: &'a Regex,
    content_regex: Option<&'a Regex>,
) -> impl Iterator<Item = FileMatch> + 'a {
    WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| !is_excluded(entry))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                log::warn!("walk error: {err}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(move |entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| name_regex.is_match(name))
        })
        .filter_map(move |entry| match_file(entry.path(), content_regex))
}

/// Depth-first search for the first file whose name matches
/// `name_regex` and, when supplied, whose contents match
/// `content_regex`. Order is unspecified; first match wins. Absence is
/// `None`, not an error.
pub fn find_first_match(
    root: &Path,
    name_regex: &Regex,
    content_regex: Option<&Regex>,
) -> Option<FileMatch> {
    walk_matches(root, name_regex, content_regex).next()
}

/// Like [`find_first_match`] but collects every matching file.
pub fn find_all_matches(
    root: &Path,
    name_regex: &Regex,
    content_regex: Option<&Regex>,
) -> Vec<FileMatch> {
    walk_matches(root, name_regex, content_regex).collect()
}

/// Byte range of the bracket-balanced block starting at `start_offset`.
///
/// Characters in `ignorable` are skipped, then `open` is expected;
/// anything else yields `None`. Nesting is counted with no awareness of
/// string literals or comments (a deliberate heuristic limitation). The
/// returned range includes both brackets.
pub fn bracketed_block_range(
    text: &str,
    start_offset: usize,
    open: char,
    close: char,
    ignorable: &str,
) -> Option<Range<usize>> {
    let tail = text.get(start_offset..)?;
    let mut chars = tail.char_indices();

    let open_at = loop {
        let (idx, ch) = chars.next()?;
        if ch == open {
            break start_offset + idx;
        }
        if !ignorable.contains(ch) {
            return None;
        }
    };

    let mut depth = 1usize;
    for (idx, ch) in chars {
        if ch == open {
            depth += 1;
        } else if ch == close {
            depth -= 1;
            if depth == 0 {
                return Some(open_at..start_offset + idx + ch.len_utf8());
            }
        }
    }
    None
}

/// The bracket-balanced substring (brackets included) starting at
/// `start_offset`, or `None` when the block is absent or unbalanced.
pub fn extract_bracketed_block<'a>(
    text: &'a str,
    start_offset: usize,
    open: char,
    close: char,
    ignorable: &str,
) -> Option<&'a str> {
    bracketed_block_range(text, start_offset, open, close, ignorable).map(|range| &text[range])
}

/// 1-based line number of a byte offset.
#[must_use]
pub fn offset_to_line_number(text: &str, offset: usize) -> usize {
    let end = offset.min(text.len());
    text.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}
