use crate::artifacts::core::error::{BitError, BitResult};
use regex::Regex;

/// A single compiled ignore glob
///
/// - `*` matches any run of characters except `/`
/// - `?` matches one character except `/`
/// - `**` matches any run of characters, `/` included
///
/// A pattern without `/` is tried against every segment of a path. A pattern
/// containing `/` is anchored at the repository root and tried against every
/// directory prefix of the path. A trailing `/` restricts the pattern to
/// directories.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
    anchored: bool,
    directory_only: bool,
}

impl Pattern {
    pub fn new(raw: &str) -> BitResult<Self> {
        let source = raw.trim().to_string();
        let mut body = source.as_str();

        let directory_only = body.ends_with('/');
        body = body.trim_end_matches('/');

        let mut anchored = body.starts_with('/');
        body = body.trim_start_matches('/');
        anchored |= body.contains('/');

        if body.is_empty() {
            return Err(BitError::InvalidConfig(format!(
                "empty ignore pattern '{raw}'"
            )));
        }

        let regex = Regex::new(&glob_to_regex(body)).map_err(|e| {
            BitError::InvalidConfig(format!("invalid ignore pattern '{raw}': {e}"))
        })?;

        Ok(Pattern {
            source,
            regex,
            anchored,
            directory_only,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// `is_dir` tells whether the last segment names a directory
    pub fn matches(&self, segments: &[&str], is_dir: bool) -> bool {
        let last = segments.len();
        let candidate_is_dir = |end: usize| end < last || is_dir;

        if self.anchored {
            (1..=last).any(|end| {
                (!self.directory_only || candidate_is_dir(end))
                    && self.regex.is_match(&segments[..end].join("/"))
            })
        } else {
            segments.iter().enumerate().any(|(i, segment)| {
                (!self.directory_only || candidate_is_dir(i + 1)) && self.regex.is_match(segment)
            })
        }
    }
}

fn glob_to_regex(glob: &str) -> String {
    let mut regex = String::from("^");
    let mut chars = glob.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                if chars.peek() == Some(&'/') {
                    chars.next();
                    regex.push_str("(?:.*/)?");
                } else {
                    regex.push_str(".*");
                }
            }
            '*' => regex.push_str("[^/]*"),
            '?' => regex.push_str("[^/]"),
            other => regex.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }

    regex.push('$');
    regex
}
