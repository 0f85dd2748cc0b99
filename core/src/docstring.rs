//! Numpydoc-style docstring parsing.
//!
//! Only two things are read from a docstring: the first paragraph, used as
//! the task description, and the `Parameters` section, used as per-flag help.
//! Parsing is lenient. A docstring without a recognizable section yields no
//! help, and described names are never checked against the real parameters.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

static ENTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^\s:][^:]*):(.*)$").expect("static regex must compile"));
static PARAGRAPH_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n").expect("static regex must compile"));

/// Normalizes the indentation of a docstring.
///
/// Leading whitespace is stripped from the first line, the common
/// indentation of the remaining lines is removed, and leading and trailing
/// blank lines are dropped.
///
/// # Examples
///
/// ```
/// use scout_task_core::clean_doc;
///
/// let doc = "Summary.\n\n    Parameters\n    ----------\n    x : value\n";
/// assert_eq!(clean_doc(doc), "Summary.\n\nParameters\n----------\nx : value");
/// ```
pub fn clean_doc(doc: &str) -> String {
    let lines: Vec<&str> = doc.lines().collect();
    let indent = lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let cleaned: Vec<&str> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                line.trim_start()
            } else if line.trim().is_empty() {
                ""
            } else {
                line.get(indent..).unwrap_or_else(|| line.trim_start())
            }
        })
        .collect();

    let start = cleaned.iter().position(|line| !line.is_empty());
    let end = cleaned.iter().rposition(|line| !line.is_empty());
    match (start, end) {
        (Some(start), Some(end)) => cleaned[start..=end].join("\n"),
        _ => String::new(),
    }
}

/// Returns the first paragraph of a docstring.
///
/// # Examples
///
/// ```
/// use scout_task_core::description;
///
/// assert_eq!(description("Computes.\n\nLonger text."), "Computes.");
/// assert_eq!(description("Two\nlines.\n  \nRest"), "Two\nlines.");
/// assert_eq!(description(""), "");
/// ```
pub fn description(doc: &str) -> String {
    let doc = clean_doc(doc);
    PARAGRAPH_BREAK_RE
        .split(&doc)
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Extracts per-parameter help from the `Parameters` section of a docstring.
///
/// The section opens with a `Parameters` line (any case) directly followed by
/// a line of dashes. Each entry starts with an unindented `name : ...` line.
/// Indented lines that follow are joined into the help text; an entry without
/// them uses the text after its colon. The section ends at the first
/// unindented line without a colon, or at the end of input.
///
/// # Examples
///
/// ```
/// use scout_task_core::parse_parameter_docs;
///
/// let doc = "\
/// Computes.
///
/// Parameters
/// ----------
/// count : int
///     number of
///     items
/// label : text shown first
///
/// Returns
/// -------
/// str
/// ";
/// let docs = parse_parameter_docs(doc);
/// assert_eq!(docs["count"], "number of items");
/// assert_eq!(docs["label"], "text shown first");
/// assert_eq!(docs.len(), 2);
///
/// assert!(parse_parameter_docs("No sections here.").is_empty());
/// ```
pub fn parse_parameter_docs(doc: &str) -> BTreeMap<String, String> {
    let doc = clean_doc(doc);
    let lines: Vec<&str> = doc.lines().collect();
    let mut docs = BTreeMap::new();

    let Some(start) = find_parameters_section(&lines) else {
        return docs;
    };

    let mut current: Option<Entry<'_>> = None;
    for line in &lines[start..] {
        if line.trim().is_empty() {
            continue;
        }

        if let Some(caps) = ENTRY_RE.captures(line) {
            if let Some(entry) = current.take() {
                entry.finish(&mut docs);
            }
            current = Some(Entry {
                name: caps.get(1).map_or("", |m| m.as_str().trim()),
                inline: caps.get(2).map_or("", |m| m.as_str().trim()),
                body: Vec::new(),
            });
            continue;
        }

        match current.as_mut() {
            Some(entry) if line.starts_with(char::is_whitespace) => entry.body.push(line.trim()),
            _ => break,
        }
    }

    if let Some(entry) = current {
        entry.finish(&mut docs);
    }

    docs
}

/// Returns the index of the first line after the `Parameters` underline.
fn find_parameters_section(lines: &[&str]) -> Option<usize> {
    lines
        .windows(2)
        .position(|pair| pair[0].trim().eq_ignore_ascii_case("parameters") && is_underline(pair[1]))
        .map(|header| header + 2)
}

fn is_underline(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && line.chars().all(|c| c == '-')
}

struct Entry<'a> {
    name: &'a str,
    inline: &'a str,
    body: Vec<&'a str>,
}

impl Entry<'_> {
    fn finish(self, docs: &mut BTreeMap<String, String>) {
        if self.name.is_empty() {
            return;
        }
        let help = if self.body.is_empty() {
            self.inline.to_string()
        } else {
            self.body.join(" ")
        };
        docs.insert(self.name.to_string(), help);
    }
}
