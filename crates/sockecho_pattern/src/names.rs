//! Group name bookkeeping.
//!
//! The engine rejects a pattern that declares the same group name twice. When
//! duplicates are allowed, every repeated declaration is renamed to a unique
//! internal name before compiling and the public name is kept in a lookup
//! table, so callers still ask for the name they wrote.

use std::collections::HashSet;
use std::iter::Peekable;
use std::str::CharIndices;

/// One `(?P<name>` or `(?<name>` found in a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GroupDecl {
    pub name: String,
    /// Byte offset of the first character of the name.
    pub at: usize,
}

/// Pattern text handed to the engine plus enough history to map engine
/// offsets and group names back to what the caller wrote.
#[derive(Debug)]
pub(crate) struct Rewrite {
    text: String,
    edits: Vec<Edit>,
}

#[derive(Debug)]
struct Edit {
    at: usize,
    old_len: usize,
    new_len: usize,
    internal: String,
    public: String,
}

struct Scanner<'a> {
    iter: Peekable<CharIndices<'a>>,
    data: &'a str,
    extended: bool,
    /// Extended mode outside each open group, innermost last.
    outer: Vec<bool>,
}

pub(crate) fn scan(pattern: &str, extended: bool) -> Vec<GroupDecl> {
    let mut scanner = Scanner {
        iter: pattern.char_indices().peekable(),
        data: pattern,
        extended,
        outer: vec![],
    };
    let mut decls = vec![];

    while let Some((_, c)) = scanner.iter.next() {
        match c {
            '\\' => {
                let _ = scanner.iter.next();
            }
            '[' => scanner.skip_class(),
            '#' if scanner.extended => scanner.skip_comment(),
            '(' => {
                scanner.outer.push(scanner.extended);
                if let Some(decl) = scanner.group_open() {
                    decls.push(decl);
                }
            }
            ')' => {
                if let Some(extended) = scanner.outer.pop() {
                    scanner.extended = extended;
                }
            }
            _ => (),
        }
    }

    decls
}

impl<'a> Scanner<'a> {
    fn peek(&mut self) -> Option<char> {
        self.iter.peek().map(|(_, c)| *c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            let _ = self.iter.next();
            true
        } else {
            false
        }
    }

    // Called right after the opening `[`. Handles nesting, `[:class:]` and a
    // leading literal `]`.
    fn skip_class(&mut self) {
        let _ = self.eat('^');
        let _ = self.eat(']');
        let mut depth = 1;

        while let Some((_, c)) = self.iter.next() {
            match c {
                '\\' => {
                    let _ = self.iter.next();
                }
                '[' if self.eat(':') => {
                    while let Some((_, c)) = self.iter.next() {
                        if c == ':' && self.eat(']') {
                            break;
                        }
                    }
                }
                '[' => {
                    let _ = self.eat('^');
                    depth += 1;
                }
                ']' => {
                    depth -= 1;
                    if depth == 0 {
                        return;
                    }
                }
                _ => (),
            }
        }
    }

    fn skip_comment(&mut self) {
        for (_, c) in self.iter.by_ref() {
            if c == '\n' {
                return;
            }
        }
    }

    // Called right after `(`.
    fn group_open(&mut self) -> Option<GroupDecl> {
        if !self.eat('?') {
            return None;
        }
        match self.peek() {
            Some('P' | '<') => self.group_name(),
            _ => {
                self.inline_flags();
                None
            }
        }
    }

    // `(?flags)` switches the enclosing group, `(?flags:` only the new one.
    fn inline_flags(&mut self) {
        let mut negated = false;
        let mut extended = None;

        while let Some(c) = self.peek() {
            match c {
                '-' => negated = true,
                'x' => extended = Some(!negated),
                ':' => {
                    let _ = self.iter.next();
                    if let Some(extended) = extended {
                        self.extended = extended;
                    }
                    return;
                }
                ')' => {
                    let _ = self.iter.next();
                    let _ = self.outer.pop();
                    if let Some(extended) = extended {
                        self.extended = extended;
                    }
                    return;
                }
                c if c.is_ascii_alphabetic() => (),
                _ => return,
            }
            let _ = self.iter.next();
        }
    }

    fn group_name(&mut self) -> Option<GroupDecl> {
        let _ = self.eat('P');
        if self.peek() != Some('<') {
            return None;
        }
        let _ = self.iter.next();
        // `(?<=` and `(?<!` are look-behinds, not names
        if matches!(self.peek(), Some('=' | '!') | None) {
            return None;
        }

        let (start, _) = *self.iter.peek()?;
        while let Some((i, c)) = self.iter.next() {
            if c == '>' {
                return Some(GroupDecl {
                    name: self.data[start..i].to_string(),
                    at: start,
                });
            }
        }
        None
    }
}

impl Rewrite {
    /// The pattern as written, untouched.
    pub fn identity(pattern: &str) -> Self {
        Self {
            text: pattern.to_string(),
            edits: vec![],
        }
    }

    /// Renames the second and later declarations of every name.
    pub fn dedup(pattern: &str, decls: &[GroupDecl]) -> Self {
        let taken: HashSet<&str> = decls.iter().map(|d| d.name.as_str()).collect();
        let mut seen = HashSet::new();
        let mut edits = vec![];

        for decl in decls {
            if seen.insert(decl.name.as_str()) {
                continue;
            }
            let mut n = edits.len() + 1;
            let internal = loop {
                let candidate = format!("{}__dup{}", decl.name, n);
                if !taken.contains(candidate.as_str()) {
                    break candidate;
                }
                n += 1;
            };
            edits.push(Edit {
                at: decl.at,
                old_len: decl.name.len(),
                new_len: internal.len(),
                internal,
                public: decl.name.clone(),
            });
        }

        let mut text = String::with_capacity(pattern.len() + edits.len() * 8);
        let mut last = 0;
        for edit in &edits {
            text.push_str(&pattern[last..edit.at]);
            text.push_str(&edit.internal);
            last = edit.at + edit.old_len;
        }
        text.push_str(&pattern[last..]);

        Self { text, edits }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Maps an internal group name back to the name the caller declared.
    pub fn public_name<'s>(&'s self, internal: &'s str) -> &'s str {
        self.edits
            .iter()
            .find(|e| e.internal == internal)
            .map(|e| e.public.as_str())
            .unwrap_or(internal)
    }

    /// Maps a byte offset in [`Rewrite::text`] back into the caller's pattern.
    /// Offsets inside a renamed group name land on the start of that name.
    pub fn source_offset(&self, offset: usize) -> usize {
        let mut grown = 0;
        for edit in &self.edits {
            let at = edit.at + grown;
            if offset < at {
                break;
            }
            if offset < at + edit.new_len {
                return edit.at;
            }
            grown += edit.new_len - edit.old_len;
        }
        offset - grown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(pattern: &str, extended: bool) -> Vec<String> {
        scan(pattern, extended).into_iter().map(|d| d.name).collect()
    }

    #[test]
    fn both_spellings() {
        assert_eq!(names(r"(?P<a>x)(?<b>y)(z)", false), vec!["a", "b"]);
    }

    #[test]
    fn escapes_and_classes_are_skipped() {
        assert_eq!(names(r"\(?P<no>x)[(?P<nope>][[:alpha:]](?P<yes>.)", false), vec!["yes"]);
        assert_eq!(names(r"[]\]](?P<k>.)", false), vec!["k"]);
    }

    #[test]
    fn non_capturing_and_lookaround() {
        assert_eq!(names(r"(?:a)(?i)(?<=x)(?<!y)(?P<n>b)", false), vec!["n"]);
    }

    #[test]
    fn comments_only_in_extended_mode() {
        assert_eq!(names("# (?P<c>x)\n(?P<d>y)", true), vec!["d"]);
        assert_eq!(names("# (?P<c>x)\n(?P<d>y)", false), vec!["c", "d"]);
    }

    #[test]
    fn inline_extended_mode() {
        assert_eq!(names("(?P<a>c)|(?-x:#(?P<b>d))", true), vec!["a", "b"]);
        assert_eq!(names("(?x)# (?P<c>x)\n(?P<d>y)", false), vec!["d"]);
        // scoped to the group
        assert_eq!(names("(?x:# (?P<c>x)\n)(?P<d>y)#(?P<e>z)", false), vec!["d", "e"]);
        // until the enclosing group closes
        assert_eq!(names("((?x)# (?P<c>x)\n)#(?P<e>z)", false), vec!["e"]);
        assert_eq!(names("(?i)#(?P<f>z)", false), vec!["f"]);
    }

    #[test]
    fn dedup_renames_later_declarations() {
        let pattern = "(?P<p>a)|(?P<p>b)";
        let rewrite = Rewrite::dedup(pattern, &scan(pattern, false));

        assert_eq!(rewrite.text(), "(?P<p>a)|(?P<p__dup1>b)");
        assert_eq!(rewrite.public_name("p__dup1"), "p");
        assert_eq!(rewrite.public_name("p"), "p");
    }

    #[test]
    fn dedup_avoids_taken_names() {
        let pattern = "(?P<p>a)(?P<p__dup1>b)|(?P<p>c)";
        let rewrite = Rewrite::dedup(pattern, &scan(pattern, false));

        assert_eq!(rewrite.text(), "(?P<p>a)(?P<p__dup1>b)|(?P<p__dup2>c)");
    }

    #[test]
    fn offsets_map_back() {
        let pattern = "(?P<p>a)|(?P<p>b)(";
        let rewrite = Rewrite::dedup(pattern, &scan(pattern, false));

        // before the edit
        assert_eq!(rewrite.source_offset(3), 3);
        // inside the renamed name
        assert_eq!(rewrite.source_offset(17), 13);
        // trailing `(` sits at 17 in the source and 23 after the rename
        assert_eq!(rewrite.source_offset(23), 17);
    }
}
