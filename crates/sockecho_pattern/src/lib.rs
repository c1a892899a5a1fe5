//! Named capture extraction on top of `regex`.
//!
//! A pattern is compiled once into a [`CompiledPattern`] and can then be
//! matched any number of times, from any number of threads. Each match pulls
//! a caller chosen list of named groups out of the subject:
//!
//! ```
//! use sockecho_pattern::{compile, match_extract, Flags};
//!
//! let pattern = compile(r"(?P<key>\w+)=(?P<value>\w+)", Flags::UTF).unwrap();
//! let captures = match_extract(&pattern, "answer=42", &["key", "value", "other"]).unwrap();
//!
//! assert_eq!(captures[0].value.as_deref(), Some("answer"));
//! assert_eq!(captures[1].value.as_deref(), Some("42"));
//! assert_eq!(captures[2].value, None);
//! ```

#[cfg(test)]
mod tests;

mod alloc;
mod engine;
mod error;
mod flags;
mod names;

pub use alloc::{HeapAlloc, TextAlloc};
pub use error::{AllocError, CompileError, MatchError};
pub use flags::Flags;

use engine::Engine;
use names::Rewrite;
use regex::bytes::Captures;
use std::borrow::Cow;
use std::fmt::{Debug, Formatter};
use tracing::{debug, error, info, trace, warn};

/// A compiled pattern. Dropping it releases the compiled program.
pub struct CompiledPattern {
    engine: Engine,
    source: String,
    groups: Vec<GroupSlot>,
}

/// A group name with every capture index declared under it, in pattern order.
struct GroupSlot {
    name: String,
    indices: Vec<usize>,
}

/// One requested group of a match. `value` is `None` when the group did not
/// take part in the match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedCapture<T = String> {
    pub name: String,
    pub value: Option<T>,
}

pub fn compile(pattern: &str, flags: Flags) -> Result<CompiledPattern, CompileError> {
    if pattern.is_empty() {
        error!("could not compile an empty pattern");
        return Err(CompileError::WrongArgs);
    }

    let decls = names::scan(pattern, flags.contains(Flags::EXTENDED));
    let rewrite = if flags.contains(Flags::DUPNAMES) {
        Rewrite::dedup(pattern, &decls)
    } else {
        Rewrite::identity(pattern)
    };

    // The engine reports syntax errors as text only, the parser gives us the span.
    if let Err(err) = flags.syntax_parser().parse(rewrite.text()) {
        let (message, offset) = syntax_error(&err);
        let offset = rewrite.source_offset(offset);
        error!(offset, %message, "pattern compilation failed");
        return Err(CompileError::WrongPattern {
            message,
            offset: Some(offset),
        });
    }

    let regex = flags
        .regex_builder(rewrite.text())
        .build()
        .map_err(|err| match err {
            regex::Error::CompiledTooBig(limit) => {
                error!(limit, "compiled pattern too big");
                CompileError::ResourceError
            }
            err => {
                error!(%err, "pattern compilation failed");
                CompileError::WrongPattern {
                    message: err.to_string(),
                    offset: None,
                }
            }
        })?;

    let mut groups: Vec<GroupSlot> = vec![];
    for (index, internal) in regex.capture_names().enumerate() {
        let Some(internal) = internal else { continue };
        let name = rewrite.public_name(internal);
        match groups.iter_mut().find(|slot| slot.name == name) {
            Some(slot) => slot.indices.push(index),
            None => groups.push(GroupSlot {
                name: name.to_string(),
                indices: vec![index],
            }),
        }
    }

    let engine = Engine::build(regex, rewrite.text(), flags);
    info!(
        groups = groups.len(),
        accelerated = engine.is_accelerated(),
        "pattern compiled"
    );

    Ok(CompiledPattern {
        engine,
        source: pattern.to_string(),
        groups,
    })
}

/// Matches `subject` once and copies out the groups named in `names`.
///
/// The result has one entry per requested name, in the same order. See
/// [`match_extract_with`] for the details.
pub fn match_extract<N: AsRef<str>>(
    pattern: &CompiledPattern,
    subject: &str,
    names: &[N],
) -> Result<Vec<NamedCapture>, MatchError> {
    match_extract_with(pattern, subject, names, &HeapAlloc)
}

/// Like [`match_extract`], copying captured text through `alloc`.
///
/// A group that did not participate, or a name the pattern never declared,
/// yields an entry without a value. When a name is declared more than once the
/// first declaration that participated wins.
///
/// If `alloc` fails, everything collected so far by this call is dropped and
/// [`MatchError::ResourceError`] is returned.
pub fn match_extract_with<N: AsRef<str>, A: TextAlloc>(
    pattern: &CompiledPattern,
    subject: &str,
    names: &[N],
    alloc: &A,
) -> Result<Vec<NamedCapture<A::Text>>, MatchError> {
    if names.is_empty() {
        error!("no group names to extract");
        return Err(MatchError::WrongArgs);
    }

    let captures = match pattern.engine.captures(subject.as_bytes()) {
        Some(captures) => captures,
        None => {
            debug!(subject, "no match");
            return Err(MatchError::NoMatch);
        }
    };
    debug!(
        count = captures.iter().filter(Option::is_some).count(),
        "match"
    );
    trace!(groups = names.len(), "extracting");

    let mut collected = Vec::with_capacity(names.len());
    for name in names {
        let name = name.as_ref();
        let value = match pattern.group_text(subject, &captures, name) {
            Some(text) => {
                trace!(group = name, value = %text, "found");
                let copy = alloc.copy(&text).map_err(|err| {
                    error!(group = name, %err, "could not store captured group");
                    MatchError::ResourceError(err)
                })?;
                Some(copy)
            }
            None => {
                trace!(group = name, "not set");
                None
            }
        };
        collected.push(NamedCapture {
            name: name.to_string(),
            value,
        });
    }

    debug!(
        filled = collected.iter().filter(|c| c.value.is_some()).count(),
        "groups extracted"
    );
    Ok(collected)
}

/// Releases a compiled pattern. `None` is accepted and ignored.
///
/// Captures extracted earlier own their text and stay valid.
pub fn release(pattern: Option<CompiledPattern>) {
    drop(pattern);
}

impl CompiledPattern {
    /// The pattern as it was passed to [`compile`].
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether matching runs through the accelerated pre-pass.
    ///
    /// Only set when [`Flags::JIT`] was requested and the pre-pass could be
    /// built. Results are the same either way.
    pub fn is_accelerated(&self) -> bool {
        self.engine.is_accelerated()
    }

    /// Declared group names, duplicates listed once.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|slot| slot.name.as_str())
    }

    // Without `Flags::UTF` a group may end inside a multi-byte character,
    // such text is copied lossily.
    fn group_text<'h>(
        &self,
        subject: &'h str,
        captures: &Captures<'h>,
        name: &str,
    ) -> Option<Cow<'h, str>> {
        let Some(slot) = self.groups.iter().find(|slot| slot.name == name) else {
            warn!(group = name, "pattern declares no such group");
            return None;
        };
        let m = slot.indices.iter().find_map(|i| captures.get(*i))?;
        Some(match subject.get(m.range()) {
            Some(text) => Cow::Borrowed(text),
            None => String::from_utf8_lossy(m.as_bytes()),
        })
    }
}

impl Debug for CompiledPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledPattern")
            .field("source", &self.source)
            .field("accelerated", &self.is_accelerated())
            .finish()
    }
}

impl Drop for CompiledPattern {
    fn drop(&mut self) {
        trace!(regex = self.engine.regex().as_str(), "releasing compiled pattern");
    }
}

fn syntax_error(err: &regex_syntax::Error) -> (String, usize) {
    match err {
        regex_syntax::Error::Parse(err) => (err.kind().to_string(), err.span().start.offset),
        regex_syntax::Error::Translate(err) => (err.kind().to_string(), err.span().start.offset),
        err => (err.to_string(), 0),
    }
}
