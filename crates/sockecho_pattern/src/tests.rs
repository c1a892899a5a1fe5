use super::*;
use pretty_assertions::assert_eq;
use std::cell::Cell;
use std::rc::Rc;

fn values<T: AsRef<str>>(captures: &[NamedCapture<T>]) -> Vec<Option<&str>> {
    captures
        .iter()
        .map(|c| c.value.as_ref().map(|v| v.as_ref()))
        .collect()
}

#[test]
fn extract_in_requested_order() {
    let pattern = compile(r"(?P<user>\w+)@(?P<domain>[\w.]+)", Flags::UTF).unwrap();
    let captures = match_extract(&pattern, "ada@example.org", &["domain", "user"]).unwrap();

    assert_eq!(captures[0].name, "domain");
    assert_eq!(values(&captures), vec![Some("example.org"), Some("ada")]);
}

#[test]
fn unset_groups_are_absent() {
    let pattern = compile(r"^(?:(?P<num>\d+)|(?P<word>[a-z]+))$", Flags::empty()).unwrap();

    let captures = match_extract(&pattern, "1234", &["num", "word"]).unwrap();
    assert_eq!(values(&captures), vec![Some("1234"), None]);

    let captures = match_extract(&pattern, "abc", &["num", "word"]).unwrap();
    assert_eq!(values(&captures), vec![None, Some("abc")]);
}

#[test]
fn unknown_names_are_absent() {
    let pattern = compile(r"(?P<a>x)", Flags::empty()).unwrap();
    let captures = match_extract(&pattern, "x", &["a", "missing"]).unwrap();

    assert_eq!(values(&captures), vec![Some("x"), None]);
}

#[test]
fn no_match() {
    let pattern = compile(r"^(?P<a>\d+)$", Flags::empty()).unwrap();

    assert_eq!(
        match_extract(&pattern, "12a", &["a"]).unwrap_err(),
        MatchError::NoMatch
    );
}

#[test]
fn wrong_args() {
    assert_eq!(compile("", Flags::UTF).unwrap_err(), CompileError::WrongArgs);

    let pattern = compile("a", Flags::empty()).unwrap();
    let names: [&str; 0] = [];
    assert_eq!(
        match_extract(&pattern, "a", &names).unwrap_err(),
        MatchError::WrongArgs
    );
}

#[test]
fn wrong_pattern_reports_offset() {
    match compile("ab(c", Flags::empty()).unwrap_err() {
        CompileError::WrongPattern { offset, .. } => assert_eq!(offset, Some(2)),
        err => panic!("unexpected error {:?}", err),
    }
}

#[test]
fn offsets_point_into_the_original_pattern() {
    match compile("(?P<p>a)|(?P<p>b)(", Flags::DUPNAMES).unwrap_err() {
        CompileError::WrongPattern { offset, .. } => assert_eq!(offset, Some(17)),
        err => panic!("unexpected error {:?}", err),
    }
}

#[test]
fn duplicate_names_need_the_flag() {
    let source = r"^(?:(?P<v>\d+)|x(?P<v>[a-z]+))$";

    assert!(matches!(
        compile(source, Flags::empty()),
        Err(CompileError::WrongPattern { offset: Some(_), .. })
    ));

    let pattern = compile(source, Flags::DUPNAMES).unwrap();
    assert_eq!(pattern.group_names().collect::<Vec<_>>(), vec!["v"]);

    let captures = match_extract(&pattern, "42", &["v"]).unwrap();
    assert_eq!(values(&captures), vec![Some("42")]);

    let captures = match_extract(&pattern, "xyz", &["v"]).unwrap();
    assert_eq!(values(&captures), vec![Some("yz")]);
}

#[test]
fn inline_flags_scope_comments() {
    let pattern = compile(
        "(?P<a>c)|(?-x:#(?P<a>d))",
        Flags::EXTENDED | Flags::DUPNAMES,
    )
    .unwrap();

    assert_eq!(
        values(&match_extract(&pattern, "#d", &["a"]).unwrap()),
        vec![Some("d")]
    );
    assert_eq!(
        values(&match_extract(&pattern, "c", &["a"]).unwrap()),
        vec![Some("c")]
    );
}

#[test]
fn first_participating_duplicate_wins() {
    let pattern = compile(r"(?P<v>a)?(?P<v>b)", Flags::DUPNAMES).unwrap();

    let captures = match_extract(&pattern, "ab", &["v"]).unwrap();
    assert_eq!(values(&captures), vec![Some("a")]);

    let captures = match_extract(&pattern, "b", &["v"]).unwrap();
    assert_eq!(values(&captures), vec![Some("b")]);
}

#[test]
fn flags_change_matching() {
    let plain = compile(r"^(?P<w>abc)$", Flags::empty()).unwrap();
    let caseless = compile(r"^(?P<w>abc)$", Flags::CASELESS).unwrap();

    assert!(match_extract(&plain, "ABC", &["w"]).is_err());
    assert_eq!(
        values(&match_extract(&caseless, "ABC", &["w"]).unwrap()),
        vec![Some("ABC")]
    );

    let extended = compile(
        "^ (?P<a> \\d+ ) # digits\n - (?P<b> \\d+ ) $",
        Flags::EXTENDED,
    )
    .unwrap();
    assert_eq!(
        values(&match_extract(&extended, "12-34", &["a", "b"]).unwrap()),
        vec![Some("12"), Some("34")]
    );

    let multi = compile(r"^(?P<line>b)$", Flags::MULTILINE).unwrap();
    assert!(match_extract(&multi, "a\nb\nc", &["line"]).is_ok());
}

#[test]
fn dollar_matches_only_at_the_end() {
    let pattern = compile(r"^(?P<a>x)$", Flags::empty()).unwrap();

    assert_eq!(
        match_extract(&pattern, "x\n", &["a"]).unwrap_err(),
        MatchError::NoMatch
    );
    assert!(match_extract(&pattern, "x", &["a"]).is_ok());
}

#[test]
fn utf_switches_to_code_points() {
    let bytes = compile(r"^(?P<w>\w+)$", Flags::empty()).unwrap();
    let utf = compile(r"^(?P<w>\w+)$", Flags::UTF).unwrap();

    assert_eq!(
        match_extract(&bytes, "héllo", &["w"]).unwrap_err(),
        MatchError::NoMatch
    );
    assert_eq!(
        values(&match_extract(&utf, "héllo", &["w"]).unwrap()),
        vec![Some("héllo")]
    );

    // a byte-wise group may split a character
    let split = compile(r"^(?P<head>.)", Flags::empty()).unwrap();
    assert_eq!(
        values(&match_extract(&split, "é", &["head"]).unwrap()),
        vec![Some("\u{FFFD}")]
    );
}

#[test]
fn jit_is_transparent() {
    let source = r"^(?P<a>[a-z]+)-(?P<b>[0-9]+)$";
    let standard = compile(source, Flags::UTF).unwrap();
    let jit = compile(source, Flags::UTF | Flags::JIT).unwrap();

    assert!(!standard.is_accelerated());
    assert!(jit.is_accelerated());

    for subject in ["abc-123", "abc-", "-1", "x-9"] {
        let names = ["a", "b"];
        assert_eq!(
            match_extract(&standard, subject, &names),
            match_extract(&jit, subject, &names)
        );
    }
}

#[test]
fn jit_falls_back() {
    // dense DFAs do not support unicode word boundaries
    let pattern = compile(r"\b(?P<w>word)\b", Flags::UTF | Flags::JIT).unwrap();

    assert!(!pattern.is_accelerated());
    assert_eq!(
        values(&match_extract(&pattern, "a word here", &["w"]).unwrap()),
        vec![Some("word")]
    );
}

#[test]
fn captures_outlive_the_pattern() {
    let pattern = compile(r"(?P<a>.+)", Flags::empty()).unwrap();
    let captures = match_extract(&pattern, "kept", &["a"]).unwrap();
    release(Some(pattern));
    release(None);

    assert_eq!(values(&captures), vec![Some("kept")]);
}

#[test]
fn shareable_between_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<CompiledPattern>();

    let pattern = compile(r"^(?P<n>\d+)$", Flags::JIT).unwrap();
    std::thread::scope(|scope| {
        for i in 0..4 {
            let pattern = &pattern;
            scope.spawn(move || {
                let subject = i.to_string();
                let captures = match_extract(pattern, &subject, &["n"]).unwrap();
                assert_eq!(captures[0].value.as_deref(), Some(subject.as_str()));
            });
        }
    });
}

/// Hands out copies that count themselves, failing once `budget` is spent.
struct Tracking {
    live: Rc<Cell<usize>>,
    budget: Cell<usize>,
}

#[derive(Debug)]
struct Tracked {
    text: String,
    live: Rc<Cell<usize>>,
}

impl Tracking {
    fn new(budget: usize) -> Self {
        Self {
            live: Rc::new(Cell::new(0)),
            budget: Cell::new(budget),
        }
    }
}

impl TextAlloc for Tracking {
    type Text = Tracked;

    fn copy(&self, text: &str) -> Result<Tracked, AllocError> {
        if self.budget.get() == 0 {
            return Err(AllocError {
                requested: text.len(),
            });
        }
        self.budget.set(self.budget.get() - 1);
        self.live.set(self.live.get() + 1);
        Ok(Tracked {
            text: text.to_string(),
            live: self.live.clone(),
        })
    }
}

impl AsRef<str> for Tracked {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.live.set(self.live.get() - 1);
    }
}

#[test]
fn failed_extraction_leaks_nothing() {
    let pattern = compile(r"^(?P<a>\w+):(?P<b>\w+):(?P<c>\w+)$", Flags::UTF).unwrap();
    let alloc = Tracking::new(1);

    let err = match_extract_with(&pattern, "x:y:z", &["a", "b", "c"], &alloc).unwrap_err();

    assert_eq!(err, MatchError::ResourceError(AllocError { requested: 1 }));
    assert_eq!(alloc.live.get(), 0);
}

#[test]
fn successful_extraction_hands_over_ownership() {
    let pattern = compile(r"^(?P<a>\w+):(?P<b>\w+)$", Flags::UTF).unwrap();
    let alloc = Tracking::new(8);

    let captures = match_extract_with(&pattern, "x:y", &["a", "missing", "b"], &alloc).unwrap();
    assert_eq!(alloc.live.get(), 2);
    assert_eq!(values(&captures), vec![Some("x"), None, Some("y")]);

    drop(captures);
    assert_eq!(alloc.live.get(), 0);
}
