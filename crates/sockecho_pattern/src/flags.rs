use bitflags::bitflags;

bitflags! {
    /// Compile options for [`compile`](crate::compile).
    ///
    /// Everything except [`Flags::JIT`] changes what a pattern matches.
    /// `JIT` only asks for an accelerated pre-pass and never changes results.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Flags: u32 {
        /// Letters match regardless of case.
        const CASELESS  = 1 << 0;
        /// `^` and `$` also match at line boundaries.
        const MULTILINE = 1 << 1;
        /// `.` also matches `\n`.
        const DOTALL    = 1 << 2;
        /// Literal whitespace is ignored and `#` starts a comment.
        const EXTENDED  = 1 << 3;
        /// Match by code point with Unicode aware classes and case folding.
        /// Without it the subject is matched byte by byte.
        const UTF       = 1 << 4;
        /// Swap the meaning of `x*` and `x*?`.
        const UNGREEDY  = 1 << 5;
        /// The same group name may be declared more than once.
        const DUPNAMES  = 1 << 6;

        /// Best-effort accelerated matching, see [`CompiledPattern::is_accelerated`](crate::CompiledPattern::is_accelerated).
        const JIT       = 1 << 29;
    }
}

impl Flags {
    pub(crate) fn regex_builder(self, pattern: &str) -> regex::bytes::RegexBuilder {
        let mut builder = regex::bytes::RegexBuilder::new(pattern);
        builder
            .case_insensitive(self.contains(Flags::CASELESS))
            .multi_line(self.contains(Flags::MULTILINE))
            .dot_matches_new_line(self.contains(Flags::DOTALL))
            .ignore_whitespace(self.contains(Flags::EXTENDED))
            .unicode(self.contains(Flags::UTF))
            .swap_greed(self.contains(Flags::UNGREEDY));
        builder
    }

    pub(crate) fn syntax_parser(self) -> regex_syntax::Parser {
        regex_syntax::ParserBuilder::new()
            .case_insensitive(self.contains(Flags::CASELESS))
            .multi_line(self.contains(Flags::MULTILINE))
            .dot_matches_new_line(self.contains(Flags::DOTALL))
            .ignore_whitespace(self.contains(Flags::EXTENDED))
            .unicode(self.contains(Flags::UTF))
            .swap_greed(self.contains(Flags::UNGREEDY))
            .utf8(false)
            .build()
    }

    pub(crate) fn automata_syntax(self) -> regex_automata::util::syntax::Config {
        regex_automata::util::syntax::Config::new()
            .case_insensitive(self.contains(Flags::CASELESS))
            .multi_line(self.contains(Flags::MULTILINE))
            .dot_matches_new_line(self.contains(Flags::DOTALL))
            .ignore_whitespace(self.contains(Flags::EXTENDED))
            .unicode(self.contains(Flags::UTF))
            .swap_greed(self.contains(Flags::UNGREEDY))
            .utf8(false)
    }
}
