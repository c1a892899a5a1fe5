use crate::Flags;
use regex::bytes::{Captures, Regex};
use regex_automata::dfa::{dense, regex::Regex as DfaRegex};
use regex_automata::nfa::thompson;
use regex_automata::Input;
use tracing::{debug, trace, warn};

// Upper bound for the accelerated pre-pass. Patterns whose DFA grows past
// this keep matching through the standard engine.
const DFA_SIZE_LIMIT: usize = 4 * (1 << 20);

pub(crate) enum Engine {
    Standard(Regex),
    Accelerated { regex: Regex, dfa: Box<DfaRegex> },
}

impl Engine {
    pub fn build(regex: Regex, pattern: &str, flags: Flags) -> Self {
        if !flags.contains(Flags::JIT) {
            return Engine::Standard(regex);
        }

        let dfa = DfaRegex::builder()
            .syntax(flags.automata_syntax())
            .thompson(thompson::Config::new().utf8(false))
            .dense(
                dense::Config::new()
                    .dfa_size_limit(Some(DFA_SIZE_LIMIT))
                    .determinize_size_limit(Some(DFA_SIZE_LIMIT)),
            )
            .build(pattern);

        match dfa {
            Ok(dfa) => {
                debug!("accelerated pre-pass built");
                Engine::Accelerated {
                    regex,
                    dfa: Box::new(dfa),
                }
            }
            Err(err) => {
                warn!(%err, "accelerated pre-pass unavailable, using standard matching");
                Engine::Standard(regex)
            }
        }
    }

    pub fn regex(&self) -> &Regex {
        match self {
            Engine::Standard(regex) => regex,
            Engine::Accelerated { regex, .. } => regex,
        }
    }

    pub fn is_accelerated(&self) -> bool {
        matches!(self, Engine::Accelerated { .. })
    }

    /// One match attempt over the whole subject.
    pub fn captures<'h>(&self, subject: &'h [u8]) -> Option<Captures<'h>> {
        match self {
            Engine::Standard(regex) => regex.captures(subject),
            Engine::Accelerated { regex, dfa } => match dfa.try_search(&Input::new(subject)) {
                Ok(None) => {
                    trace!("rejected by pre-pass");
                    None
                }
                Ok(Some(_)) => regex.captures(subject),
                Err(err) => {
                    trace!(%err, "pre-pass gave up");
                    regex.captures(subject)
                }
            },
        }
    }
}
