use sockecho_pattern::Flags;

/// Two alternatives, written for extended mode:
///
/// ```not_rust
/// ("tcp" | "udp") "://" host ":" port
/// "unix" "://" path
/// ```
///
/// A host is a dot separated list of labels, each 1 to 63 characters of
/// `[a-zA-Z0-9-]` that neither start nor end with `-`. IPv4 literals are
/// valid hosts too. The path is anything without control characters.
pub const ADDRESS_PATTERN: &str = r"
    ^ (?:
        (?: (?P<proto> tcp | udp ) :// (?:
            (?P<host>
                (?: [a-zA-Z0-9] | [a-zA-Z0-9][a-zA-Z0-9\-]{0,61}[a-zA-Z0-9] )
                (?: \. (?: [a-zA-Z0-9] | [a-zA-Z0-9][a-zA-Z0-9\-]{0,61}[a-zA-Z0-9] ) )*
            )
            : (?P<port> \d{1,6} )
        ) )
      | (?: (?P<proto> unix ) :// (?P<path> [^[:cntrl:]]+ ) )
    ) $
";

/// `proto` is declared in both alternatives.
pub const ADDRESS_FLAGS: Flags = Flags::EXTENDED
    .union(Flags::UTF)
    .union(Flags::DUPNAMES);

pub const PROTO: usize = 0;
pub const HOST: usize = 1;
pub const PORT: usize = 2;
pub const PATH: usize = 3;

pub const GROUP_NAMES: [&str; 4] = ["proto", "host", "port", "path"];
