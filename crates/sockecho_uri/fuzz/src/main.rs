fn main() {
    afl::fuzz!(|data: &[u8]| {
        if let Ok(s) = std::str::from_utf8(data) {
            if let Ok(address) = sockecho_uri::parse(s) {
                let _ = address.to_string().parse::<sockecho_uri::Address>();
            }
        }
    });
}
