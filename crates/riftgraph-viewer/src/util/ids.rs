pub const LABEL_MAX_CHARS: usize = 12;
pub const LABEL_KEEP_CHARS: usize = 10;

// Counts chars, not bytes, so multi-byte ids never split mid-codepoint.
pub fn short_label(id: &str) -> String {
    if id.chars().count() > LABEL_MAX_CHARS {
        let head: String = id.chars().take(LABEL_KEEP_CHARS).collect();
        format!("{head}..")
    } else {
        id.to_string()
    }
}

pub fn hop_summary(path_len: usize) -> String {
    let hops = path_len.saturating_sub(1);
    format!("Path: {hops} hop{}", if hops == 1 { "" } else { "s" })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_ids_are_truncated() {
        assert_eq!(short_label("ACCOUNT-0001234"), "ACCOUNT-00..");
    }

    #[test]
    fn short_and_boundary_ids_are_kept() {
        assert_eq!(short_label("AC-01"), "AC-01");
        assert_eq!(short_label("ABCDEFGHIJKL"), "ABCDEFGHIJKL");
        assert_eq!(short_label("ABCDEFGHIJKLM"), "ABCDEFGHIJ..");
    }

    #[test]
    fn multibyte_ids_do_not_panic() {
        assert_eq!(short_label("ÄÖÜäöüßÄÖÜäöü"), "ÄÖÜäöüßÄÖÜ..");
    }

    #[test]
    fn hop_summary_pluralizes() {
        assert_eq!(hop_summary(1), "Path: 0 hops");
        assert_eq!(hop_summary(2), "Path: 1 hop");
        assert_eq!(hop_summary(4), "Path: 3 hops");
    }
}
