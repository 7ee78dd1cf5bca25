use std::sync::OnceLock;

use regex::Regex;

fn bolt11_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // hrp for mainnet/testnet/signet/regtest, then bech32 data characters
    RE.get_or_init(|| {
        Regex::new(r"^ln(bc|tb|tbs|bcrt)[0-9]*[munp]?1[02-9ac-hj-np-z]{20,}$")
            .expect("static bolt11 regex")
    })
}

/// Turns pasted or scanned text into a bare BOLT11 invoice.
///
/// Accepts an optional `lightning:` URI scheme (any case) and surrounding
/// whitespace. Returns `None` when the result does not look like an invoice.
pub fn normalize_invoice(raw: &str) -> Option<String> {
    let mut s = raw.trim();

    if s.get(..10).is_some_and(|p| p.eq_ignore_ascii_case("lightning:")) {
        s = s[10..].trim_start_matches('/');
    }

    let s = s.trim().to_ascii_lowercase();
    bolt11_re().is_match(&s).then_some(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    const INV: &str = "lnbc2500u1pvjluezpp5qqqsyqcyq5rqwzqfqqqsyqcyq5rqwzqfqqqsyqcyq5rqwzqfqypq";

    #[test]
    fn strips_scheme_and_case() {
        let scanned = format!("LIGHTNING:{}", INV.to_uppercase());
        assert_eq!(normalize_invoice(&scanned).as_deref(), Some(INV));
        assert_eq!(normalize_invoice(&format!("  lightning://{INV}\n")).as_deref(), Some(INV));
        assert_eq!(normalize_invoice(INV).as_deref(), Some(INV));
    }

    #[test]
    fn rejects_non_invoices() {
        assert!(normalize_invoice("").is_none());
        assert!(normalize_invoice("bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq").is_none());
        assert!(normalize_invoice("lightning:").is_none());
        assert!(normalize_invoice("lnbc1short").is_none());
    }

    #[test]
    fn does_not_panic_on_multibyte_input() {
        assert!(normalize_invoice("ⓛⓘⓖⓗⓣⓝⓘⓝⓖ:lnbc").is_none());
    }
}
