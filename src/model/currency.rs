/// Display symbol for a currency code. Unknown codes are shown as given;
/// a blank code falls back to `$`.
pub fn currency_symbol(code: &str) -> String {
    let code = code.trim();
    let symbol = match code.to_ascii_uppercase().as_str() {
        "" => "$",
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "TRY" => "₺",
        "IQD" => "د.ع",
        "SAR" => "ر.س",
        "AED" => "د.إ",
        "KWD" => "د.ك",
        "JOD" => "د.أ",
        "SYP" => "ل.س",
        "IRR" => "﷼",
        _ => return code.to_string(),
    };
    symbol.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_codes() {
        assert_eq!(currency_symbol("usd"), "$");
        assert_eq!(currency_symbol("IQD"), "د.ع");
    }

    #[test]
    fn passes_through_symbols_and_unknown_codes() {
        assert_eq!(currency_symbol("$"), "$");
        assert_eq!(currency_symbol("XYZ"), "XYZ");
        assert_eq!(currency_symbol("  "), "$");
    }
}
