use regex::Regex;
use std::sync::LazyLock;

use crate::error::{Error, Result};
use crate::sources::parse_price;
use crate::types::quote::SpotQuote;
use crate::util::current_datetime;

static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"data-test="instrument-price-last"[^>]*>\s*([\d,.]+)\s*<"#)
        .expect("valid regex")
});
static CHANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"data-test="instrument-price-change"[^>]*>\s*([^<]+?)\s*<"#)
        .expect("valid regex")
});
static CHANGE_PERCENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"data-test="instrument-price-change-percent"[^>]*>\s*([^<]+?)\s*<"#)
        .expect("valid regex")
});

/// Extract the XAU/USD spot quote from the instrument page markup.
///
/// The price field is mandatory and must parse to a positive number; the
/// change fields are cosmetic and default to empty when absent.
pub fn parse_spot(html: &str) -> Result<SpotQuote> {
    let price_text = PRICE_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| Error::Parse("spot price field not found".to_string()))?;

    let price = parse_price(price_text);
    if price <= 0.0 {
        return Err(Error::Parse(format!(
            "spot price not positive: {price_text:?}"
        )));
    }

    let field = |re: &Regex| {
        re.captures(html)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default()
    };

    Ok(SpotQuote {
        kind: SpotQuote::KIND.to_string(),
        price,
        change: field(&CHANGE_RE),
        change_percent: field(&CHANGE_PERCENT_RE),
        update_time: current_datetime(),
    })
}
