use regex::Regex;
use std::sync::LazyLock;

use crate::error::{Error, Result};
use crate::sources::parse_price;
use crate::types::quote::{DealerQuote, DealerRow};
use crate::util::{current_date, current_datetime};

pub const GOLD_BAR: &str = "Gold Bar 96.5%";
pub const JEWELRY_GOLD: &str = "Jewelry Gold 96.5%";

// The dealer page renders prices inside <font> tags with stable server-side
// control ids: BL = bullion (gold bar), OM = ornament (jewelry gold).
static BAR_BUY_RE: LazyLock<Regex> = LazyLock::new(|| field_regex("lblBLBuy"));
static BAR_SELL_RE: LazyLock<Regex> = LazyLock::new(|| field_regex("lblBLSell"));
static JEWELRY_BUY_RE: LazyLock<Regex> = LazyLock::new(|| field_regex("lblOMBuy"));
static JEWELRY_SELL_RE: LazyLock<Regex> = LazyLock::new(|| field_regex("lblOMSell"));

fn field_regex(label: &str) -> Regex {
    Regex::new(&format!(
        r#"id="DetailPlace_uc_goldprices1_{label}"[^>]*>(?:.*?)([\d,]+\.?\d*)</font>"#
    ))
    .expect("valid regex")
}

fn extract(re: &Regex, html: &str) -> f64 {
    re.captures(html)
        .and_then(|c| c.get(1))
        .map(|m| parse_price(m.as_str()))
        .unwrap_or(0.0)
}

/// Extract the dealer-association buy/sell table from the page markup.
///
/// Rows are only emitted when both sides of a pair parsed to positive
/// numbers; a page yielding no rows at all is a parse error so the monitor
/// retries it like any other fetch failure.
pub fn parse_dealer(html: &str, source_url: &str) -> Result<DealerQuote> {
    let now = current_datetime();
    let mut rows = Vec::new();

    let bar_buy = extract(&BAR_BUY_RE, html);
    let bar_sell = extract(&BAR_SELL_RE, html);
    if bar_buy > 0.0 && bar_sell > 0.0 {
        rows.push(DealerRow {
            kind: GOLD_BAR.to_string(),
            buy_price: bar_buy,
            sell_price: bar_sell,
            update_time: now.clone(),
        });
    }

    let jewelry_buy = extract(&JEWELRY_BUY_RE, html);
    let jewelry_sell = extract(&JEWELRY_SELL_RE, html);
    if jewelry_buy > 0.0 && jewelry_sell > 0.0 {
        rows.push(DealerRow {
            kind: JEWELRY_GOLD.to_string(),
            buy_price: jewelry_buy,
            sell_price: jewelry_sell,
            update_time: now.clone(),
        });
    }

    if rows.is_empty() {
        return Err(Error::Parse("no dealer price rows found".to_string()));
    }

    Ok(DealerQuote {
        date: current_date(),
        last_update: now,
        rows,
        source: source_url.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        <td><font id="DetailPlace_uc_goldprices1_lblBLBuy" color="Red">51,150.00</font></td>
        <td><font id="DetailPlace_uc_goldprices1_lblBLSell" color="Red">51,250.00</font></td>
        <td><font id="DetailPlace_uc_goldprices1_lblOMBuy" color="Red">50,224.68</font></td>
        <td><font id="DetailPlace_uc_goldprices1_lblOMSell" color="Red">51,750.00</font></td>
    "#;

    #[test]
    fn parses_both_rows() {
        let quote = parse_dealer(SAMPLE, "https://example.test").unwrap();
        assert_eq!(quote.rows.len(), 2);

        assert_eq!(quote.rows[0].kind, GOLD_BAR);
        assert_eq!(quote.rows[0].buy_price, 51150.0);
        assert_eq!(quote.rows[0].sell_price, 51250.0);

        assert_eq!(quote.rows[1].kind, JEWELRY_GOLD);
        assert_eq!(quote.rows[1].buy_price, 50224.68);
        assert_eq!(quote.rows[1].sell_price, 51750.0);
    }

    #[test]
    fn partial_pair_is_dropped() {
        let html = r#"
            <font id="DetailPlace_uc_goldprices1_lblBLBuy">51,150.00</font>
            <font id="DetailPlace_uc_goldprices1_lblOMBuy">50,224.68</font>
            <font id="DetailPlace_uc_goldprices1_lblOMSell">51,750.00</font>
        "#;
        let quote = parse_dealer(html, "https://example.test").unwrap();
        assert_eq!(quote.rows.len(), 1);
        assert_eq!(quote.rows[0].kind, JEWELRY_GOLD);
    }

    #[test]
    fn empty_page_is_a_parse_error() {
        assert!(matches!(
            parse_dealer("<html></html>", "https://example.test"),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn nested_markup_before_the_number_is_tolerated() {
        let html = r#"
            <font id="DetailPlace_uc_goldprices1_lblBLBuy"><b></b>51,150.00</font>
            <font id="DetailPlace_uc_goldprices1_lblBLSell">  51,250.00</font>
        "#;
        let quote = parse_dealer(html, "https://example.test").unwrap();
        assert_eq!(quote.rows[0].buy_price, 51150.0);
    }
}
