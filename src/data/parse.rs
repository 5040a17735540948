use std::sync::LazyLock;

use regex::Regex;

// ---------------------------------------------------------------------------
// Free-text → number parsers
// ---------------------------------------------------------------------------
//
// Every parser here is total: bad input yields `None`, never a panic or an
// error. `None` covers both "cell absent" and "cell present but garbled".

const CRORE: f64 = 10_000_000.0;
const LAKH: f64 = 100_000.0;

static DECIMAL_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\d.]+").unwrap());
static LEADING_NUMERAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+[\d,.]*").unwrap());
static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Which half of a `"<current> out of <total>"` floor descriptor to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloorPart {
    Current,
    Total,
}

/// Pass a value through only when it is a finite number.
pub fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Parse a whole string as a finite float (surrounding whitespace allowed).
pub fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().and_then(finite)
}

/// Parse an Indian-market price such as `"1.2 Cr"`, `"85 Lac"` or
/// `"45,00,000"` into rupees.
///
/// `"cr"` is tested before `"lac"`; anything carrying neither suffix must
/// parse as a plain number.
pub fn parse_currency(text: Option<&str>) -> Option<f64> {
    let cleaned = text?.trim().to_lowercase().replace(',', "");

    if cleaned.contains("cr") {
        first_decimal_run(&cleaned).map(|v| v * CRORE).and_then(finite)
    } else if cleaned.contains("lac") {
        first_decimal_run(&cleaned).map(|v| v * LAKH).and_then(finite)
    } else {
        parse_number(&cleaned)
    }
}

fn first_decimal_run(text: &str) -> Option<f64> {
    DECIMAL_RUN
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Parse the leading numeral of an area string such as `"1,200 sqft"`.
/// Trailing unit text is ignored; no unit conversion is applied.
pub fn parse_area(text: Option<&str>) -> Option<f64> {
    let cleaned = text?.replace(',', "");
    LEADING_NUMERAL
        .find(&cleaned)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .and_then(finite)
}

/// Parse a floor descriptor like `"3 out of 10"` or `"Ground out of 5"`.
///
/// Ground floor is `Some(0)` for [`FloorPart::Current`], even when a total
/// follows it. The total is always the second digit run. With more than two
/// digit runs the first two are taken as current and total.
pub fn parse_floor(text: Option<&str>, part: FloorPart) -> Option<i64> {
    let text = text?;
    let mut runs = DIGIT_RUN.find_iter(text).map(|m| m.as_str());

    match part {
        FloorPart::Current if text.to_lowercase().contains("ground") => Some(0),
        FloorPart::Current => runs.next().and_then(|run| run.parse().ok()),
        FloorPart::Total => runs.nth(1).and_then(|run| run.parse().ok()),
    }
}
