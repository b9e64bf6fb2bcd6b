//! Cell-level parsing for bank exports: delimiter sniffing, dates with
//! ambiguous day/month order, localized amounts and transaction direction.

use crate::storage::TransactionKind;
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Maximum number of date cells sampled when inferring day/month order
pub const DATE_SAMPLE_LIMIT: usize = 50;

fn numeric_date_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{4}|\d{2})$").ok())
        .as_ref()
}

fn iso_date_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})(?:[T ].*)?$").ok())
        .as_ref()
}

fn amount_noise_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^0-9,.\-()]").ok()).as_ref()
}

/// Pick `,` or `;` by counting fields on the header line. Quoted separators
/// do not count. Ties go to `,`.
pub fn detect_delimiter(text: &str) -> u8 {
    let header = text
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("");
    let commas = count_unquoted(header, ',');
    let semicolons = count_unquoted(header, ';');
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

fn count_unquoted(line: &str, separator: char) -> usize {
    let mut in_quotes = false;
    let mut count = 0;
    for ch in line.chars() {
        if ch == '"' {
            // a doubled quote toggles twice and leaves the state unchanged
            in_quotes = !in_quotes;
        } else if ch == separator && !in_quotes {
            count += 1;
        }
    }
    count
}

/// Field order of numeric dates such as `01/02/2024`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    /// `DD/MM/YYYY`
    DayFirst,
    /// `MM/DD/YYYY`
    MonthFirst,
}

impl DateOrder {
    /// US dollar exports use month-first dates; everything else day-first
    pub fn for_currency(currency: &str) -> Self {
        if currency.trim().eq_ignore_ascii_case("USD") {
            DateOrder::MonthFirst
        } else {
            DateOrder::DayFirst
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DateOrder::DayFirst => "DD/MM",
            DateOrder::MonthFirst => "MM/DD",
        }
    }
}

/// Configured handling of ambiguous dates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DateOrderSetting {
    /// Sample the column, falling back to the currency default on a tie
    #[default]
    Auto,
    /// Sample the column, falling back to day-first on a tie
    Dmy,
    /// Sample the column, falling back to month-first on a tie
    Mdy,
}

impl DateOrderSetting {
    pub fn fallback(&self, currency: &str) -> DateOrder {
        match self {
            DateOrderSetting::Auto => DateOrder::for_currency(currency),
            DateOrderSetting::Dmy => DateOrder::DayFirst,
            DateOrderSetting::Mdy => DateOrder::MonthFirst,
        }
    }
}

impl std::str::FromStr for DateOrderSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(DateOrderSetting::Auto),
            "dmy" | "dd/mm" => Ok(DateOrderSetting::Dmy),
            "mdy" | "mm/dd" => Ok(DateOrderSetting::Mdy),
            other => Err(format!("unknown date order: {}", other)),
        }
    }
}

/// Vote on day/month order over up to `DATE_SAMPLE_LIMIT` cells.
///
/// A first field above 12 votes day-first and a second field above 12 votes
/// month-first. Returns `None` when the votes are tied, including when there
/// are none.
pub fn infer_date_order<'a>(samples: impl IntoIterator<Item = &'a str>) -> Option<DateOrder> {
    let re = numeric_date_re()?;
    let mut day_first = 0usize;
    let mut month_first = 0usize;

    for sample in samples.into_iter().take(DATE_SAMPLE_LIMIT) {
        let Some(caps) = re.captures(sample.trim()) else {
            continue;
        };
        let a: u32 = caps[1].parse().unwrap_or(0);
        let b: u32 = caps[2].parse().unwrap_or(0);
        if a > 12 {
            day_first += 1;
        }
        if b > 12 {
            month_first += 1;
        }
    }

    match day_first.cmp(&month_first) {
        std::cmp::Ordering::Greater => Some(DateOrder::DayFirst),
        std::cmp::Ordering::Less => Some(DateOrder::MonthFirst),
        std::cmp::Ordering::Equal => None,
    }
}

/// Parse an ISO (`YYYY-MM-DD`) or numeric (`a/b/YYYY`) date.
/// Two-digit years are taken as 20xx.
pub fn parse_date(text: &str, order: DateOrder) -> Option<NaiveDate> {
    let text = text.trim();

    if let Some(caps) = iso_date_re()?.captures(text) {
        return NaiveDate::from_ymd_opt(
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
            caps[3].parse().ok()?,
        );
    }

    let caps = numeric_date_re()?.captures(text)?;
    let a: u32 = caps[1].parse().ok()?;
    let b: u32 = caps[2].parse().ok()?;
    let mut year: i32 = caps[3].parse().ok()?;
    if caps[3].len() == 2 {
        year += 2000;
    }
    let (day, month) = match order {
        DateOrder::DayFirst => (a, b),
        DateOrder::MonthFirst => (b, a),
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse a signed amount written in any common locale.
///
/// - currency symbols, letters and whitespace are ignored
/// - `(12.50)`, `-12.50` and `12.50-` are negative
/// - with both `,` and `.` present, the later one is the decimal point
/// - a single separator followed by one or two digits is a decimal point,
///   otherwise separators group thousands
pub fn parse_amount(text: &str) -> Option<f64> {
    let cleaned = amount_noise_re()?.replace_all(text.trim(), "");
    let negative = cleaned.contains('(') || cleaned.contains('-');
    let digits: String = cleaned
        .chars()
        .filter(|c| !matches!(c, '(' | ')' | '-'))
        .collect();
    if !digits.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let last_comma = digits.rfind(',');
    let last_dot = digits.rfind('.');
    let normalized = match (last_comma, last_dot) {
        (Some(comma), Some(dot)) => {
            if comma > dot {
                digits.replace('.', "").replace(',', ".")
            } else {
                digits.replace(',', "")
            }
        }
        (Some(_), None) => single_separator(&digits, ','),
        (None, Some(_)) => single_separator(&digits, '.'),
        (None, None) => digits,
    };

    let value: f64 = normalized.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(if negative { -value } else { value })
}

fn single_separator(digits: &str, separator: char) -> String {
    let occurrences = digits.matches(separator).count();
    let decimals = digits
        .rsplit(separator)
        .next()
        .map(|tail| tail.len())
        .unwrap_or(0);
    if occurrences == 1 && (1..=2).contains(&decimals) {
        digits.replace(separator, ".")
    } else {
        digits.replace(separator, "")
    }
}

const INCOME_WORDS: &[&str] = &["income", "credit", "deposit", "refund", "salary"];
const EXPENSE_WORDS: &[&str] = &["expense", "debit", "withdrawal", "payment", "purchase"];
const TRANSFER_WORDS: &[&str] = &["transfer"];

/// Direction from a type column value, falling back to the amount's sign.
/// Returns `None` only when neither gives an answer.
pub fn infer_kind(type_value: Option<&str>, amount: f64) -> Option<TransactionKind> {
    if let Some(value) = type_value {
        let value = value.trim().to_lowercase();
        if !value.is_empty() {
            if TRANSFER_WORDS.iter().any(|w| value.contains(w)) {
                return Some(TransactionKind::Transfer);
            }
            if EXPENSE_WORDS.iter().any(|w| value.contains(w)) {
                return Some(TransactionKind::Expense);
            }
            if INCOME_WORDS.iter().any(|w| value.contains(w)) {
                return Some(TransactionKind::Income);
            }
        }
    }

    if amount < 0.0 {
        Some(TransactionKind::Expense)
    } else if amount > 0.0 {
        Some(TransactionKind::Income)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("Date,Amount,Payee\n"), b',');
        assert_eq!(detect_delimiter("Datum;Betrag;Empfänger\n1;2;3"), b';');
        // the quoted comma is part of a field
        assert_eq!(detect_delimiter("\"Payee, Inc\";Amount;Date"), b';');
        // tie
        assert_eq!(detect_delimiter("a,b;c"), b',');
        assert_eq!(detect_delimiter("\n\nDate;Amount"), b';');
    }

    #[test]
    fn test_infer_date_order_votes() {
        assert_eq!(
            infer_date_order(["25/01/2024", "03/02/2024"]),
            Some(DateOrder::DayFirst)
        );
        assert_eq!(
            infer_date_order(["01/25/2024", "02/13/2024", "14/01/2024"]),
            Some(DateOrder::MonthFirst)
        );
        assert_eq!(infer_date_order(["01/02/2024", "2024-01-30"]), None);
    }

    #[test]
    fn test_infer_date_order_caps_sample() {
        let mut samples = vec!["01/13/2024"; DATE_SAMPLE_LIMIT];
        samples.extend(vec!["13/01/2024"; 60]);
        assert_eq!(infer_date_order(samples), Some(DateOrder::MonthFirst));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("01/02/2024", DateOrder::DayFirst), Some(ymd(2024, 2, 1)));
        assert_eq!(parse_date("01/02/2024", DateOrder::MonthFirst), Some(ymd(2024, 1, 2)));
        assert_eq!(parse_date("2024-03-09", DateOrder::MonthFirst), Some(ymd(2024, 3, 9)));
        assert_eq!(parse_date("2024-03-09T10:00:00Z", DateOrder::DayFirst), Some(ymd(2024, 3, 9)));
        assert_eq!(parse_date("31.12.23", DateOrder::DayFirst), Some(ymd(2023, 12, 31)));
        assert_eq!(parse_date("13/13/2024", DateOrder::DayFirst), None);
        assert_eq!(parse_date("yesterday", DateOrder::DayFirst), None);
    }

    #[test]
    fn test_parse_amount_formats() {
        assert_eq!(parse_amount("-12.50"), Some(-12.5));
        assert_eq!(parse_amount("$1,234.56"), Some(1234.56));
        assert_eq!(parse_amount("1.234,56 €"), Some(1234.56));
        assert_eq!(parse_amount("(45.00)"), Some(-45.0));
        assert_eq!(parse_amount("12,5"), Some(12.5));
        assert_eq!(parse_amount("1,234"), Some(1234.0));
        assert_eq!(parse_amount("1 234 567"), Some(1234567.0));
        assert_eq!(parse_amount("9.99-"), Some(-9.99));
        assert_eq!(parse_amount("USD"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn test_infer_kind() {
        assert_eq!(infer_kind(Some("debit"), 12.5), Some(TransactionKind::Expense));
        assert_eq!(infer_kind(Some("Direct Deposit"), -3.0), Some(TransactionKind::Income));
        assert_eq!(infer_kind(Some("TRANSFER OUT"), -3.0), Some(TransactionKind::Transfer));
        assert_eq!(infer_kind(Some("posted"), -3.0), Some(TransactionKind::Expense));
        assert_eq!(infer_kind(None, 40.0), Some(TransactionKind::Income));
        assert_eq!(infer_kind(None, 0.0), None);
    }

    #[test]
    fn test_date_order_setting() {
        assert_eq!(DateOrderSetting::Auto.fallback("usd"), DateOrder::MonthFirst);
        assert_eq!(DateOrderSetting::Auto.fallback("GBP"), DateOrder::DayFirst);
        assert_eq!(DateOrderSetting::Mdy.fallback("EUR"), DateOrder::MonthFirst);
        assert_eq!("dd/mm".parse::<DateOrderSetting>().unwrap(), DateOrderSetting::Dmy);
    }
}
