use std::str::FromStr;

use chrono::{DateTime, Utc};
use solana_sdk::pubkey::Pubkey;

/// Parse a pubkey from string, with better error messages
pub fn parse_pubkey(s: &str) -> anyhow::Result<Pubkey> {
    Pubkey::from_str(s).map_err(|e| anyhow::anyhow!("Invalid pubkey {}: {}", s, e))
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn split_signed(value: f64, formatted: &str) -> (&'static str, String) {
    let sign = if value < 0.0 { "-" } else { "" };
    (sign, formatted.trim_start_matches('-').to_string())
}

/// Format a value as USD currency, e.g. `$1,234.57`
pub fn format_currency(value: f64) -> String {
    let (sign, formatted) = split_signed(value, &format!("{value:.2}"));
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((&formatted, "00"));
    format!("{sign}${}.{frac_part}", group_thousands(int_part))
}

/// Format a number with thousands separators, up to 3 decimal places
pub fn format_number(value: f64) -> String {
    let (sign, formatted) = split_signed(value, &format!("{value:.3}"));
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');

    match trimmed.split_once('.') {
        Some((int_part, frac_part)) => {
            format!("{sign}{}.{frac_part}", group_thousands(int_part))
        }
        None => format!("{sign}{}", group_thousands(trimmed)),
    }
}

/// Format a token price (often a very small number) with 7 decimal places
pub fn format_token_price(value: f64) -> String {
    let (sign, formatted) = split_signed(value, &format!("{value:.7}"));
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((&formatted, ""));
    format!("{sign}${}.{frac_part}", group_thousands(int_part))
}

/// Format a pubkey for display, e.g. `H8r7Gk...d9zE`
pub fn format_pubkey(pubkey: &Pubkey) -> String {
    let s = pubkey.to_string();
    format!("{}...{}", &s[..6], &s[s.len() - 4..])
}

/// Elapsed time in human-readable form
pub fn time_ago(then: DateTime<Utc>) -> String {
    elapsed_text((Utc::now() - then).num_seconds())
}

fn elapsed_text(seconds: i64) -> String {
    if seconds < 5 {
        "Just now".to_string()
    } else if seconds < 60 {
        format!("{seconds} seconds ago")
    } else if seconds < 120 {
        "1 minute ago".to_string()
    } else if seconds < 3600 {
        format!("{} minutes ago", seconds / 60)
    } else if seconds < 7200 {
        "1 hour ago".to_string()
    } else {
        format!("{} hours ago", seconds / 3600)
    }
}
