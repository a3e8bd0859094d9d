/// Money formatting and parsing for ledger descriptions and CLI input.
///
/// Game money is whole dollars, so amounts are plain `i64`s with no minor units.

// ============================================================================
// Display Formatting
// ============================================================================

/// Format an amount the way it appears in transaction descriptions
/// (e.g. "$400", "-$50").
pub fn format_money(amount: i64) -> String {
    if amount < 0 {
        format!("-${}", amount.unsigned_abs())
    } else {
        format!("${}", amount)
    }
}

/// Format with thousands separators for wide displays (e.g. "$20,580").
pub fn format_money_grouped(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse a money amount from user input.
/// Examples: "400", "$400", "$1,500", "-50", "-$50"
pub fn parse_money(input: &str) -> Result<i64, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("Empty money amount".to_string());
    }

    let (negative, rest) = match input.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, input),
    };
    let cleaned: String = rest
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();

    if cleaned.is_empty() {
        return Err("Missing digits".to_string());
    }
    if cleaned.contains('.') {
        return Err("Money amounts are whole dollars".to_string());
    }

    let value: i64 = cleaned
        .parse()
        .map_err(|_| format!("Invalid money amount '{}'", input))?;
    Ok(if negative { -value } else { value })
}

// ============================================================================
// Unit Tests
// ============================================================================
