//! Input validation for player names, colors, amounts and ledger text.
//!
//! Both the in-memory engine and the roster store run caller input through
//! these checks before touching any state. Each error knows which input field
//! it refers to so the roster variant can report it back to clients.

use std::collections::HashSet;

pub const MAX_NAME_LENGTH: usize = 24;
pub const MAX_REASON_LENGTH: usize = 80;
pub const MAX_DESCRIPTION_LENGTH: usize = 200;
/// Largest single amount, price or starting balance accepted from callers.
pub const MAX_AMOUNT: i64 = 1_000_000_000;

/// Validation errors with helpful messages
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Name is too long (maximum {max} characters)")]
    NameTooLong { max: usize },

    #[error("Name contains invalid characters: {chars}")]
    InvalidCharacters { chars: String },

    #[error("Name is reserved for the bank")]
    Reserved,

    #[error("Color must be a hex code like #ef4444 or a lowercase color name")]
    InvalidColor,

    #[error("Amount must be at least {min}")]
    AmountTooSmall { min: i64 },

    #[error("Amount cannot exceed {max}")]
    AmountTooLarge { max: i64 },

    #[error("Description cannot be empty")]
    EmptyDescription,

    #[error("Text is too long (maximum {max} characters)")]
    TextTooLong { field: &'static str, max: usize },
}

impl ValidationError {
    /// Name of the offending input field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyName
            | Self::NameTooLong { .. }
            | Self::InvalidCharacters { .. }
            | Self::Reserved => "name",
            Self::InvalidColor => "color",
            Self::AmountTooSmall { .. } | Self::AmountTooLarge { .. } => "amount",
            Self::EmptyDescription => "description",
            Self::TextTooLong { field, .. } => *field,
        }
    }
}

/// Names that would read ambiguously in transaction descriptions
fn reserved_names() -> HashSet<&'static str> {
    [
        "bank",
        "the bank",
        "banker",
        "free parking",
        "free_parking",
        "jackpot",
        "unknown",
    ]
    .iter()
    .copied()
    .collect()
}

/// Validate a player display name. Returns the trimmed name.
pub fn validate_player_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::NameTooLong {
            max: MAX_NAME_LENGTH,
        });
    }

    if trimmed.chars().any(|c| c.is_control()) {
        let control_chars: String = trimmed
            .chars()
            .filter(|c| c.is_control())
            .map(|c| format!("\\u{{{:04x}}}", c as u32))
            .collect::<Vec<_>>()
            .join(", ");
        return Err(ValidationError::InvalidCharacters {
            chars: control_chars,
        });
    }

    if reserved_names().contains(trimmed.to_lowercase().as_str()) {
        return Err(ValidationError::Reserved);
    }

    Ok(trimmed.to_string())
}

/// Validate a player color tag: `#rgb`, `#rrggbb`, or a plain lowercase word
/// such as `red`. Returns the color lowercased.
pub fn validate_color(color: &str) -> Result<String, ValidationError> {
    let trimmed = color.trim().to_lowercase();

    let valid = if let Some(hex) = trimmed.strip_prefix('#') {
        matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
    } else {
        !trimmed.is_empty() && trimmed.len() <= 20 && trimmed.chars().all(|c| c.is_ascii_lowercase())
    };

    if valid {
        Ok(trimmed)
    } else {
        Err(ValidationError::InvalidColor)
    }
}

/// Money movements must be strictly positive and at most [`MAX_AMOUNT`].
pub fn validate_amount(amount: i64) -> Result<i64, ValidationError> {
    if amount < 1 {
        return Err(ValidationError::AmountTooSmall { min: 1 });
    }
    if amount > MAX_AMOUNT {
        return Err(ValidationError::AmountTooLarge { max: MAX_AMOUNT });
    }
    Ok(amount)
}

/// Strip control characters from free text and enforce a length cap.
pub fn sanitize_text(
    text: &str,
    field: &'static str,
    max: usize,
) -> Result<String, ValidationError> {
    let sanitized: String = text
        .trim()
        .chars()
        .filter(|c| !c.is_control())
        .collect();
    if sanitized.chars().count() > max {
        return Err(ValidationError::TextTooLong { field, max });
    }
    Ok(sanitized)
}

/// Validate a transfer reason. Empty reasons are allowed and become "Payment".
pub fn validate_reason(reason: &str) -> Result<String, ValidationError> {
    let sanitized = sanitize_text(reason, "reason", MAX_REASON_LENGTH)?;
    if sanitized.is_empty() {
        Ok("Payment".to_string())
    } else {
        Ok(sanitized)
    }
}

/// Validate a roster transaction description (required).
pub fn validate_description(description: &str) -> Result<String, ValidationError> {
    let sanitized = sanitize_text(description, "description", MAX_DESCRIPTION_LENGTH)?;
    if sanitized.is_empty() {
        return Err(ValidationError::EmptyDescription);
    }
    Ok(sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_name_validation() {
        assert_eq!(validate_player_name("  Alice ").unwrap(), "Alice");
        assert!(validate_player_name("José María").is_ok());
        assert!(validate_player_name("🚀 Rocket").is_ok());

        assert_eq!(validate_player_name("   "), Err(ValidationError::EmptyName));
        assert!(matches!(
            validate_player_name(&"x".repeat(MAX_NAME_LENGTH + 1)),
            Err(ValidationError::NameTooLong { .. })
        ));
        assert!(matches!(
            validate_player_name("bad\u{0007}name"),
            Err(ValidationError::InvalidCharacters { .. })
        ));

        // Reserved names are case-insensitive
        assert_eq!(validate_player_name("The Bank"), Err(ValidationError::Reserved));
        assert_eq!(validate_player_name("FREE PARKING"), Err(ValidationError::Reserved));
    }

    #[test]
    fn test_color_validation() {
        assert_eq!(validate_color("#EF4444").unwrap(), "#ef4444");
        assert_eq!(validate_color("#abc").unwrap(), "#abc");
        assert_eq!(validate_color("Red").unwrap(), "red");

        assert!(validate_color("#12345").is_err());
        assert!(validate_color("#ggghhh").is_err());
        assert!(validate_color("").is_err());
        assert!(validate_color("light blue").is_err());
    }

    #[test]
    fn test_amount_validation() {
        assert_eq!(validate_amount(1), Ok(1));
        assert_eq!(
            validate_amount(0),
            Err(ValidationError::AmountTooSmall { min: 1 })
        );
        assert!(validate_amount(-200).is_err());
        assert_eq!(validate_amount(MAX_AMOUNT), Ok(MAX_AMOUNT));
        assert_eq!(
            validate_amount(i64::MAX),
            Err(ValidationError::AmountTooLarge { max: MAX_AMOUNT })
        );
    }

    #[test]
    fn test_reason_and_description() {
        assert_eq!(validate_reason("").unwrap(), "Payment");
        assert_eq!(validate_reason("Rent\n").unwrap(), "Rent");
        assert!(validate_reason(&"r".repeat(MAX_REASON_LENGTH + 1)).is_err());

        assert_eq!(
            validate_description("  "),
            Err(ValidationError::EmptyDescription)
        );
        assert_eq!(validate_description("Paid rent").unwrap(), "Paid rent");
    }

    #[test]
    fn test_error_fields() {
        assert_eq!(ValidationError::EmptyName.field(), "name");
        assert_eq!(ValidationError::InvalidColor.field(), "color");
        assert_eq!(ValidationError::AmountTooSmall { min: 1 }.field(), "amount");
        assert_eq!(
            ValidationError::TextTooLong {
                field: "reason",
                max: 80
            }
            .field(),
            "reason"
        );
    }
}
