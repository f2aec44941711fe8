// Simulated payment: validates card or UPI details and issues a receipt.
// No gateway is contacted; a valid form is always accepted.
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PaymentError {
    #[error("Invalid payment details: {}", describe(.0))]
    InvalidDetails(BTreeMap<&'static str, String>),
}

fn describe(fields: &BTreeMap<&'static str, String>) -> String {
    fields
        .iter()
        .map(|(field, msg)| format!("{}: {}", field, msg))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
    pub card_number: String,
    pub expiry_date: String,
    pub cvv: String,
    pub cardholder_name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "method", rename_all = "kebab-case")]
pub enum PaymentMethod {
    DebitCard(CardDetails),
    #[serde(rename_all = "camelCase")]
    Upi { upi_id: String },
}

impl PaymentMethod {
    pub fn kind(&self) -> &'static str {
        match self {
            PaymentMethod::DebitCard(_) => "debit-card",
            PaymentMethod::Upi { .. } => "upi",
        }
    }

    /// Checks every field and reports all problems at once.
    pub fn validate(&self, today: NaiveDate) -> Result<(), PaymentError> {
        let mut errors = BTreeMap::new();

        match self {
            PaymentMethod::DebitCard(card) => {
                let digits: String = card.card_number.split_whitespace().collect();
                if digits.len() != 16 || !all_digits(&digits) {
                    errors.insert(
                        "cardNumber",
                        "Please enter a valid 16-digit card number".to_string(),
                    );
                }

                if let Err(msg) = check_expiry(&card.expiry_date, today) {
                    errors.insert("expiryDate", msg.to_string());
                }

                if !(3..=4).contains(&card.cvv.len()) || !all_digits(&card.cvv) {
                    errors.insert("cvv", "CVV must be 3 or 4 digits".to_string());
                }

                if card.cardholder_name.trim().is_empty() {
                    errors.insert("cardholderName", "Cardholder name is required".to_string());
                }
            }
            PaymentMethod::Upi { upi_id } => {
                if !upi_id.contains('@') {
                    errors.insert("upiId", "Please enter a valid UPI ID".to_string());
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(PaymentError::InvalidDetails(errors))
        }
    }

    fn last_four(&self) -> Option<String> {
        match self {
            PaymentMethod::DebitCard(card) => {
                let digits: String = card.card_number.split_whitespace().collect();
                digits.get(digits.len().saturating_sub(4)..).map(str::to_string)
            }
            PaymentMethod::Upi { .. } => None,
        }
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn check_expiry(expiry: &str, today: NaiveDate) -> Result<(), &'static str> {
    if expiry.trim().is_empty() {
        return Err("Expiry date is required");
    }

    let (month, year) = expiry.split_once('/').ok_or("Invalid expiry date")?;
    if year.len() != 2 {
        return Err("Invalid expiry date");
    }
    let month: u32 = month.parse().map_err(|_| "Invalid expiry date")?;
    let year: i32 = year.parse().map_err(|_| "Invalid expiry date")?;
    if !(1..=12).contains(&month) {
        return Err("Invalid expiry date");
    }

    let current_year = today.year() % 100;
    if year < current_year || (year == current_year && month < today.month()) {
        return Err("Card has expired");
    }
    Ok(())
}

/// Groups up to 16 digits in blocks of four, dropping anything else.
pub fn format_card_number(input: &str) -> String {
    let digits: Vec<char> = input.chars().filter(char::is_ascii_digit).take(16).collect();
    digits
        .chunks(4)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Turns raw digits into `MM/YY` once the month is complete.
pub fn format_expiry_date(input: &str) -> String {
    let digits: String = input.chars().filter(char::is_ascii_digit).take(4).collect();
    if digits.len() >= 2 {
        format!("{}/{}", &digits[..2], &digits[2..])
    } else {
        digits
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub transaction_id: String,
    pub amount: f64,
    pub currency: String,
    pub method: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_four: Option<String>,
    pub paid_at: DateTime<Utc>,
}

pub fn simulate_payment(
    method: &PaymentMethod,
    amount: f64,
    currency: &str,
    now: DateTime<Utc>,
) -> Result<PaymentReceipt, PaymentError> {
    method.validate(now.date_naive())?;

    let suffix: u16 = rand::thread_rng().gen_range(0..10_000);
    Ok(PaymentReceipt {
        transaction_id: format!("TXN{}{:04}", now.timestamp_millis(), suffix),
        amount,
        currency: currency.to_string(),
        method: method.kind(),
        last_four: method.last_four(),
        paid_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn card(number: &str, expiry: &str, cvv: &str, name: &str) -> PaymentMethod {
        PaymentMethod::DebitCard(CardDetails {
            card_number: number.to_string(),
            expiry_date: expiry.to_string(),
            cvv: cvv.to_string(),
            cardholder_name: name.to_string(),
        })
    }

    fn failed_fields(result: Result<(), PaymentError>) -> Vec<&'static str> {
        match result {
            Err(PaymentError::InvalidDetails(fields)) => fields.keys().copied().collect(),
            Ok(()) => vec![],
        }
    }

    #[test]
    fn test_valid_card() {
        let method = card("4111 1111 1111 1111", "12/27", "123", "Ada Lovelace");
        assert!(method.validate(today()).is_ok());
    }

    #[test_case("4111 1111 1111", "12/27", "123", "Ada", vec!["cardNumber"]; "short card number")]
    #[test_case("4111 1111 1111 111a", "12/27", "123", "Ada", vec!["cardNumber"]; "non digit card number")]
    #[test_case("4111111111111111", "05/25", "123", "Ada", vec!["expiryDate"]; "expired last month")]
    #[test_case("4111111111111111", "13/27", "123", "Ada", vec!["expiryDate"]; "month out of range")]
    #[test_case("4111111111111111", "12/2027", "123", "Ada", vec!["expiryDate"]; "four digit year")]
    #[test_case("4111111111111111", "", "123", "Ada", vec!["expiryDate"]; "missing expiry")]
    #[test_case("4111111111111111", "12/27", "12", "Ada", vec!["cvv"]; "short cvv")]
    #[test_case("4111111111111111", "12/27", "12345", "Ada", vec!["cvv"]; "long cvv")]
    #[test_case("4111111111111111", "12/27", "123", "   ", vec!["cardholderName"]; "blank name")]
    #[test_case("1", "1", "1", "", vec!["cardNumber", "cardholderName", "cvv", "expiryDate"]; "everything wrong")]
    fn test_invalid_card(number: &str, expiry: &str, cvv: &str, name: &str, expected: Vec<&str>) {
        let method = card(number, expiry, cvv, name);
        assert_eq!(failed_fields(method.validate(today())), expected);
    }

    #[test]
    fn test_expiry_in_current_month_is_valid() {
        let method = card("4111111111111111", "06/25", "1234", "Ada");
        assert!(method.validate(today()).is_ok());
    }

    #[test]
    fn test_upi() {
        let ok = PaymentMethod::Upi {
            upi_id: "guest@okbank".to_string(),
        };
        assert!(ok.validate(today()).is_ok());

        let bad = PaymentMethod::Upi {
            upi_id: "guest".to_string(),
        };
        assert_eq!(failed_fields(bad.validate(today())), vec!["upiId"]);
    }

    #[test]
    fn test_payment_method_json() {
        let method: PaymentMethod = serde_json::from_str(
            r#"{"method": "debit-card", "cardNumber": "4111111111111111", "expiryDate": "01/30", "cvv": "999", "cardholderName": "Grace"}"#,
        )
        .unwrap();
        assert_eq!(method.kind(), "debit-card");

        let method: PaymentMethod =
            serde_json::from_str(r#"{"method": "upi", "upiId": "grace@upi"}"#).unwrap();
        assert_eq!(method.kind(), "upi");
    }

    #[test_case("4111111111111111", "4111 1111 1111 1111")]
    #[test_case("4111-1111-11", "4111 1111 11"; "dashes dropped")]
    #[test_case("41111111111111119999", "4111 1111 1111 1111"; "capped at sixteen")]
    fn test_format_card_number(input: &str, expected: &str) {
        assert_eq!(format_card_number(input), expected);
    }

    #[test_case("1", "1")]
    #[test_case("12", "12/")]
    #[test_case("1227", "12/27")]
    #[test_case("12/279", "12/27"; "extra digit dropped")]
    fn test_format_expiry_date(input: &str, expected: &str) {
        assert_eq!(format_expiry_date(input), expected);
    }

    #[test]
    fn test_simulate_payment_receipt() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 9, 30, 0).unwrap();
        let method = card("4111 1111 1111 4242", "12/27", "123", "Ada");

        let receipt = simulate_payment(&method, 300.0, "USD", now).unwrap();
        assert!(receipt
            .transaction_id
            .starts_with(&format!("TXN{}", now.timestamp_millis())));
        assert_eq!(receipt.last_four.as_deref(), Some("4242"));
        assert_eq!(receipt.amount, 300.0);
        assert_eq!(receipt.paid_at, now);
    }

    #[test]
    fn test_simulate_payment_rejects_invalid_details() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 9, 30, 0).unwrap();
        let method = PaymentMethod::Upi {
            upi_id: String::new(),
        };
        let err = simulate_payment(&method, 10.0, "USD", now).unwrap_err();
        assert_eq!(err.to_string(), "Invalid payment details: upiId: Please enter a valid UPI ID");
    }
}
