use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::value_objects::IpoStatus;
use crate::domain::document::{DocumentFiles, DocumentFilesInput};
use crate::domain::validation::{blank_as_none, optional_text, FieldErrors, REQUIRED};

/// Everything about an IPO except its identity and owning company
#[derive(Debug, Clone, PartialEq)]
pub struct IpoDetails {
    pub status: IpoStatus,
    pub price_band: Option<String>,
    pub open_date: Option<NaiveDate>,
    pub close_date: Option<NaiveDate>,
    pub issue_size: Option<String>,
    pub issue_type: Option<String>,
    pub listing_date: Option<NaiveDate>,
    pub ipo_price: Option<Decimal>,
    pub listing_price: Option<Decimal>,
    pub listing_gain: Option<Decimal>,
    pub current_market_price: Option<Decimal>,
    pub current_return: Option<Decimal>,
}

/// IPO entity as stored
///
/// # Invariants
/// - `company_id` references an existing company
/// - `close_date` is not before `open_date` when both are set
#[derive(Debug, Clone, PartialEq)]
pub struct Ipo {
    pub id: i64,
    pub company_id: i64,
    pub details: IpoDetails,
}

/// IPO ready to be inserted or to replace an existing one
#[derive(Debug, Clone, PartialEq)]
pub struct NewIpo {
    pub company_id: i64,
    pub details: IpoDetails,
}

/// Raw IPO payload
///
/// `documents` is only honoured when the IPO is nested inside a company
/// creation request.
#[derive(Debug, Default, Deserialize)]
pub struct IpoInput {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub company: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub price_band: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub open_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub close_date: Option<NaiveDate>,
    #[serde(default)]
    pub issue_size: Option<String>,
    #[serde(default)]
    pub issue_type: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub listing_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub ipo_price: Option<Decimal>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub listing_price: Option<Decimal>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub listing_gain: Option<Decimal>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub current_market_price: Option<Decimal>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub current_return: Option<Decimal>,
    #[serde(default)]
    pub documents: Vec<DocumentFilesInput>,
}

// NUMERIC(12, 2) for prices, NUMERIC(8, 2) for percentages
const PRICE_MAX_WHOLE_DIGITS: u32 = 10;
const PERCENT_MAX_WHOLE_DIGITS: u32 = 6;
const DECIMAL_PLACES: u32 = 2;

impl IpoInput {
    /// Validates a top-level IPO payload, which must name its company
    ///
    /// Whether the company exists is checked by the caller.
    pub fn validate(self) -> Result<NewIpo, FieldErrors> {
        let (details, mut errors) = split(self.validate_details());
        if self.company.is_none() {
            errors.add("company", REQUIRED);
        }

        match (self.company, details) {
            (Some(company_id), Some(details)) => Ok(NewIpo {
                company_id,
                details,
            }),
            _ => Err(errors),
        }
    }

    /// Validates an IPO nested under a company being created
    ///
    /// The company is implied, so `company` is ignored. At most one document
    /// may accompany each IPO.
    pub fn validate_nested(self) -> Result<(IpoDetails, Option<DocumentFiles>), FieldErrors> {
        let (details, mut errors) = split(self.validate_details());

        if self.documents.len() > 1 {
            errors.add("documents", "An IPO may have at most one document.");
        }

        let mut files = None;
        for (index, document) in self.documents.into_iter().enumerate() {
            match document.validate() {
                Ok(valid) => {
                    files.get_or_insert(valid);
                }
                Err(e) => errors.merge_nested(&format!("documents[{}]", index), e),
            }
        }

        match details {
            Some(details) if errors.is_empty() => Ok((details, files)),
            _ => Err(errors),
        }
    }

    fn validate_details(&self) -> Result<IpoDetails, FieldErrors> {
        let mut errors = FieldErrors::new();

        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => {
                errors.add("status", REQUIRED);
                None
            }
            Some(raw) => raw
                .parse::<IpoStatus>()
                .map_err(|e| errors.add("status", e))
                .ok(),
        };

        let price_band = optional_text(&mut errors, "price_band", self.price_band.as_deref(), 100);
        let issue_size = optional_text(&mut errors, "issue_size", self.issue_size.as_deref(), 100);
        let issue_type = optional_text(&mut errors, "issue_type", self.issue_type.as_deref(), 100);

        if let (Some(open), Some(close)) = (self.open_date, self.close_date) {
            if close < open {
                errors.add("close_date", "Close date cannot be earlier than open date.");
            }
        }

        for (field, value, non_negative, whole_digits) in [
            ("ipo_price", self.ipo_price, true, PRICE_MAX_WHOLE_DIGITS),
            ("listing_price", self.listing_price, true, PRICE_MAX_WHOLE_DIGITS),
            ("current_market_price", self.current_market_price, true, PRICE_MAX_WHOLE_DIGITS),
            ("listing_gain", self.listing_gain, false, PERCENT_MAX_WHOLE_DIGITS),
            ("current_return", self.current_return, false, PERCENT_MAX_WHOLE_DIGITS),
        ] {
            if let Some(value) = value {
                check_decimal(&mut errors, field, value, non_negative, whole_digits);
            }
        }

        match status {
            Some(status) if errors.is_empty() => Ok(IpoDetails {
                status,
                price_band,
                open_date: self.open_date,
                close_date: self.close_date,
                issue_size,
                issue_type,
                listing_date: self.listing_date,
                ipo_price: self.ipo_price.map(to_column_scale),
                listing_price: self.listing_price.map(to_column_scale),
                listing_gain: self.listing_gain.map(to_column_scale),
                current_market_price: self.current_market_price.map(to_column_scale),
                current_return: self.current_return.map(to_column_scale),
            }),
            _ => Err(errors),
        }
    }
}

// Stored as NUMERIC(_, 2); both adapters hand back the same representation
fn to_column_scale(mut value: Decimal) -> Decimal {
    value.rescale(DECIMAL_PLACES);
    value
}

fn split(result: Result<IpoDetails, FieldErrors>) -> (Option<IpoDetails>, FieldErrors) {
    match result {
        Ok(details) => (Some(details), FieldErrors::new()),
        Err(errors) => (None, errors),
    }
}

fn check_decimal(
    errors: &mut FieldErrors,
    field: &str,
    value: Decimal,
    non_negative: bool,
    max_whole_digits: u32,
) {
    if non_negative && value.is_sign_negative() && !value.is_zero() {
        errors.add(field, "Ensure this value is greater than or equal to 0.");
    }
    if value.normalize().scale() > DECIMAL_PLACES {
        errors.add(
            field,
            format!(
                "Ensure that there are no more than {} decimal places.",
                DECIMAL_PLACES
            ),
        );
    }
    let limit = Decimal::from(10_i64.pow(max_whole_digits));
    if value.abs().trunc() >= limit {
        errors.add(
            field,
            format!(
                "Ensure that there are no more than {} digits before the decimal point.",
                max_whole_digits
            ),
        );
    }
}
