// Company domain
// A listed (or listing) company and the nested listing it can be created with

use serde::Deserialize;

use super::document::DocumentFiles;
use super::ipo::{IpoDetails, IpoInput};
use super::validation::{blank_as_none, optional_text, required_text, FieldErrors};

pub const COMPANY_NAME_MAX_LEN: usize = 255;
pub const COMPANY_LOGO_MAX_LEN: usize = 500;

/// Company entity as stored
///
/// # Invariants
/// - `company_name` is unique and non-blank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Company {
    pub id: i64,
    pub company_name: String,
    pub company_logo: Option<String>,
}

/// Company fields for insert or full replacement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCompany {
    pub company_name: String,
    pub company_logo: Option<String>,
}

/// One IPO (and optionally its document) created together with its company
#[derive(Debug, Clone, PartialEq)]
pub struct ListingIpo {
    pub details: IpoDetails,
    pub document: Option<DocumentFiles>,
}

/// A company with the IPOs to create alongside it, persisted atomically
#[derive(Debug, Clone, PartialEq)]
pub struct NewListing {
    pub company: NewCompany,
    pub ipos: Vec<ListingIpo>,
}

/// Raw company payload
#[derive(Debug, Default, Deserialize)]
pub struct CompanyInput {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub company_logo: Option<String>,
    #[serde(default)]
    pub ipos: Vec<IpoInput>,
}

impl CompanyInput {
    /// Validates a creation payload, including any nested IPOs and documents
    ///
    /// Name uniqueness is enforced by the store.
    pub fn validate(self) -> Result<NewListing, FieldErrors> {
        let mut errors = FieldErrors::new();
        let company = validate_company_fields(
            &mut errors,
            self.company_name.as_deref(),
            self.company_logo.as_deref(),
        );

        let mut ipos = Vec::with_capacity(self.ipos.len());
        for (index, ipo) in self.ipos.into_iter().enumerate() {
            match ipo.validate_nested() {
                Ok((details, document)) => ipos.push(ListingIpo { details, document }),
                Err(e) => errors.merge_nested(&format!("ipos[{}]", index), e),
            }
        }

        match company {
            Some(company) if errors.is_empty() => Ok(NewListing { company, ipos }),
            _ => Err(errors),
        }
    }

    /// Validates only the company's own fields (updates never touch IPOs)
    pub fn validate_fields(self) -> Result<NewCompany, FieldErrors> {
        let mut errors = FieldErrors::new();
        let company = validate_company_fields(
            &mut errors,
            self.company_name.as_deref(),
            self.company_logo.as_deref(),
        );
        match company {
            Some(company) if errors.is_empty() => Ok(company),
            _ => Err(errors),
        }
    }
}

fn validate_company_fields(
    errors: &mut FieldErrors,
    name: Option<&str>,
    logo: Option<&str>,
) -> Option<NewCompany> {
    let company_name = required_text(errors, "company_name", name, COMPANY_NAME_MAX_LEN);
    let company_logo = optional_text(errors, "company_logo", logo, COMPANY_LOGO_MAX_LEN);

    if let Some(logo) = &company_logo {
        if !is_http_url(logo) {
            errors.add("company_logo", "Enter a valid URL.");
        }
    }

    company_name.map(|company_name| NewCompany {
        company_name,
        company_logo,
    })
}

fn is_http_url(value: &str) -> bool {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    match rest {
        Some(rest) => {
            let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
            !host.is_empty() && !rest.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
