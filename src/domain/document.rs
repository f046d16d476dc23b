// Disclosure documents (RHP / DRHP) attached to an IPO
// Files themselves live in external storage; only their references are kept

use serde::Deserialize;

use super::validation::{blank_as_none, optional_text, FieldErrors, REQUIRED};

/// Maximum length of a stored file reference
pub const FILE_REF_MAX_LEN: usize = 255;

/// References to the red herring prospectus files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentFiles {
    pub rhp_pdf: Option<String>,
    pub drhp_pdf: Option<String>,
}

/// Document entity as stored
///
/// # Invariants
/// - `ipo_id` references an existing IPO
/// - No other document references the same IPO
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: i64,
    pub ipo_id: i64,
    pub files: DocumentFiles,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDocument {
    pub ipo_id: i64,
    pub files: DocumentFiles,
}

/// Raw file references, as found nested under an IPO
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentFilesInput {
    #[serde(default)]
    pub rhp_pdf: Option<String>,
    #[serde(default)]
    pub drhp_pdf: Option<String>,
}

impl DocumentFilesInput {
    pub fn validate(self) -> Result<DocumentFiles, FieldErrors> {
        let mut errors = FieldErrors::new();
        let rhp_pdf = optional_text(&mut errors, "rhp_pdf", self.rhp_pdf.as_deref(), FILE_REF_MAX_LEN);
        let drhp_pdf =
            optional_text(&mut errors, "drhp_pdf", self.drhp_pdf.as_deref(), FILE_REF_MAX_LEN);
        errors.into_result(DocumentFiles { rhp_pdf, drhp_pdf })
    }
}

/// Raw top-level document payload
#[derive(Debug, Default, Deserialize)]
pub struct DocumentInput {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub ipo: Option<i64>,
    #[serde(default)]
    pub rhp_pdf: Option<String>,
    #[serde(default)]
    pub drhp_pdf: Option<String>,
}

impl DocumentInput {
    /// Validates the payload; whether the IPO exists is checked by the caller
    pub fn validate(self) -> Result<NewDocument, FieldErrors> {
        let files = DocumentFilesInput {
            rhp_pdf: self.rhp_pdf,
            drhp_pdf: self.drhp_pdf,
        }
        .validate();

        let mut errors = match &files {
            Ok(_) => FieldErrors::new(),
            Err(e) => e.clone(),
        };
        if self.ipo.is_none() {
            errors.add("ipo", REQUIRED);
        }

        match (self.ipo, files) {
            (Some(ipo_id), Ok(files)) => Ok(NewDocument { ipo_id, files }),
            _ => Err(errors),
        }
    }
}
