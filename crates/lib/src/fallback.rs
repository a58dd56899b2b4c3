//! # Regex Fallback Extraction
//!
//! A handful of patterns that recover the most common GLR fields straight from
//! the report text. Their output only fills placeholders the model left empty.

use crate::{errors::PromptError, types::FieldMap};
use chrono::NaiveDate;
use regex::Regex;
use std::collections::HashSet;
use tracing::debug;

pub const INSURED_NAME: &str = "INSURED_NAME";
pub const INSURED_H_STREET: &str = "INSURED_H_STREET";
pub const INSURED_H_CITY: &str = "INSURED_H_CITY";
pub const INSURED_H_STATE: &str = "INSURED_H_STATE";
pub const INSURED_H_ZIP: &str = "INSURED_H_ZIP";
pub const DATE_INSPECTED: &str = "DATE_INSPECTED";
pub const DATE_RECEIVED: &str = "DATE_RECEIVED";
pub const MORTGAGEE: &str = "MORTGAGEE";

/// Compiled heuristics for the well-known GLR fields.
#[derive(Debug, Clone)]
pub struct FallbackExtractor {
    insured: Regex,
    address: Regex,
    date: Regex,
    mortgagee: Regex,
}

impl FallbackExtractor {
    pub fn new() -> Result<Self, PromptError> {
        Ok(Self {
            insured: Regex::new(
                r"(?i)(Insured|Insured Name|Policyholder)[^\n]{0,20}([A-Z][A-Za-z .,'-]{2,80})",
            )?,
            address: Regex::new(r"([0-9]{1,5}[^,\n]+),\s*([A-Za-z\s]+),\s*([A-Z]{2})\s*(\d{5})")?,
            date: Regex::new(r"([0-1]?\d[/-][0-3]?\d[/-]\d{2,4})")?,
            mortgagee: Regex::new(r"(?i)(Mortgagee|Lender|Bank)[^\n]{0,20}(.+)")?,
        })
    }

    /// Extracts fallback values for `placeholders` from `pdf_text`.
    ///
    /// The result has one entry per placeholder; fields no pattern matched are empty.
    /// `today` supplies the value of `DATE_RECEIVED`.
    pub fn extract(&self, pdf_text: &str, placeholders: &[String], today: NaiveDate) -> FieldMap {
        let wanted: HashSet<&str> = placeholders.iter().map(String::as_str).collect();
        let mut data: FieldMap = placeholders
            .iter()
            .map(|p| (p.clone(), String::new()))
            .collect();
        let mut set = |key: &str, value: &str| {
            if wanted.contains(key) {
                data.insert(key.to_string(), value.trim().to_string());
            }
        };

        if let Some(caps) = self.insured.captures(pdf_text) {
            set(INSURED_NAME, &caps[2]);
        }

        if let Some(caps) = self.address.captures(pdf_text) {
            set(INSURED_H_STREET, &caps[1]);
            set(INSURED_H_CITY, &caps[2]);
            set(INSURED_H_STATE, &caps[3]);
            set(INSURED_H_ZIP, &caps[4]);
        }

        if let Some(caps) = self.date.captures(pdf_text) {
            set(DATE_INSPECTED, &caps[1]);
        }

        if let Some(caps) = self.mortgagee.captures(pdf_text) {
            set(MORTGAGEE, &caps[2]);
        }

        set(DATE_RECEIVED, &today.format("%m/%d/%Y").to_string());

        debug!(
            filled = data.values().filter(|v| !v.is_empty()).count(),
            "Fallback extraction finished."
        );
        data
    }
}
