use base64::{engine::general_purpose, Engine as _};
use regex::{Captures, Regex};
use sha2::{Digest, Sha256};

const EMAIL_PATTERN: &str = r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b";
const PHONE_PATTERN: &str = r"(?:\+1[-.\s]?)?\(?\b[0-9]{3}\)?[-.\s]?[0-9]{3}[-.\s]?[0-9]{4}\b";
const SSN_PATTERN: &str = r"\b\d{3}-\d{2}-\d{4}\b";
const MRN_PATTERN: &str = r"\bMRN[-\s]?\d+\b";

/// Which kinds of PII get masked
#[derive(Debug, Clone)]
pub struct RedactionConfig {
    pub redact_emails: bool,
    pub redact_phones: bool,
    pub redact_ssn: bool,
    pub redact_record_numbers: bool,
    /// Replace matches with a short hash so equal values stay correlatable
    pub hash_for_correlation: bool,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            redact_emails: true,
            redact_phones: true,
            redact_ssn: true,
            redact_record_numbers: true,
            hash_for_correlation: true,
        }
    }
}

/// Masks PII in free text before it is logged
#[derive(Debug, Clone)]
pub struct PiiRedactor {
    config: RedactionConfig,
    email: Regex,
    phone: Regex,
    ssn: Regex,
    mrn: Regex,
}

impl PiiRedactor {
    pub fn new(config: RedactionConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            config,
            email: Regex::new(EMAIL_PATTERN)?,
            phone: Regex::new(PHONE_PATTERN)?,
            ssn: Regex::new(SSN_PATTERN)?,
            mrn: Regex::new(MRN_PATTERN)?,
        })
    }

    /// A redactor that leaves text untouched
    pub fn disabled() -> Result<Self, regex::Error> {
        Self::new(RedactionConfig {
            redact_emails: false,
            redact_phones: false,
            redact_ssn: false,
            redact_record_numbers: false,
            hash_for_correlation: false,
        })
    }

    pub fn redact(&self, text: &str) -> String {
        let mut result = text.to_string();

        // SSN before phone: the phone pattern would otherwise eat SSN digits
        if self.config.redact_ssn {
            result = self.mask(&self.ssn, &result, "SSN", |_| "***-**-****".to_string());
        }

        if self.config.redact_emails {
            result = self.mask(&self.email, &result, "EMAIL", |email| {
                match email.split_once('@') {
                    Some((local, domain)) => format!(
                        "{}***@{}***",
                        local.chars().next().unwrap_or('*'),
                        domain.chars().next().unwrap_or('*')
                    ),
                    None => "***@***".to_string(),
                }
            });
        }

        if self.config.redact_phones {
            result = self.mask(&self.phone, &result, "PHONE", |_| "(***) ***-****".to_string());
        }

        if self.config.redact_record_numbers {
            result = self.mask(&self.mrn, &result, "MRN", |_| "MRN[REDACTED]".to_string());
        }

        result
    }

    /// Redact an optional value, passing `None` through
    pub fn redact_opt(&self, text: Option<&str>) -> Option<String> {
        text.map(|t| self.redact(t))
    }

    fn mask<F>(&self, pattern: &Regex, text: &str, label: &str, plain: F) -> String
    where
        F: Fn(&str) -> String,
    {
        pattern
            .replace_all(text, |caps: &Captures| {
                let matched = caps.get(0).map_or("", |m| m.as_str());
                if self.config.hash_for_correlation {
                    format!("{}[{}]", label, hash_value(matched))
                } else {
                    plain(matched)
                }
            })
            .into_owned()
    }
}

fn hash_value(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    // First 8 bytes keep the tag short
    general_purpose::STANDARD_NO_PAD.encode(digest.get(..8).unwrap_or_default())
}
