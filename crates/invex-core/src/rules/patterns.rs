//! Common regex patterns for invoice field extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Invoice numbers: optional '#', optional 1-4 letter prefix with hyphen, 2+ digits, tail
    pub static ref INVOICE_NUMBER: Regex = Regex::new(
        r"^#?(?:[A-Za-z]{1,4}-)?\d{2,}[A-Za-z0-9\-/]*$"
    ).unwrap();

    pub static ref PO_RESERVED_PREFIX: Regex = Regex::new(r"(?i)^#?XD-").unwrap();

    pub static ref PHONE_NUMBER: Regex = Regex::new(
        r"^(?:\+?1[\s.\-]?)?\(?\d{3}\)?[\s.\-]?\d{3}[\s.\-]\d{4}$"
    ).unwrap();

    pub static ref DATE_SHAPE: Regex = Regex::new(
        r"^\d{1,2}[/\-.]\d{1,2}[/\-.](?:\d{4}|\d{2})$"
    ).unwrap();

    // PO numbers embedded in a single token, e.g. "PO#BADFISH-425"
    pub static ref PO_EMBEDDED: Regex = Regex::new(
        r"^(?i:PO)#([A-Za-z0-9\-/]+)$"
    ).unwrap();

    pub static ref PO_EMBEDDED_COLON: Regex = Regex::new(
        r"^(?i:P\.?O\.?)(?:#|:)\s*([A-Za-z0-9\-/]{3,})$"
    ).unwrap();

    // PO shape families
    pub static ref PO_XD: Regex = Regex::new(r"^XD-\d+[A-Za-z0-9\-]*$").unwrap();
    pub static ref PO_SE: Regex = Regex::new(r"^#?SE\d+").unwrap();
    pub static ref PO_ALPHA_HYPHEN_NUMERIC: Regex = Regex::new(
        r"^[A-Za-z]{1,10}-\d+[A-Za-z0-9\-]*$"
    ).unwrap();
    pub static ref PO_SLASH_DELIMITED: Regex = Regex::new(
        r"^[A-Za-z0-9]+(?:/[A-Za-z0-9]+)+$"
    ).unwrap();
    pub static ref PO_NUMERIC: Regex = Regex::new(r"^\d{5,}$").unwrap();
    pub static ref PO_NUMERIC_HYPHENATED: Regex = Regex::new(r"^\d+(?:-\d+)+$").unwrap();
    pub static ref PO_ALPHA_PREFIX: Regex = Regex::new(r"^[A-Za-z]{1,4}\d{3,}[A-Za-z0-9]*$").unwrap();
    pub static ref PO_NUMERIC_SUFFIX: Regex = Regex::new(r"^\d{3,}[A-Za-z]{1,4}\d*$").unwrap();
    pub static ref PO_UNDERSCORE: Regex = Regex::new(r"^[A-Za-z]+_[A-Za-z0-9_]+$").unwrap();
    pub static ref PO_NAME_LIKE: Regex = Regex::new(
        r"^[A-Za-z][A-Za-z'.]{2,}(?:[ \-][A-Za-z][A-Za-z'.]+)?\d*$"
    ).unwrap();

    // Currency: digits with up to two decimals once '$' and ',' are stripped
    pub static ref CURRENCY_BODY: Regex = Regex::new(r"^\d+(?:\.\d{0,2})?$").unwrap();

    // Dates inside free text
    pub static ref DATE_ISO: Regex = Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").unwrap();

    pub static ref DATE_NUMERIC: Regex = Regex::new(
        r"\b(\d{1,2})[/\-.](\d{1,2})[/\-.](\d{4}|\d{2})\b"
    ).unwrap();

    pub static ref DATE_MONTH_NAME: Regex = Regex::new(
        r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{1,2}),?\s+(\d{4})\b"
    ).unwrap();

    pub static ref DATE_DAY_MONTH: Regex = Regex::new(
        r"(?i)\b(\d{1,2})[\s\-](jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*[\s\-,]+(\d{4}|\d{2})\b"
    ).unwrap();

    // Discount terms
    pub static ref TERMS_PERCENT_NET: Regex = Regex::new(
        r"(?i)^\s*(\d+(?:\.\d+)?)\s*%\s*(?:\d+\s*(?:days?)?\s*,?\s*)?net\s*\d+"
    ).unwrap();

    pub static ref TERMS_NUMBER: Regex = Regex::new(r"(\d+(?:\.\d+)?)(\s*%)?").unwrap();

    pub static ref TERMS_SHAPE: Regex = Regex::new(
        r"(?i)(net\s*\d+|\d+(?:\.\d+)?\s*%|due\s+(?:on|upon)\s+receipt|\bc\.?o\.?d\b|\bprepaid\b|\d+\s*days)"
    ).unwrap();

    pub static ref PERCENT: Regex = Regex::new(r"(\d+(?:\.\d+)?)\s*%").unwrap();
}
