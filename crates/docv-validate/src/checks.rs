//! Field validators.
//!
//! Each validator is a pure, stateless function over one raw value plus the
//! parameters carried on its [`ValidatorKind`]. Dispatch is an exhaustive
//! match, so adding a kind is a compile-time-checked change. REGEX patterns
//! are compiled once per schema into a [`SchemaChecks`] context; row
//! validation only ever looks compiled patterns up.
//!
//! FUZZY_LIST is the one validator with an output beyond pass/fail: on a hit
//! it normalizes the value to the canonical entity name. Lookup resolution
//! and document naming both consume that canonical form.

use std::collections::HashMap;

use docv_model::{FieldSpec, Record, ReferenceEntity, SchemaDefinition, ValidatorKind};
use rapidfuzz::fuzz;
use regex::Regex;
use tracing::warn;

/// Outcome of validating one value.
#[derive(Debug, Clone)]
pub struct FieldCheck {
    pub valid: bool,
    /// Canonicalized value, when the validator normalizes.
    pub normalized: Option<String>,
    /// What a valid value would look like.
    pub expected: Option<String>,
    pub error: Option<String>,
}

impl FieldCheck {
    fn ok() -> Self {
        Self {
            valid: true,
            normalized: None,
            expected: None,
            error: None,
        }
    }

    fn ok_normalized(normalized: impl Into<String>) -> Self {
        Self {
            valid: true,
            normalized: Some(normalized.into()),
            expected: None,
            error: None,
        }
    }

    fn fail(expected: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            valid: false,
            normalized: None,
            expected: Some(expected.into()),
            error: Some(error.into()),
        }
    }
}

/// Validation context for one schema: the schema plus its REGEX patterns,
/// compiled once and anchored for full-string matching.
pub struct SchemaChecks<'a> {
    schema: &'a SchemaDefinition,
    patterns: HashMap<String, Regex>,
}

impl<'a> SchemaChecks<'a> {
    /// Compile every REGEX field's pattern up front.
    ///
    /// Registry loading already rejects non-compiling patterns, so a miss in
    /// the compiled set marks a schema that bypassed loading.
    pub fn new(schema: &'a SchemaDefinition) -> Self {
        let mut patterns = HashMap::new();
        for field in &schema.fields {
            if let ValidatorKind::Regex { pattern } = &field.validator
                && !patterns.contains_key(pattern)
            {
                match Regex::new(&format!("^(?:{pattern})$")) {
                    Ok(re) => {
                        patterns.insert(pattern.clone(), re);
                    }
                    Err(err) => {
                        warn!(field = %field.id, pattern = %pattern, %err, "pattern failed to compile");
                    }
                }
            }
        }
        Self { schema, patterns }
    }

    pub fn schema(&self) -> &SchemaDefinition {
        self.schema
    }

    /// Validate one raw value against a field's validator.
    ///
    /// `value` is `None` for absent or blank cells: valid unless the field
    /// is required.
    pub fn check_value(&self, value: Option<&str>, field: &FieldSpec) -> FieldCheck {
        let Some(value) = value else {
            if field.required {
                return FieldCheck::fail("non-empty value", "required field is empty");
            }
            return FieldCheck::ok();
        };

        match &field.validator {
            ValidatorKind::Regex { pattern } => self.check_regex(value, pattern),
            ValidatorKind::Enumeration { enum_name } => {
                check_enum(value, enum_name, self.schema.enum_values(enum_name))
            }
            ValidatorKind::FuzzyList {
                list_name,
                min_score,
            } => check_fuzzy_list(value, list_name, self.schema.list_entries(list_name), *min_score),
            ValidatorKind::NationalId => check_national_id(value),
            ValidatorKind::BankAccount => check_bank_account(value),
            ValidatorKind::DecimalAmount => check_decimal_amount(value),
            ValidatorKind::PostalCode => check_postal_code(value),
            ValidatorKind::Date => check_date(value),
            ValidatorKind::None => FieldCheck::ok(),
        }
    }

    /// Percentage (0-100) of a column's values that pass a field's
    /// validator.
    ///
    /// Used by the content-scan mapping fallback. Blank values are skipped
    /// for optional fields, matching how row validation treats them.
    pub fn column_valid_percentage(&self, column: &str, field: &FieldSpec, rows: &[Record]) -> f64 {
        let mut total = 0usize;
        let mut valid = 0usize;
        for row in rows {
            let value = row.text(column);
            if value.is_none() && !field.required {
                continue;
            }
            total += 1;
            if self.check_value(value, field).valid {
                valid += 1;
            }
        }
        if total == 0 {
            return 0.0;
        }
        valid as f64 / total as f64 * 100.0
    }

    fn check_regex(&self, value: &str, pattern: &str) -> FieldCheck {
        let Some(re) = self.patterns.get(pattern) else {
            return FieldCheck::fail(
                format!("match pattern {pattern}"),
                format!("pattern is not compilable: {pattern}"),
            );
        };
        if re.is_match(value) {
            FieldCheck::ok()
        } else {
            FieldCheck::fail(
                format!("match pattern {pattern}"),
                format!("value does not match pattern: {pattern}"),
            )
        }
    }
}

fn check_enum(value: &str, enum_name: &str, allowed: &[String]) -> FieldCheck {
    if allowed.iter().any(|v| v == value) {
        FieldCheck::ok()
    } else {
        FieldCheck::fail(
            format!("one of: {}", allowed.join(", ")),
            format!("value not in enumeration {enum_name}"),
        )
    }
}

/// Best (canonical name, score) over every alias of every entry.
///
/// Scores are normalized Levenshtein similarity (0-100), case-insensitive.
/// Deterministic: on equal scores the earlier entry wins.
pub fn best_list_match<'a>(value: &str, entries: &'a [ReferenceEntity]) -> Option<(&'a str, f64)> {
    let needle = value.to_lowercase();
    let mut best: Option<(&str, f64)> = None;
    for entry in entries {
        for alias in entry.all_names() {
            let score = fuzz::ratio(needle.chars(), alias.to_lowercase().chars());
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((entry.name.as_str(), score));
            }
        }
    }
    best
}

fn check_fuzzy_list(
    value: &str,
    list_name: &str,
    entries: &[ReferenceEntity],
    min_score: u8,
) -> FieldCheck {
    match best_list_match(value, entries) {
        Some((name, score)) if score >= f64::from(min_score) => FieldCheck::ok_normalized(name),
        Some((name, score)) => FieldCheck::fail(
            format!("match an entry in list {list_name}"),
            format!("no close match in {list_name} (best: {name}, score: {score:.1}%)"),
        ),
        None => FieldCheck::fail(
            format!("match an entry in list {list_name}"),
            format!("reference list {list_name} is empty"),
        ),
    }
}

fn strip_separators(value: &str, extra: &[char]) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace() && !extra.contains(c))
        .collect()
}

/// National ID: exactly 13 digits and a Luhn mod-10 checksum.
///
/// The checksum is the sole validity criterion: a value that passes is valid
/// however atypical it looks, and a well-formed-looking value that fails the
/// checksum is invalid.
fn check_national_id(value: &str) -> FieldCheck {
    let digits = strip_separators(value, &['-']);
    if digits.len() != 13 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return FieldCheck::fail("13-digit national ID", "national ID must be 13 digits");
    }
    if !luhn_valid(&digits) {
        return FieldCheck::fail("valid national ID", "national ID checksum failed");
    }
    FieldCheck::ok_normalized(digits)
}

fn luhn_valid(digits: &str) -> bool {
    let mut sum = 0u32;
    for (i, c) in digits.chars().rev().enumerate() {
        let mut d = c.to_digit(10).unwrap_or(0);
        if i % 2 == 1 {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
    }
    sum % 10 == 0
}

/// Bank account: 6-12 digits after stripping separators. Masked digits (`*`)
/// are tolerated. Format-only; no external verification.
fn check_bank_account(value: &str) -> FieldCheck {
    let stripped = strip_separators(value, &['-', ',']);
    let len_ok = (6..=12).contains(&stripped.len());
    if len_ok && stripped.chars().all(|c| c.is_ascii_digit() || c == '*') {
        FieldCheck::ok_normalized(stripped)
    } else {
        FieldCheck::fail(
            "6-12 digit account number",
            "invalid bank account number format",
        )
    }
}

/// Decimal amount: non-negative, at most two fractional digits, thousands
/// separators and currency symbols stripped. Normalizes to `1234.56` form.
fn check_decimal_amount(value: &str) -> FieldCheck {
    let stripped = strip_separators(value, &[',', '$', '£', '€']);
    let expected = "non-negative amount with at most two decimals (e.g. 1234.56)";

    if stripped.starts_with('-') {
        return FieldCheck::fail(expected, "amount must not be negative");
    }

    let (int_part, frac_part) = match stripped.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (stripped.as_str(), None),
    };

    let int_ok = !int_part.is_empty() && int_part.chars().all(|c| c.is_ascii_digit());
    let frac_ok = frac_part.is_none_or(|f| {
        !f.is_empty() && f.len() <= 2 && f.chars().all(|c| c.is_ascii_digit())
    });

    if int_ok && frac_ok {
        FieldCheck::ok_normalized(stripped)
    } else if frac_part.is_some_and(|f| f.len() > 2) {
        FieldCheck::fail(expected, "amount has more than two fractional digits")
    } else {
        FieldCheck::fail(expected, "invalid decimal amount")
    }
}

/// Postal code: 4-10 characters after space stripping, digits and hyphens
/// only. Country-specific alphanumeric formats are out of scope.
fn check_postal_code(value: &str) -> FieldCheck {
    let stripped = strip_separators(value, &[]);
    let len_ok = (4..=10).contains(&stripped.len());
    if len_ok && stripped.chars().all(|c| c.is_ascii_digit() || c == '-') {
        FieldCheck::ok_normalized(stripped)
    } else {
        FieldCheck::fail("4-10 digit postal code", "invalid postal code format")
    }
}

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%d-%m-%Y",
    "%m-%d-%Y",
    "%d.%m.%Y",
    "%m.%d.%Y",
    "%Y/%m/%d",
    "%d %b %Y",
    "%d %B %Y",
];

// Epoch seconds past 3000-01-01 are treated as garbage, not dates.
const MAX_EPOCH_SECONDS: i64 = 32_503_680_000;

/// Date: first successful parse from an ordered format list wins; falls back
/// to epoch seconds. Normalizes to ISO `YYYY-MM-DD`.
fn check_date(value: &str) -> FieldCheck {
    for format in DATE_FORMATS {
        if let Ok(date) = chrono::NaiveDate::parse_from_str(value, format) {
            return FieldCheck::ok_normalized(date.format("%Y-%m-%d").to_string());
        }
    }

    if let Ok(epoch) = value.parse::<f64>() {
        let seconds = epoch as i64;
        if epoch >= 0.0
            && seconds <= MAX_EPOCH_SECONDS
            && let Some(ts) = chrono::DateTime::from_timestamp(seconds, 0)
        {
            return FieldCheck::ok_normalized(ts.date_naive().format("%Y-%m-%d").to_string());
        }
    }

    FieldCheck::fail("recognized date (e.g. 2024-01-15)", "invalid date format")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(validator: ValidatorKind, required: bool) -> FieldSpec {
        FieldSpec {
            id: "F".to_string(),
            aliases: Vec::new(),
            validator,
            required,
            max_matches: 1,
            description: None,
        }
    }

    fn empty_schema() -> SchemaDefinition {
        SchemaDefinition {
            type_id: "T".to_string(),
            title: None,
            fields: Vec::new(),
            enums: Default::default(),
            lists: Default::default(),
            lookup_fields: Vec::new(),
            pass_threshold: 80.0,
            output_template: None,
        }
    }

    fn check(value: Option<&str>, spec: &FieldSpec, schema: &SchemaDefinition) -> FieldCheck {
        let mut schema = schema.clone();
        schema.fields.push(spec.clone());
        SchemaChecks::new(&schema).check_value(value, spec)
    }

    fn bank_schema(min_score: u8) -> (SchemaDefinition, FieldSpec) {
        let mut schema = empty_schema();
        schema.lists.insert(
            "BANKS".to_string(),
            vec![
                ReferenceEntity {
                    name: "First National Bank".to_string(),
                    aliases: vec!["FNB".to_string()],
                },
                ReferenceEntity::new("Standard Bank"),
            ],
        );
        let spec = field(
            ValidatorKind::FuzzyList {
                list_name: "BANKS".to_string(),
                min_score,
            },
            true,
        );
        (schema, spec)
    }

    #[test]
    fn empty_value_valid_only_when_optional() {
        let schema = empty_schema();
        let required = field(ValidatorKind::None, true);
        let optional = field(ValidatorKind::None, false);
        assert!(!check(None, &required, &schema).valid);
        assert!(check(None, &optional, &schema).valid);
    }

    #[test]
    fn regex_requires_full_string_match() {
        let schema = empty_schema();
        let spec = field(
            ValidatorKind::Regex {
                pattern: r"[A-Z]{3}\d{4}".to_string(),
            },
            true,
        );
        assert!(check(Some("ABC1234"), &spec, &schema).valid);
        assert!(!check(Some("ABC1234-extra"), &spec, &schema).valid);
        assert!(!check(Some("xABC1234"), &spec, &schema).valid);
    }

    #[test]
    fn regex_compiles_once_per_context() {
        let mut schema = empty_schema();
        let spec = field(
            ValidatorKind::Regex {
                pattern: r"\d{4}".to_string(),
            },
            true,
        );
        schema.fields.push(spec.clone());

        // One context serves the whole dataset; no per-value compilation.
        let checks = SchemaChecks::new(&schema);
        for value in ["1234", "5678", "9999"] {
            assert!(checks.check_value(Some(value), &spec).valid);
        }
        assert!(!checks.check_value(Some("12x4"), &spec).valid);
    }

    #[test]
    fn uncompiled_pattern_reports_configuration_not_value() {
        // A field whose pattern never reached the context (it would have been
        // rejected at registry load) must not blame the value.
        let schema = empty_schema();
        let spec = field(
            ValidatorKind::Regex {
                pattern: "([".to_string(),
            },
            true,
        );
        let result = SchemaChecks::new(&schema).check_value(Some("anything"), &spec);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("not compilable"));
    }

    #[test]
    fn enum_membership_is_case_sensitive_and_lists_allowed() {
        let mut schema = empty_schema();
        schema.enums.insert(
            "CC".to_string(),
            vec!["ZA".to_string(), "NA".to_string()],
        );
        let spec = field(
            ValidatorKind::Enumeration {
                enum_name: "CC".to_string(),
            },
            true,
        );
        assert!(check(Some("ZA"), &spec, &schema).valid);
        let result = check(Some("za"), &spec, &schema);
        assert!(!result.valid);
        assert!(result.expected.unwrap().contains("ZA, NA"));
    }

    #[test]
    fn fuzzy_list_boundary_at_threshold() {
        // "FNB" against alias "FNB" scores 100; a one-character deviation
        // against a 4-char alias lands below 80.
        let (schema, spec) = bank_schema(80);
        let exact = check(Some("fnb"), &spec, &schema);
        assert!(exact.valid);
        assert_eq!(exact.normalized.as_deref(), Some("First National Bank"));

        // Exactly at the threshold: "Standard Ban" vs "Standard Bank"
        // scores ratio(12, 13) = 2*12/25 = 96 >= 80.
        let (schema, spec) = bank_schema(96);
        let at = check(Some("Standard Ban"), &spec, &schema);
        assert!(at.valid, "score exactly at threshold must pass");

        let (schema, spec) = bank_schema(97);
        let below = check(Some("Standard Ban"), &spec, &schema);
        assert!(!below.valid, "one point below threshold must fail");
        assert!(below.error.unwrap().contains("Standard Bank"));
    }

    #[test]
    fn fuzzy_list_normalizes_to_canonical_name() {
        let (schema, spec) = bank_schema(80);
        let result = check(Some("FNB"), &spec, &schema);
        assert_eq!(result.normalized.as_deref(), Some("First National Bank"));
    }

    #[test]
    fn national_id_checksum_is_sole_criterion() {
        let schema = empty_schema();
        let spec = field(ValidatorKind::NationalId, true);
        // 13 digits with a valid Luhn checksum, atypical-looking prefix.
        assert!(check(Some("0000000000000"), &spec, &schema).valid);
        // 8001015009087 is the valid form; the altered last digit must fail.
        assert!(check(Some("8001015009087"), &spec, &schema).valid);
        assert!(!check(Some("8001015009088"), &spec, &schema).valid);
        // Separators are stripped before the digit count check.
        assert!(check(Some("800101 500 9087"), &spec, &schema).valid);
    }

    #[test]
    fn bank_account_format_only() {
        let schema = empty_schema();
        let spec = field(ValidatorKind::BankAccount, true);
        assert!(check(Some("62001234567"), &spec, &schema).valid);
        assert!(check(Some("62-001 234"), &spec, &schema).valid);
        assert!(check(Some("62****4567"), &spec, &schema).valid);
        assert!(!check(Some("12345"), &spec, &schema).valid); // too short
        assert!(!check(Some("1234567890123"), &spec, &schema).valid); // too long
        assert!(!check(Some("ABC123456"), &spec, &schema).valid);
    }

    #[test]
    fn decimal_amount_rules() {
        let schema = empty_schema();
        let spec = field(ValidatorKind::DecimalAmount, true);

        let ok = check(Some("1,234.56"), &spec, &schema);
        assert!(ok.valid);
        assert_eq!(ok.normalized.as_deref(), Some("1234.56"));

        assert!(check(Some("$ 99"), &spec, &schema).valid);
        assert!(!check(Some("-5.00"), &spec, &schema).valid);
        assert!(!check(Some("12.345"), &spec, &schema).valid);
        assert!(!check(Some("12."), &spec, &schema).valid);
        assert!(!check(Some("abc"), &spec, &schema).valid);
    }

    #[test]
    fn postal_code_digits_and_hyphens_after_space_stripping() {
        let schema = empty_schema();
        let spec = field(ValidatorKind::PostalCode, true);

        assert!(check(Some("0181"), &spec, &schema).valid);
        assert!(check(Some("12345-6789"), &spec, &schema).valid);
        let spaced = check(Some("90210 123"), &spec, &schema);
        assert!(spaced.valid);
        assert_eq!(spaced.normalized.as_deref(), Some("90210123"));

        assert!(!check(Some("123"), &spec, &schema).valid); // too short
        assert!(!check(Some("12345678901"), &spec, &schema).valid); // too long
        assert!(!check(Some("SW1A 1AA"), &spec, &schema).valid);
    }

    #[test]
    fn date_formats_and_epoch() {
        let schema = empty_schema();
        let spec = field(ValidatorKind::Date, true);

        for value in ["2024-01-15", "15/01/2024", "15 Jan 2024", "2024/01/15"] {
            let result = check(Some(value), &spec, &schema);
            assert!(result.valid, "{value} should parse");
            assert_eq!(result.normalized.as_deref(), Some("2024-01-15"));
        }

        let epoch = check(Some("1705276800"), &spec, &schema);
        assert!(epoch.valid);
        assert_eq!(epoch.normalized.as_deref(), Some("2024-01-15"));

        assert!(!check(Some("not a date"), &spec, &schema).valid);
        assert!(!check(Some("99999999999999"), &spec, &schema).valid);
    }

    #[test]
    fn column_percentage_skips_blanks_for_optional_fields() {
        let mut schema = empty_schema();
        let spec = field(ValidatorKind::DecimalAmount, false);
        schema.fields.push(spec.clone());
        let rows = vec![
            Record::from_pairs(0, [("AMT", "10.00")]),
            Record::from_pairs(1, [("AMT", "")]),
            Record::from_pairs(2, [("AMT", "bad")]),
            Record::from_pairs(3, [("AMT", "3.5")]),
        ];
        let pct = SchemaChecks::new(&schema).column_valid_percentage("AMT", &spec, &rows);
        assert!((pct - 66.666).abs() < 0.1, "{pct}");
    }
}
