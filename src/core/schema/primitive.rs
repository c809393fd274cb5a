//! core::schema::primitive
//!
//! Leaf validators. Every primitive stores its canonical string form.

use crate::core::types::{DbEnum, EnumDef};

use super::{ErrorType, ValidationError};

const EMPTY_MESSAGE: &str = "Empty value is not allowed";

/// One end of a numeric range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub limit: f64,
    pub inclusive: bool,
}

impl Bound {
    fn below(&self, v: f64) -> bool {
        v < self.limit || (v == self.limit && !self.inclusive)
    }

    fn above(&self, v: f64) -> bool {
        v > self.limit || (v == self.limit && !self.inclusive)
    }
}

/// What a primitive accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveKind {
    Text,
    Float {
        low: Option<Bound>,
        high: Option<Bound>,
    },
    Int {
        low: Option<Bound>,
        high: Option<Bound>,
    },
    Bool,
    Enum(EnumDef),
}

/// A leaf validator with its constraints, required flag and default.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    kind: PrimitiveKind,
    required: bool,
    default: Option<String>,
}

impl Primitive {
    fn of(kind: PrimitiveKind) -> Self {
        Self {
            kind,
            required: true,
            default: None,
        }
    }

    /// Trimmed text, non-empty when required. Defaults to `""`.
    pub fn text() -> Self {
        Self::of(PrimitiveKind::Text)
    }

    /// Real number. Defaults to `0`.
    pub fn float() -> Self {
        Self::of(PrimitiveKind::Float {
            low: None,
            high: None,
        })
    }

    /// Integral number. Defaults to `0`.
    pub fn int() -> Self {
        Self::of(PrimitiveKind::Int {
            low: None,
            high: None,
        })
    }

    /// Boolean with the given default. Never fails to validate.
    pub fn bool(default: bool) -> Self {
        Self::of(PrimitiveKind::Bool).with_default(bool_text(default))
    }

    /// Member of `E`. Defaults to the first declared member.
    pub fn enumeration<E: DbEnum>() -> Self {
        Self::of(PrimitiveKind::Enum(EnumDef::of::<E>()))
    }

    /// Override the default. Checked when the owning schema is built.
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Allow the value to be absent.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Set the lower bound. No effect on non-numeric kinds.
    pub fn low_limit(mut self, limit: f64, inclusive: bool) -> Self {
        if let PrimitiveKind::Float { low, .. } | PrimitiveKind::Int { low, .. } = &mut self.kind {
            *low = Some(Bound { limit, inclusive });
        }
        self
    }

    /// Set the upper bound. No effect on non-numeric kinds.
    pub fn high_limit(mut self, limit: f64, inclusive: bool) -> Self {
        if let PrimitiveKind::Float { high, .. } | PrimitiveKind::Int { high, .. } = &mut self.kind {
            *high = Some(Bound { limit, inclusive });
        }
        self
    }

    /// Set both bounds, inclusive.
    pub fn range(self, low: f64, high: f64) -> Self {
        self.low_limit(low, true).high_limit(high, true)
    }

    pub fn kind(&self) -> &PrimitiveKind {
        &self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Whether a default was set explicitly.
    pub(crate) fn has_explicit_default(&self) -> bool {
        self.default.is_some()
    }

    /// The default canonical value.
    pub fn default_value(&self) -> String {
        if let Some(default) = &self.default {
            return default.clone();
        }
        match &self.kind {
            PrimitiveKind::Text => String::new(),
            PrimitiveKind::Float { .. } | PrimitiveKind::Int { .. } => "0".to_string(),
            PrimitiveKind::Bool => bool_text(false).to_string(),
            PrimitiveKind::Enum(def) => def
                .members()
                .first()
                .map(|m| m.value.clone())
                .unwrap_or_default(),
        }
    }

    /// Validate a raw value.
    ///
    /// `None` is an absent value. Returns the canonical form, or `None` for an
    /// absent optional value.
    ///
    /// # Errors
    ///
    /// - `EmptyError` if a required text or number is blank
    /// - `TypeError` if a number does not parse, or is not integral for ints
    /// - `RangeError` if a number falls outside its bounds
    /// - `EnumError` if the value names no enum member, blank included
    pub fn validate(
        &self,
        raw: Option<&str>,
        name: Option<&str>,
    ) -> Result<Option<String>, ValidationError> {
        match &self.kind {
            PrimitiveKind::Bool => Ok(Some(bool_text(is_truthy(raw)).to_string())),
            PrimitiveKind::Text => Ok(self.present(raw, name)?.map(str::to_string)),
            PrimitiveKind::Float { low, high } => match self.present(raw, name)? {
                None | Some("") => Ok(None),
                Some(v) => {
                    let number = parse_number(v, name)?;
                    check_range(number, *low, *high, name)?;
                    Ok(Some(v.to_string()))
                }
            },
            PrimitiveKind::Int { low, high } => match self.present(raw, name)? {
                None | Some("") => Ok(None),
                Some(v) => {
                    let number = parse_number(v, name)?;
                    if number.fract() != 0.0 || !number.is_finite() {
                        return Err(ValidationError::new(
                            ErrorType::TypeError,
                            "Only integers are allowed",
                            name,
                        ));
                    }
                    check_range(number, *low, *high, name)?;
                    Ok(Some(v.to_string()))
                }
            },
            // A blank enum value names no member, required or not.
            PrimitiveKind::Enum(def) => match raw.map(str::trim) {
                None if !self.required => Ok(None),
                value => match value.and_then(|v| def.find(v)) {
                    Some(member) => Ok(Some(member.value.clone())),
                    None => Err(ValidationError::new(
                        ErrorType::EnumError,
                        format!("Only {} are allowed.", def.allowed()),
                        name,
                    )),
                },
            },
        }
    }

    /// Trim the raw value, failing when a required value is blank.
    fn present<'a>(
        &self,
        raw: Option<&'a str>,
        name: Option<&str>,
    ) -> Result<Option<&'a str>, ValidationError> {
        let value = raw.map(str::trim);
        if self.required && value.map_or(true, str::is_empty) {
            return Err(ValidationError::new(ErrorType::EmptyError, EMPTY_MESSAGE, name));
        }
        Ok(value)
    }
}

pub(crate) fn bool_text(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

pub(crate) fn is_truthy(raw: Option<&str>) -> bool {
    match raw.map(|s| s.trim().to_ascii_lowercase()) {
        None => false,
        Some(s) => !matches!(s.as_str(), "" | "0" | "false" | "no" | "off" | "none"),
    }
}

fn parse_number(value: &str, name: Option<&str>) -> Result<f64, ValidationError> {
    match value.parse::<f64>() {
        Ok(v) if !v.is_nan() => Ok(v),
        _ => Err(ValidationError::new(
            ErrorType::TypeError,
            format!("could not convert '{value}' to a number"),
            name,
        )),
    }
}

fn check_range(
    value: f64,
    low: Option<Bound>,
    high: Option<Bound>,
    name: Option<&str>,
) -> Result<(), ValidationError> {
    let out_of_range = low.is_some_and(|b| b.below(value)) || high.is_some_and(|b| b.above(value));
    if out_of_range {
        return Err(ValidationError::new(
            ErrorType::RangeError,
            format!("Out of Range{}", range_text(low, high)),
            name,
        ));
    }
    Ok(())
}

fn range_text(low: Option<Bound>, high: Option<Bound>) -> String {
    let Some(high) = high else {
        return match low {
            Some(Bound {
                limit,
                inclusive: true,
            }) => format!(" (value ≥ {limit})"),
            Some(Bound { limit, .. }) => format!(" (value > {limit})"),
            None => String::new(),
        };
    };

    let low_text = match low {
        Some(Bound {
            limit,
            inclusive: true,
        }) => format!("{limit} ≤ "),
        Some(Bound { limit, .. }) => format!("{limit} < "),
        None => String::new(),
    };
    let op = if high.inclusive { "≤" } else { "<" };
    format!(" ({low_text}value {op} {})", high.limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::db_enum! {
        enum Phase("Phase") {
            Gas = "gas",
            Liquid = "liquid",
            Solid = "solid",
        }
    }

    fn ok(p: &Primitive, raw: &str) -> Option<String> {
        p.validate(Some(raw), None).unwrap()
    }

    fn kind_of(p: &Primitive, raw: &str) -> ErrorType {
        p.validate(Some(raw), None).unwrap_err().kind()
    }

    mod text {
        use super::*;

        #[test]
        fn trims() {
            assert_eq!(ok(&Primitive::text(), "  air "), Some("air".into()));
        }

        #[test]
        fn required_rejects_blank() {
            assert_eq!(kind_of(&Primitive::text(), "   "), ErrorType::EmptyError);
            let err = Primitive::text().validate(None, Some("Name")).unwrap_err();
            assert_eq!(err.name(), Some("Name"));
        }

        #[test]
        fn optional_absent_is_none() {
            assert_eq!(Primitive::text().optional().validate(None, None).unwrap(), None);
        }
    }

    mod float {
        use super::*;

        #[test]
        fn range_inclusive() {
            let p = Primitive::float().range(0.0, 1.0);
            assert_eq!(ok(&p, "1"), Some("1".into()));
            assert_eq!(ok(&p, "0"), Some("0".into()));
            assert_eq!(kind_of(&p, "1.5"), ErrorType::RangeError);
        }

        #[test]
        fn exclusive_low_limit() {
            let p = Primitive::float().low_limit(0.0, false);
            assert_eq!(kind_of(&p, "0"), ErrorType::RangeError);
            assert_eq!(ok(&p, "1e-9"), Some("1e-9".into()));
        }

        #[test]
        fn range_message() {
            let p = Primitive::float().range(0.0, 1.0);
            let err = p.validate(Some("1.5"), Some("Ratio")).unwrap_err();
            insta::assert_snapshot!(err.to_message(), @"Ratio - Out of Range (0 ≤ value ≤ 1)");

            let p = Primitive::float().low_limit(0.0, false);
            let err = p.validate(Some("-1"), None).unwrap_err();
            assert_eq!(err.message(), "Out of Range (value > 0)");

            let p = Primitive::float().high_limit(10.0, false);
            let err = p.validate(Some("10"), None).unwrap_err();
            assert_eq!(err.message(), "Out of Range (value < 10)");
        }

        #[test]
        fn not_a_number() {
            assert_eq!(kind_of(&Primitive::float(), "abc"), ErrorType::TypeError);
            assert_eq!(kind_of(&Primitive::float(), "NaN"), ErrorType::TypeError);
        }

        #[test]
        fn optional_blank_is_absent() {
            let p = Primitive::float().optional();
            assert_eq!(p.validate(Some(""), None).unwrap(), None);
        }

        #[test]
        fn keeps_canonical_text() {
            assert_eq!(ok(&Primitive::float(), " 1.50 "), Some("1.50".into()));
        }
    }

    mod int {
        use super::*;

        #[test]
        fn accepts_integral() {
            assert_eq!(ok(&Primitive::int(), "42"), Some("42".into()));
            assert_eq!(ok(&Primitive::int(), "3.0"), Some("3.0".into()));
        }

        #[test]
        fn rejects_fraction() {
            assert_eq!(kind_of(&Primitive::int(), "3.5"), ErrorType::TypeError);
        }

        #[test]
        fn honours_range() {
            let p = Primitive::int().low_limit(1.0, true);
            assert_eq!(kind_of(&p, "0"), ErrorType::RangeError);
        }
    }

    mod boolean {
        use super::*;

        #[test]
        fn coerces() {
            let p = Primitive::bool(false);
            assert_eq!(ok(&p, "yes"), Some("true".into()));
            assert_eq!(ok(&p, "False"), Some("false".into()));
            assert_eq!(ok(&p, "0"), Some("false".into()));
            assert_eq!(p.validate(None, None).unwrap(), Some("false".into()));
        }

        #[test]
        fn default_from_constructor() {
            assert_eq!(Primitive::bool(true).default_value(), "true");
        }
    }

    mod enumeration {
        use super::*;

        #[test]
        fn accepts_value_and_name() {
            let p = Primitive::enumeration::<Phase>();
            assert_eq!(ok(&p, "liquid"), Some("liquid".into()));
            assert_eq!(ok(&p, "Liquid"), Some("liquid".into()));
            assert_eq!(ok(&p, Phase::Solid.value()), Some("solid".into()));
        }

        #[test]
        fn rejects_unknown() {
            let p = Primitive::enumeration::<Phase>();
            let err = p.validate(Some("plasma"), None).unwrap_err();
            assert_eq!(err.kind(), ErrorType::EnumError);
            assert_eq!(err.message(), "Only gas, liquid, solid are allowed.");
        }

        #[test]
        fn blank_names_no_member() {
            let p = Primitive::enumeration::<Phase>();
            assert_eq!(kind_of(&p, ""), ErrorType::EnumError);
            assert_eq!(p.validate(None, None).unwrap_err().kind(), ErrorType::EnumError);

            let p = Primitive::enumeration::<Phase>().optional();
            assert_eq!(p.validate(None, None).unwrap(), None);
            assert_eq!(kind_of(&p, " "), ErrorType::EnumError);
        }

        #[test]
        fn default_is_first_member() {
            assert_eq!(Primitive::enumeration::<Phase>().default_value(), "gas");
        }
    }
}
