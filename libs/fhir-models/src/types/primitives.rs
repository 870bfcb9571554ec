//! FHIR primitive datatypes.
//!
//! Each primitive is an element: it may carry an `id` and extensions next to
//! (or instead of) its value.

use super::temporal::{self, DateTimeValue, DateValue};
use super::PrimitiveType;
use crate::config::ModelConfig;
use crate::error::Result;
use crate::validation;
use crate::visitor::PrimitiveValue;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{Datelike, FixedOffset, NaiveDate, NaiveTime, Utc};

primitive!(
    /// A stream of bytes, base64 encoded on the wire
    Base64Binary, Base64BinaryBuilder, Vec<u8>, "base64Binary"
);
primitive!(Boolean, BooleanBuilder, bool, "boolean");
primitive!(
    /// A URI that refers to a resource by its canonical URL (`url|version`)
    Canonical, CanonicalBuilder, String, "canonical"
);
primitive!(
    /// A string drawn from a controlled set of values
    Code, CodeBuilder, String, "code"
);
primitive!(Date, DateBuilder, DateValue, "date");
primitive!(DateTime, DateTimeBuilder, DateTimeValue, "dateTime");
primitive!(Decimal, DecimalBuilder, rust_decimal::Decimal, "decimal");
primitive!(
    /// Sequence of Unicode characters
    FhirString, FhirStringBuilder, String, "string"
);
primitive!(
    /// Logical identifier: 1 to 64 characters of `[A-Za-z0-9\-.]`
    Id, IdBuilder, String, "id"
);
primitive!(
    /// An instant in time, known at least to the second, with a zone offset
    Instant, InstantBuilder, chrono::DateTime<FixedOffset>, "instant", zoned
);
primitive!(Integer, IntegerBuilder, i32, "integer");
primitive!(Markdown, MarkdownBuilder, String, "markdown");
primitive!(PositiveInt, PositiveIntBuilder, i32, "positiveInt");
primitive!(
    /// A time during the day, with no date
    Time, TimeBuilder, NaiveTime, "time"
);
primitive!(UnsignedInt, UnsignedIntBuilder, i32, "unsignedInt");
primitive!(Uri, UriBuilder, String, "uri");
primitive!(Url, UrlBuilder, String, "url");
primitive!(
    /// Limited XHTML content rooted at a `div`
    Xhtml, XhtmlBuilder, String, "xhtml"
);

macro_rules! string_like {
    ($($name:ident),+) => {
        $(
            impl From<&str> for $name {
                fn from(value: &str) -> Self {
                    Self::of(value)
                }
            }

            impl From<String> for $name {
                fn from(value: String) -> Self {
                    Self::of(value)
                }
            }

            impl $name {
                pub fn as_str(&self) -> Option<&str> {
                    self.value.as_deref()
                }
            }
        )+
    };
}

string_like!(Canonical, Code, FhirString, Id, Markdown, Uri, Url, Xhtml);

macro_rules! integer_like {
    ($($name:ident),+) => {
        $(
            impl From<i32> for $name {
                fn from(value: i32) -> Self {
                    Self::of(value)
                }
            }
        )+
    };
}

integer_like!(Integer, PositiveInt, UnsignedInt);

impl PrimitiveType for Base64Binary {
    fn primitive_value(&self) -> Option<PrimitiveValue<'_>> {
        self.value.as_deref().map(PrimitiveValue::Binary)
    }
}

impl Base64Binary {
    /// Decode a base64 string into a value.
    pub fn decode(encoded: &str) -> Result<Self> {
        STANDARD
            .decode(encoded)
            .map(Self::of)
            .map_err(|_| crate::error::Error::parse("base64Binary", encoded))
    }

    pub fn encoded(&self) -> Option<String> {
        self.value.as_ref().map(|bytes| STANDARD.encode(bytes))
    }
}

impl From<Vec<u8>> for Base64Binary {
    fn from(value: Vec<u8>) -> Self {
        Self::of(value)
    }
}

impl From<&[u8]> for Base64Binary {
    fn from(value: &[u8]) -> Self {
        Self::of(value.to_vec())
    }
}

impl PrimitiveType for Boolean {
    fn primitive_value(&self) -> Option<PrimitiveValue<'_>> {
        self.value.map(PrimitiveValue::Boolean)
    }
}

impl From<bool> for Boolean {
    fn from(value: bool) -> Self {
        Self::of(value)
    }
}

impl PrimitiveType for Canonical {
    fn primitive_value(&self) -> Option<PrimitiveValue<'_>> {
        self.value.as_deref().map(PrimitiveValue::String)
    }

    fn check_value(&self, _config: &ModelConfig) -> std::result::Result<(), String> {
        self.value.as_deref().map_or(Ok(()), validation::check_uri)
    }
}

impl PrimitiveType for Code {
    fn primitive_value(&self) -> Option<PrimitiveValue<'_>> {
        self.value.as_deref().map(PrimitiveValue::String)
    }

    fn check_value(&self, _config: &ModelConfig) -> std::result::Result<(), String> {
        self.value.as_deref().map_or(Ok(()), validation::check_code)
    }
}

impl PrimitiveType for Date {
    fn primitive_value(&self) -> Option<PrimitiveValue<'_>> {
        self.value.as_ref().map(PrimitiveValue::Date)
    }

    fn check_value(&self, _config: &ModelConfig) -> std::result::Result<(), String> {
        self.value.as_ref().map_or(Ok(()), validation::check_date)
    }
}

impl Date {
    /// Parse `YYYY`, `YYYY-MM` or `YYYY-MM-DD`.
    pub fn parse(value: &str) -> Result<Self> {
        value.parse::<DateValue>().map(Self::of)
    }
}

impl From<NaiveDate> for Date {
    fn from(value: NaiveDate) -> Self {
        Self::of(value)
    }
}

impl From<DateValue> for Date {
    fn from(value: DateValue) -> Self {
        Self::of(value)
    }
}

impl PrimitiveType for DateTime {
    fn primitive_value(&self) -> Option<PrimitiveValue<'_>> {
        self.value.as_ref().map(PrimitiveValue::DateTime)
    }

    fn check_value(&self, _config: &ModelConfig) -> std::result::Result<(), String> {
        self.value.as_ref().map_or(Ok(()), validation::check_date_time)
    }
}

impl DateTime {
    /// Parse any `date` precision or a full timestamp with zone offset.
    pub fn parse(value: &str) -> Result<Self> {
        value.parse::<DateTimeValue>().map(Self::of)
    }
}

impl From<DateTimeValue> for DateTime {
    fn from(value: DateTimeValue) -> Self {
        Self::of(value)
    }
}

impl From<NaiveDate> for DateTime {
    fn from(value: NaiveDate) -> Self {
        Self::of(value)
    }
}

impl From<chrono::DateTime<FixedOffset>> for DateTime {
    fn from(value: chrono::DateTime<FixedOffset>) -> Self {
        Self::of(value)
    }
}

impl From<chrono::DateTime<Utc>> for DateTime {
    fn from(value: chrono::DateTime<Utc>) -> Self {
        Self::of(value)
    }
}

impl PrimitiveType for Decimal {
    fn primitive_value(&self) -> Option<PrimitiveValue<'_>> {
        self.value.map(PrimitiveValue::Decimal)
    }
}

impl From<rust_decimal::Decimal> for Decimal {
    fn from(value: rust_decimal::Decimal) -> Self {
        Self::of(value)
    }
}

impl From<i32> for Decimal {
    fn from(value: i32) -> Self {
        Self::of(value)
    }
}

impl PrimitiveType for FhirString {
    fn primitive_value(&self) -> Option<PrimitiveValue<'_>> {
        self.value.as_deref().map(PrimitiveValue::String)
    }

    fn check_value(&self, config: &ModelConfig) -> std::result::Result<(), String> {
        self.value
            .as_deref()
            .map_or(Ok(()), |value| validation::check_string(value, config.check_control_chars))
    }
}

impl PrimitiveType for Id {
    fn primitive_value(&self) -> Option<PrimitiveValue<'_>> {
        self.value.as_deref().map(PrimitiveValue::String)
    }

    fn check_value(&self, _config: &ModelConfig) -> std::result::Result<(), String> {
        self.value.as_deref().map_or(Ok(()), validation::check_id)
    }
}

impl PrimitiveType for Instant {
    fn primitive_value(&self) -> Option<PrimitiveValue<'_>> {
        self.value.as_ref().map(PrimitiveValue::Instant)
    }

    fn check_value(&self, _config: &ModelConfig) -> std::result::Result<(), String> {
        self.value
            .as_ref()
            .map_or(Ok(()), |value| validation::check_year(value.year(), "instant"))
    }
}

impl Instant {
    pub fn parse(value: &str) -> Result<Self> {
        temporal::parse_instant(value).map(Self::of)
    }
}

impl From<chrono::DateTime<FixedOffset>> for Instant {
    fn from(value: chrono::DateTime<FixedOffset>) -> Self {
        Self::of(value)
    }
}

impl From<chrono::DateTime<Utc>> for Instant {
    fn from(value: chrono::DateTime<Utc>) -> Self {
        Self::of(value)
    }
}

impl PrimitiveType for Integer {
    fn primitive_value(&self) -> Option<PrimitiveValue<'_>> {
        self.value.map(PrimitiveValue::Integer)
    }
}

impl PrimitiveType for Markdown {
    fn primitive_value(&self) -> Option<PrimitiveValue<'_>> {
        self.value.as_deref().map(PrimitiveValue::String)
    }

    fn check_value(&self, config: &ModelConfig) -> std::result::Result<(), String> {
        self.value
            .as_deref()
            .map_or(Ok(()), |value| validation::check_string(value, config.check_control_chars))
    }
}

impl PrimitiveType for PositiveInt {
    fn primitive_value(&self) -> Option<PrimitiveValue<'_>> {
        self.value.map(PrimitiveValue::Integer)
    }

    fn check_value(&self, _config: &ModelConfig) -> std::result::Result<(), String> {
        self.value
            .map_or(Ok(()), |value| validation::check_min(value, 1, "positiveInt"))
    }
}

impl PrimitiveType for Time {
    fn primitive_value(&self) -> Option<PrimitiveValue<'_>> {
        self.value.as_ref().map(PrimitiveValue::Time)
    }
}

impl Time {
    pub fn parse(value: &str) -> Result<Self> {
        temporal::parse_time(value).map(Self::of)
    }
}

impl From<NaiveTime> for Time {
    fn from(value: NaiveTime) -> Self {
        Self::of(value)
    }
}

impl PrimitiveType for UnsignedInt {
    fn primitive_value(&self) -> Option<PrimitiveValue<'_>> {
        self.value.map(PrimitiveValue::Integer)
    }

    fn check_value(&self, _config: &ModelConfig) -> std::result::Result<(), String> {
        self.value
            .map_or(Ok(()), |value| validation::check_min(value, 0, "unsignedInt"))
    }
}

impl PrimitiveType for Uri {
    fn primitive_value(&self) -> Option<PrimitiveValue<'_>> {
        self.value.as_deref().map(PrimitiveValue::String)
    }

    fn check_value(&self, _config: &ModelConfig) -> std::result::Result<(), String> {
        self.value.as_deref().map_or(Ok(()), validation::check_uri)
    }
}

impl PrimitiveType for Url {
    fn primitive_value(&self) -> Option<PrimitiveValue<'_>> {
        self.value.as_deref().map(PrimitiveValue::String)
    }

    fn check_value(&self, _config: &ModelConfig) -> std::result::Result<(), String> {
        self.value.as_deref().map_or(Ok(()), validation::check_uri)
    }
}

impl PrimitiveType for Xhtml {
    fn primitive_value(&self) -> Option<PrimitiveValue<'_>> {
        self.value.as_deref().map(PrimitiveValue::String)
    }

    fn check_value(&self, _config: &ModelConfig) -> std::result::Result<(), String> {
        self.value.as_deref().map_or(Ok(()), validation::check_xhtml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::{Element, ElementBuilder, Extension};

    #[test]
    fn builder_rejects_invalid_values() {
        let err = PositiveInt::builder().value(0).build().unwrap_err();
        assert!(matches!(err, Error::InvalidPrimitive { type_name: "positiveInt", .. }));

        assert!(Code::builder().value(" padded").build().is_err());
        assert!(Id::builder().value("a b").build().is_err());
        assert!(UnsignedInt::builder().value(0).build().is_ok());
    }

    #[test]
    fn builder_rejects_impossible_dates() {
        let err = Date::builder().value(DateValue::Year(123456)).build().unwrap_err();
        assert!(matches!(err, Error::InvalidPrimitive { type_name: "date", .. }));

        assert!(DateTime::builder()
            .value(DateTimeValue::YearMonth(2020, 13))
            .build()
            .is_err());
        assert!(DateTime::builder()
            .value(DateTimeValue::YearMonth(2020, 12))
            .build()
            .is_ok());
    }

    #[test]
    fn instants_compare_offsets() {
        let utc = Instant::parse("2020-01-01T10:00:00Z").unwrap();
        let shifted = Instant::parse("2020-01-01T12:00:00+02:00").unwrap();
        assert_ne!(utc, shifted);
        assert_eq!(utc, Instant::parse("2020-01-01T10:00:00+00:00").unwrap());
    }

    #[test]
    fn empty_primitive_violates_ele_1() {
        let err = FhirString::builder().build().unwrap_err();
        assert!(matches!(err, Error::ValueOrChildrenRequired(ref path) if path == "string"));
    }

    #[test]
    fn extension_only_primitive_is_allowed() {
        let absent = Extension::builder()
            .url("http://hl7.org/fhir/StructureDefinition/data-absent-reason")
            .value(Code::of("unknown"))
            .build()
            .unwrap();
        let value = Boolean::builder().extension([absent]).build().unwrap();
        assert!(!value.has_value());
        assert!(value.has_children());
    }

    #[test]
    fn base64_decodes() {
        let binary = Base64Binary::decode("aGVsbG8=").unwrap();
        assert_eq!(binary.value().map(Vec::as_slice), Some(&b"hello"[..]));
        assert_eq!(binary.encoded().as_deref(), Some("aGVsbG8="));
        assert!(Base64Binary::decode("not base64!").is_err());
    }

    #[test]
    fn equal_values_compare_equal() {
        assert_eq!(FhirString::of("a"), FhirString::from("a"));
        assert_ne!(FhirString::of("a"), FhirString::of("b"));
        assert_eq!(Decimal::of(rust_decimal::Decimal::new(15, 1)).value().map(|d| d.to_string()), Some("1.5".to_string()));
    }
}
