//! Record schemas and per-field type coercion.
//!
//! A record type declares its columns once, in file order, as a list of
//! [`Field`]s. Each field pairs a column name with a typed setter; the
//! setter's variant is the column's semantic type, so a declaration can never
//! disagree with the field it writes.

use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

use crate::types::{Currency, Result, SaxoError};

/// Day-month-year pattern used by the broker's exports.
pub const DATE_FORMAT: &str = "%d-%m-%Y";

// ---------------------------------------------------------------------------
// Semantic types and values
// ---------------------------------------------------------------------------

/// The closed set of column types a schema may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Text,
    Integer,
    Decimal,
    Boolean,
    CurrencyCode,
    CalendarDate,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Text => "text",
            FieldType::Integer => "integer",
            FieldType::Decimal => "decimal",
            FieldType::Boolean => "boolean",
            FieldType::CurrencyCode => "currency",
            FieldType::CalendarDate => "date",
        };
        f.write_str(name)
    }
}

impl FromStr for FieldType {
    type Err = SaxoError;

    /// Parse a type name from a column declaration (case-insensitive).
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "string" => Ok(FieldType::Text),
            "integer" | "int" => Ok(FieldType::Integer),
            "decimal" | "float" => Ok(FieldType::Decimal),
            "boolean" | "bool" => Ok(FieldType::Boolean),
            "currency" => Ok(FieldType::CurrencyCode),
            "date" => Ok(FieldType::CalendarDate),
            _ => Err(SaxoError::UnsupportedFieldType(s.to_string())),
        }
    }
}

/// A single coerced column value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Decimal(f64),
    Boolean(bool),
    Currency(Currency),
    Date(NaiveDate),
}

impl FieldValue {
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::Text(_) => FieldType::Text,
            FieldValue::Integer(_) => FieldType::Integer,
            FieldValue::Decimal(_) => FieldType::Decimal,
            FieldValue::Boolean(_) => FieldType::Boolean,
            FieldValue::Currency(_) => FieldType::CurrencyCode,
            FieldValue::Date(_) => FieldType::CalendarDate,
        }
    }
}

// ---------------------------------------------------------------------------
// Token parsers
// ---------------------------------------------------------------------------

/// Interpret a broker boolean. Exports write "Yes"/"No"; "true"/"false" are
/// accepted too, in any letter case.
pub fn parse_yes_no(token: &str) -> Option<bool> {
    match token.to_ascii_lowercase().as_str() {
        "yes" | "true" => Some(true),
        "no" | "false" => Some(false),
        _ => None,
    }
}

/// Coerce one token into a value of the given type.
///
/// `position` and `field` only label the error.
pub fn coerce(ty: FieldType, position: usize, field: &str, token: &str) -> Result<FieldValue> {
    let value = match ty {
        FieldType::Text => FieldValue::Text(token.to_string()),
        FieldType::Integer => FieldValue::Integer(parse_integer(position, field, token)?),
        FieldType::Decimal => FieldValue::Decimal(parse_decimal(position, field, token)?),
        FieldType::Boolean => FieldValue::Boolean(parse_boolean(position, field, token)?),
        FieldType::CurrencyCode => FieldValue::Currency(parse_currency(position, field, token)?),
        FieldType::CalendarDate => FieldValue::Date(parse_date(position, field, token)?),
    };
    Ok(value)
}

fn parse_integer(position: usize, field: &str, token: &str) -> Result<i64> {
    token.parse().map_err(|_| SaxoError::MalformedNumber {
        position,
        field: field.to_string(),
        token: token.to_string(),
    })
}

fn parse_decimal(position: usize, field: &str, token: &str) -> Result<f64> {
    token.parse().map_err(|_| SaxoError::MalformedNumber {
        position,
        field: field.to_string(),
        token: token.to_string(),
    })
}

fn parse_boolean(position: usize, field: &str, token: &str) -> Result<bool> {
    parse_yes_no(token).ok_or_else(|| SaxoError::UnrecognizedBoolean {
        position,
        field: field.to_string(),
        token: token.to_string(),
    })
}

fn parse_currency(position: usize, field: &str, token: &str) -> Result<Currency> {
    Currency::new(token).ok_or_else(|| SaxoError::EmptyCurrency {
        position,
        field: field.to_string(),
    })
}

fn parse_date(position: usize, field: &str, token: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(token, DATE_FORMAT).map_err(|_| SaxoError::MalformedDate {
        position,
        field: field.to_string(),
        token: token.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Static schemas
// ---------------------------------------------------------------------------

/// Typed setter for one field of `R`. The variant is the semantic type.
pub enum Setter<R> {
    Text(fn(&mut R, String)),
    Integer(fn(&mut R, i64)),
    Decimal(fn(&mut R, f64)),
    Boolean(fn(&mut R, bool)),
    Currency(fn(&mut R, Currency)),
    Date(fn(&mut R, NaiveDate)),
}

/// One column declaration of a record type.
pub struct Field<R> {
    pub name: &'static str,
    pub setter: Setter<R>,
}

impl<R> Field<R> {
    pub fn text(name: &'static str, set: fn(&mut R, String)) -> Self {
        Self { name, setter: Setter::Text(set) }
    }

    pub fn integer(name: &'static str, set: fn(&mut R, i64)) -> Self {
        Self { name, setter: Setter::Integer(set) }
    }

    pub fn decimal(name: &'static str, set: fn(&mut R, f64)) -> Self {
        Self { name, setter: Setter::Decimal(set) }
    }

    pub fn boolean(name: &'static str, set: fn(&mut R, bool)) -> Self {
        Self { name, setter: Setter::Boolean(set) }
    }

    pub fn currency(name: &'static str, set: fn(&mut R, Currency)) -> Self {
        Self { name, setter: Setter::Currency(set) }
    }

    pub fn date(name: &'static str, set: fn(&mut R, NaiveDate)) -> Self {
        Self { name, setter: Setter::Date(set) }
    }

    pub fn field_type(&self) -> FieldType {
        match self.setter {
            Setter::Text(_) => FieldType::Text,
            Setter::Integer(_) => FieldType::Integer,
            Setter::Decimal(_) => FieldType::Decimal,
            Setter::Boolean(_) => FieldType::Boolean,
            Setter::Currency(_) => FieldType::CurrencyCode,
            Setter::Date(_) => FieldType::CalendarDate,
        }
    }

    /// Coerce `token` and write it into `record`.
    pub fn apply(&self, record: &mut R, position: usize, token: &str) -> Result<()> {
        match self.setter {
            Setter::Text(set) => set(record, token.to_string()),
            Setter::Integer(set) => set(record, parse_integer(position, self.name, token)?),
            Setter::Decimal(set) => set(record, parse_decimal(position, self.name, token)?),
            Setter::Boolean(set) => set(record, parse_boolean(position, self.name, token)?),
            Setter::Currency(set) => set(record, parse_currency(position, self.name, token)?),
            Setter::Date(set) => set(record, parse_date(position, self.name, token)?),
        }
        Ok(())
    }
}

impl<R> fmt::Debug for Field<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("type", &self.field_type())
            .finish()
    }
}

/// Ordered column declarations for a record type.
#[derive(Debug)]
pub struct Schema<R> {
    fields: Vec<Field<R>>,
}

impl<R> Schema<R> {
    pub fn new(fields: Vec<Field<R>>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[Field<R>] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Column names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }
}

/// A record type that can be bound from one tabular row.
///
/// `Default` supplies the scratch value the binder fills; it is only handed
/// back once every field has been written.
pub trait Record: Default + Sized + 'static {
    /// The record's column declarations, built once per type.
    fn schema() -> &'static Schema<Self>;
}

// ---------------------------------------------------------------------------
// Dynamic schemas
// ---------------------------------------------------------------------------

/// Column layout known only at run time, declared by type name.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicSchema {
    columns: Vec<(String, FieldType)>,
}

impl DynamicSchema {
    /// Build from `(name, type name)` pairs.
    ///
    /// Unknown type names fail here, before any row is read.
    pub fn parse<N, T>(columns: impl IntoIterator<Item = (N, T)>) -> Result<Self>
    where
        N: Into<String>,
        T: AsRef<str>,
    {
        let columns = columns
            .into_iter()
            .map(|(name, ty)| -> Result<(String, FieldType)> {
                Ok((name.into(), ty.as_ref().parse()?))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[(String, FieldType)] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Bind one row into values, with the same rules as static binding.
    pub fn bind<S: AsRef<str>>(&self, row: &[S]) -> Result<Vec<FieldValue>> {
        if row.len() != self.columns.len() {
            return Err(SaxoError::FieldCountMismatch {
                expected: self.columns.len(),
                got: row.len(),
            });
        }
        self.columns
            .iter()
            .zip(row)
            .enumerate()
            .map(|(position, ((name, ty), token))| coerce(*ty, position, name, token.as_ref()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
