//! Named-parameter statements and their translation to positional SQL.
//!
//! Statements are written with `@Name` placeholders. A statement whose text is
//! a single bare identifier is a routine call and is rendered with named
//! argument notation; anything else is passed through as text.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::errors::FleetError;

/// A typed argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Int(i32),
    Decimal(Decimal),
    Text(Option<String>),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl From<i32> for SqlParam {
    fn from(v: i32) -> Self { SqlParam::Int(v) }
}

impl From<Decimal> for SqlParam {
    fn from(v: Decimal) -> Self { SqlParam::Decimal(v) }
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self { SqlParam::Text(Some(v.to_string())) }
}

impl From<String> for SqlParam {
    fn from(v: String) -> Self { SqlParam::Text(Some(v)) }
}

impl From<Option<String>> for SqlParam {
    fn from(v: Option<String>) -> Self { SqlParam::Text(v) }
}

impl From<NaiveDate> for SqlParam {
    fn from(v: NaiveDate) -> Self { SqlParam::Date(v) }
}

impl From<NaiveDateTime> for SqlParam {
    fn from(v: NaiveDateTime) -> Self { SqlParam::Timestamp(v) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// Bare routine name, e.g. `sp_GetVehicleSummary`.
    Procedure,
    /// Full statement text.
    Text,
}

/// Classify statement text: no whitespace and not starting with `SELECT` means a routine call.
pub fn classify(text: &str) -> StatementKind {
    let trimmed = text.trim();
    let has_whitespace = trimmed.chars().any(char::is_whitespace);
    let is_select = trimmed
        .get(..6)
        .map(|head| head.eq_ignore_ascii_case("select"))
        .unwrap_or(false);
    if has_whitespace || is_select {
        StatementKind::Text
    } else {
        StatementKind::Procedure
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    text: String,
    params: Vec<(String, SqlParam)>,
}

/// Positional SQL ready for the driver: `$n` placeholders plus arguments in order.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSql {
    pub sql: String,
    pub args: Vec<SqlParam>,
}

impl SqlStatement {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), params: Vec::new() }
    }

    /// Bind `value` to `@name`. The leading `@` is optional; rebinding a name replaces it.
    pub fn bind(mut self, name: &str, value: impl Into<SqlParam>) -> Self {
        let name = name.trim_start_matches('@').to_string();
        let value = value.into();
        match self.params.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(&name)) {
            Some(slot) => slot.1 = value,
            None => self.params.push((name, value)),
        }
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn params(&self) -> &[(String, SqlParam)] {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&SqlParam> {
        let name = name.trim_start_matches('@');
        self.params.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)).map(|(_, v)| v)
    }

    pub fn kind(&self) -> StatementKind {
        classify(&self.text)
    }

    pub fn render(&self) -> Result<RenderedSql, FleetError> {
        match self.kind() {
            StatementKind::Procedure => self.render_call(),
            StatementKind::Text => self.render_text(),
        }
    }

    fn render_call(&self) -> Result<RenderedSql, FleetError> {
        let name = self.text.trim();
        if !is_routine_name(name) {
            return Err(FleetError::invalid(format!("'{name}' is not a valid routine name")));
        }
        let mut args = Vec::with_capacity(self.params.len());
        let mut named = Vec::with_capacity(self.params.len());
        for (idx, (param, value)) in self.params.iter().enumerate() {
            if !is_identifier(param) {
                return Err(FleetError::invalid(format!("'{param}' is not a valid parameter name")));
            }
            named.push(format!("{param} => ${}", idx + 1));
            args.push(value.clone());
        }
        Ok(RenderedSql { sql: format!("SELECT * FROM {name}({})", named.join(", ")), args })
    }

    fn render_text(&self) -> Result<RenderedSql, FleetError> {
        let text = self.text.as_str();
        let mut sql = String::with_capacity(text.len());
        let mut args: Vec<SqlParam> = Vec::new();
        let mut slots: Vec<String> = Vec::new();
        let mut quote: Option<char> = None;
        let mut chars = text.char_indices().peekable();

        while let Some((pos, ch)) = chars.next() {
            if let Some(q) = quote {
                sql.push(ch);
                if ch == q {
                    quote = None;
                }
                continue;
            }
            match ch {
                '\'' | '"' => {
                    quote = Some(ch);
                    sql.push(ch);
                }
                '@' if chars.peek().map(|(_, c)| is_ident_start(*c)).unwrap_or(false) => {
                    let start = pos + 1;
                    let mut end = start;
                    while let Some((i, c)) = chars.peek().copied() {
                        if !is_ident_char(c) {
                            break;
                        }
                        end = i + c.len_utf8();
                        chars.next();
                    }
                    let name = &text[start..end];
                    let slot = match slots.iter().position(|s| s.eq_ignore_ascii_case(name)) {
                        Some(existing) => existing,
                        None => {
                            let value = self.param(name).ok_or_else(|| FleetError::Binding(name.to_string()))?;
                            slots.push(name.to_string());
                            args.push(value.clone());
                            slots.len() - 1
                        }
                    };
                    sql.push('$');
                    sql.push_str(&(slot + 1).to_string());
                }
                _ => sql.push(ch),
            }
        }
        Ok(RenderedSql { sql, args })
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().map(is_ident_start).unwrap_or(false) && chars.all(is_ident_char)
}

fn is_routine_name(s: &str) -> bool {
    !s.is_empty() && s.split('.').all(is_identifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_routines_and_text() {
        assert_eq!(classify("sp_GetVehicleSummary"), StatementKind::Procedure);
        assert_eq!(classify("  fn_GetVehicleHistory "), StatementKind::Procedure);
        assert_eq!(classify("SELECT 1"), StatementKind::Text);
        assert_eq!(classify("selectsomething"), StatementKind::Text);
        assert_eq!(classify("DELETE FROM trips WHERE trip_id = @TripID"), StatementKind::Text);
    }

    #[test]
    fn renders_routine_with_named_arguments() {
        let rendered = SqlStatement::new("sp_UpdateVehicleStatus")
            .bind("@VehicleID", 3)
            .bind("NewStatus", "Maintenance")
            .render()
            .unwrap();
        assert_eq!(rendered.sql, "SELECT * FROM sp_UpdateVehicleStatus(VehicleID => $1, NewStatus => $2)");
        assert_eq!(rendered.args, vec![SqlParam::Int(3), SqlParam::Text(Some("Maintenance".into()))]);
    }

    #[test]
    fn repeated_placeholders_share_one_slot() {
        let rendered = SqlStatement::new("SELECT * FROM vehicles WHERE make ILIKE @Term OR model ILIKE @term")
            .bind("Term", "%toy%")
            .render()
            .unwrap();
        assert_eq!(rendered.sql, "SELECT * FROM vehicles WHERE make ILIKE $1 OR model ILIKE $1");
        assert_eq!(rendered.args.len(), 1);
    }

    #[test]
    fn placeholders_inside_literals_are_left_alone() {
        let rendered = SqlStatement::new("SELECT '@NotAParam', x FROM t WHERE id = @Id")
            .bind("Id", 1)
            .render()
            .unwrap();
        assert_eq!(rendered.sql, "SELECT '@NotAParam', x FROM t WHERE id = $1");
    }

    #[test]
    fn unknown_placeholder_is_a_binding_error() {
        let err = SqlStatement::new("SELECT * FROM trips WHERE trip_id = @TripID").render().unwrap_err();
        assert_eq!(err, FleetError::Binding("TripID".into()));
    }

    #[test]
    fn rejects_malformed_routine_names() {
        assert!(SqlStatement::new("sp_X;DROP").render().is_err());
        assert!(SqlStatement::new("").render().is_err());
    }

    #[test]
    fn rebinding_replaces_value() {
        let stmt = SqlStatement::new("sp_GetVehicleSummary").bind("VehicleID", 1).bind("vehicleid", 2);
        assert_eq!(stmt.params().len(), 1);
        assert_eq!(stmt.param("@VehicleID"), Some(&SqlParam::Int(2)));
    }
}
