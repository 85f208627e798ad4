//! Partial-update statement construction.
//!
//! `UpdateBuilder` collects `(column, Option<value>)` pairs in declaration order,
//! keeps only the present ones and numbers their placeholders from `$1`. Scope
//! parameters (the ids that tie the update to its owner) are numbered after the
//! assignments, so the argument vector always lines up with the statement text.

use crate::error::AppError;

/// A value bound to a positional placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlArg {
    Text(String),
    Bool(bool),
    Int(i32),
}

impl From<String> for SqlArg {
    fn from(value: String) -> Self {
        SqlArg::Text(value)
    }
}

impl From<&str> for SqlArg {
    fn from(value: &str) -> Self {
        SqlArg::Text(value.to_string())
    }
}

impl From<bool> for SqlArg {
    fn from(value: bool) -> Self {
        SqlArg::Bool(value)
    }
}

impl From<i32> for SqlArg {
    fn from(value: i32) -> Self {
        SqlArg::Int(value)
    }
}

/// A finished statement together with its positional arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStatement {
    pub sql: String,
    pub args: Vec<SqlArg>,
}

#[derive(Debug, Default)]
pub struct UpdateBuilder {
    assignments: Vec<String>,
    args: Vec<SqlArg>,
}

impl UpdateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `column = $n` if `value` is present; absent values are skipped.
    pub fn set<T: Into<SqlArg>>(mut self, column: &'static str, value: Option<T>) -> Self {
        if let Some(value) = value {
            self.args.push(value.into());
            self.assignments
                .push(format!("{} = ${}", column, self.args.len()));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// The comma separated SET clause built so far.
    pub fn set_clause(&self) -> String {
        self.assignments.join(", ")
    }

    /// Appends the scope parameters and renders the statement.
    ///
    /// `render` receives the SET clause and one placeholder per scope parameter,
    /// numbered after the assignments. Fails with `BadRequest` when nothing was set.
    pub fn build<F>(self, scope: Vec<SqlArg>, render: F) -> Result<UpdateStatement, AppError>
    where
        F: FnOnce(&str, &[String]) -> String,
    {
        if self.is_empty() {
            return Err(AppError::BadRequest("update structure has no values".into()));
        }

        let set_clause = self.set_clause();
        let mut args = self.args;
        let first = args.len() + 1;
        let placeholders: Vec<String> = (first..first + scope.len())
            .map(|index| format!("${}", index))
            .collect();
        args.extend(scope);

        Ok(UpdateStatement {
            sql: render(&set_clause, &placeholders),
            args,
        })
    }
}
