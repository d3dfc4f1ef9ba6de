//! Query builder - construct a single-table SELECT with a fluent API.

use serde::{Deserialize, Serialize};

use super::token::{Token, TokenStream};

// =============================================================================
// Literal binding
// =============================================================================

/// How query-supplied values reach the SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiteralMode {
    /// Escaped single-quoted literals.
    #[default]
    Inline,
    /// Positional placeholders; values are returned alongside the SQL.
    Bind,
}

/// Collects bind values while a query is tokenized.
#[derive(Debug)]
pub struct Binder {
    mode: LiteralMode,
    params: Vec<String>,
}

impl Binder {
    pub fn new(mode: LiteralMode) -> Self {
        Self {
            mode,
            params: Vec::new(),
        }
    }

    fn bind(&mut self, value: &str) -> Token {
        match self.mode {
            LiteralMode::Inline => Token::LitString(value.to_string()),
            LiteralMode::Bind => {
                self.params.push(value.to_string());
                Token::Param(self.params.len())
            }
        }
    }

    pub fn into_params(self) -> Vec<String> {
        self.params
    }
}

// =============================================================================
// Expressions
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Trusted SQL fragment from a dataset definition.
    Raw(String),
    /// Dotted column reference, quoted per segment.
    Reference(String),
    /// Select-list alias, quoted as one identifier.
    Alias(String),
    /// Query-supplied value, inlined or bound per [`LiteralMode`].
    Value(String),
    /// Constant string literal, always inlined.
    Literal(String),
    Function { name: String, args: Vec<Expr> },
}

impl Expr {
    pub fn raw(sql: &str) -> Self {
        Expr::Raw(sql.into())
    }

    pub fn reference(name: &str) -> Self {
        Expr::Reference(name.into())
    }

    pub fn alias(name: &str) -> Self {
        Expr::Alias(name.into())
    }

    pub fn value(v: &str) -> Self {
        Expr::Value(v.into())
    }

    /// `DATE_TRUNC('<part>', <expr>)`
    pub fn date_trunc(part: &str, expr: Expr) -> Self {
        Expr::Function {
            name: "date_trunc".into(),
            args: vec![Expr::Literal(part.into()), expr],
        }
    }

    pub fn to_tokens(&self, binder: &mut Binder) -> TokenStream {
        let mut ts = TokenStream::new();
        match self {
            Expr::Raw(sql) => {
                ts.push(Token::Raw(sql.clone()));
            }
            Expr::Reference(name) => {
                ts.push(Token::Reference(name.clone()));
            }
            Expr::Alias(name) => {
                ts.push(Token::Ident(name.clone()));
            }
            Expr::Value(v) => {
                ts.push(binder.bind(v));
            }
            Expr::Literal(s) => {
                ts.push(Token::LitString(s.clone()));
            }
            Expr::Function { name, args } => {
                ts.push(Token::FunctionName(name.clone())).lparen();
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        ts.comma().space();
                    }
                    ts.append(&arg.to_tokens(binder));
                }
                ts.rparen();
            }
        }
        ts
    }
}

// =============================================================================
// Predicates
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gte,
    Lte,
}

impl CompareOp {
    fn token(self) -> Token {
        match self {
            CompareOp::Eq => Token::Eq,
            CompareOp::Ne => Token::Ne,
            CompareOp::Gte => Token::Gte,
            CompareOp::Lte => Token::Lte,
        }
    }
}

/// A single WHERE conjunct.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare {
        left: Expr,
        op: CompareOp,
        right: Expr,
    },
    InList {
        expr: Expr,
        negated: bool,
        list: Vec<Expr>,
    },
}

impl Predicate {
    pub fn compare(left: Expr, op: CompareOp, right: Expr) -> Self {
        Predicate::Compare { left, op, right }
    }

    pub fn in_list(expr: Expr, list: Vec<Expr>) -> Self {
        Predicate::InList {
            expr,
            negated: false,
            list,
        }
    }

    pub fn not_in_list(expr: Expr, list: Vec<Expr>) -> Self {
        Predicate::InList {
            expr,
            negated: true,
            list,
        }
    }

    pub fn to_tokens(&self, binder: &mut Binder) -> TokenStream {
        let mut ts = TokenStream::new();
        match self {
            Predicate::Compare { left, op, right } => {
                ts.append(&left.to_tokens(binder))
                    .space()
                    .push(op.token())
                    .space()
                    .append(&right.to_tokens(binder));
            }
            Predicate::InList {
                expr,
                negated,
                list,
            } => {
                ts.append(&expr.to_tokens(binder)).space();
                if *negated {
                    ts.push(Token::Not).space();
                }
                ts.push(Token::In).space().lparen();
                for (i, item) in list.iter().enumerate() {
                    if i > 0 {
                        ts.comma().space();
                    }
                    ts.append(&item.to_tokens(binder));
                }
                ts.rparen();
            }
        }
        ts
    }
}

// =============================================================================
// Select list / ORDER BY
// =============================================================================

/// A SELECT list item: expression with optional alias.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct SelectExpr {
    pub expr: Expr,
    pub alias: Option<String>,
}

impl SelectExpr {
    pub fn new(expr: Expr) -> Self {
        Self { expr, alias: None }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn to_tokens(&self, binder: &mut Binder) -> TokenStream {
        let mut ts = self.expr.to_tokens(binder);
        if let Some(alias) = &self.alias {
            ts.space()
                .push(Token::As)
                .space()
                .push(Token::Ident(alias.clone()));
        }
        ts
    }
}

/// An ORDER BY expression.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByExpr {
    pub expr: Expr,
    pub descending: bool,
}

impl OrderByExpr {
    pub fn asc(expr: Expr) -> Self {
        Self {
            expr,
            descending: false,
        }
    }

    pub fn desc(expr: Expr) -> Self {
        Self {
            expr,
            descending: true,
        }
    }

    pub fn to_tokens(&self, binder: &mut Binder) -> TokenStream {
        let mut ts = self.expr.to_tokens(binder);
        if self.descending {
            ts.space().push(Token::Desc);
        }
        ts
    }
}

// =============================================================================
// Query Builder
// =============================================================================

/// SQL text plus the values bound to its placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSql {
    pub sql: String,
    pub params: Vec<String>,
}

/// A SELECT query over one table.
///
/// Predicates are joined with `AND` in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use = "Query has no effect until converted to SQL with to_sql() or render()"]
pub struct Query {
    pub select: Vec<SelectExpr>,
    pub from: Option<String>,
    pub predicates: Vec<Predicate>,
    pub group_by: Vec<Expr>,
    pub order_by: Vec<OrderByExpr>,
    pub limit: Option<u64>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, exprs: Vec<SelectExpr>) -> Self {
        self.select = exprs;
        self
    }

    pub fn from(mut self, table: &str) -> Self {
        self.from = Some(table.into());
        self
    }

    /// Add a WHERE conjunct.
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn group_by(mut self, exprs: Vec<Expr>) -> Self {
        self.group_by = exprs;
        self
    }

    pub fn order_by(mut self, exprs: Vec<OrderByExpr>) -> Self {
        self.order_by = exprs;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn to_tokens(&self, binder: &mut Binder) -> TokenStream {
        let mut ts = TokenStream::new();

        ts.push(Token::Select).space();
        for (i, select_expr) in self.select.iter().enumerate() {
            if i > 0 {
                ts.comma().space();
            }
            ts.append(&select_expr.to_tokens(binder));
        }

        if let Some(from) = &self.from {
            ts.space()
                .push(Token::From)
                .space()
                .push(Token::Reference(from.clone()));
        }

        if !self.predicates.is_empty() {
            ts.space().push(Token::Where).space();
            for (i, predicate) in self.predicates.iter().enumerate() {
                if i > 0 {
                    ts.space().push(Token::And).space();
                }
                ts.append(&predicate.to_tokens(binder));
            }
        }

        if !self.group_by.is_empty() {
            ts.space().push(Token::GroupBy).space();
            for (i, expr) in self.group_by.iter().enumerate() {
                if i > 0 {
                    ts.comma().space();
                }
                ts.append(&expr.to_tokens(binder));
            }
        }

        if !self.order_by.is_empty() {
            ts.space().push(Token::OrderBy).space();
            for (i, order_expr) in self.order_by.iter().enumerate() {
                if i > 0 {
                    ts.comma().space();
                }
                ts.append(&order_expr.to_tokens(binder));
            }
        }

        if let Some(limit) = self.limit {
            ts.space()
                .push(Token::Limit)
                .space()
                .push(Token::LitInt(limit));
        }

        ts
    }

    /// Render with the given literal mode.
    pub fn render(&self, mode: LiteralMode) -> RenderedSql {
        let mut binder = Binder::new(mode);
        let sql = self.to_tokens(&mut binder).serialize();
        RenderedSql {
            sql,
            params: binder.into_params(),
        }
    }

    /// Render with inlined literals.
    pub fn to_sql(&self) -> String {
        self.render(LiteralMode::Inline).sql
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_sql())
    }
}
