//! Tableau → DAX tree rewriting.
//!
//! Walks the parsed expression tree bottom-up and rewrites each node into
//! its DAX counterpart: function renames via the fixed name table, the
//! special forms (IIF, ATTR, NULL, DATEPART, running aggregates), and field
//! binding to the calculation's home table.
//!
//! The pass is idempotent: every output name is outside the source-name
//! table, so rewriting an already-translated expression changes nothing.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

use super::ast::{BinaryOperator, Expr, Literal};

/// The fixed Tableau → DAX function-name table.
///
/// Names mapping to themselves are listed so that the table is the single
/// exhaustive record of supported functions.
pub static FUNCTION_RENAMES: &[(&str, &str)] = &[
    // Aggregates
    ("SUM", "SUM"),
    ("AVG", "AVERAGE"),
    ("MIN", "MIN"),
    ("MAX", "MAX"),
    ("COUNT", "COUNT"),
    ("COUNTD", "DISTINCTCOUNT"),
    // Date
    ("DATEADD", "DATEADD"),
    ("DATEDIFF", "DATEDIFF"),
    ("TODAY", "TODAY"),
    ("NOW", "NOW"),
    // String
    ("LEFT", "LEFT"),
    ("RIGHT", "RIGHT"),
    ("MID", "MID"),
    ("LEN", "LEN"),
    ("FIND", "FIND"),
    ("CONTAINS", "SEARCH"),
    ("TRIM", "TRIM"),
    ("UPPER", "UPPER"),
    ("LOWER", "LOWER"),
    ("REPLACE", "SUBSTITUTE"),
    // Logical
    ("IF", "IF"),
    ("IFNULL", "IFERROR"),
    ("ISNULL", "ISBLANK"),
    ("ZN", "COALESCE"),
    // Math
    ("ABS", "ABS"),
    ("ROUND", "ROUND"),
    ("SQRT", "SQRT"),
    ("LOG", "LN"),
    ("EXP", "EXP"),
    ("POWER", "POWER"),
];

static FUNCTION_MAP: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| FUNCTION_RENAMES.iter().copied().collect());

/// DATEPART unit → DAX extraction function.
static DATE_PARTS: &[(&str, &str)] = &[
    ("year", "YEAR"),
    ("quarter", "QUARTER"),
    ("month", "MONTH"),
    ("day", "DAY"),
    ("hour", "HOUR"),
    ("minute", "MINUTE"),
    ("second", "SECOND"),
];

/// Names the rewriter itself emits. Calls to these pass through silently on
/// a second translation instead of being reported as unknown.
static TARGET_NAMES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    FUNCTION_RENAMES
        .iter()
        .map(|(_, dst)| *dst)
        .chain(DATE_PARTS.iter().map(|(_, dst)| *dst))
        .chain(["CALCULATE", "ALLPREVIOUS", "VALUES", "MOD", "BLANK"])
        .collect()
});

/// Outcome of rewriting one expression tree.
#[derive(Debug, Clone, PartialEq)]
pub struct RewriteOutcome {
    /// The rewritten tree.
    pub expr: Expr,
    /// Field names that could not be bound to a table.
    pub unresolved: Vec<String>,
    /// Constructs that translated only partially and need manual review.
    pub notes: Vec<String>,
}

/// Rewrite a parsed Tableau expression into its DAX equivalent.
///
/// `home_table` is the table that unqualified field references bind to;
/// when absent, fields stay unresolved and are reported in the outcome.
pub fn rewrite(expr: Expr, home_table: Option<&str>) -> RewriteOutcome {
    let mut rw = Rewriter {
        home_table,
        unresolved: Vec::new(),
        notes: Vec::new(),
    };
    let expr = rw.rewrite(expr);
    RewriteOutcome {
        expr,
        unresolved: rw.unresolved,
        notes: rw.notes,
    }
}

struct Rewriter<'a> {
    home_table: Option<&'a str>,
    unresolved: Vec<String>,
    notes: Vec<String>,
}

impl Rewriter<'_> {
    fn rewrite(&mut self, expr: Expr) -> Expr {
        match expr {
            Expr::Field { table, name } => {
                let table = table.or_else(|| self.home_table.map(str::to_string));
                if table.is_none() && !self.unresolved.contains(&name) {
                    self.unresolved.push(name.clone());
                }
                Expr::Field { table, name }
            }

            Expr::Literal(lit) => Expr::Literal(lit),
            Expr::Ident(name) => Expr::Ident(name),

            // DAX has no % operator
            Expr::BinaryOp {
                left,
                op: BinaryOperator::Mod,
                right,
            } => Expr::call("MOD", vec![self.rewrite(*left), self.rewrite(*right)]),

            Expr::BinaryOp { left, op, right } => Expr::BinaryOp {
                left: Box::new(self.rewrite(*left)),
                op,
                right: Box::new(self.rewrite(*right)),
            },

            Expr::UnaryOp { op, expr } => Expr::UnaryOp {
                op,
                expr: Box::new(self.rewrite(*expr)),
            },

            Expr::Call { name, args } => self.rewrite_call(name, args),

            Expr::If {
                branches,
                else_branch,
            } => Expr::If {
                branches: branches
                    .into_iter()
                    .map(|(c, v)| (self.rewrite(c), self.rewrite(v)))
                    .collect(),
                else_branch: else_branch.map(|e| Box::new(self.rewrite(*e))),
            },

            Expr::Paren(inner) => Expr::Paren(Box::new(self.rewrite(*inner))),
        }
    }

    fn rewrite_call(&mut self, name: String, args: Vec<Expr>) -> Expr {
        let upper = name.to_ascii_uppercase();
        let args: Vec<Expr> = args.into_iter().map(|a| self.rewrite(a)).collect();

        match upper.as_str() {
            // Running aggregates become cumulative CALCULATE calls. The
            // argument is a full sub-expression, so nested calls survive.
            "RUNNING_SUM" | "RUNNING_AVG" => {
                let aggregate = if upper == "RUNNING_SUM" { "SUM" } else { "AVERAGE" };
                if args.len() != 1 {
                    self.notes.push(format!(
                        "{} expects one argument, found {}",
                        upper,
                        args.len()
                    ));
                    return Expr::Call { name: upper, args };
                }
                let mut args = args;
                let Some(inner) = args.pop() else {
                    return Expr::Call { name: upper, args };
                };
                // RUNNING_SUM(SUM(x)) is already an aggregate; anything else
                // is wrapped in the plain aggregate first.
                let aggregated = match inner {
                    Expr::Call { ref name, .. } if name == aggregate => inner,
                    other => Expr::call(aggregate, vec![other]),
                };
                Expr::call(
                    "CALCULATE",
                    vec![aggregated, Expr::call("ALLPREVIOUS", vec![])],
                )
            }

            // DATEPART('unit', expr) → UNIT(expr)
            "DATEPART" => self.rewrite_datepart(args),

            // IIF has IF's exact argument shape in DAX
            "IIF" => Expr::call("IF", args),

            // ATTR(x) → aggregation-neutral value extraction
            "ATTR" => Expr::call("VALUES", args),

            _ => match FUNCTION_MAP.get(upper.as_str()) {
                Some(dst) => Expr::call(*dst, args),
                None => {
                    if !TARGET_NAMES.contains(upper.as_str()) {
                        self.notes
                            .push(format!("unknown function {} left unchanged", name));
                    }
                    Expr::Call { name, args }
                }
            },
        }
    }

    fn rewrite_datepart(&mut self, mut args: Vec<Expr>) -> Expr {
        if args.len() != 2 {
            self.notes
                .push(format!("DATEPART expects two arguments, found {}", args.len()));
            return Expr::Call {
                name: "DATEPART".to_string(),
                args,
            };
        }

        let unit = match &args[0] {
            Expr::Literal(Literal::Str(s)) => Some(s.to_ascii_lowercase()),
            Expr::Ident(s) => Some(s.to_ascii_lowercase()),
            _ => None,
        };

        let mapped = unit
            .as_deref()
            .and_then(|u| DATE_PARTS.iter().find(|(src, _)| *src == u))
            .map(|(_, dst)| *dst);

        match mapped {
            Some(dst) => match args.pop() {
                Some(expr) => Expr::call(dst, vec![expr]),
                None => Expr::Call {
                    name: "DATEPART".to_string(),
                    args,
                },
            },
            None => {
                self.notes.push(format!(
                    "unrecognized DATEPART unit {:?}",
                    unit.unwrap_or_else(|| "<expression>".to_string())
                ));
                Expr::Call {
                    name: "DATEPART".to_string(),
                    args,
                }
            }
        }
    }
}
