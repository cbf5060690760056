//! DAX rendering of expression trees.

use super::ast::{Expr, Literal};

/// Render an expression tree as DAX text.
pub fn render(expr: &Expr) -> String {
    let mut out = String::new();
    write_expr(&mut out, expr);
    out
}

fn write_expr(out: &mut String, expr: &Expr) {
    match expr {
        Expr::Field { table, name } => {
            if let Some(table) = table {
                out.push_str(&quote_table(table));
            }
            out.push('[');
            out.push_str(name);
            out.push(']');
        }

        Expr::Literal(lit) => match lit {
            Literal::Number(n) => out.push_str(n),
            // Embedded quotes are escaped by doubling them
            Literal::Str(s) => {
                out.push('"');
                for c in s.chars() {
                    if c == '"' {
                        out.push('"');
                    }
                    out.push(c);
                }
                out.push('"');
            }
            Literal::Bool(true) => out.push_str("TRUE()"),
            Literal::Bool(false) => out.push_str("FALSE()"),
            Literal::Null => out.push_str("BLANK()"),
        },

        Expr::Ident(name) => out.push_str(name),

        Expr::BinaryOp { left, op, right } => {
            write_expr(out, left);
            out.push(' ');
            out.push_str(op.as_dax());
            out.push(' ');
            write_expr(out, right);
        }

        Expr::UnaryOp { op, expr } => {
            match op {
                super::ast::UnaryOperator::Neg => out.push('-'),
                super::ast::UnaryOperator::Not => out.push_str("NOT "),
            }
            write_expr(out, expr);
        }

        Expr::Call { name, args } => {
            out.push_str(name);
            out.push('(');
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_expr(out, arg);
            }
            out.push(')');
        }

        // Block conditionals render as nested IF calls
        Expr::If {
            branches,
            else_branch,
        } => write_if(out, branches, else_branch.as_deref()),

        Expr::Paren(inner) => {
            out.push('(');
            write_expr(out, inner);
            out.push(')');
        }
    }
}

fn write_if(out: &mut String, branches: &[(Expr, Expr)], else_branch: Option<&Expr>) {
    let (cond, then) = &branches[0];
    out.push_str("IF(");
    write_expr(out, cond);
    out.push_str(", ");
    write_expr(out, then);
    if branches.len() > 1 {
        out.push_str(", ");
        write_if(out, &branches[1..], else_branch);
    } else if let Some(els) = else_branch {
        out.push_str(", ");
        write_expr(out, els);
    }
    out.push(')');
}

/// Quote a table name for DAX. Plain identifiers pass through; anything with
/// spaces or punctuation is wrapped in single quotes.
fn quote_table(table: &str) -> String {
    let plain = !table.is_empty()
        && table
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !table.chars().next().is_some_and(|c| c.is_ascii_digit());
    if plain {
        table.to_string()
    } else {
        format!("'{}'", table)
    }
}
