//! Expression AST for calculation formulas.
//!
//! One tree type serves both sides of the translation: the parser builds it
//! from Tableau formula text, the rewriter transforms it node by node, and
//! the renderer serializes it as DAX. Every variant must be handled in the
//! rewrite and render passes - the compiler enforces this.

/// A calculation expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A field reference: `[Name]`, optionally bound to a table.
    Field {
        table: Option<String>,
        name: String,
    },

    /// A literal value.
    Literal(Literal),

    /// A bare identifier that is neither a keyword nor a call, such as an
    /// unquoted date part in `DATEPART(year, [Date])`.
    Ident(String),

    /// Binary operation: left op right.
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },

    /// Unary operation: op expr.
    UnaryOp { op: UnaryOperator, expr: Box<Expr> },

    /// Function call: name(args...).
    Call { name: String, args: Vec<Expr> },

    /// Block conditional: IF c THEN a [ELSEIF c2 THEN b]* [ELSE z] END.
    If {
        /// (condition, value) pairs, first is the IF branch.
        branches: Vec<(Expr, Expr)>,
        else_branch: Option<Box<Expr>>,
    },

    /// Parenthesized expression.
    Paren(Box<Expr>),
}

impl Expr {
    /// Build a field reference with no table binding.
    pub fn field(name: impl Into<String>) -> Self {
        Expr::Field {
            table: None,
            name: name.into(),
        }
    }

    /// Build a function call.
    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call {
            name: name.into(),
            args,
        }
    }

    /// Build a binary operation.
    pub fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Self {
        Expr::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Build a unary operation.
    pub fn unary(op: UnaryOperator, expr: Expr) -> Self {
        Expr::UnaryOp {
            op,
            expr: Box::new(expr),
        }
    }
}

/// Literal values.
///
/// Numbers keep their source text so that rendering is byte-faithful
/// (`2.50` must not come back as `2.5`).
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(String),
    Str(String),
    Bool(bool),
    Null,
}

/// Binary operators, in Tableau and DAX spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,

    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,

    // Logical
    And,
    Or,
}

impl BinaryOperator {
    /// DAX spelling of the operator.
    pub fn as_dax(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            // DAX has no % operator; the rewriter turns Mod into MOD().
            BinaryOperator::Mod => "%",
            BinaryOperator::Pow => "^",
            BinaryOperator::Eq => "=",
            BinaryOperator::Ne => "<>",
            BinaryOperator::Lt => "<",
            BinaryOperator::Le => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::Ge => ">=",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    /// Numeric negation.
    Neg,
    /// Logical NOT.
    Not,
}
