use std::fmt;

/// Variable the normalized program assigns the solid to.
pub const RESULT_VARIABLE: &str = "shape";

/// Display hook the normalized program hands the solid to.
pub const DISPLAY_HOOK: &str = "Part.show";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Constant argument expression. Nothing in it can refer to a name.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Str(String),
    None,
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Binary {
        lhs: Box<Expr>,
        op: BinaryOp,
        rhs: Box<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    /// Keyword, for `name=value` arguments.
    pub name: Option<String>,
    pub value: Expr,
}

/// One `name(args)` call. `args_text` is the argument list exactly as written.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub name: String,
    pub args: Vec<Argument>,
    pub args_text: String,
}

impl Call {
    pub fn positional(&self) -> impl Iterator<Item = &Expr> {
        self.args
            .iter()
            .filter(|arg| arg.name.is_none())
            .map(|arg| &arg.value)
    }

    pub fn keywords(&self) -> impl Iterator<Item = (&str, &Expr)> {
        self.args
            .iter()
            .filter_map(|arg| arg.name.as_deref().map(|name| (name, &arg.value)))
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.args_text)
    }
}

/// Exactly two statements: `variable = call` then `display(variable)`.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedProgram {
    pub variable: String,
    pub call: Call,
    pub display: String,
}

impl NormalizedProgram {
    pub fn to_source(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for NormalizedProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} = {}", self.variable, self.call)?;
        write!(f, "{}({})", self.display, self.variable)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(value) => write!(f, "{value}"),
            Expr::Str(text) => write!(f, "{text:?}"),
            Expr::None => f.write_str("None"),
            Expr::Unary { op, expr } => match op {
                UnaryOp::Neg => write!(f, "(-{expr})"),
            },
            Expr::Binary { lhs, op, rhs } => {
                let op_text = match op {
                    BinaryOp::Add => "+",
                    BinaryOp::Sub => "-",
                    BinaryOp::Mul => "*",
                    BinaryOp::Div => "/",
                };
                write!(f, "({lhs} {op_text} {rhs})")
            }
        }
    }
}
