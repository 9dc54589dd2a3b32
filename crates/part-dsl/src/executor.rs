use part_core::{GeometryKernel, KernelError, SolidRecipe, realize};
use part_library::{ArgValue, Arguments, BuildError, PrimitiveSpec, Registry};
use thiserror::Error;
use tracing::{debug, info};

use crate::ast::{BinaryOp, Call, DISPLAY_HOOK, Expr, NormalizedProgram, UnaryOp};
use crate::error::DslError;
use crate::parser::parse_program;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutionError {
    #[error("malformed program: {0}")]
    Syntax(#[from] DslError),
    #[error("'{name}' is not an allowed helper{}", suggestion_hint(.suggestion))]
    UnknownHelper {
        name: String,
        suggestion: Option<&'static str>,
    },
    #[error("'{name}' is not the display hook '{expected}'")]
    UnknownDisplay { name: String, expected: &'static str },
    #[error("invalid parameters: {0}")]
    InvalidParameters(#[from] BuildError),
    #[error("geometry kernel failed: {0}")]
    Kernel(#[from] KernelError),
}

fn suggestion_hint(suggestion: &Option<&'static str>) -> String {
    suggestion
        .map(|name| format!("; did you mean '{name}'?"))
        .unwrap_or_default()
}

/// Everything a normalized program can reach: the registered primitives and
/// one display hook.
#[derive(Debug, Clone, Copy)]
pub struct Namespace {
    registry: Registry,
    display: &'static str,
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new(Registry::standard())
    }
}

impl Namespace {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            display: DISPLAY_HOOK,
        }
    }

    pub fn registry(&self) -> Registry {
        self.registry
    }

    pub fn display(&self) -> &'static str {
        self.display
    }

    /// Resolves `call` against the registry and binds its arguments.
    pub fn bind(&self, call: &Call) -> Result<(&'static PrimitiveSpec, Arguments), ExecutionError> {
        let spec = self
            .registry
            .lookup(&call.name)
            .ok_or_else(|| ExecutionError::UnknownHelper {
                name: call.name.clone(),
                suggestion: self.registry.suggest(&call.name),
            })?;
        let positional = call
            .positional()
            .map(evaluate)
            .collect::<Result<Vec<_>, _>>()?;
        let keywords = call
            .keywords()
            .map(|(name, expr)| evaluate(expr).map(|value| (name.to_string(), value)))
            .collect::<Result<Vec<_>, _>>()?;
        let args = spec.bind(positional, keywords)?;
        Ok((spec, args))
    }
}

/// Reduces a constant argument expression to a value.
pub fn evaluate(expr: &Expr) -> Result<ArgValue, DslError> {
    match expr {
        Expr::Number(value) => Ok(ArgValue::Number(*value)),
        Expr::Str(text) => Ok(ArgValue::Text(text.clone())),
        Expr::None => Ok(ArgValue::None),
        Expr::Unary { op, expr } => match (op, evaluate(expr)?) {
            (UnaryOp::Neg, ArgValue::Number(value)) => Ok(ArgValue::Number(-value)),
            (UnaryOp::Neg, other) => Err(DslError::new(format!("cannot negate {other}"))),
        },
        Expr::Binary { lhs, op, rhs } => {
            let (ArgValue::Number(a), ArgValue::Number(b)) = (evaluate(lhs)?, evaluate(rhs)?) else {
                return Err(DslError::new(format!("arithmetic needs numbers in {expr}")));
            };
            match op {
                BinaryOp::Add => Ok(ArgValue::Number(a + b)),
                BinaryOp::Sub => Ok(ArgValue::Number(a - b)),
                BinaryOp::Mul => Ok(ArgValue::Number(a * b)),
                BinaryOp::Div if b == 0.0 => Err(DslError::new(format!("division by zero in {expr}"))),
                BinaryOp::Div => Ok(ArgValue::Number(a / b)),
            }
        }
    }
}

/// Result of one successful run. The solid itself went to the display hook.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    pub primitive: &'static str,
    pub arguments: Arguments,
    pub recipe: SolidRecipe,
}

/// Runs normalized programs inside a closed [`Namespace`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Executor {
    namespace: Namespace,
}

impl Executor {
    pub fn new(namespace: Namespace) -> Self {
        Self { namespace }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Parses and runs program text.
    pub fn run_source<K, F>(
        &self,
        source: &str,
        kernel: &mut K,
        display: F,
    ) -> Result<Execution, ExecutionError>
    where
        K: GeometryKernel + ?Sized,
        F: FnOnce(K::Solid),
    {
        let program = parse_program(source)?;
        self.run(&program, kernel, display)
    }

    /// Builds the program's recipe without touching a kernel.
    pub fn plan(&self, program: &NormalizedProgram) -> Result<Execution, ExecutionError> {
        if program.display != self.namespace.display {
            return Err(ExecutionError::UnknownDisplay {
                name: program.display.clone(),
                expected: self.namespace.display,
            });
        }
        let (spec, arguments) = self.namespace.bind(&program.call)?;
        let recipe = spec.build(&arguments)?;
        debug!(
            primitive = spec.name,
            operations = recipe.operation_count(),
            "built recipe"
        );
        Ok(Execution {
            primitive: spec.name,
            arguments,
            recipe,
        })
    }

    /// Builds the recipe, realizes it through `kernel` and hands the solid to
    /// `display`. The hook runs exactly once, and only on success.
    pub fn run<K, F>(
        &self,
        program: &NormalizedProgram,
        kernel: &mut K,
        display: F,
    ) -> Result<Execution, ExecutionError>
    where
        K: GeometryKernel + ?Sized,
        F: FnOnce(K::Solid),
    {
        let execution = self.plan(program)?;
        let solid = realize(kernel, &execution.recipe)?;
        display(solid);
        info!(primitive = execution.primitive, "displayed solid");
        Ok(execution)
    }
}
