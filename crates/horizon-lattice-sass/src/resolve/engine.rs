//! Main compilation pass.

use std::collections::HashMap;

use crate::functions::{FunctionCall, FunctionRegistry, Generated};
use crate::render::{DEFAULT_PRECISION, Strategy};
use crate::resolve::arithmetic::{self, ArithmeticError};
use crate::resolve::variables::{self, VariableTable};
use crate::rules::{Declaration, Stylesheet};
use crate::types::{UnitKind, ValueChain};
use crate::{Error, Result};

/// Options for a [`Compiler`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompilerOptions {
    /// Decimal places kept by canonical output.
    pub precision: u8,
    /// Whether trailing comments are written after declarations.
    pub emit_comments: bool,
    /// Strategy used for the emitted text.
    pub strategy: Strategy,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            emit_comments: true,
            strategy: Strategy::CANONICAL,
        }
    }
}

impl CompilerOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of decimal places.
    pub fn precision(mut self, precision: u8) -> Self {
        self.precision = precision;
        self
    }

    /// Enable or disable comment output.
    pub fn emit_comments(mut self, emit: bool) -> Self {
        self.emit_comments = emit;
        self
    }

    /// Set the output strategy.
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// The strategy output is rendered with, precision applied.
    pub fn output_strategy(&self) -> Strategy {
        match self.strategy {
            Strategy::Canonical { .. } => Strategy::canonical(self.precision),
            Strategy::Diagnostic => Strategy::Diagnostic,
        }
    }
}

/// The result of compiling a stylesheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Compilation {
    /// The emitted CSS, one declaration per line.
    pub css: String,
    /// Everything reported along the way, in the order it happened.
    pub diagnostics: Vec<Error>,
}

impl Compilation {
    /// Diagnostics that dropped a declaration.
    pub fn errors(&self) -> impl Iterator<Item = &Error> {
        self.diagnostics.iter().filter(|err| err.is_fatal())
    }

    /// Diagnostics that did not affect output.
    pub fn warnings(&self) -> impl Iterator<Item = &Error> {
        self.diagnostics.iter().filter(|err| !err.is_fatal())
    }

    /// Whether any declaration was dropped.
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }
}

/// Compiles stylesheets to CSS.
///
/// A compiler holds no state between compilations: every call to
/// [`compile`](Self::compile) starts from an empty variable table, so one
/// compiler can be reused and shared freely.
///
/// # Example
///
/// ```
/// use horizon_lattice_sass::Compiler;
///
/// let compilation = Compiler::default()
///     .compile_str("$gap: 4px; margin: $gap * 2 $gap;")
///     .unwrap();
/// assert_eq!(compilation.css, "margin: 8px 4px;");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Compiler<'r> {
    registry: &'r FunctionRegistry,
    options: CompilerOptions,
}

impl Default for Compiler<'static> {
    fn default() -> Self {
        Self::new(CompilerOptions::default())
    }
}

impl Compiler<'static> {
    /// Create a compiler using the built-in functions.
    pub fn new(options: CompilerOptions) -> Self {
        Self::with_registry(FunctionRegistry::builtin(), options)
    }
}

impl<'r> Compiler<'r> {
    /// Create a compiler using a custom function registry.
    pub fn with_registry(registry: &'r FunctionRegistry, options: CompilerOptions) -> Self {
        Self { registry, options }
    }

    /// Get the options.
    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Get the function registry.
    pub fn registry(&self) -> &'r FunctionRegistry {
        self.registry
    }

    /// Read and compile SCSS text.
    pub fn compile_str(&self, scss: &str) -> Result<Compilation> {
        let mut stylesheet = Stylesheet::from_scss(scss)?;
        self.compile(&mut stylesheet)
    }

    /// Compile a stylesheet.
    ///
    /// Each declaration's value is replaced in place by its resolved form.
    /// Declarations with a fatal error keep their original value, are left out
    /// of the output and are listed in [`Compilation::diagnostics`].
    ///
    /// # Errors
    ///
    /// Fails without output when a variable declaration is malformed, refers
    /// to itself through other variables, or fails to evaluate.
    pub fn compile(&self, stylesheet: &mut Stylesheet) -> Result<Compilation> {
        let strategy = self.options.output_strategy();
        let mut context = ResolutionContext::new(self.registry, strategy);

        context.collect(stylesheet)?;
        context.settle_all()?;

        let mut lines = Vec::new();
        for declaration in stylesheet.declarations_mut() {
            if let Err(err) = context.resolve_declaration(declaration) {
                context.report(err);
                continue;
            }

            let line = declaration.render_with(strategy, self.options.emit_comments);
            if line.is_empty() {
                tracing::debug!("Dropping blank declaration '{}'", declaration.property);
                continue;
            }
            lines.push(line);
        }

        Ok(Compilation {
            css: lines.join("\n"),
            diagnostics: context.into_diagnostics(),
        })
    }
}

/// A variable expression as written, before settling.
#[derive(Debug, Clone)]
struct RawBinding {
    expression: ValueChain,
    line: Option<u32>,
}

/// Per-compilation state: the variable table, the registry and the
/// diagnostics collected so far.
pub(crate) struct ResolutionContext<'r> {
    registry: &'r FunctionRegistry,
    strategy: Strategy,
    raw: HashMap<String, RawBinding>,
    variables: VariableTable,
    diagnostics: Vec<Error>,
}

impl<'r> ResolutionContext<'r> {
    pub(crate) fn new(registry: &'r FunctionRegistry, strategy: Strategy) -> Self {
        Self {
            registry,
            strategy,
            raw: HashMap::new(),
            variables: VariableTable::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Record every variable declaration, in source order.
    ///
    /// Values are not resolved here, so declarations may refer to variables
    /// declared further down.
    pub(crate) fn collect(&mut self, stylesheet: &Stylesheet) -> Result<()> {
        for variable in stylesheet.variables() {
            if variable.name.is_empty() {
                return Err(Error::invalid_variable("", "missing name", variable.line));
            }
            if variable.expression.is_empty() {
                return Err(Error::invalid_variable(
                    &variable.name,
                    "missing value",
                    variable.line,
                ));
            }
            if variable.guarded && self.raw.contains_key(&variable.name) {
                continue;
            }

            self.raw.insert(
                variable.name.clone(),
                RawBinding {
                    expression: variable.expression.clone(),
                    line: variable.line,
                },
            );
        }
        Ok(())
    }

    /// Resolve every collected variable.
    pub(crate) fn settle_all(&mut self) -> Result<()> {
        let mut names: Vec<String> = self.raw.keys().cloned().collect();
        names.sort_unstable();

        let mut stack = Vec::new();
        for name in names {
            self.settle(&name, &mut stack)?;
        }
        Ok(())
    }

    fn settle(&mut self, name: &str, stack: &mut Vec<String>) -> Result<()> {
        if self.variables.contains(name) {
            return Ok(());
        }
        let Some(raw) = self.raw.get(name).cloned() else {
            return Ok(());
        };

        if let Some(start) = stack.iter().position(|entry| entry == name) {
            let mut cycle: Vec<String> = stack[start..]
                .iter()
                .map(|entry| format!("${entry}"))
                .collect();
            cycle.push(format!("${name}"));
            return Err(Error::invalid_variable(
                name,
                format!("circular reference {}", cycle.join(" -> ")),
                raw.line,
            ));
        }

        stack.push(name.to_string());
        for dependency in raw.expression.variable_names() {
            self.settle(&dependency, stack)?;
        }
        stack.pop();

        let context = format!("${name}");
        let value = self.resolve_chain(&raw.expression, &context, raw.line)?;
        tracing::trace!(
            "Settled ${} = {}",
            name,
            Strategy::Diagnostic.render(&value)
        );
        self.variables.bind(name, value);
        Ok(())
    }

    /// Resolve one declaration and replace its property and value in place.
    pub(crate) fn resolve_declaration(&mut self, declaration: &mut Declaration) -> Result<()> {
        // Detection must see the chain before substitution.
        let classified = arithmetic::classify_division(&declaration.value);
        let has_arithmetic = arithmetic::contains_arithmetic(&classified);

        let property = variables::interpolate(&declaration.property, &self.variables, self.strategy);
        let value = self.reduce(&classified, has_arithmetic, &property, declaration.line)?;

        declaration.property = property;
        declaration.value = value;
        tracing::trace!("Resolved {}", declaration);
        Ok(())
    }

    fn resolve_chain(&mut self, chain: &ValueChain, context: &str, line: Option<u32>) -> Result<ValueChain> {
        let classified = arithmetic::classify_division(chain);
        let has_arithmetic = arithmetic::contains_arithmetic(&classified);
        self.reduce(&classified, has_arithmetic, context, line)
    }

    /// Substitute, evaluate when needed, then dispatch functions.
    fn reduce(
        &mut self,
        classified: &ValueChain,
        has_arithmetic: bool,
        context: &str,
        line: Option<u32>,
    ) -> Result<ValueChain> {
        let mut unbound = Vec::new();
        let substituted =
            variables::substitute(classified, &self.variables, self.strategy, &mut unbound);
        for name in unbound {
            self.report(Error::unbound_variable(name, context, line));
        }

        let evaluated = if has_arithmetic {
            let operands = self.dispatch_operands(substituted, context, line)?;
            arithmetic::evaluate(&operands).map_err(|err| lift(err, context, line))?
        } else {
            substituted
        };

        self.dispatch_functions(evaluated, context, line)
    }

    /// Call the registered functions that sit next to an operator, so their
    /// results can be evaluated as operands.
    fn dispatch_operands(
        &mut self,
        chain: ValueChain,
        context: &str,
        line: Option<u32>,
    ) -> Result<ValueChain> {
        let units: Vec<UnitKind> = chain.into_iter().collect();
        let is_operator = |unit: Option<&UnitKind>| matches!(unit, Some(UnitKind::Operator(_)));
        let operands: Vec<bool> = (0..units.len())
            .map(|i| {
                is_operator(i.checked_sub(1).and_then(|prev| units.get(prev)))
                    || is_operator(units.get(i + 1))
            })
            .collect();

        let mut out = Vec::with_capacity(units.len());
        for (unit, operand) in units.into_iter().zip(operands) {
            match unit {
                UnitKind::Function { name, params } if operand && self.registry.contains(&name) => {
                    out.extend(self.call(name, params, context, line)?);
                }
                unit => out.push(unit),
            }
        }

        Ok(out.into_iter().collect())
    }

    /// Replace registered function calls with their results, innermost first.
    fn dispatch_functions(
        &mut self,
        chain: ValueChain,
        context: &str,
        line: Option<u32>,
    ) -> Result<ValueChain> {
        let mut units = Vec::with_capacity(chain.len());

        for unit in chain {
            match unit {
                UnitKind::Function { name, params } => {
                    units.extend(self.call(name, params, context, line)?);
                }
                unit => units.push(unit),
            }
        }

        Ok(units.into_iter().collect())
    }

    /// Dispatch a single call after its arguments. Unknown functions come back
    /// as they are.
    fn call(
        &mut self,
        name: String,
        params: ValueChain,
        context: &str,
        line: Option<u32>,
    ) -> Result<ValueChain> {
        let registry = self.registry;
        let params = self.dispatch_functions(params, context, line)?;

        let Some(generator) = registry.get(&name) else {
            tracing::debug!(
                "Passing through unknown function {}({})",
                name,
                Strategy::Diagnostic.render(&params)
            );
            self.report(Error::unknown_function(&name, context, line));
            return Ok(ValueChain::single(UnitKind::Function { name, params }));
        };

        let params = if arithmetic::contains_arithmetic(&params) {
            arithmetic::evaluate(&params).map_err(|err| lift(err, context, line))?
        } else {
            params
        };

        let call = FunctionCall::new(&name, &params);
        let generated = generator
            .apply(&call, self.strategy)
            .map_err(|err| Error::function_argument(&name, context, err.message, line))?;

        Ok(match generated {
            Generated::Value(value) => value,
            Generated::Text(text) if text.is_empty() => ValueChain::new(),
            Generated::Text(text) => ValueChain::single(UnitKind::Ident(text)),
        })
    }

    /// Log and keep a diagnostic.
    pub(crate) fn report(&mut self, err: Error) {
        tracing::warn!("{}", err);
        self.diagnostics.push(err);
    }

    pub(crate) fn into_diagnostics(self) -> Vec<Error> {
        self.diagnostics
    }
}

fn lift(err: ArithmeticError, context: &str, line: Option<u32>) -> Error {
    Error::arithmetic(context, err.operator.map(|op| op.symbol()), err.message, line)
}
