// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Source text in, rewritten [`Unit`] out.

use cause_ast::expr::{Expr, ExprKind};
use cause_ast::Printer;
use cause_interp::{Interpreter, Value};
use cause_transform::{DeltaRules, Folder, LambdaForm, Normalize, Symbols};
use cause_types::Type;
use indexmap::IndexMap;
use log::{debug, warn};

use crate::config::CompileOptions;
use crate::error::{CompileError, Error};
use crate::unit::Unit;

/// The result of compiling one expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    /// Type of the whole expression after rewriting.
    pub ty: Type,
    /// The rewritten body as source text, for display.
    pub code: String,
    pub unit: Unit,
}

impl Compiled {
    pub fn free(&self) -> &[String] {
        self.unit.free()
    }

    /// Free variables that `values` has no entry for.
    pub fn missing(&self, values: &IndexMap<String, Value>) -> Vec<String> {
        self.free().iter().filter(|name| !values.contains_key(*name)).cloned().collect()
    }
}

/// Compiles expressions with one set of options and one normalizer.
pub struct Compiler {
    options: CompileOptions,
    normalizer: Box<dyn Normalize>,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        let normalizer = LambdaForm::new(options.namespace.clone());
        Self::with_normalizer(options, normalizer)
    }

    pub fn with_normalizer(options: CompileOptions, normalizer: impl Normalize + 'static) -> Self {
        Self { options, normalizer: Box::new(normalizer) }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn compile(&self, symbols: impl Into<Symbols>, source: &str) -> Result<Compiled, CompileError> {
        let expr = parse(source)?;

        let mut symbols = symbols.into();
        if let ExprKind::Function { name: Some(name), .. } = &expr.kind {
            symbols.insert(name.clone());
        }

        let namespace = self.options.namespace.as_str();
        let normalized = self.normalizer.normalize(expr, &symbols)?;
        let rules = DeltaRules::new(namespace);
        let folded = Folder::new(&rules).fold(&normalized.expr)?;

        let code = format!("return {}", Printer::new(namespace).print(&folded.expr));
        debug!("compiled to {}: {}", folded.ty, code);

        Ok(Compiled {
            ty: folded.ty,
            code,
            unit: Unit::new(namespace, normalized.free, folded.expr),
        })
    }

    /// Compile `source` and run it against `values`.
    pub fn evaluate(
        &self,
        symbols: impl Into<Symbols>,
        source: &str,
        interp: &Interpreter<'_>,
        values: &IndexMap<String, Value>,
    ) -> Result<Value, Error> {
        let compiled = self.compile(symbols, source)?;
        self.check_bindings(&compiled, values)?;
        Ok(compiled.unit.invoke(interp, values)?)
    }

    /// In strict mode every free variable needs a value; otherwise missing
    /// ones are only reported.
    pub fn check_bindings(&self, compiled: &Compiled, values: &IndexMap<String, Value>) -> Result<(), CompileError> {
        let missing = compiled.missing(values);
        if missing.is_empty() {
            return Ok(());
        }
        if self.options.strict_free_variables {
            return Err(CompileError::MissingBindings(missing));
        }
        warn!("no binding for free variable(s): {}", missing.join(", "));
        Ok(())
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(CompileOptions::default())
    }
}

fn parse(source: &str) -> Result<Expr, CompileError> {
    let result = cause_parser::parse_source(source);
    match result.expr {
        Some(expr) if result.errors.is_empty() => Ok(expr),
        _ => Err(CompileError::Parse(result.errors)),
    }
}
