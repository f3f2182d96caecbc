//! SCSS variables (`$name`) and their substitution.

use std::collections::HashMap;

use crate::render::Strategy;
use crate::types::{UnitKind, ValueChain};

/// Variable bindings for one compilation.
///
/// Names are stored without the leading `$`; lookups accept either form.
#[derive(Debug, Clone, Default)]
pub struct VariableTable {
    variables: HashMap<String, ValueChain>,
}

impl VariableTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a variable, replacing any earlier binding.
    pub fn bind(&mut self, name: impl Into<String>, value: ValueChain) {
        let name = name.into();
        // Remove leading "$" if present
        let name = name.strip_prefix('$').unwrap_or(&name).to_string();
        self.variables.insert(name, value);
    }

    /// Bind a variable only if it has no binding yet (`!default`).
    ///
    /// Returns whether the binding was made.
    pub fn bind_default(&mut self, name: impl Into<String>, value: ValueChain) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.bind(name, value);
        true
    }

    /// Get a variable's bound value.
    pub fn lookup(&self, name: &str) -> Option<&ValueChain> {
        let name = name.strip_prefix('$').unwrap_or(name);
        self.variables.get(name)
    }

    /// Check if a variable exists.
    pub fn contains(&self, name: &str) -> bool {
        let name = name.strip_prefix('$').unwrap_or(name);
        self.variables.contains_key(name)
    }

    /// Iterate over all bindings.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValueChain)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Get the number of bindings.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Clear all bindings.
    pub fn clear(&mut self) {
        self.variables.clear();
    }
}

/// Replace variable references with copies of their bound values.
///
/// Recurses into function parameters and interpolates `#{$name}` markers in
/// identifiers and strings. The input chain is left untouched; every
/// substituted value is a fresh copy of the binding. Names without a binding
/// stay in the chain and are appended to `unbound`. Markers render with
/// `strategy`.
pub fn substitute(
    chain: &ValueChain,
    table: &VariableTable,
    strategy: Strategy,
    unbound: &mut Vec<String>,
) -> ValueChain {
    let mut units = Vec::with_capacity(chain.len());

    for unit in chain.iter() {
        match unit {
            UnitKind::Variable(name) => match table.lookup(name) {
                Some(value) => units.extend(value.iter().cloned()),
                None => {
                    unbound.push(name.clone());
                    units.push(unit.clone());
                }
            },
            UnitKind::Function { name, params } => units.push(UnitKind::Function {
                name: name.clone(),
                params: substitute(params, table, strategy, unbound),
            }),
            UnitKind::Ident(text) => units.push(UnitKind::Ident(interpolate(text, table, strategy))),
            UnitKind::Str(text) => units.push(UnitKind::Str(interpolate(text, table, strategy))),
            other => units.push(other.clone()),
        }
    }

    units.into_iter().collect()
}

/// Replace `#{$name}` markers in `text` with the bound value rendered bare.
///
/// Markers naming an unbound variable are left as written.
pub fn interpolate(text: &str, table: &VariableTable, strategy: Strategy) -> String {
    if !text.contains("#{") {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("#{") {
        out.push_str(&rest[..start]);
        let marker = &rest[start..];

        let Some(end) = marker.find('}') else {
            out.push_str(marker);
            rest = "";
            break;
        };

        let inner = marker[2..end].trim();
        match inner.strip_prefix('$').and_then(|name| table.lookup(name)) {
            Some(value) => out.push_str(&strategy.render_unquoted(value)),
            None => out.push_str(&marker[..=end]),
        }
        rest = &marker[end + 1..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Separator;

    fn px(value: f64) -> UnitKind {
        UnitKind::dimension(value, "px")
    }

    #[test]
    fn variables_bind_lookup() {
        let mut vars = VariableTable::new();
        vars.bind("$gap", ValueChain::single(px(8.0)));

        assert_eq!(vars.lookup("gap"), Some(&ValueChain::single(px(8.0))));
        assert_eq!(vars.lookup("$gap"), Some(&ValueChain::single(px(8.0))));
        assert!(vars.contains("gap"));
        assert_eq!(vars.len(), 1);
    }

    #[test]
    fn last_write_wins() {
        let mut vars = VariableTable::new();
        vars.bind("gap", ValueChain::single(px(8.0)));
        vars.bind("gap", ValueChain::single(px(16.0)));
        assert_eq!(vars.lookup("gap"), Some(&ValueChain::single(px(16.0))));
    }

    #[test]
    fn bind_default_keeps_existing() {
        let mut vars = VariableTable::new();
        assert!(vars.bind_default("gap", ValueChain::single(px(8.0))));
        assert!(!vars.bind_default("gap", ValueChain::single(px(16.0))));
        assert_eq!(vars.lookup("gap"), Some(&ValueChain::single(px(8.0))));
    }

    #[test]
    fn substitute_replaces_with_copies() {
        let mut vars = VariableTable::new();
        vars.bind("border", [px(1.0), UnitKind::ident("solid")].into_iter().collect());

        let chain: ValueChain = [UnitKind::variable("border"), UnitKind::ident("red")]
            .into_iter()
            .collect();
        let mut unbound = vec![];
        let result = substitute(&chain, &vars, Strategy::CANONICAL, &mut unbound);

        assert_eq!(Strategy::CANONICAL.render(&result), "1px solid red");
        assert!(unbound.is_empty());
        // The original chain still holds the reference.
        assert_eq!(chain.first(), Some(&UnitKind::Variable("border".into())));
        assert_eq!(vars.lookup("border").map(ValueChain::len), Some(2));
    }

    #[test]
    fn substitute_recurses_into_functions() {
        let mut vars = VariableTable::new();
        vars.bind("amount", ValueChain::single(UnitKind::dimension(10.0, "%")));

        let params: ValueChain = [
            UnitKind::ident("red"),
            UnitKind::Separator(Separator::Comma),
            UnitKind::variable("amount"),
        ]
        .into_iter()
        .collect();
        let chain = ValueChain::single(UnitKind::function("lighten", params));

        let result = substitute(&chain, &vars, Strategy::CANONICAL, &mut vec![]);
        assert_eq!(Strategy::CANONICAL.render(&result), "lighten(red, 10%)");
    }

    #[test]
    fn unbound_references_pass_through() {
        let vars = VariableTable::new();
        let chain = ValueChain::single(UnitKind::variable("missing"));
        let mut unbound = vec![];

        let result = substitute(&chain, &vars, Strategy::CANONICAL, &mut unbound);
        assert_eq!(result, chain);
        assert_eq!(unbound, vec!["missing".to_string()]);
    }

    #[test]
    fn interpolation_markers() {
        let mut vars = VariableTable::new();
        vars.bind("side", ValueChain::single(UnitKind::ident("left")));
        vars.bind("font", ValueChain::single(UnitKind::string("Open Sans")));

        assert_eq!(interpolate("border-#{$side}", &vars, Strategy::CANONICAL), "border-left");
        assert_eq!(interpolate("#{$font}, serif", &vars, Strategy::CANONICAL), "Open Sans, serif");
        assert_eq!(interpolate("margin-#{$nope}", &vars, Strategy::CANONICAL), "margin-#{$nope}");
        assert_eq!(interpolate("plain", &vars, Strategy::CANONICAL), "plain");
        assert_eq!(interpolate("broken-#{$side", &vars, Strategy::CANONICAL), "broken-#{$side");
    }

    #[test]
    fn interpolation_uses_given_precision() {
        let mut vars = VariableTable::new();
        vars.bind("ratio", ValueChain::single(UnitKind::dimension(10.0 / 3.0, "px")));

        assert_eq!(interpolate("#{$ratio}", &vars, Strategy::canonical(2)), "3.33px");
        assert_eq!(interpolate("#{$ratio}", &vars, Strategy::CANONICAL), "3.33333px");
    }
}
