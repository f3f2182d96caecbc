//! SCSS statement and value reader using the `cssparser` tokenizer.
//!
//! The reader understands a flat list of `;`-terminated statements:
//!
//! ```text
//! $name: value [!default];
//! property: value [!important]; /* optional trailing comment */
//! ```
//!
//! There is no nesting, no selectors and no at-rules. Values are read into
//! [`ValueChain`]s with every literal `/` already classified, so the chains
//! can be handed straight to the compiler.

use cssparser::{
    BasicParseErrorKind, Delimiter, ParseError as CssParseError, ParseErrorKind, Parser,
    ParserInput, Token,
};

use crate::functions::{FunctionCall, FunctionGenerator, Generated, Rgb, Rgba};
use crate::render::Strategy;
use crate::resolve::arithmetic;
use crate::rules::{Declaration, Node, Stylesheet, VariableDeclaration};
use crate::types::{Color, Operator, Separator, UnitKind, ValueChain, widen};
use crate::{Error, Result};

type ReadResult<'i, T> = std::result::Result<T, CssParseError<'i, String>>;

/// Trailing `!flag`s of a statement.
#[derive(Debug, Clone, Copy, Default)]
struct Flags {
    important: bool,
    default: bool,
}

/// Read a single value such as `$gap * 2 solid lighten(#000, 10%)`.
///
/// # Example
///
/// ```
/// use horizon_lattice_sass::parser::parse_value;
/// use horizon_lattice_sass::render::Strategy;
///
/// let chain = parse_value("12px/1.5 $family").unwrap();
/// assert_eq!(Strategy::CANONICAL.render(&chain), "12px/1.5 $family");
/// ```
pub fn parse_value(text: &str) -> Result<ValueChain> {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);

    let units = parser
        .parse_entirely(|p| read_units(p, None))
        .map_err(convert_error)?;
    Ok(chain_of(units))
}

/// Read SCSS text into a stylesheet.
///
/// Statements are kept in source order with their 1-based line numbers. A
/// `/* comment */` on the same line after a declaration's `;` is attached to
/// that declaration.
///
/// # Errors
///
/// The first statement that cannot be read fails the whole read.
pub fn parse_stylesheet(scss: &str) -> Result<Stylesheet> {
    let mut input = ParserInput::new(scss);
    let mut parser = Parser::new(&mut input);
    let mut stylesheet = Stylesheet::new();

    loop {
        parser.skip_whitespace();
        if parser.is_exhausted() {
            break;
        }

        let line = parser.current_source_location().line + 1;
        let node = parser
            .parse_until_after(Delimiter::Semicolon, |p| read_statement(p, line))
            .map_err(convert_error)?;

        match node {
            Some(Node::Declaration(declaration)) => {
                let declaration = match trailing_comment(&mut parser) {
                    Some(comment) => declaration.with_comment(comment),
                    None => declaration,
                };
                stylesheet.push(declaration);
            }
            Some(node) => stylesheet.push(node),
            None => {}
        }
    }

    tracing::trace!("Read {} statements", stylesheet.len());
    Ok(stylesheet)
}

fn convert_error(err: CssParseError<'_, String>) -> Error {
    let message = match err.kind {
        ParseErrorKind::Custom(message) => message,
        ParseErrorKind::Basic(BasicParseErrorKind::UnexpectedToken(token)) => {
            format!("unexpected {:?}", token)
        }
        ParseErrorKind::Basic(BasicParseErrorKind::EndOfInput) => "unexpected end of input".into(),
        ParseErrorKind::Basic(kind) => format!("{:?}", kind),
    };
    Error::parse(message, err.location.line + 1, err.location.column)
}

/// One statement, without its `;`. Empty statements yield `None`.
fn read_statement<'i>(p: &mut Parser<'i, '_>, line: u32) -> ReadResult<'i, Option<Node>> {
    if p.is_exhausted() {
        return Ok(None);
    }

    let state = p.state();
    if let Token::Delim('$') = p.next()? {
        let name = variable_name(p)?;
        p.expect_colon()?;

        let mut flags = Flags::default();
        let units = read_units(p, Some(&mut flags))?;
        if flags.important {
            return Err(p.new_custom_error("'!important' is not allowed on a variable"));
        }

        let mut variable = VariableDeclaration::new(name, chain_of(units)).at_line(line);
        if flags.default {
            variable = variable.guarded();
        }
        return Ok(Some(Node::Variable(variable)));
    }

    p.reset(&state);
    let property = property_name(p)?;

    let mut flags = Flags::default();
    let units = read_units(p, Some(&mut flags))?;
    if flags.default {
        return Err(p.new_custom_error(format!("'!default' is not allowed on '{property}'")));
    }

    let mut declaration = Declaration::new(property, chain_of(units)).at_line(line);
    if flags.important {
        declaration = declaration.important();
    }
    Ok(Some(Node::Declaration(declaration)))
}

fn chain_of(units: Vec<UnitKind>) -> ValueChain {
    arithmetic::classify_division(&units.into_iter().collect())
}

/// A property name up to and including its `:`, with `#{$name}` markers kept.
fn property_name<'i>(p: &mut Parser<'i, '_>) -> ReadResult<'i, String> {
    let mut name = String::new();

    loop {
        match p.next_including_whitespace()?.clone() {
            Token::Colon => break,
            Token::WhiteSpace(_) => {}
            Token::Ident(part) => name.push_str(&part),
            Token::Delim('#') => name.push_str(&interpolation(p)?),
            token => return Err(p.new_unexpected_token_error(token)),
        }
    }

    if name.is_empty() {
        return Err(p.new_custom_error("missing property name"));
    }
    Ok(name)
}

/// The identifier directly after a `$`.
fn variable_name<'i>(p: &mut Parser<'i, '_>) -> ReadResult<'i, String> {
    match p.next_including_whitespace()?.clone() {
        Token::Ident(name) => Ok(name.to_string()),
        token => Err(p.new_unexpected_token_error(token)),
    }
}

/// The `{$name}` block after a `#`, returned as `#{$name}`.
fn interpolation<'i>(p: &mut Parser<'i, '_>) -> ReadResult<'i, String> {
    match p.next_including_whitespace()?.clone() {
        Token::CurlyBracketBlock => {}
        token => return Err(p.new_unexpected_token_error(token)),
    }

    let name = p.parse_nested_block(|p| {
        p.expect_delim('$')?;
        variable_name(p)
    })?;
    Ok(format!("#{{${name}}}"))
}

/// Read value units until the input (or the enclosing block) ends.
///
/// `flags` is `Some` at the top level of a statement, where `!important` and
/// `!default` are accepted.
fn read_units<'i>(
    p: &mut Parser<'i, '_>,
    mut flags: Option<&mut Flags>,
) -> ReadResult<'i, Vec<UnitKind>> {
    let mut units: Vec<UnitKind> = Vec::new();
    let mut spaced = true;

    loop {
        let start = p.position();
        let token = match p.next_including_whitespace() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };

        match token {
            Token::WhiteSpace(_) => {
                spaced = true;
                continue;
            }
            Token::Number { value, .. } => {
                let source = p.slice_from(start);
                let value = exact_number(source, "").unwrap_or_else(|| widen(value));
                let value = split_sign(&mut units, spaced, source, value);
                units.push(UnitKind::Number(value));
            }
            Token::Dimension { value, unit, .. } => {
                let source = p.slice_from(start);
                let value = exact_number(source, &unit).unwrap_or_else(|| widen(value));
                let value = split_sign(&mut units, spaced, source, value);
                units.push(UnitKind::dimension(value, unit.to_string()));
            }
            Token::Percentage { unit_value, .. } => {
                let source = p.slice_from(start);
                let value =
                    exact_number(source, "%").unwrap_or_else(|| widen(unit_value * 100.0));
                let value = split_sign(&mut units, spaced, source, value);
                units.push(UnitKind::dimension(value, "%"));
            }
            Token::Ident(text) => match units.last_mut() {
                Some(UnitKind::Ident(prev)) if !spaced && prev.ends_with('}') => prev.push_str(&text),
                _ => units.push(UnitKind::ident(text.to_string())),
            },
            Token::Delim('#') => {
                let marker = interpolation(p)?;
                match units.last_mut() {
                    Some(UnitKind::Ident(prev)) if !spaced => prev.push_str(&marker),
                    _ => units.push(UnitKind::Ident(marker)),
                }
            }
            Token::QuotedString(text) => units.push(UnitKind::string(text.to_string())),
            Token::Hash(hex) | Token::IDHash(hex) => {
                let text = format!("#{hex}");
                match Color::from_hex(&text) {
                    Some(color) => units.push(UnitKind::Color(color)),
                    None => units.push(UnitKind::Ident(text)),
                }
            }
            Token::UnquotedUrl(url) => units.push(UnitKind::Ident(format!("url({url})"))),
            Token::Delim('$') => units.push(UnitKind::variable(variable_name(p)?)),
            Token::Delim('+') => units.push(UnitKind::Operator(Operator::Add)),
            Token::Delim('-') => {
                let negation = spaced && units.last().is_some_and(is_value) && glued(p);
                let op = if negation { Operator::Neg } else { Operator::Sub };
                units.push(UnitKind::Operator(op));
            }
            Token::Delim('*') => units.push(UnitKind::Operator(Operator::Mul)),
            Token::Delim('/') => units.push(UnitKind::Operator(Operator::Div)),
            Token::Comma => units.push(UnitKind::Separator(Separator::Comma)),
            Token::Delim('!') => {
                let Some(flags) = flags.as_deref_mut() else {
                    return Err(p.new_unexpected_token_error(Token::Delim('!')));
                };
                let flag = p.expect_ident_cloned()?;
                if flag.eq_ignore_ascii_case("important") {
                    flags.important = true;
                } else if flag.eq_ignore_ascii_case("default") {
                    flags.default = true;
                } else {
                    return Err(p.new_custom_error(format!("unknown flag '!{flag}'")));
                }
            }
            Token::ParenthesisBlock => {
                let inner = p.parse_nested_block(|p| read_units(p, None))?;
                units.push(UnitKind::Operator(Operator::LeftParen));
                units.extend(inner);
                units.push(UnitKind::Operator(Operator::RightParen));
            }
            Token::Function(name) => {
                let params: ValueChain = p.parse_nested_block(|p| read_units(p, None))?.into_iter().collect();
                units.push(fold_color(&name, params));
            }
            token => return Err(p.new_unexpected_token_error(token)),
        }
        spaced = false;
    }

    Ok(units)
}

/// Whether `unit` can stand as a list item to the left of an operator.
fn is_value(unit: &UnitKind) -> bool {
    match unit {
        UnitKind::Operator(op) => *op == Operator::RightParen,
        UnitKind::Separator(_) => false,
        _ => true,
    }
}

/// Whether the next token follows without whitespace.
fn glued(p: &mut Parser<'_, '_>) -> bool {
    let state = p.state();
    let glued = !matches!(p.next_including_whitespace(), Ok(Token::WhiteSpace(_)) | Err(_));
    p.reset(&state);
    glued
}

/// `2px+3px` tokenizes as `2px` and a signed `+3px`. When a signed number
/// directly follows a numeric operand, push its sign as an operator and
/// return the magnitude.
fn split_sign(units: &mut Vec<UnitKind>, spaced: bool, source: &str, value: f64) -> f64 {
    let op = match source.as_bytes().first() {
        Some(b'+') => Operator::Add,
        Some(b'-') => Operator::Sub,
        _ => return value,
    };
    let operand = matches!(
        units.last(),
        Some(
            UnitKind::Number(_)
                | UnitKind::Dimension { .. }
                | UnitKind::Variable(_)
                | UnitKind::Function { .. }
                | UnitKind::Operator(Operator::RightParen)
        )
    );
    if spaced || !operand {
        return value;
    }

    units.push(UnitKind::Operator(op));
    value.abs()
}

/// The number in a token's source text, read at full precision.
fn exact_number(source: &str, unit: &str) -> Option<f64> {
    source.strip_suffix(unit)?.parse().ok()
}

/// Turn `rgb()`/`rgba()` calls with literal arguments into a color.
fn fold_color(name: &str, params: ValueChain) -> UnitKind {
    let generator: &dyn FunctionGenerator = match name {
        "rgb" => &Rgb,
        "rgba" => &Rgba,
        _ => return UnitKind::function(name, params),
    };

    let literal = params.iter().all(|unit| {
        matches!(
            unit,
            UnitKind::Number(_) | UnitKind::Dimension { .. } | UnitKind::Color(_)
        ) || unit.is_comma()
    });
    if literal
        && let Ok(Generated::Value(value)) =
            generator.apply(&FunctionCall::new(name, &params), Strategy::CANONICAL)
        && let Some(UnitKind::Color(color)) = value.first()
    {
        return UnitKind::Color(*color);
    }

    UnitKind::function(name, params)
}

/// A comment after the `;` on the same line, with its delimiters.
fn trailing_comment(p: &mut Parser<'_, '_>) -> Option<String> {
    loop {
        let state = p.state();
        match p.next_including_whitespace_and_comments() {
            Ok(Token::WhiteSpace(space)) if !space.contains('\n') => {}
            Ok(Token::Comment(text)) => return Some(format!("/*{text}*/")),
            _ => {
                p.reset(&state);
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(text: &str) -> String {
        Strategy::CANONICAL.render(&parse_value(text).unwrap())
    }

    #[test]
    fn read_literals() {
        let chain = parse_value("10px 1.5 50% bold \"Open Sans\" #ff0000").unwrap();
        let units: Vec<_> = chain.iter().cloned().collect();
        assert_eq!(
            units,
            vec![
                UnitKind::dimension(10.0, "px"),
                UnitKind::Number(1.5),
                UnitKind::dimension(50.0, "%"),
                UnitKind::ident("bold"),
                UnitKind::string("Open Sans"),
                UnitKind::Color(Color::rgb(255, 0, 0)),
            ]
        );
    }

    #[test]
    fn read_operators_and_variables() {
        let chain = parse_value("$a * (2px + $b)").unwrap();
        let units: Vec<_> = chain.iter().cloned().collect();
        assert_eq!(
            units,
            vec![
                UnitKind::variable("a"),
                UnitKind::Operator(Operator::Mul),
                UnitKind::Operator(Operator::LeftParen),
                UnitKind::dimension(2.0, "px"),
                UnitKind::Operator(Operator::Add),
                UnitKind::variable("b"),
                UnitKind::Operator(Operator::RightParen),
            ]
        );
    }

    #[test]
    fn slash_is_classified_on_read() {
        let chain = parse_value("12px/1.5").unwrap();
        assert_eq!(chain.iter().nth(1), Some(&UnitKind::Separator(Separator::Slash)));

        let chain = parse_value("$a/$b").unwrap();
        assert_eq!(chain.iter().nth(1), Some(&UnitKind::Operator(Operator::Div)));
    }

    #[test]
    fn read_functions() {
        assert_eq!(render("lighten(#000, 50%)"), "lighten(#000000, 50%)");
        assert_eq!(render("calc(100% - 10px)"), "calc(100% - 10px)");
        assert_eq!(render("rgba(0, 0, 0, 0.5)"), "rgba(0, 0, 0, 0.5)");
        assert_eq!(
            parse_value("rgb(255, 0, 0)").unwrap().first(),
            Some(&UnitKind::Color(Color::rgb(255, 0, 0)))
        );
        assert!(matches!(
            parse_value("rgb($r, 0, 0)").unwrap().first(),
            Some(UnitKind::Function { .. })
        ));
    }

    #[test]
    fn spaced_minus_before_operand_is_negation() {
        let units: Vec<_> = parse_value("0 -$g").unwrap().iter().cloned().collect();
        assert_eq!(
            units,
            vec![
                UnitKind::Number(0.0),
                UnitKind::Operator(Operator::Neg),
                UnitKind::variable("g"),
            ]
        );
        assert_eq!(render("0 -$g"), "0 -$g");

        assert_eq!(
            parse_value("$a - $b").unwrap().iter().nth(1),
            Some(&UnitKind::Operator(Operator::Sub))
        );
        assert_eq!(parse_value("-$b").unwrap().first(), Some(&UnitKind::Operator(Operator::Sub)));
    }

    #[test]
    fn glued_signed_numbers_are_operators() {
        let units: Vec<_> = parse_value("2px+3px").unwrap().iter().cloned().collect();
        assert_eq!(
            units,
            vec![
                UnitKind::dimension(2.0, "px"),
                UnitKind::Operator(Operator::Add),
                UnitKind::dimension(3.0, "px"),
            ]
        );

        let units: Vec<_> = parse_value("$a-2").unwrap().iter().cloned().collect();
        assert_eq!(units.len(), 1, "a hyphen continues the variable name");

        let units: Vec<_> = parse_value("(1px)-2px").unwrap().iter().cloned().collect();
        assert_eq!(units[3], UnitKind::Operator(Operator::Sub));
        assert_eq!(units[4], UnitKind::dimension(2.0, "px"));

        // A space keeps the sign on the number.
        let units: Vec<_> = parse_value("10px -2px").unwrap().iter().cloned().collect();
        assert_eq!(
            units,
            vec![UnitKind::dimension(10.0, "px"), UnitKind::dimension(-2.0, "px")]
        );
    }

    #[test]
    fn numbers_keep_source_precision() {
        let chain = parse_value("0.1px 33.3%").unwrap();
        let units: Vec<_> = chain.iter().cloned().collect();
        assert_eq!(
            units,
            vec![UnitKind::dimension(0.1, "px"), UnitKind::dimension(33.3, "%")]
        );
    }

    #[test]
    fn interpolation_is_glued_to_identifiers() {
        let chain = parse_value("border-#{$side} #{$x}-y").unwrap();
        let units: Vec<_> = chain.iter().cloned().collect();
        assert_eq!(
            units,
            vec![UnitKind::ident("border-#{$side}"), UnitKind::ident("#{$x}-y")]
        );
    }

    #[test]
    fn read_statements() {
        let sheet = parse_stylesheet(
            "$gap: 4px !default;\nwidth: $gap * 2 !important; /* doubled */\nmargin-#{$side}: 0;\n",
        )
        .unwrap();
        assert_eq!(sheet.len(), 3);

        let variable = sheet.variables().next().unwrap();
        assert_eq!(variable.name, "gap");
        assert!(variable.guarded);
        assert_eq!(variable.line, Some(1));

        let declarations: Vec<_> = sheet.declarations().collect();
        assert_eq!(declarations[0].property, "width");
        assert!(declarations[0].important);
        assert_eq!(declarations[0].comment.as_deref(), Some("/* doubled */"));
        assert_eq!(declarations[0].line, Some(2));
        assert_eq!(declarations[1].property, "margin-#{$side}");
        assert_eq!(declarations[1].comment, None);
    }

    #[test]
    fn comment_on_next_line_is_not_attached() {
        let sheet = parse_stylesheet("width: 1px;\n/* next */\nheight: 2px;").unwrap();
        assert!(sheet.declarations().all(|d| d.comment.is_none()));
        assert_eq!(sheet.declarations().count(), 2);
    }

    #[test]
    fn empty_values_are_read() {
        let sheet = parse_stylesheet("content: ;").unwrap();
        assert!(sheet.declarations().next().unwrap().value.is_empty());
    }

    #[test]
    fn parse_errors_have_locations() {
        let err = parse_stylesheet("width: 1px;\nheight 2px;").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));

        let err = parse_stylesheet("$x: 1px !important;").unwrap_err();
        assert!(matches!(err, Error::Parse { ref message, .. } if message.contains("!important")));

        assert!(parse_value("1px !important").is_err());
    }
}
