// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Compilation of [`StepPattern`]s into uniform [`Expression`] matchers.
//!
//! Placeholder-style patterns are [Cucumber Expressions][1], expanded into a
//! [`Regex`] with the help of the [`ParameterTypes`] table. Regex patterns are
//! used verbatim, their top-level capture groups becoming arguments converted
//! by the [`ParameterType`] of the same regex, if any.
//!
//! [1]: https://github.com/cucumber/cucumber-expressions#readme

use std::{any::Any, fmt};

use derive_more::with_trait::{Display, From};
use regex::{Captures, Regex};
use regex_syntax::ast::{self, Ast};

use crate::{
    error::{ExpressionError, RegistrationError},
    parameter::{ParameterType, ParameterTypes},
};

/// Pattern a step is declared with.
#[derive(Clone, Debug, Display, From)]
pub enum StepPattern {
    /// [Cucumber Expression][1], like `I have {int} cukes`.
    ///
    /// [1]: https://github.com/cucumber/cucumber-expressions#readme
    #[display("{_0}")]
    Expression(String),

    /// Regular expression, like `^I have (\d+) cukes$`.
    #[display("/{}/", _0.as_str())]
    Regex(Regex),
}

impl From<&str> for StepPattern {
    fn from(s: &str) -> Self {
        Self::Expression(s.to_owned())
    }
}

impl StepPattern {
    /// Checks the syntax of this [`StepPattern`].
    ///
    /// Parameter types are not resolved here, as they may be defined after
    /// the steps using them.
    pub(crate) fn validate(&self) -> Result<(), RegistrationError> {
        match self {
            Self::Expression(src) => cucumber_expressions::Expression::parse(src)
                .map(drop)
                .map_err(|e| RegistrationError::InvalidExpression {
                    expression: src.clone(),
                    reason: e.to_string(),
                }),
            Self::Regex(_) => Ok(()),
        }
    }

    /// Compiles this [`StepPattern`] into an [`Expression`] using the given
    /// `parameter_types`.
    ///
    /// # Errors
    ///
    /// - [`ExpressionError::UnknownParameterType`] if a placeholder names a
    ///   parameter type missing in `parameter_types`.
    /// - [`ExpressionError::Compile`] if the pattern cannot be expanded.
    pub fn compile<W>(
        &self,
        parameter_types: &ParameterTypes<W>,
    ) -> Result<Expression<W>, ExpressionError> {
        match self {
            Self::Regex(re) => {
                let groups = top_level_captures(re.as_str())
                    .map_err(|reason| ExpressionError::Compile {
                        expression: self.to_string(),
                        reason,
                    })?
                    .into_iter()
                    .map(|(index, source)| Group {
                        candidates: vec![index],
                        quoted: false,
                        parameter: parameter_types.lookup_by_regexp(source).cloned(),
                    })
                    .collect();
                Ok(Expression {
                    pattern: self.clone(),
                    regex: re.clone(),
                    groups,
                })
            }
            Self::Expression(src) => {
                let compile_err = |reason: String| ExpressionError::Compile {
                    expression: src.clone(),
                    reason,
                };

                let parameters = placeholders(src)
                    .into_iter()
                    .map(|name| {
                        parameter_types.get(&name).cloned().ok_or_else(|| {
                            ExpressionError::UnknownParameterType {
                                name,
                                expression: src.clone(),
                            }
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                let regex = cucumber_expressions::Expression::regex_with_parameters(
                    src.as_str(),
                    &parameter_types.custom_regexps(),
                )
                .map_err(|e| compile_err(e.to_string()))?;

                let clusters = capture_clusters(&regex);
                if clusters.len() != parameters.len() {
                    return Err(compile_err(format!(
                        "expanded into {} capture groups for {} parameters",
                        clusters.len(),
                        parameters.len(),
                    )));
                }

                let groups = clusters
                    .into_iter()
                    .zip(parameters)
                    .map(|((candidates, quoted), parameter)| Group {
                        candidates,
                        quoted,
                        parameter: Some(parameter),
                    })
                    .collect();

                Ok(Expression {
                    pattern: self.clone(),
                    regex,
                    groups,
                })
            }
        }
    }
}

/// Compiled [`StepPattern`] matching step text.
pub struct Expression<W> {
    /// Pattern this [`Expression`] was compiled from.
    pattern: StepPattern,

    /// Anchored [`Regex`] the `pattern` expands into.
    regex: Regex,

    /// Capture groups of the `regex`, one per argument.
    groups: Vec<Group<W>>,
}

impl<W> fmt::Debug for Expression<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expression")
            .field("pattern", &self.pattern)
            .field("regex", &self.regex)
            .finish_non_exhaustive()
    }
}

impl<W> Expression<W> {
    /// [`StepPattern`] this [`Expression`] was compiled from.
    #[must_use]
    pub const fn pattern(&self) -> &StepPattern {
        &self.pattern
    }

    /// [`Regex`] this [`Expression`] matches with.
    #[must_use]
    pub const fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Number of arguments a match produces.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.groups.len()
    }

    /// Indicates whether the given step `text` matches.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Matches the given step `text`, returning one deferred [`Argument`] per
    /// capture.
    #[must_use]
    pub fn match_text(&self, text: &str) -> Option<Vec<Argument<W>>> {
        let caps = self.regex.captures(text)?;
        Some(
            self.groups
                .iter()
                .map(|g| Argument {
                    text: g.capture(&caps, text).map(str::to_owned),
                    parameter: g.parameter.clone(),
                })
                .collect(),
        )
    }
}

/// Capture of a single argument.
struct Group<W> {
    /// Indices of capture groups, the first participating one wins.
    candidates: Vec<usize>,

    /// Whether `candidates` capture the contents of a quoted string, without
    /// the quotes.
    quoted: bool,

    /// [`ParameterType`] converting the capture, or [`None`] for plain
    /// [`String`]s.
    parameter: Option<ParameterType<W>>,
}

impl<W> Group<W> {
    fn capture<'t>(&self, caps: &Captures<'t>, text: &'t str) -> Option<&'t str> {
        let m = self.candidates.iter().find_map(|i| caps.get(*i))?;
        if self.quoted {
            // Widen to the quotes, so `{string}` always sees its literal form.
            if let Some(s) = m
                .start()
                .checked_sub(1)
                .and_then(|start| text.get(start..=m.end()))
                .filter(|s| s.starts_with(['"', '\'']) && s.ends_with(['"', '\'']))
            {
                return Some(s);
            }
        }
        Some(m.as_str())
    }
}

/// Deferred extractor of a single argument out of a step text match.
///
/// Conversion happens only in [`Argument::value()`], once the world the step
/// runs against is known.
pub struct Argument<W> {
    /// Captured text, [`None`] if its group didn't participate in the match.
    text: Option<String>,

    /// [`ParameterType`] converting the `text`.
    parameter: Option<ParameterType<W>>,
}

impl<W> fmt::Debug for Argument<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argument")
            .field("text", &self.text)
            .field("parameter_type", &self.parameter_type())
            .finish()
    }
}

impl<W> Argument<W> {
    /// Captured text, empty if the capture group didn't participate in the
    /// match.
    #[must_use]
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    /// Name of the [`ParameterType`] converting this [`Argument`], if any.
    #[must_use]
    pub fn parameter_type(&self) -> Option<&str> {
        self.parameter.as_ref().map(ParameterType::name)
    }

    /// Converts the captured text in the context of the given `world`.
    ///
    /// Without a [`ParameterType`], or if the capture group didn't participate
    /// in the match, an empty or captured [`String`] is returned as is.
    ///
    /// # Errors
    ///
    /// If the [`ParameterType`]'s transformer fails.
    pub fn value(&self, world: &W) -> anyhow::Result<Box<dyn Any>> {
        match (&self.parameter, &self.text) {
            (Some(p), Some(text)) => p.transform(world, text),
            (_, text) => Ok(Box::new(text.clone().unwrap_or_default())),
        }
    }
}

/// Returns names of all `{name}` placeholders of the given Cucumber
/// Expression, in order.
fn placeholders(src: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut chars = src.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => _ = chars.next(),
            '{' => names.push(chars.by_ref().take_while(|c| *c != '}').collect()),
            _ => {}
        }
    }
    names
}

/// Returns indices and sources of the capture groups of the given `regex`
/// not nested into another capture group, in order of appearance.
fn top_level_captures(regex: &str) -> Result<Vec<(usize, &str)>, String> {
    fn walk<'r>(regex: &'r str, ast: &Ast, out: &mut Vec<(usize, &'r str)>) {
        match ast {
            Ast::Group(g) => match g.capture_index() {
                Some(index) => {
                    let span = g.ast.span();
                    out.push((
                        index as usize,
                        &regex[span.start.offset..span.end.offset],
                    ));
                }
                None => walk(regex, &g.ast, out),
            },
            Ast::Concat(c) => c.asts.iter().for_each(|a| walk(regex, a, out)),
            Ast::Alternation(a) => a.asts.iter().for_each(|a| walk(regex, a, out)),
            Ast::Repetition(r) => walk(regex, &r.ast, out),
            _ => {}
        }
    }

    let ast = ast::parse::Parser::new()
        .parse(regex)
        .map_err(|e| e.to_string())?;
    let mut captures = Vec::new();
    walk(regex, &ast, &mut captures);
    Ok(captures)
}

/// Splits capture groups of an expanded Cucumber Expression into clusters,
/// one per parameter, in order of appearance.
///
/// A parameter expands either into a single group (unnamed or named `__N`),
/// or into a set of alternative groups named `__N_M` capturing the contents of
/// a quoted string. Each cluster is returned with a flag telling which kind it
/// is.
fn capture_clusters(regex: &Regex) -> Vec<(Vec<usize>, bool)> {
    let mut clusters: Vec<(Option<&str>, Vec<usize>, bool)> = Vec::new();
    for (i, name) in regex.capture_names().enumerate().skip(1) {
        let Some(name) = name.and_then(|n| n.strip_prefix("__")) else {
            clusters.push((None, vec![i], false));
            continue;
        };
        match name.split_once('_') {
            None => {
                if !clusters.iter().any(|(id, ..)| *id == Some(name)) {
                    clusters.push((Some(name), vec![i], false));
                }
            }
            Some((id, _)) => match clusters.iter_mut().find(|(c, ..)| *c == Some(id)) {
                Some((_, candidates, true)) => candidates.push(i),
                // Nested inside a group already representing this parameter.
                Some((_, _, false)) => {}
                None => clusters.push((Some(id), vec![i], true)),
            },
        }
    }
    clusters
        .into_iter()
        .map(|(_, candidates, quoted)| (candidates, quoted))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct World {
        multiplier: i64,
    }

    fn compile(pattern: impl Into<StepPattern>) -> Expression<World> {
        pattern.into().compile(&ParameterTypes::new()).unwrap()
    }

    fn values(expr: &Expression<World>, text: &str) -> Vec<Box<dyn Any>> {
        expr.match_text(text)
            .unwrap()
            .iter()
            .map(|a| a.value(&World::default()).unwrap())
            .collect()
    }

    #[test]
    fn matches_int_placeholder() {
        let expr = compile("I have {int} cukes");

        let vals = values(&expr, "I have 42 cukes");

        assert_eq!(vals.len(), 1);
        assert_eq!(*vals[0].downcast_ref::<i64>().unwrap(), 42);
        assert_eq!(expr.arity(), 1);
    }

    #[test]
    fn matching_is_anchored() {
        let expr = compile("I have {int} cukes");

        assert!(!expr.is_match("I have 42 cukes in my belly"));
        assert!(!expr.is_match("Now I have 42 cukes"));
        assert!(expr.match_text("I have many cukes").is_none());
    }

    #[test]
    fn matches_several_placeholders_in_order() {
        let expr = compile("{word} has {float} kg of {string}");

        let vals = values(&expr, r#"Bob has 1.5 kg of "green \"fresh\" cukes""#);

        assert_eq!(vals[0].downcast_ref::<String>().unwrap(), "Bob");
        assert!((vals[1].downcast_ref::<f64>().unwrap() - 1.5).abs() < f64::EPSILON);
        assert_eq!(
            vals[2].downcast_ref::<String>().unwrap(),
            r#"green "fresh" cukes"#,
        );
    }

    #[test]
    fn string_placeholder_accepts_single_quotes() {
        let expr = compile("I say {string} and {int}");

        let vals = values(&expr, "I say 'hi there' and 3");

        assert_eq!(vals[0].downcast_ref::<String>().unwrap(), "hi there");
        assert_eq!(*vals[1].downcast_ref::<i64>().unwrap(), 3);
    }

    #[test]
    fn supports_optionals_and_alternations() {
        let expr = compile("I have {int} cucumber(s) in my belly/stomach");

        assert!(expr.is_match("I have 1 cucumber in my belly"));
        assert!(expr.is_match("I have 2 cucumbers in my stomach"));
    }

    #[test]
    fn anonymous_placeholder_captures_anything() {
        let expr = compile("I eat {}");

        let vals = values(&expr, "I eat 3 green cukes");

        assert_eq!(vals[0].downcast_ref::<String>().unwrap(), "3 green cukes");
    }

    #[test]
    fn regex_groups_use_parameter_types_of_same_regex() {
        let expr = compile(Regex::new(r"^I have (\d+) (\w+)(?: and (\w+))?$").unwrap());

        let args = expr.match_text("I have 42 cukes").unwrap();

        assert_eq!(args.len(), 3);
        assert_eq!(args[0].text(), "42");
        assert_eq!(args[0].parameter_type(), Some("int"));
        assert!(args[1].parameter_type().is_none());
        let vals = values(&expr, "I have 42 cukes");
        assert_eq!(*vals[0].downcast_ref::<i64>().unwrap(), 42);
        assert_eq!(vals[1].downcast_ref::<String>().unwrap(), "cukes");
        assert_eq!(vals[2].downcast_ref::<String>().unwrap(), "");
    }

    #[test]
    fn regex_group_prefers_custom_parameter_type() {
        let mut types = ParameterTypes::new();
        types
            .define(ParameterType::new("doubled", r"\d+", |_: &World, s: &str| {
                s.parse::<i64>().map(|n| n * 2)
            }))
            .unwrap();
        let expr = StepPattern::from(Regex::new(r"^(\d+) and ([a-z]+)$").unwrap())
            .compile(&types)
            .unwrap();

        let args = expr.match_text("4 and red").unwrap();

        assert_eq!(args[0].parameter_type(), Some("doubled"));
        let v = args[0].value(&World::default()).unwrap();
        assert_eq!(*v.downcast_ref::<i64>().unwrap(), 8);
        assert!(args[1].parameter_type().is_none());
    }

    #[test]
    fn nested_regex_groups_are_not_arguments() {
        let expr = compile(Regex::new(r"^I have ((\d+) cukes)(?:, ((\w+) left))?$").unwrap());

        let args = expr.match_text("I have 3 cukes, 2 left").unwrap();

        assert_eq!(expr.arity(), 2);
        assert_eq!(
            args.iter().map(Argument::text).collect::<Vec<_>>(),
            ["3 cukes", "2 left"],
        );
        assert!(args.iter().all(|a| a.parameter_type().is_none()));
    }

    #[test]
    fn top_level_captures_carry_their_sources() {
        assert_eq!(
            top_level_captures(r"a(b(c))|(?P<x>d)(?:(e))*").unwrap(),
            [(1, "b(c)"), (3, "d"), (4, "e")],
        );
    }

    #[test]
    fn custom_parameter_type_reads_world() {
        let mut types = ParameterTypes::new();
        types
            .define(ParameterType::new("scaled", r"\d+", |w: &World, s: &str| {
                s.parse::<i64>().map(|n| n * w.multiplier)
            }))
            .unwrap();
        let expr = StepPattern::from("scale {scaled}").compile(&types).unwrap();

        let args = expr.match_text("scale 7").unwrap();

        assert_eq!(args[0].parameter_type(), Some("scaled"));
        let v = args[0].value(&World { multiplier: 3 }).unwrap();
        assert_eq!(*v.downcast_ref::<i64>().unwrap(), 21);
    }

    #[test]
    fn extraction_is_deferred() {
        let mut types = ParameterTypes::new();
        types
            .define(ParameterType::new("never", r"\w+", |_: &World, _: &str| {
                Err::<(), _>(anyhow::anyhow!("not yet"))
            }))
            .unwrap();
        let expr = StepPattern::from("go {never}").compile(&types).unwrap();

        let args = expr.match_text("go home").unwrap();

        assert_eq!(args[0].text(), "home");
        assert!(args[0].value(&World::default()).is_err());
    }

    #[test]
    fn unknown_parameter_type_is_named() {
        let err = StepPattern::from("I pick {color}")
            .compile(&ParameterTypes::<World>::new())
            .unwrap_err();

        assert_eq!(
            err,
            ExpressionError::UnknownParameterType {
                name: "color".into(),
                expression: "I pick {color}".into(),
            },
        );
    }

    #[test]
    fn validates_syntax() {
        assert!(StepPattern::from("I have {int cukes").validate().is_err());
        assert!(StepPattern::from("I have {color} cukes").validate().is_ok());
    }

    #[test]
    fn renders_original_pattern() {
        assert_eq!(StepPattern::from("I have {int} cukes").to_string(), "I have {int} cukes");
        assert_eq!(
            StepPattern::from(Regex::new(r"I have (\d+) cukes").unwrap()).to_string(),
            r"/I have (\d+) cukes/",
        );
    }

    #[test]
    fn placeholders_skip_escapes() {
        assert_eq!(placeholders(r"a \{b} {c} {}"), ["c", ""]);
    }
}
