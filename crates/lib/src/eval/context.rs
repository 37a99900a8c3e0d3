//! Request-scoped evaluation state.

use std::{collections::HashMap, sync::Arc};

use rand::{SeedableRng, rngs::StdRng};
use tracing::{debug, trace, warn};

use super::{
    EvalError, ParameterPositionContext, Scope,
    reference::{self, ReferenceKind},
};
use crate::{
    Clock,
    macros::{MacroCall, MacroKind, MacroNode, MacroRegistry, MacroTree, generators, unescape},
    constants::MAX_RANDOM_LENGTH,
    model::{Attribute, Id, ParameterValue},
    overlay::{self, OverlapNode},
    resolver::ResolverConfig,
    source::DataSource,
};

/// The outcome of evaluating one position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluated {
    /// Rendered value, `None` if the cell is empty.
    pub value: Option<String>,
    /// Whether an override contributed to the value.
    pub overlap: bool,
}

/// The authoritative raw value behind a position.
#[derive(Debug, Clone)]
pub struct Located {
    pub attribute: Arc<Attribute>,
    /// The DataSet the reference chain arrived at, if any.
    pub data_set: Option<Id>,
    pub value: Option<ParameterValue>,
    /// Whether an override was applied anywhere along the path.
    pub overlap: bool,
}

impl Located {
    /// The DataSet a DSL-typed value points to.
    pub fn target(&self) -> Option<Id> {
        self.value.as_ref().and_then(ParameterValue::data_set_ref)
    }
}

/// Evaluation state for one top-level request.
///
/// Owns the position cache, the override tries loaded so far and the RNG
/// behind the random macros. Within one context every position evaluates to
/// the same value on every access: the first evaluation is cached and wins.
/// Create a fresh context per request; contexts are not shared.
pub struct EvaluationContext<'a> {
    source: &'a dyn DataSource,
    registry: &'a MacroRegistry,
    clock: &'a dyn Clock,
    config: &'a ResolverConfig,
    rng: StdRng,
    overlays: HashMap<Id, OverlapNode>,
    cache: HashMap<ParameterPositionContext, Evaluated>,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(
        source: &'a dyn DataSource,
        registry: &'a MacroRegistry,
        clock: &'a dyn Clock,
        config: &'a ResolverConfig,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            source,
            registry,
            clock,
            config,
            rng,
            overlays: HashMap::new(),
            cache: HashMap::new(),
        }
    }

    pub fn source(&self) -> &'a dyn DataSource {
        self.source
    }

    /// The override trie of `data_set_list`, loaded on first use.
    pub fn overlay(&mut self, data_set_list: &Id) -> Result<&OverlapNode, EvalError> {
        if !self.overlays.contains_key(data_set_list) {
            let loaded = overlay::load(self.source, data_set_list)?;
            self.overlays.insert(*data_set_list, loaded);
        }
        Ok(&self.overlays[data_set_list])
    }

    /// The cached result for `position`, if it was evaluated already.
    pub fn cached(&self, position: &ParameterPositionContext) -> Option<&Evaluated> {
        self.cache.get(position)
    }

    /// Number of evaluated positions.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Finds the raw value that wins at `position`.
    ///
    /// Walks the path from the top-level column. At every DSL segment an
    /// override registered for exactly that prefix replaces the stored
    /// reference; otherwise the stored reference of the current DataSet is
    /// followed. The leaf value is looked up the same way.
    pub fn locate(&mut self, position: &ParameterPositionContext) -> Result<Located, EvalError> {
        self.overlay(&position.data_set_list)?;
        let overlay = &self.overlays[&position.data_set_list];
        let source = self.source;
        let column = &position.column;

        let mut data_set = Some(position.column);
        let mut data_set_list = position.data_set_list;
        let mut overlap = false;
        for (depth, segment) in position.path.iter().enumerate() {
            let mismatch = || EvalError::PathMismatch {
                segment: *segment,
                data_set_list,
            };
            let attribute = source.attribute(segment)?.ok_or_else(mismatch)?;
            if attribute.data_set_list != data_set_list {
                return Err(mismatch());
            }
            let Some(next) = attribute
                .type_data_set_list
                .filter(|_| attribute.is_reference())
            else {
                return Err(EvalError::NotAReference {
                    name: attribute.name.clone(),
                });
            };
            let prefix = &position.path.as_slice()[..=depth];
            let value = match overlay.get_overlap(prefix, column, segment) {
                Some(row) => {
                    overlap = true;
                    Some(row.value.clone())
                }
                None => stored_value(source, data_set, segment)?,
            };
            data_set = value.as_ref().and_then(ParameterValue::data_set_ref);
            data_set_list = next;
        }

        let not_found = || EvalError::AttributeNotFound {
            name: position.attribute.to_string(),
            data_set_list,
        };
        let attribute = source.attribute(&position.attribute)?.ok_or_else(not_found)?;
        if attribute.data_set_list != data_set_list {
            return Err(not_found());
        }
        let key_path = if attribute.is_reference() {
            position.path.join(attribute.id)
        } else {
            position.path.clone()
        };
        let value = match overlay.get_overlap(key_path.as_slice(), column, &attribute.id) {
            Some(row) => {
                overlap = true;
                Some(row.value.clone())
            }
            None => stored_value(source, data_set, &attribute.id)?,
        };
        Ok(Located {
            attribute,
            data_set,
            value,
            overlap,
        })
    }

    /// Evaluates `position` within `scope`, consulting the cache first.
    ///
    /// Errors of macros inside the value are rendered inline; an `Err` means
    /// the position itself could not be located or rendered.
    pub fn evaluate(
        &mut self,
        position: &ParameterPositionContext,
        scope: &Scope,
    ) -> Result<Evaluated, EvalError> {
        if let Some(hit) = self.cache.get(position) {
            trace!(%position, "Position cache hit");
            return Ok(hit.clone());
        }
        if scope.is_visiting(position) {
            return Err(EvalError::CyclicReference {
                position: position.to_string(),
            });
        }
        debug!(%position, depth = scope.depth(), "Evaluating position");

        let located = self.locate(position)?;
        let inner = scope.descend(position, located.attribute.data_set_list);
        let value = match &located.value {
            Some(value) => Some(self.render_value(&located.attribute, value, &inner)?),
            None => None,
        };
        let evaluated = Evaluated {
            value,
            overlap: located.overlap,
        };
        Ok(self
            .cache
            .entry(position.clone())
            .or_insert(evaluated)
            .clone())
    }

    /// Evaluates `position` as the root of a request. Never fails: errors
    /// become the rendered value.
    pub fn resolve(&mut self, position: &ParameterPositionContext) -> Evaluated {
        let scope = Scope::new(position.data_set_list, position.column);
        match self.evaluate(position, &scope) {
            Ok(evaluated) => evaluated,
            Err(err) => Evaluated {
                value: Some(self.diagnostic(&err)),
                overlap: false,
            },
        }
    }

    /// Parses and evaluates free text within `scope`.
    pub fn evaluate_text(&mut self, text: &str, scope: &Scope) -> String {
        let tree = MacroTree::parse(text, self.registry);
        self.evaluate_nodes(tree.nodes(), scope)
    }

    /// Renders a failure for inline display.
    pub(crate) fn diagnostic(&self, err: &EvalError) -> String {
        warn!(error = %err, kind = ?err.kind(), "Evaluation failed");
        if self.config.inline_diagnostics {
            format!("[{err}]")
        } else {
            String::new()
        }
    }

    fn evaluate_nodes(&mut self, nodes: &[MacroNode], scope: &Scope) -> String {
        let mut out = String::new();
        for node in nodes {
            match node {
                MacroNode::Text(raw) => out.push_str(&unescape(raw)),
                MacroNode::Call(call) => match self.evaluate_call(call, scope) {
                    Ok(value) => out.push_str(&value),
                    Err(err) => out.push_str(&self.diagnostic(&err)),
                },
            }
        }
        out
    }

    fn evaluate_call(&mut self, call: &MacroCall, scope: &Scope) -> Result<String, EvalError> {
        match call.kind {
            MacroKind::Passthrough => Ok(call.to_source()),
            MacroKind::Random => {
                let [len] = exact::<1>(call, self.arguments(call, scope))?;
                let len = parse_count(call, &len)?;
                Ok(generators::random_digits(&mut self.rng, len))
            }
            MacroKind::RandomBetween => {
                let [min, max] = exact::<2>(call, self.arguments(call, scope))?;
                let (min, max) = (parse_int(call, &min)?, parse_int(call, &max)?);
                if min > max {
                    return Err(EvalError::InvalidBounds { min, max });
                }
                Ok(generators::random_between(&mut self.rng, min, max).to_string())
            }
            MacroKind::RandomChar => {
                exact::<0>(call, self.arguments(call, scope))?;
                Ok(generators::random_chars(&mut self.rng, 1))
            }
            MacroKind::RandomChars => {
                let [len] = exact::<1>(call, self.arguments(call, scope))?;
                let len = parse_count(call, &len)?;
                Ok(generators::random_chars(&mut self.rng, len))
            }
            MacroKind::Uuid | MacroKind::UuidUpper => {
                exact::<0>(call, self.arguments(call, scope))?;
                let upper = call.kind == MacroKind::UuidUpper;
                Ok(generators::random_uuid(&mut self.rng, upper))
            }
            MacroKind::Date => {
                let arguments = self.arguments(call, scope);
                self.date(call, &arguments)
            }
            MacroKind::Concat => Ok(self.arguments(call, scope).concat()),
            MacroKind::Ref | MacroKind::RefDsl | MacroKind::RefThis => {
                let kind = ReferenceKind::from_macro(call.kind).ok_or_else(|| {
                    EvalError::MalformedArguments {
                        name: call.name.clone(),
                        reason: "not a reference macro".to_string(),
                    }
                })?;
                let arguments = self.arguments(call, scope);
                let segments = reference::segments(&call.name, &arguments)?;
                let target = self.reference_position(kind, &call.name, &segments, scope)?;
                let evaluated = self.evaluate(&target, scope)?;
                Ok(evaluated.value.unwrap_or_default())
            }
        }
    }

    /// Evaluates every argument of `call` to text.
    fn arguments(&mut self, call: &MacroCall, scope: &Scope) -> Vec<String> {
        call.arguments()
            .iter()
            .map(|argument| self.evaluate_nodes(argument, scope))
            .collect()
    }

    fn date(&self, call: &MacroCall, arguments: &[String]) -> Result<String, EvalError> {
        if arguments.len() > 2 {
            return Err(EvalError::MalformedArguments {
                name: call.name.clone(),
                reason: format!("expects at most 2 arguments, got {}", arguments.len()),
            });
        }
        let offset = arguments.first().map(String::as_str).unwrap_or_default();
        let format = arguments
            .get(1)
            .map(|format| format.trim())
            .filter(|format| !format.is_empty())
            .unwrap_or(self.config.date_format.as_str());
        let days =
            generators::parse_day_offset(offset).ok_or_else(|| EvalError::InvalidNumber {
                name: call.name.clone(),
                value: offset.to_string(),
            })?;
        let instant = self
            .clock
            .days_from_now(days)
            .ok_or_else(|| EvalError::DateOutOfRange {
                offset: offset.to_string(),
            })?;
        generators::format_date(&instant, format).ok_or_else(|| EvalError::InvalidDateFormat {
            format: format.to_string(),
        })
    }

    fn render_value(
        &mut self,
        attribute: &Attribute,
        value: &ParameterValue,
        scope: &Scope,
    ) -> Result<String, EvalError> {
        match value {
            ParameterValue::Text(text) if attribute.kind.evaluates_macros() => {
                Ok(self.evaluate_text(text, scope))
            }
            ParameterValue::Text(text) => Ok(text.clone()),
            ParameterValue::File(file) => Ok(file.name.clone()),
            ParameterValue::ListValue(id) => self
                .source
                .list_value(id)?
                .map(|list_value| list_value.text.clone())
                .ok_or(EvalError::ListValueNotFound { id: *id }),
            ParameterValue::DataSetRef(id) => self
                .source
                .data_set(id)?
                .map(|data_set| data_set.name.clone())
                .ok_or_else(|| EvalError::DataSetNotFound {
                    name: id.to_string(),
                    data_set_list: attribute
                        .type_data_set_list
                        .unwrap_or(attribute.data_set_list),
                }),
        }
    }
}

/// The value stored at `attribute` of `data_set`, if there is a DataSet.
fn stored_value(
    source: &dyn DataSource,
    data_set: Option<Id>,
    attribute: &Id,
) -> Result<Option<ParameterValue>, EvalError> {
    let Some(data_set) = data_set else {
        return Ok(None);
    };
    Ok(source
        .parameter(&data_set, attribute)?
        .map(|parameter| parameter.value))
}

fn exact<const N: usize>(
    call: &MacroCall,
    arguments: Vec<String>,
) -> Result<[String; N], EvalError> {
    arguments
        .try_into()
        .map_err(|arguments: Vec<String>| EvalError::MalformedArguments {
            name: call.name.clone(),
            reason: format!("expects {N} argument(s), got {}", arguments.len()),
        })
}

fn parse_int(call: &MacroCall, text: &str) -> Result<i64, EvalError> {
    text.trim().parse().map_err(|_| EvalError::InvalidNumber {
        name: call.name.clone(),
        value: text.to_string(),
    })
}

/// A length argument in `1..=MAX_RANDOM_LENGTH`.
fn parse_count(call: &MacroCall, text: &str) -> Result<usize, EvalError> {
    let trimmed = text.trim();
    if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        match trimmed.parse::<usize>() {
            Ok(0) => {}
            Ok(count) if count <= MAX_RANDOM_LENGTH => return Ok(count),
            _ => {
                return Err(EvalError::LengthTooLarge {
                    name: call.name.clone(),
                    length: trimmed.to_string(),
                    max: MAX_RANDOM_LENGTH,
                });
            }
        }
    }
    Err(EvalError::InvalidNumber {
        name: call.name.clone(),
        value: text.to_string(),
    })
}
