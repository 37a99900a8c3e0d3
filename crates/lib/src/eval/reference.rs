//! Resolution of `REF`, `REF_DSL` and `REF_THIS` targets.
//!
//! A reference is a list of segments, nearer to farther: the macro's comma
//! separated arguments, or the parts of a single dotted argument. Every
//! segment is a name or an id. After the DataSetList/DataSet part, all
//! segments but the last name DSL attributes leading into nested groups; the
//! last one names the target attribute.

use super::{EvalError, EvaluationContext, ParameterPositionContext, Scope};
use crate::{
    constants::{REFERENCE_SEPARATOR, names},
    macros::MacroKind,
    model::{AttributePath, Id},
};

/// Which part of the hierarchy a reference starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// `REF(ds, path..., attr)`: a DataSet of the DataSetList owning the
    /// evaluated cell.
    Local,
    /// `REF_DSL(dsl, ds, path..., attr)`: any DataSetList and DataSet.
    Absolute,
    /// `REF_THIS(path..., attr)`: the top-level column of the current pass.
    This,
}

impl ReferenceKind {
    pub fn from_macro(kind: MacroKind) -> Option<Self> {
        match kind {
            MacroKind::Ref => Some(ReferenceKind::Local),
            MacroKind::RefDsl => Some(ReferenceKind::Absolute),
            MacroKind::RefThis => Some(ReferenceKind::This),
            _ => None,
        }
    }
}

/// Splits reference arguments into trimmed segments.
pub(crate) fn segments(name: &str, arguments: &[String]) -> Result<Vec<String>, EvalError> {
    let raw: Vec<&str> = match arguments {
        [single] => single.split(REFERENCE_SEPARATOR).collect(),
        many => many.iter().map(String::as_str).collect(),
    };
    raw.into_iter()
        .map(|segment| match segment.trim() {
            "" => Err(malformed(name, "empty reference segment")),
            trimmed => Ok(trimmed.to_string()),
        })
        .collect()
}

fn malformed(name: &str, reason: &str) -> EvalError {
    EvalError::MalformedArguments {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

impl EvaluationContext<'_> {
    /// Resolves a dotted `dsl.ds.path....attr` reference as a new request root.
    pub fn resolve_reference(&mut self, reference: &str) -> String {
        let target = segments(names::REF_DSL, &[reference.to_string()])
            .and_then(|segments| self.absolute_position(names::REF_DSL, &segments));
        match target {
            Ok(position) => self.resolve(&position).value.unwrap_or_default(),
            Err(err) => self.diagnostic(&err),
        }
    }

    /// Computes the position a reference points to.
    pub fn reference_position(
        &self,
        kind: ReferenceKind,
        name: &str,
        segments: &[String],
        scope: &Scope,
    ) -> Result<ParameterPositionContext, EvalError> {
        let source = self.source();
        match kind {
            ReferenceKind::Absolute => self.absolute_position(name, segments),
            ReferenceKind::Local => {
                let (data_set, rest) = match segments {
                    [data_set, rest @ ..] if !rest.is_empty() => (data_set, rest),
                    _ => return Err(malformed(name, "expects a DataSet and an attribute")),
                };
                let data_set = source.find_data_set(&scope.local, data_set)?.ok_or_else(|| {
                    EvalError::DataSetNotFound {
                        name: data_set.clone(),
                        data_set_list: scope.local,
                    }
                })?;
                let (path, attribute) = self.walk(name, scope.local, rest)?;
                Ok(ParameterPositionContext::new(scope.local, data_set.id, path, attribute))
            }
            ReferenceKind::This => {
                let (path, attribute) = self.walk(name, scope.data_set_list, segments)?;
                Ok(ParameterPositionContext::new(
                    scope.data_set_list,
                    scope.column,
                    path,
                    attribute,
                ))
            }
        }
    }

    /// Computes the position of a `dsl, ds, path..., attr` reference. It
    /// depends on no scope.
    fn absolute_position(
        &self,
        name: &str,
        segments: &[String],
    ) -> Result<ParameterPositionContext, EvalError> {
        let source = self.source();
        let (list, data_set, rest) = match segments {
            [list, data_set, rest @ ..] if !rest.is_empty() => (list, data_set, rest),
            _ => {
                return Err(malformed(
                    name,
                    "expects a DataSetList, a DataSet and an attribute",
                ));
            }
        };
        let list = source.find_data_set_list(list)?.ok_or_else(|| {
            EvalError::DataSetListNotFound { name: list.clone() }
        })?;
        let data_set = source.find_data_set(&list.id, data_set)?.ok_or_else(|| {
            EvalError::DataSetNotFound {
                name: data_set.clone(),
                data_set_list: list.id,
            }
        })?;
        let (path, attribute) = self.walk(name, list.id, rest)?;
        Ok(ParameterPositionContext::new(list.id, data_set.id, path, attribute))
    }

    /// Follows named DSL attributes from `start`; the last segment names the
    /// target attribute.
    fn walk(
        &self,
        name: &str,
        start: Id,
        segments: &[String],
    ) -> Result<(AttributePath, Id), EvalError> {
        let Some((last, groups)) = segments.split_last() else {
            return Err(malformed(name, "missing attribute"));
        };
        let source = self.source();
        let mut path = AttributePath::root();
        let mut current = start;
        for segment in groups {
            let attribute = source.find_attribute(&current, segment)?.ok_or_else(|| {
                EvalError::AttributeNotFound {
                    name: segment.clone(),
                    data_set_list: current,
                }
            })?;
            match attribute.type_data_set_list {
                Some(next) if attribute.is_reference() => {
                    path.push(attribute.id);
                    current = next;
                }
                _ => {
                    return Err(EvalError::NotAReference {
                        name: attribute.name.clone(),
                    });
                }
            }
        }
        let attribute = source.find_attribute(&current, last)?.ok_or_else(|| {
            EvalError::AttributeNotFound {
                name: last.clone(),
                data_set_list: current,
            }
        })?;
        Ok((path, attribute.id))
    }
}
