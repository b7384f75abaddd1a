use rosc::{OscMessage, OscType};

use crate::mapping::{MappingError, ValueMapper};
use crate::template::{
    ArgumentSlot, Bounds, CommandTemplate, EnumParam, NonIter, OptionParam, ParamType,
    PathSegment, ValueStorer, WireFormat,
};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error("'{value}' is not a valid option for {slot}")]
    InvalidOption { slot: String, value: String },

    #[error("index {index} is out of range for {slot} ({len} labels)")]
    IndexOutOfRange { slot: String, index: i32, len: usize },

    #[error("{value} is out of range for {slot} ({bounds})")]
    ValueOutOfRange {
        slot: String,
        value: String,
        bounds: String,
    },

    #[error("not enough path values: expected {expected}, got {supplied}")]
    InsufficientArguments { expected: usize, supplied: usize },

    #[error("expected {expected} values, got {supplied}")]
    ArgumentCountMismatch { expected: usize, supplied: usize },

    #[error("{slot} expects a {expected:?} value, got {found:?}")]
    TypeMismatch {
        slot: String,
        expected: ParamType,
        found: ParamType,
    },

    #[error("'{value}' is not a bitset for {slot}")]
    InvalidBitset { slot: String, value: String },

    #[error(transparent)]
    Mapping(#[from] MappingError),
}

/// Turns a template plus supplied values into a concrete OSC message.
#[derive(Debug, Clone, Default)]
pub struct MessageCompiler {
    mapper: ValueMapper,
}

impl MessageCompiler {
    pub fn new(mapper: ValueMapper) -> Self {
        Self { mapper }
    }

    pub fn mapper(&self) -> &ValueMapper {
        &self.mapper
    }

    /// Substitute `values` into the template's path, one per slot, in order.
    pub fn fill_path(
        &self,
        template: &CommandTemplate,
        values: &[ValueStorer],
    ) -> Result<String, CompileError> {
        let expected = template.path_slot_count();
        if values.len() < expected {
            return Err(CompileError::InsufficientArguments {
                expected,
                supplied: values.len(),
            });
        }
        if values.len() > expected {
            return Err(CompileError::ArgumentCountMismatch {
                expected,
                supplied: values.len(),
            });
        }

        let mut path = String::new();
        let mut values = values.iter();
        for segment in &template.path {
            if let PathSegment::Literal(text) = segment {
                path.push_str(text);
                continue;
            }
            // Counts were checked above
            let Some(value) = values.next() else { break };
            match segment {
                PathSegment::Literal(_) => {}
                PathSegment::Option(param) => path.push_str(check_option(param, value)?),
                PathSegment::Enum(param) => {
                    path.push_str(&check_enum(param, value)?.to_string());
                }
                PathSegment::NonIter(leaf) => {
                    check_non_iter(leaf, value)?;
                    path.push_str(&path_text(leaf, value));
                }
            }
        }
        Ok(path)
    }

    /// Validate and convert the trailing argument values to OSC arguments.
    pub fn compile_arguments(
        &self,
        template: &CommandTemplate,
        values: &[ValueStorer],
    ) -> Result<Vec<OscType>, CompileError> {
        if values.len() != template.arguments.len() {
            return Err(CompileError::ArgumentCountMismatch {
                expected: template.arguments.len(),
                supplied: values.len(),
            });
        }

        template
            .arguments
            .iter()
            .zip(values)
            .map(|(slot, value)| match slot {
                ArgumentSlot::Option(param) => {
                    Ok(OscType::String(check_option(param, value)?.to_string()))
                }
                ArgumentSlot::Enum(param) => Ok(OscType::Int(check_enum(param, value)?)),
                ArgumentSlot::NonIter(leaf) => {
                    check_non_iter(leaf, value)?;
                    self.non_iter_argument(leaf, value)
                }
            })
            .collect()
    }

    pub fn compile(
        &self,
        template: &CommandTemplate,
        path_values: &[ValueStorer],
        arg_values: &[ValueStorer],
    ) -> Result<OscMessage, CompileError> {
        let addr = self.fill_path(template, path_values)?;
        let args = self.compile_arguments(template, arg_values)?;
        log::trace!("compiled {} -> {} {:?}", template.id, addr, args);
        Ok(OscMessage { addr, args })
    }

    /// Wire form of an already validated NonIter value
    fn non_iter_argument(
        &self,
        leaf: &NonIter,
        value: &ValueStorer,
    ) -> Result<OscType, CompileError> {
        match leaf.param_type {
            ParamType::Int => Ok(OscType::Int(value.as_int().unwrap_or_default())),
            ParamType::String => Ok(OscType::String(value.as_str().unwrap_or_default().to_string())),
            ParamType::Bitset => {
                let bits = value.as_str().unwrap_or_default();
                // 32-bit masks fill the sign bit
                u32::from_str_radix(bits, 2)
                    .map(|mask| OscType::Int(mask as i32))
                    .map_err(|_| CompileError::InvalidBitset {
                        slot: leaf.name.clone(),
                        value: bits.to_string(),
                    })
            }
            ParamType::LinF | ParamType::LogF | ParamType::Level161 | ParamType::Level1024 => {
                let v = value.as_float().unwrap_or_default();
                let position = |v: f32| -> Result<f32, CompileError> {
                    let (min, max) = leaf.numeric_range().unwrap_or((0.0, 1.0));
                    let pct = self
                        .mapper
                        .wire_position(min, max, v as f64, leaf.param_type)?;
                    Ok(pct as f32)
                };
                let wire = match leaf.wire {
                    WireFormat::Native => v,
                    WireFormat::Normalised => position(v)?,
                    WireFormat::NormalisedInverted => 1.0 - position(v)?,
                };
                Ok(OscType::Float(wire))
            }
        }
    }
}

fn check_tag(slot: &str, expected: ParamType, value: &ValueStorer) -> Result<(), CompileError> {
    if value.param_type() == expected {
        Ok(())
    } else {
        Err(CompileError::TypeMismatch {
            slot: slot.to_string(),
            expected,
            found: value.param_type(),
        })
    }
}

fn check_option<'a>(param: &OptionParam, value: &'a ValueStorer) -> Result<&'a str, CompileError> {
    check_tag(&param.name, ParamType::String, value)?;
    let option = value.as_str().unwrap_or_default();
    if param.contains(option) {
        Ok(option)
    } else {
        Err(CompileError::InvalidOption {
            slot: param.name.clone(),
            value: option.to_string(),
        })
    }
}

fn check_enum(param: &EnumParam, value: &ValueStorer) -> Result<i32, CompileError> {
    check_tag(&param.name, ParamType::Int, value)?;
    let index = value.as_int().unwrap_or_default();
    if index >= 0 && (index as usize) < param.len() {
        Ok(index)
    } else {
        Err(CompileError::IndexOutOfRange {
            slot: param.name.clone(),
            index,
            len: param.len(),
        })
    }
}

fn check_non_iter(leaf: &NonIter, value: &ValueStorer) -> Result<(), CompileError> {
    check_tag(&leaf.name, leaf.param_type, value)?;
    let out_of_range = |shown: String, bounds: String| CompileError::ValueOutOfRange {
        slot: leaf.name.clone(),
        value: shown,
        bounds,
    };

    match leaf.bounds {
        Bounds::Int { min, max } => {
            let v = value.as_int().unwrap_or_default();
            if !(min..=max).contains(&v) {
                return Err(out_of_range(v.to_string(), format!("{}..={}", min, max)));
            }
        }
        Bounds::Float { min, max } => {
            let v = value.as_float().unwrap_or(f32::NAN);
            if !(min..=max).contains(&v) {
                return Err(out_of_range(v.to_string(), format!("{}..={}", min, max)));
            }
        }
        Bounds::Length { min, max } => {
            let text = value.as_str().unwrap_or_default();
            let len = text.chars().count();
            if !(min..=max).contains(&len) {
                return Err(out_of_range(
                    format!("'{}'", text),
                    format!("{}..={} characters", min, max),
                ));
            }
            if leaf.param_type == ParamType::Bitset && !text.chars().all(|c| c == '0' || c == '1') {
                return Err(CompileError::InvalidBitset {
                    slot: leaf.name.clone(),
                    value: text.to_string(),
                });
            }
        }
    }
    Ok(())
}

fn path_text(leaf: &NonIter, value: &ValueStorer) -> String {
    match leaf.param_type {
        ParamType::Int => format!(
            "{:0width$}",
            value.as_int().unwrap_or_default(),
            width = leaf.path_width
        ),
        ParamType::String | ParamType::Bitset => value.as_str().unwrap_or_default().to_string(),
        _ => value.as_float().unwrap_or_default().to_string(),
    }
}
