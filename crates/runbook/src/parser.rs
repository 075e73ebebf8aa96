// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Template parsing (TOML and HCL) and structural validation (spec §4.5,
//! §7 `ValidationError`: "missing specification file, malformed template,
//! unknown engine id with no default; surfaced before any step runs").

use crate::step::{Behavior, StepKind};
use crate::template::Template;
use thiserror::Error;

/// Template file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Hcl,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("hcl parse error: {0}")]
    Hcl(#[from] hcl::Error),
    #[error("invalid template at {location}: {message}")]
    InvalidFormat { location: String, message: String },
}

/// Parse a template, defaulting to TOML.
pub fn parse_template(content: &str) -> Result<Template, ParseError> {
    parse_template_with_format(content, Format::Toml)
}

pub fn parse_template_with_format(content: &str, format: Format) -> Result<Template, ParseError> {
    let template: Template = match format {
        Format::Toml => toml::from_str(content)?,
        Format::Hcl => hcl::from_str(content)?,
    };
    validate(&template)?;
    Ok(template)
}

fn validate(template: &Template) -> Result<(), ParseError> {
    for (i, step) in template.steps.iter().enumerate() {
        let location = format!("step[{i}]");

        match step.kind {
            StepKind::Module | StepKind::Controller => {
                if step.agent_id.is_empty() {
                    return Err(ParseError::InvalidFormat {
                        location,
                        message: "agent_id is required".to_string(),
                    });
                }
                if step.agent_name.is_empty() {
                    return Err(ParseError::InvalidFormat {
                        location,
                        message: "agent_name is required".to_string(),
                    });
                }
                if step.prompt_path.is_none() {
                    return Err(ParseError::InvalidFormat {
                        location,
                        message: "prompt_path is required".to_string(),
                    });
                }
            }
            StepKind::Separator => {
                if step.label.is_none() {
                    return Err(ParseError::InvalidFormat {
                        location,
                        message: "label is required for separator steps".to_string(),
                    });
                }
            }
        }

        if let Some(Behavior::Loop { steps_back, .. }) = &step.behavior {
            if *steps_back == 0 {
                return Err(ParseError::InvalidFormat {
                    location,
                    message: "loop behavior steps_back must be >= 1".to_string(),
                });
            }
        }
        if let Some(Behavior::Trigger { target_agent_id }) = &step.behavior {
            if target_agent_id.is_empty() {
                return Err(ParseError::InvalidFormat {
                    location,
                    message: "trigger behavior target_agent_id is required".to_string(),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
