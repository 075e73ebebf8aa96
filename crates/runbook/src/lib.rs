// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Template parsing and the `Step` model (spec §4.5 Template Loader &
//! Model).

mod filter;
mod parser;
mod step;
mod template;

pub use filter::apply_filters;
pub use parser::{parse_template, parse_template_with_format, Format, ParseError};
pub use step::{Behavior, ChainedPrompt, PromptPath, ReasoningEffort, Step, StepKind};
pub use template::Template;
