// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Black-box end-to-end coverage for the `codemachine` binary, driving the
//! real `SubprocessEngine` against a throwaway shell "agent" instead of the
//! in-process fakes used by the crate-level unit tests.

#[path = "specs/prelude.rs"]
mod prelude;

#[path = "specs/linear_run.rs"]
mod linear_run;

#[path = "specs/resume_after_restart.rs"]
mod resume_after_restart;

#[path = "specs/skip_and_validation.rs"]
mod skip_and_validation;
