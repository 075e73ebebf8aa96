// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reads lines from stdin and turns them into [`UserSignal`]s, the
//! explicit-channel stand-in for the host's `workflow:input` /
//! `workflow:mode-change` process signals (spec §6.3).

use codemachine_engine::UserSignal;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Spawns a task reading stdin line by line until EOF or the receiver is
/// dropped. `/skip` skips the current step; `/pause` interrupts a running
/// step; `/auto` and `/manual` switch the active input provider; an empty
/// line advances; anything else is steered to the current (or controller)
/// step as-is.
pub fn spawn() -> mpsc::Receiver<UserSignal> {
    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let signal = match line.trim() {
                        "/skip" => UserSignal::Skip,
                        "/pause" => UserSignal::Pause,
                        "/auto" => UserSignal::ModeChange { autonomous: true },
                        "/manual" => UserSignal::ModeChange { autonomous: false },
                        "" => UserSignal::Prompt { value: None },
                        other => UserSignal::Prompt { value: Some(other.to_string()) },
                    };
                    if tx.send(signal).await.is_err() {
                        return;
                    }
                }
                Ok(None) | Err(_) => return,
            }
        }
    });
    rx
}
