// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use parking_lot::Mutex as PMutex;
use std::sync::Arc;

#[test]
fn publish_with_no_subscribers_is_a_noop() {
    let bus = EventBus::new();
    assert!(!bus.has_subscribers());
    bus.publish(Event::WorkflowStarted { total_steps: 2 });
}

#[test]
fn subscribers_receive_events_in_registration_order() {
    let bus = EventBus::new();
    let seen = Arc::new(PMutex::new(Vec::new()));

    let seen_a = seen.clone();
    bus.subscribe(move |_| seen_a.lock().push("a"));
    let seen_b = seen.clone();
    bus.subscribe(move |_| seen_b.lock().push("b"));

    bus.publish(Event::WorkflowStarted { total_steps: 1 });

    assert_eq!(*seen.lock(), vec!["a", "b"]);
}

#[test]
fn events_are_delivered_in_publish_order() {
    let bus = EventBus::new();
    let seen = Arc::new(PMutex::new(Vec::new()));
    let seen_clone = seen.clone();
    bus.subscribe(move |event| {
        if let Event::WorkflowStatus { status } = event {
            seen_clone.lock().push(status.clone());
        }
    });

    bus.publish(Event::WorkflowStatus { status: "running".to_string() });
    bus.publish(Event::WorkflowStatus { status: "completed".to_string() });

    assert_eq!(*seen.lock(), vec!["running".to_string(), "completed".to_string()]);
}

#[test]
fn unsubscribe_stops_future_delivery() {
    let bus = EventBus::new();
    let seen = Arc::new(PMutex::new(0));
    let seen_clone = seen.clone();
    let id = bus.subscribe(move |_| *seen_clone.lock() += 1);

    bus.publish(Event::WorkflowStarted { total_steps: 1 });
    bus.unsubscribe(id);
    bus.publish(Event::WorkflowStarted { total_steps: 1 });

    assert_eq!(*seen.lock(), 1);
}

#[test]
fn a_panicking_subscriber_does_not_block_later_subscribers() {
    let bus = EventBus::new();
    bus.subscribe(|_| panic!("boom"));
    let seen = Arc::new(PMutex::new(false));
    let seen_clone = seen.clone();
    bus.subscribe(move |_| *seen_clone.lock() = true);

    bus.publish(Event::WorkflowStarted { total_steps: 1 });

    assert!(*seen.lock());
}

#[test]
fn emitter_agent_added_round_trips_fields() {
    let bus = Arc::new(EventBus::new());
    let emitter = Emitter::new(bus.clone());
    let received = Arc::new(PMutex::new(None));
    let received_clone = received.clone();
    bus.subscribe(move |event| *received_clone.lock() = Some(event.clone()));

    emitter.agent_added(MonitoringId(1), None, "writer", "claude");

    assert_eq!(
        *received.lock(),
        Some(Event::AgentAdded {
            monitoring_id: MonitoringId(1),
            parent_id: None,
            name: "writer".to_string(),
            engine_id: "claude".to_string(),
        })
    );
}
