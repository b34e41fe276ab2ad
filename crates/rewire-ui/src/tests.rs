#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use rewire_core::clock::TestClock;
    use rewire_core::Store;
    use web_time::{Duration, Instant};

    use crate::boundary::catch_render;
    use crate::component::{Choice, Component, Node, Role, Tone};
    use crate::root::Root;
    use crate::rows::{
        ReloadPolicy, RowError, RowManagerConfig, RowStateManager, RowStatus,
    };
    use crate::viewport::{ViewportTracker, visible_range};

    fn manager(reload: ReloadPolicy, max_tracked: usize) -> (RowStateManager, TestClock) {
        let clock = TestClock::new(Instant::now());
        let mgr = RowStateManager::with_clock(
            RowManagerConfig { max_tracked, reload },
            Rc::new(clock.clone()),
        );
        (mgr, clock)
    }

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_debounce_cancelled_by_unload() {
        let (mgr, clock) = manager(ReloadPolicy::Instant, 1000);

        mgr.mark_loading(&keys(&["r1"]));
        mgr.schedule_loaded("r1", Duration::from_millis(300));
        assert_eq!(mgr.state_of("r1").status, RowStatus::Loading);

        clock.advance(Duration::from_millis(100));
        mgr.mark_unloaded(&keys(&["r1"]));

        clock.advance(Duration::from_millis(201));
        mgr.tick();
        // the pending timer was cancelled, not fired late
        assert_eq!(mgr.state_of("r1").status, RowStatus::Unloaded);
        assert_eq!(mgr.tracked_count(), 0);
    }

    #[test]
    fn test_debounce_completes_when_left_alone() {
        let (mgr, clock) = manager(ReloadPolicy::Instant, 1000);

        mgr.mark_loading(&keys(&["r1"]));
        assert!(mgr.state_of("r1").load_start.is_some());
        mgr.schedule_loaded("r1", Duration::from_millis(300));

        clock.advance(Duration::from_millis(299));
        mgr.tick();
        assert_eq!(mgr.state_of("r1").status, RowStatus::Loading);

        clock.advance(Duration::from_millis(2));
        mgr.tick();
        assert_eq!(mgr.state_of("r1").status, RowStatus::Loaded);
        assert!(mgr.has_loaded_before("r1"));
    }

    #[test]
    fn test_sticky_reload_instant() {
        let (mgr, clock) = manager(ReloadPolicy::Instant, 1000);

        mgr.mark_loading(&keys(&["r1"]));
        mgr.schedule_loaded("r1", Duration::from_millis(300));
        clock.advance(Duration::from_millis(301));
        mgr.tick();
        assert!(mgr.is_loaded("r1"));

        mgr.mark_unloaded(&keys(&["r1"]));
        assert_eq!(mgr.state_of("r1").status, RowStatus::Unloaded);
        // the flag survives the unload cycle
        assert!(mgr.has_loaded_before("r1"));

        mgr.mark_loading(&keys(&["r1"]));
        // no second skeleton
        assert!(mgr.is_loaded("r1"));
    }

    #[test]
    fn test_sticky_reload_debounce() {
        let (mgr, clock) = manager(ReloadPolicy::Debounce, 1000);

        mgr.mark_loading(&keys(&["r1"]));
        mgr.schedule_loaded("r1", Duration::from_millis(300));
        clock.advance(Duration::from_millis(301));
        mgr.tick();
        assert!(mgr.is_loaded("r1"));

        mgr.mark_unloaded(&keys(&["r1"]));
        mgr.mark_loading(&keys(&["r1"]));
        // full loading cycle every time under this policy
        assert_eq!(mgr.state_of("r1").status, RowStatus::Loading);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let (mgr, clock) = manager(ReloadPolicy::Instant, 1000);

        // arm a timer for the row that will be evicted
        mgr.mark_loading(&keys(&["row-0"]));
        mgr.schedule_loaded("row-0", Duration::from_millis(10));

        for i in 1..=1000 {
            mgr.mark_loading(&[format!("row-{i}")]);
        }
        assert_eq!(mgr.tracked_count(), 1000);
        assert_eq!(mgr.state_of("row-0").status, RowStatus::Unloaded);
        assert_eq!(mgr.state_of("row-1000").status, RowStatus::Loading);

        // eviction cancelled row-0's timer along with its record
        clock.advance(Duration::from_millis(11));
        mgr.tick();
        assert_eq!(mgr.state_of("row-0").status, RowStatus::Unloaded);
        assert_eq!(mgr.tracked_count(), 1000);
    }

    #[test]
    fn test_error_is_terminal_data() {
        let (mgr, clock) = manager(ReloadPolicy::Instant, 1000);

        mgr.mark_loading(&keys(&["r1"]));
        mgr.schedule_loaded("r1", Duration::from_millis(300));
        mgr.mark_error(
            &keys(&["r1"]),
            RowError {
                message: "fetch failed".to_string(),
            },
        );

        clock.advance(Duration::from_millis(301));
        mgr.tick();
        let record = mgr.state_of("r1");
        assert_eq!(record.status, RowStatus::Error);
        assert_eq!(record.error.unwrap().message, "fetch failed");
    }

    #[test]
    fn test_listeners_fire_on_mutation() {
        let (mgr, clock) = manager(ReloadPolicy::Instant, 1000);
        let hits = Rc::new(RefCell::new(0));

        let id = mgr.subscribe({
            let hits = hits.clone();
            move || *hits.borrow_mut() += 1
        });

        mgr.mark_loading(&keys(&["r1"]));
        assert_eq!(*hits.borrow(), 1);

        // arming the timer pings too, not just the transition it causes
        mgr.schedule_loaded("r1", Duration::from_millis(10));
        assert_eq!(*hits.borrow(), 2);

        clock.advance(Duration::from_millis(11));
        mgr.tick();
        assert_eq!(*hits.borrow(), 3);

        mgr.unsubscribe(id);
        mgr.mark_unloaded(&keys(&["r1"]));
        assert_eq!(*hits.borrow(), 3);
    }

    #[test]
    fn test_visible_range_math() {
        let r = visible_range(0.0, 100.0, 10.0, 1000, 2);
        assert_eq!((r.start, r.end), (0, 12));

        let r = visible_range(95.0, 100.0, 10.0, 1000, 2);
        assert_eq!((r.start, r.end), (7, 22));

        // clamped to the item count
        let r = visible_range(0.0, 500.0, 10.0, 20, 2);
        assert_eq!((r.start, r.end), (0, 20));

        let r = visible_range(0.0, 100.0, 10.0, 0, 2);
        assert!(r.is_empty());
    }

    #[test]
    fn test_viewport_tracker_drives_manager() {
        let (mgr, clock) = manager(ReloadPolicy::Instant, 1000);
        let tracker = ViewportTracker::new(Duration::from_millis(300));

        tracker.sync(&mgr, keys(&["r0", "r1"]));
        assert_eq!(mgr.state_of("r0").status, RowStatus::Loading);
        assert_eq!(mgr.state_of("r1").status, RowStatus::Loading);

        // scroll: r0 out, r2 in
        tracker.sync(&mgr, keys(&["r1", "r2"]));
        assert_eq!(mgr.state_of("r0").status, RowStatus::Unloaded);
        assert_eq!(mgr.state_of("r2").status, RowStatus::Loading);
        assert_eq!(tracker.visible_count(), 2);

        clock.advance(Duration::from_millis(301));
        mgr.tick();
        assert!(mgr.is_loaded("r1"));
        assert!(mgr.is_loaded("r2"));
        // r0 left before its debounce elapsed
        assert_eq!(mgr.state_of("r0").status, RowStatus::Unloaded);
    }

    #[test]
    fn test_root_counter_lifecycle() {
        let store = Store::new();
        store.write("counter", 0i64);
        let executions = Rc::new(RefCell::new(0));

        let root = Root::mount({
            let store = store.clone();
            let executions = executions.clone();
            move || {
                *executions.borrow_mut() += 1;
                Component::Text {
                    content: format!("{}", store.read_as::<i64>("counter").unwrap()),
                }
            }
        });

        assert_eq!(
            root.render(),
            Component::Text { content: "0".to_string() }
        );
        // clean frame: cached, no re-execution
        root.render();
        assert_eq!(*executions.borrow(), 1);

        store.write("counter", 1i64);
        store.write("counter", 2i64);
        assert!(root.is_dirty());
        assert_eq!(
            root.render(),
            Component::Text { content: "2".to_string() }
        );
        // two invalidations coalesced into one re-execution
        assert_eq!(*executions.borrow(), 2);

        root.unmount();
        store.write("counter", 3i64);
        assert_eq!(store.subscriber_count("counter"), 0);
        assert_eq!(*executions.borrow(), 2);
    }

    #[test]
    fn test_dispatch_button_and_badge() {
        let node = Component::Button {
            label: "Save".to_string(),
            tone: Tone::Primary,
            on_press: 7,
        }
        .render();
        assert_eq!(node.role, Role::Button);
        assert_eq!(node.text.as_deref(), Some("Save"));
        assert_eq!(node.handler, Some(7));

        let node = Component::Badge {
            text: "New".to_string(),
            tone: Tone::Success,
        }
        .render();
        assert_eq!(node.role, Role::Badge);
    }

    #[test]
    fn test_dispatch_table_shape() {
        let node = Component::Table {
            columns: vec!["a".to_string(), "b".to_string()],
            rows: vec![vec!["1".to_string(), "2".to_string()]],
        }
        .render();
        assert_eq!(node.role, Role::Table);
        // header row + one data row
        assert_eq!(node.children.len(), 2);
        assert_eq!(node.children[0].children.len(), 2);
        assert_eq!(node.children[1].children[1].text.as_deref(), Some("2"));
    }

    #[test]
    fn test_dispatch_tabs_render_active_panel_only() {
        let tabs = Component::Tabs {
            labels: vec!["one".to_string(), "two".to_string()],
            active: 1,
            on_select: 3,
            panels: vec![
                Component::Text { content: "first".to_string() },
                Component::Text { content: "second".to_string() },
            ],
        };
        let node = tabs.render();
        // tab bar + the single active panel
        assert_eq!(node.children.len(), 2);
        assert_eq!(node.children[1].text.as_deref(), Some("second"));
    }

    #[test]
    fn test_dispatch_closed_overlay_is_empty() {
        let node = Component::Dialog {
            title: "Confirm".to_string(),
            open: false,
            on_close: 1,
            children: vec![Component::Text { content: "body".to_string() }],
        }
        .render();
        assert!(node.children.is_empty());

        let node = Component::Dialog {
            title: "Confirm".to_string(),
            open: true,
            on_close: 1,
            children: vec![Component::Text { content: "body".to_string() }],
        }
        .render();
        // close button + body
        assert_eq!(node.children.len(), 2);
    }

    #[test]
    fn test_dispatch_radio_selection_marker() {
        let node = Component::RadioGroup {
            choices: vec![
                Choice { value: "a".to_string(), label: "A".to_string() },
                Choice { value: "b".to_string(), label: "B".to_string() },
            ],
            selected: Some("b".to_string()),
            on_select: 4,
        }
        .render();
        assert_eq!(node.children[0].text.as_deref(), Some("( ) A"));
        assert_eq!(node.children[1].text.as_deref(), Some("(*) B"));
    }

    #[test]
    fn test_reactive_component_tree() {
        let state = Store::new();
        let dataset = Store::new();
        state.write("tab", 0usize);
        dataset.write("rows", vec![vec!["x".to_string()]]);

        let root = Root::mount({
            let state = state.clone();
            let dataset = dataset.clone();
            move || Component::Tabs {
                labels: vec!["data".to_string(), "about".to_string()],
                active: state.read_as::<usize>("tab").unwrap(),
                on_select: 1,
                panels: vec![
                    Component::Table {
                        columns: vec!["col".to_string()],
                        rows: dataset.read_as::<Vec<Vec<String>>>("rows").unwrap(),
                    },
                    Component::Text { content: "about".to_string() },
                ],
            }
        });

        let frame: Node = root.render().render();
        assert_eq!(frame.children[1].role, Role::Table);

        state.write("tab", 1usize);
        let frame = root.render().render();
        assert_eq!(frame.children[1].role, Role::Text);
    }

    #[test]
    fn test_catch_render_fallback() {
        let out = catch_render(
            |panic| Component::Text { content: format!("failed: {}", panic.message) },
            || panic!("boom"),
        );
        assert_eq!(
            out,
            Component::Text { content: "failed: boom".to_string() }
        );

        let out = catch_render(
            |_| Component::Divider,
            || Component::Text { content: "fine".to_string() },
        );
        assert_eq!(out, Component::Text { content: "fine".to_string() });
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_component_serde_roundtrip() {
        let desc = Component::Card {
            title: Some("stats".to_string()),
            children: vec![Component::Progress { value: 3.0, max: 10.0 }],
        };
        let json = serde_json::to_string(&desc).unwrap();
        let back: Component = serde_json::from_str(&json).unwrap();
        assert_eq!(back, desc);
    }
}
