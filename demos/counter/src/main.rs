//! End-to-end walkthrough: mount a reactive region over a key-version store,
//! write through a few frames, then unmount and show that nothing is left
//! subscribed.

use anyhow::Result;
use rewire_core::Store;
use rewire_ui::{Component, Root, Tone};

fn frame(root: &Root<Component>, label: &str) {
    let dirty = root.is_dirty();
    let tree = root.render().render();
    log::info!("{label}: dirty={dirty}");
    println!("{label}: {tree:#?}");
}

fn main() -> Result<()> {
    env_logger::init();

    let state = Store::new();
    state.write("counter", 0i64);

    let root = Root::mount({
        let state = state.clone();
        move || {
            let count = state.read_as::<i64>("counter").unwrap_or(0);
            Component::Card {
                title: Some("Counter".to_string()),
                children: vec![
                    Component::Text {
                        content: format!("count = {count}"),
                    },
                    Component::Button {
                        label: "+1".to_string(),
                        tone: Tone::Primary,
                        on_press: 1,
                    },
                ],
            }
        }
    });

    frame(&root, "initial");

    // a "click": the host handler writes back into the store
    state.write("counter", 1i64);
    frame(&root, "after write");

    // no change since the last frame: render() serves the cached tree
    frame(&root, "clean frame");

    // coalescing: two writes, one re-execution on the next frame
    state.batch(|| {
        state.write("counter", 2i64);
        state.write("counter", 3i64);
    });
    frame(&root, "after batch");

    root.unmount();
    state.write("counter", 4i64);
    println!(
        "after unmount: {} subscriber(s) on `counter`",
        state.subscriber_count("counter")
    );

    Ok(())
}
