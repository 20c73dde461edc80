//! End-to-end scenarios run against every detection backend.

use common::{Rect, ScrollPosition, Size};
use in_viewport::{
    Capabilities, Page, PartialViewportOptions, ScrollDirection, Strategy, ViewportController, ViewportEvent,
    ViewportHost, ViewportOptions,
};
use std::time::Duration;

const VIEWPORT: Size = Size::new(800.0, 600.0);

fn backends() -> Vec<(Strategy, ViewportOptions)> {
    let base = ViewportOptions::default().with_listener("window", "scroll.scrollable");
    vec![
        (Strategy::Observer, base.clone()),
        (Strategy::Polling, base.clone().with_intersection_observer(false)),
        (Strategy::EventBased, base.event_based()),
    ]
}

/// Scroll down a feed whose loader moves 1000px further every time it
/// enters the viewport. Returns the number of loads and every event seen.
fn infinite_scroll(options: ViewportOptions) -> (usize, Vec<ViewportEvent>) {
    let mut page = Page::new(VIEWPORT);
    let window = page.window();
    let mut controller = ViewportController::new();

    let mut content_height = 1000.0;
    let loader = page.create_element("infinity-loader", Rect::new(0.0, content_height, 800.0, 50.0));
    controller.attach(loader, options.clone(), &mut page).unwrap();

    let mut loads = 0;
    let mut seen = Vec::new();
    for step in 1..=40 {
        page.scroll_to(window, ScrollPosition::new(step as f64 * 100.0, 0.0));
        page.advance(Duration::from_millis(200), &mut controller);

        for event in controller.take_events() {
            assert_eq!(event.element, loader);
            seen.push(event.event);
            if event.event == ViewportEvent::Entered {
                loads += 1;
                content_height += 1000.0;
                page.set_layout(loader, Rect::new(0.0, content_height, 800.0, 50.0));
                controller.attach(loader, options.clone(), &mut page).unwrap();
            }
        }
    }

    controller.detach(loader, &mut page);
    assert_eq!(page.listener_count(), 0);
    assert_eq!(page.observer_count(), 0);

    (loads, seen)
}

#[test]
fn test_infinite_scroll_on_every_backend() {
    for (strategy, options) in backends() {
        let (loads, seen) = infinite_scroll(options);
        assert_eq!(loads, 4, "{strategy}");
        assert_eq!(seen, vec![ViewportEvent::Entered; 4], "{strategy}");
    }
}

#[test]
fn test_backends_agree_on_spy_script() {
    let script = [500.0, 1500.0, 700.0, 0.0];
    let mut sequences = Vec::new();

    for (strategy, options) in backends() {
        let mut page = Page::new(VIEWPORT);
        let window = page.window();
        let mut controller = ViewportController::new();
        let element = page.create_element("ember1", Rect::new(0.0, 1000.0, 800.0, 100.0));

        controller.attach(element, options.with_spy(true), &mut page).unwrap();
        assert_eq!(controller.strategy(element), Some(strategy));

        for top in script {
            page.scroll_to(window, ScrollPosition::new(top, 0.0));
            page.advance(Duration::from_millis(200), &mut controller);
        }

        let events: Vec<_> = controller.take_events().into_iter().map(|e| e.event).collect();
        sequences.push((strategy, events));
    }

    let expected = vec![
        ViewportEvent::Entered,
        ViewportEvent::Exited,
        ViewportEvent::Entered,
        ViewportEvent::Scrolled(ScrollDirection::Up),
        ViewportEvent::Exited,
    ];
    for (strategy, events) in sequences {
        assert_eq!(events, expected, "{strategy}");
    }
}

#[test]
fn test_configuration_document_drives_attach() {
    let mut page = Page::new(VIEWPORT).with_capabilities(Capabilities::DOM | Capabilities::ANIMATION_FRAME);
    let window = page.window();
    let mut controller = ViewportController::new();
    let element = page.create_element("ember1", Rect::new(0.0, 1000.0, 800.0, 100.0));

    let app = PartialViewportOptions::from_json(r#"{"spy": true, "tolerance": {"bottom": 100}}"#).unwrap();
    let component = PartialViewportOptions::from_json(r#"{"refreshRate": 50}"#).unwrap();
    let options = app.merge(component).resolve(page.capabilities());
    assert!(!options.use_intersection_observer);

    controller.attach(element, options, &mut page).unwrap();
    assert_eq!(controller.strategy(element), Some(Strategy::Polling));

    // Within the bottom tolerance but not the viewport itself.
    page.scroll_to(window, ScrollPosition::new(350.0, 0.0));
    page.next_frame(&mut controller);
    assert_eq!(controller.entered(element), Some(true));
}
