//! Main application entry point (native).
//!
//! Without a platform PDF backend the native binary runs a short scripted
//! session on the canvas: a card, a pin dropped on it, and a drag of the card.

#[cfg(feature = "native")]
fn main() {
    use kurbo::{Point, Vec2};
    use pinboard_app::{App, AppConfig};
    use pinboard_core::{Editor, Modifiers, ShapeUpdate};

    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json| AppConfig::from_json(&json).map_err(|e| e.to_string()))
        {
            Ok(config) => config,
            Err(err) => {
                log::error!("Failed to read config {path}: {err}");
                AppConfig::default()
            }
        },
        None => AppConfig::default(),
    };
    log::info!("Starting {}", config.title);

    let mut app = App::new(config);
    app.shortcuts().print_all();

    // Card centred on (400, 300).
    app.handle_key("1", false, false);
    app.pointer_down(Point::new(400.0, 300.0), Modifiers::NONE);
    app.pointer_up(Point::new(400.0, 300.0), Modifiers::NONE);
    let Some(&card) = app.canvas().current_page_shape_ids().last() else {
        log::error!("Card tool did not create a card");
        return;
    };

    // Pin on the card's top-left quarter.
    app.handle_key("2", false, false);
    app.pointer_down(Point::new(330.0, 250.0), Modifiers::NONE);
    app.pointer_up(Point::new(330.0, 250.0), Modifiers::NONE);
    let Some(&pin) = app.canvas().current_page_shape_ids().last() else {
        log::error!("Pin tool did not create a pin");
        return;
    };

    let Some(origin) = app.canvas().shape(card).map(|shape| shape.position) else {
        return;
    };
    let moved = ShapeUpdate::new(card).position(origin + Vec2::new(120.0, 40.0));
    app.canvas_mut().update_shapes(vec![moved]);

    if let Some(position) = app.canvas().shape(pin).map(|shape| shape.position) {
        println!("Pin followed the card to ({:.1}, {:.1})", position.x, position.y);
    }
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
