use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use lifexp_map::app::App;
use lifexp_map::config::Config;
use lifexp_map::map::Shape;
use lifexp_map::shading::{Marker, ValueTable};
use lifexp_map::{data, logging, ui};
use ratatui::DefaultTerminal;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

fn main() -> Result<()> {
    let config = Config::default();
    logging::init(&config.log_file);

    let (markers, values) = load_data(&config);
    let values = Arc::new(values);

    let mut terminal = ratatui::init();
    terminal.clear()?;
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, markers, values);

    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// Load both data files, falling back to the built-in sample world if either fails
fn load_data(config: &Config) -> (Vec<Marker<Shape>>, ValueTable) {
    let values = data::load_value_table(&config.values_path());
    let markers = data::load_country_markers(&config.shapes_path());

    match (markers, values) {
        (Ok(markers), Ok(values)) => (markers, values),
        (markers, values) => {
            if let Err(e) = markers {
                warn!("{e}");
            }
            if let Err(e) = values {
                warn!("{e}");
            }
            warn!("using the built-in sample world");
            data::generate_sample_world()
        }
    }
}

/// Mouse: scroll zooms at the cursor, left drag pans, left click selects
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row),
        // Horizontal scroll for panning (trackpad two-finger swipe)
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        MouseEventKind::Down(MouseButton::Left) => app.begin_press(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => app.handle_drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.end_press(mouse.column, mouse.row),
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal, markers: Vec<Marker<Shape>>, values: Arc<ValueTable>) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(size.width as usize, size.height as usize, markers, values);
    info!(
        countries = app.engine.markers().len(),
        with_data = app.engine.matched_count(),
        "map ready"
    );

    loop {
        app.on_frame();
        terminal.draw(|frame| ui::render(frame, &app))?;

        // ~60fps poll
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => app.quit(),

                    // Pan with hjkl or arrow keys
                    KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0),
                    KeyCode::Right | KeyCode::Char('l') => app.pan(10, 0),
                    KeyCode::Up | KeyCode::Char('k') => app.pan(0, -6),
                    KeyCode::Down | KeyCode::Char('j') => app.pan(0, 6),

                    KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
                    KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

                    KeyCode::Char('b') | KeyCode::Char('B') => app.map_renderer.toggle_borders(),
                    KeyCode::Char('f') | KeyCode::Char('F') => app.map_renderer.toggle_fills(),
                    KeyCode::Char('c') | KeyCode::Char('C') => app.clear_selection(),
                    KeyCode::Char('r') | KeyCode::Char('0') => app.reset_view(),

                    _ => {}
                },
                Event::Mouse(mouse) => handle_mouse(&mut app, mouse),
                Event::Resize(width, height) => app.resize(width as usize, height as usize),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
