use crate::app::{App, INFO_BOX_OFFSET, INFO_BOX_SIZE};
use crate::map::MapLayers;
use crate::shading::{color_for, Rgb, RAMP_MAX, RAMP_MIN};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
    Frame,
};

/// Legend steps across the ramp, in years
const LEGEND_STEP: f64 = 10.0;

#[inline(always)]
fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_map(frame, app, chunks[0]);
    render_status_bar(frame, app, chunks[1]);
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Life Expectancy ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Braille gives 2x4 resolution per character
    let mut viewport = app.viewport.clone();
    viewport.width = inner.width as usize * 2;
    viewport.height = inner.height as usize * 4;

    let layers = app
        .map_renderer
        .render(app.engine.markers(), inner.width as usize, inner.height as usize, &viewport);
    frame.render_widget(MapWidget { layers }, inner);

    render_info_box(frame, app, inner);
}

/// Fixed-size box in the top-left corner describing the selection
fn render_info_box(frame: &mut Frame, app: &App, map_area: Rect) {
    let area = Rect {
        x: map_area.x + INFO_BOX_OFFSET.0,
        y: map_area.y + INFO_BOX_OFFSET.1,
        width: INFO_BOX_SIZE.0,
        height: INFO_BOX_SIZE.1,
    }
    .intersection(map_area);
    if area.is_empty() {
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().bg(Color::Rgb(255, 250, 250)).fg(Color::Black));
    let text = app.engine.describe_selection().unwrap_or_default();

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(text).block(block), area);
}

/// Country fills as cell backgrounds with braille outlines on top
struct MapWidget {
    layers: MapLayers,
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rows = (area.height as usize).min(self.layers.height);
        let cols = (area.width as usize).min(self.layers.width);

        for row in 0..rows {
            for col in 0..cols {
                let cell = &mut buf[(area.x + col as u16, area.y + row as u16)];
                let fill = self.layers.fill_at(col, row);

                if let Some(rgb) = fill {
                    cell.set_bg(to_color(rgb));
                }
                if let Some(ch) = self.layers.borders.glyph(col, row) {
                    // Dark outlines over land, light ones over water
                    let fg = if fill.is_some() { Color::Black } else { Color::Gray };
                    cell.set_char(ch).set_fg(fg);
                }
            }
        }
    }
}

/// Color swatches from RAMP_MIN to RAMP_MAX
fn legend_spans() -> Vec<Span<'static>> {
    let mut spans = vec![Span::styled(
        format!("{RAMP_MIN:.0}y "),
        Style::default().fg(Color::DarkGray),
    )];
    let mut value = RAMP_MIN;
    while value <= RAMP_MAX {
        spans.push(Span::styled("  ", Style::default().bg(to_color(color_for(value)))));
        value += LEGEND_STEP;
    }
    spans.push(Span::styled(
        format!(" {RAMP_MAX:.0}y "),
        Style::default().fg(Color::DarkGray),
    ));
    spans.push(Span::styled("  ", Style::default().bg(to_color(Rgb::GRAY))));
    spans.push(Span::styled(" n/a ", Style::default().fg(Color::DarkGray)));
    spans
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let settings = &app.map_renderer.settings;

    let mut spans = vec![
        Span::styled(" Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" ", Style::default()),
        Span::styled(
            if settings.show_borders { "[B]order " } else { "[b]order " },
            Style::default().fg(if settings.show_borders { Color::Green } else { Color::DarkGray }),
        ),
        Span::styled(
            if settings.show_fills { "[F]ill " } else { "[f]ill " },
            Style::default().fg(if settings.show_fills { Color::Green } else { Color::DarkGray }),
        ),
        Span::styled("| ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
    ];
    spans.extend(legend_spans());
    spans.push(Span::styled(
        "| click:select c:clear hjkl:pan +/-:zoom r:reset q:quit",
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
