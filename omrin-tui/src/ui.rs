use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
};
use omrin_core::{SensorKind, SensorReading};

use crate::app::App;

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();

    // Outer layout: title, main content, status line
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [header_area, content_area, status_area] = chunks else {
        return;
    };

    let session = app.coordinator.session();
    let header = Paragraph::new(format!(
        "omrin – waste collection sensors for {}",
        session.address
    ))
    .block(Block::default().borders(Borders::ALL).title("Omrin"));
    frame.render_widget(header, *header_area);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(*content_area);

    let [sensors_area, detail_area] = content_chunks.as_ref() else {
        return;
    };

    draw_sensor_table(frame, app, *sensors_area);
    draw_sensor_detail(frame, app, *detail_area);

    let nav_hint = "↑/↓ select sensor · r refresh · q/Ctrl-C quit";

    let status_text = if app.is_loading {
        format!("Refreshing… · {nav_hint}")
    } else if let Some(msg) = &app.error_message {
        format!("{msg} · {nav_hint}")
    } else if let Some(updated) = app.last_updated {
        format!("Updated {} · {nav_hint}", updated.format("%H:%M:%S"))
    } else {
        format!("No data yet · {nav_hint}")
    };

    let status_style = if app.error_message.is_some() {
        Style::default().fg(Color::Red)
    } else if app.is_loading {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(status_style)
        .wrap(Wrap { trim: true });

    frame.render_widget(status, *status_area);
}

fn draw_sensor_table(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let rows = app.readings.iter().map(|reading| {
        let state = reading.state.clone().unwrap_or_else(|| "unknown".to_owned());
        let relative = reading
            .attributes
            .get("days_until")
            .and_then(|days| days.parse::<i64>().ok())
            .map(relative_day_label)
            .unwrap_or_default();

        let mut style = Style::default().fg(kind_color(reading.kind));
        if reading.state.is_none() {
            style = style.add_modifier(Modifier::DIM);
        }

        Row::new(vec![
            Cell::from(reading.name.clone()),
            Cell::from(reading.friendly_name.clone()),
            Cell::from(state),
            Cell::from(relative),
        ])
        .style(style)
    });

    let column_widths = [
        Constraint::Length(16),
        Constraint::Length(16),
        Constraint::Min(12),
        Constraint::Length(12),
    ];

    let table = Table::new(rows, column_widths)
        .header(
            Row::new(vec!["Entity", "Name", "State", "In"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title("Sensors"))
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .column_spacing(1);

    let mut state = TableState::default();
    if !app.readings.is_empty() {
        state.select(Some(app.sensor_list_index));
    }
    frame.render_stateful_widget(table, area, &mut state);
}

fn draw_sensor_detail(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let Some(reading) = app.selected_reading() else {
        return;
    };

    let mut lines = vec![Line::from(format!(
        "state: {}",
        reading.state.as_deref().unwrap_or("unknown")
    ))];
    lines.extend(
        reading
            .attributes
            .iter()
            .map(|(name, value)| Line::from(format!("{name}: {value}"))),
    );
    lines.push(Line::from(format!(
        "date format: {}",
        app.coordinator.session().date_format
    )));

    let detail = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(reading_title(reading)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(detail, area);
}

fn reading_title(reading: &SensorReading) -> String {
    format!("{} ({})", reading.friendly_name, reading.name)
}

fn kind_color(kind: SensorKind) -> Color {
    match kind {
        SensorKind::Biobak => Color::Green,
        SensorKind::Sortibak => Color::Gray,
        SensorKind::Papierbak => Color::Blue,
        SensorKind::Today => Color::Yellow,
        SensorKind::Tomorrow => Color::Cyan,
        SensorKind::Next => Color::Magenta,
    }
}

fn relative_day_label(delta: i64) -> String {
    match delta {
        0 => "today".to_owned(),
        1 => "tomorrow".to_owned(),
        days if days > 1 => format!("in {days} days"),
        -1 => "yesterday".to_owned(),
        days => format!("{} days ago", days.abs()),
    }
}
