use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

pub fn selected_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

pub fn input_style() -> Style {
    Style::default().fg(Color::Yellow)
}

pub fn bordered(title: impl Into<String>) -> Block<'static> {
    Block::default().borders(Borders::ALL).title(title.into())
}

/// A labelled input line; the focused one is highlighted and shows a cursor.
pub fn field_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let label = Span::styled(
        format!("{:<12}", label),
        Style::default().add_modifier(Modifier::BOLD),
    );
    if focused {
        Line::from(vec![label, Span::styled(format!("{}_", value), input_style())])
    } else {
        Line::from(vec![label, Span::raw(value.to_string())])
    }
}

/// Renders `rows` as a bordered list scrolled to `selected`, or `empty`
/// when there are no rows.
pub fn render_list(
    frame: &mut Frame,
    area: Rect,
    title: String,
    rows: Vec<ListItem<'static>>,
    selected: Option<usize>,
    empty: &str,
) {
    if rows.is_empty() {
        let empty_msg = Paragraph::new(empty.to_string())
            .style(Style::default().fg(Color::Gray))
            .block(bordered(title));
        frame.render_widget(empty_msg, area);
        return;
    }

    let list = List::new(rows).block(bordered(title));
    let mut list_state = ListState::default();
    list_state.select(selected);
    frame.render_stateful_widget(list, area, &mut list_state);
}

/// Plain rows, with the selected one highlighted.
pub fn highlighted_rows(rows: Vec<String>, selected: usize) -> Vec<ListItem<'static>> {
    rows.into_iter()
        .enumerate()
        .map(|(idx, content)| {
            let style = if idx == selected {
                selected_style()
            } else {
                Style::default()
            };
            ListItem::new(content).style(style)
        })
        .collect()
}

/// Carves a centered popup out of `area` and clears what is underneath.
pub fn popup(frame: &mut Frame, area: Rect, percent_x: u16, height: u16) -> Rect {
    let [area] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(area);
    frame.render_widget(Clear, area);
    area
}

pub fn render_confirm(frame: &mut Frame, area: Rect, message: &str) {
    let area = popup(frame, area, 60, 5);
    let body = Paragraph::new(vec![
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "y: confirm | n: cancel",
            Style::default().fg(Color::Gray),
        )),
    ])
    .wrap(Wrap { trim: true })
    .block(bordered("Confirm").border_style(Style::default().fg(Color::Red)));
    frame.render_widget(body, area);
}

/// Text progress bar, e.g. `[#####.....]  50%`.
pub fn progress_bar(percent: f64, width: usize) -> String {
    let percent = if percent.is_finite() {
        percent.clamp(0.0, 100.0)
    } else {
        0.0
    };
    let filled = ((percent / 100.0) * width as f64).round() as usize;
    format!(
        "[{}{}] {:>3.0}%",
        "#".repeat(filled),
        ".".repeat(width - filled),
        percent
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(50.0, 10), "[#####.....]  50%");
        assert_eq!(progress_bar(100.0, 4), "[####] 100%");
        assert_eq!(progress_bar(f64::NAN, 4), "[....]   0%");
        assert_eq!(progress_bar(250.0, 2), "[##] 100%");
    }
}
