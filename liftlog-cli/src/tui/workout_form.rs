use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{ListItem, Paragraph},
};

use liftlog::db::models::ExerciseSet;
use liftlog::store::SqliteStore;
use liftlog::views::{Tab, WorkoutForm};

use super::Action;
use super::widgets::{
    bordered, field_line, highlighted_rows, input_style, popup, render_list, selected_style,
};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
const REST_STEP_SECONDS: i64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Name,
    Date,
    Duration,
    Notes,
    Entries,
}

impl Focus {
    const ORDER: [Focus; 5] = [
        Focus::Name,
        Focus::Date,
        Focus::Duration,
        Focus::Notes,
        Focus::Entries,
    ];

    fn step(self, forward: bool) -> Focus {
        let len = Self::ORDER.len();
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        let next = if forward { idx + 1 } else { idx + len - 1 };
        Self::ORDER[next % len]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SetColumn {
    Reps,
    Weight,
}

/// Position of the focused set: entry index, then set position inside it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Cursor {
    entry: usize,
    set: usize,
}

pub struct FormScreen {
    form: WorkoutForm<SqliteStore>,
    focus: Focus,
    date_input: String,
    duration_input: String,
    /// Selected row of the exercise picker; `None` while the picker is closed.
    picker: Option<usize>,
    cursor: Cursor,
    column: SetColumn,
    value_input: String,
}

impl FormScreen {
    pub async fn open(mut form: WorkoutForm<SqliteStore>) -> Self {
        form.open().await;
        Self {
            date_input: form.date.format(DATE_FORMAT).to_string(),
            duration_input: form
                .duration_minutes
                .map(|m| m.to_string())
                .unwrap_or_default(),
            form,
            focus: Focus::Name,
            picker: None,
            cursor: Cursor::default(),
            column: SetColumn::Reps,
            value_input: String::new(),
        }
    }

    pub fn hint(&self) -> &'static str {
        match (self.picker, self.focus) {
            (Some(_), _) => "type to search | ↑/↓: choose | Enter: add | Esc: close",
            (None, Focus::Entries) => {
                "j/k: set | ←/→: reps/weight | 0-9 Enter: set value | +/-: add/remove set | [ ]: rest | x: remove exercise | Ctrl+S: save"
            }
            (None, _) => "Tab: next field | Ctrl+A: add exercise | Ctrl+S: save | Esc: cancel",
        }
    }

    pub async fn handle_key(&mut self, key: KeyEvent, status: &mut String) -> Action {
        if self.picker.is_some() {
            self.picker_key(key);
            return Action::Handled;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('s') => self.save(status).await,
                KeyCode::Char('a') => {
                    self.form.search.clear();
                    self.picker = Some(0);
                    Action::Handled
                }
                _ => Action::Handled,
            };
        }

        match key.code {
            KeyCode::Esc => {
                *status = "Discarded changes".to_string();
                return Action::Open(Tab::Workouts);
            }
            KeyCode::Tab => self.move_focus(true),
            KeyCode::BackTab => self.move_focus(false),
            _ if self.focus == Focus::Entries => self.entries_key(key),
            KeyCode::Enter => self.move_focus(true),
            KeyCode::Backspace => {
                self.focused_text().pop();
            }
            KeyCode::Char(c) => {
                let accepted = match self.focus {
                    Focus::Date => c.is_ascii_digit() || c == '-',
                    Focus::Duration => c.is_ascii_digit(),
                    _ => true,
                };
                if accepted {
                    self.focused_text().push(c);
                }
            }
            _ => {}
        }
        Action::Handled
    }

    fn move_focus(&mut self, forward: bool) {
        self.focus = self.focus.step(forward);
        self.value_input.clear();
    }

    fn focused_text(&mut self) -> &mut String {
        match self.focus {
            Focus::Name => &mut self.form.name,
            Focus::Date => &mut self.date_input,
            Focus::Duration => &mut self.duration_input,
            Focus::Notes => &mut self.form.notes,
            Focus::Entries => &mut self.value_input,
        }
    }

    fn picker_key(&mut self, key: KeyEvent) {
        let Some(selected) = self.picker else {
            return;
        };
        let results: Vec<i64> = self.form.search_results().iter().map(|e| e.id).collect();
        match key.code {
            KeyCode::Esc => self.picker = None,
            KeyCode::Down => self.picker = Some((selected + 1).min(results.len().saturating_sub(1))),
            KeyCode::Up => self.picker = Some(selected.saturating_sub(1)),
            KeyCode::Enter => {
                if let Some(&exercise_id) = results.get(selected)
                    && self.form.add_exercise(exercise_id)
                {
                    self.picker = None;
                    self.focus = Focus::Entries;
                    self.cursor = Cursor {
                        entry: self.form.entries().len() - 1,
                        set: 0,
                    };
                }
            }
            KeyCode::Backspace => {
                self.form.search.pop();
                self.picker = Some(0);
            }
            KeyCode::Char(c) => {
                self.form.search.push(c);
                self.picker = Some(0);
            }
            _ => {}
        }
    }

    fn entries_key(&mut self, key: KeyEvent) {
        let entry = self.cursor.entry;
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.step_cursor(true),
            KeyCode::Char('k') | KeyCode::Up => self.step_cursor(false),
            KeyCode::Left | KeyCode::Right => {
                self.column = match self.column {
                    SetColumn::Reps => SetColumn::Weight,
                    SetColumn::Weight => SetColumn::Reps,
                };
                self.value_input.clear();
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => self.value_input.push(c),
            KeyCode::Backspace => {
                self.value_input.pop();
            }
            KeyCode::Enter => self.commit_value(),
            KeyCode::Char('+') => {
                if self.form.add_set(entry) {
                    self.cursor.set = self.form.entries()[entry].sets.len() - 1;
                }
            }
            KeyCode::Char('-') => {
                self.form.remove_set(entry);
                self.clamp_cursor();
            }
            KeyCode::Char('x') => {
                self.form.remove_exercise(entry);
                self.clamp_cursor();
            }
            KeyCode::Char('[') | KeyCode::Char(']') => {
                if let Some(current) = self.form.entries().get(entry).map(|e| e.rest_seconds) {
                    let delta = if key.code == KeyCode::Char(']') {
                        REST_STEP_SECONDS
                    } else {
                        -REST_STEP_SECONDS
                    };
                    let rest = current.unwrap_or(0) + delta;
                    self.form.set_rest(entry, (rest > 0).then_some(rest));
                }
            }
            _ => {}
        }
    }

    /// Writes the typed number into the focused reps or weight cell.
    fn commit_value(&mut self) {
        let Cursor { entry, set } = self.cursor;
        let input = std::mem::take(&mut self.value_input);
        match self.column {
            SetColumn::Reps => {
                if let Ok(reps) = input.parse::<u32>() {
                    self.form.set_reps(entry, set, reps);
                }
            }
            SetColumn::Weight => {
                if let Ok(weight) = input.parse::<f64>() {
                    self.form.set_weight(entry, set, weight);
                }
            }
        }
    }

    fn step_cursor(&mut self, forward: bool) {
        self.value_input.clear();
        let entries = self.form.entries();
        let Some(current) = entries.get(self.cursor.entry) else {
            return;
        };
        if forward {
            if self.cursor.set + 1 < current.sets.len() {
                self.cursor.set += 1;
            } else if self.cursor.entry + 1 < entries.len() {
                self.cursor = Cursor {
                    entry: self.cursor.entry + 1,
                    set: 0,
                };
            }
        } else if self.cursor.set > 0 {
            self.cursor.set -= 1;
        } else if self.cursor.entry > 0 {
            let entry = self.cursor.entry - 1;
            self.cursor = Cursor {
                entry,
                set: entries[entry].sets.len() - 1,
            };
        }
    }

    fn clamp_cursor(&mut self) {
        let entries = self.form.entries();
        if entries.is_empty() {
            self.cursor = Cursor::default();
            return;
        }
        let entry = self.cursor.entry.min(entries.len() - 1);
        let set = self.cursor.set.min(entries[entry].sets.len() - 1);
        self.cursor = Cursor { entry, set };
    }

    async fn save(&mut self, status: &mut String) -> Action {
        match parse_date(&self.date_input) {
            Some(date) => self.form.date = date,
            None => {
                *status = "Date must be YYYY-MM-DD".to_string();
                return Action::Handled;
            }
        }
        match parse_minutes(&self.duration_input) {
            Ok(minutes) => self.form.duration_minutes = minutes,
            Err(()) => {
                *status = "Duration must be a whole number of minutes".to_string();
                return Action::Handled;
            }
        }

        match self.form.save().await {
            Some(workout) => {
                *status = format!("Saved workout: {}", workout.name);
                Action::Open(Tab::Workouts)
            }
            None => {
                *status = self.form.alert().unwrap_or_default().to_string();
                Action::Handled
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::vertical([Constraint::Length(6), Constraint::Min(1)]).split(area);

        let title = match self.form.workout_id() {
            Some(id) => format!("Edit Workout #{}", id),
            None => "New Workout".to_string(),
        };
        let fields = Paragraph::new(vec![
            field_line("Name", &self.form.name, self.focus == Focus::Name),
            field_line("Date", &self.date_input, self.focus == Focus::Date),
            field_line(
                "Duration",
                &self.duration_input,
                self.focus == Focus::Duration,
            ),
            field_line("Notes", &self.form.notes, self.focus == Focus::Notes),
        ])
        .block(bordered(title));
        frame.render_widget(fields, chunks[0]);

        let (rows, selected) = self.entry_rows();
        render_list(
            frame,
            chunks[1],
            format!("Exercises ({})", self.form.entries().len()),
            rows,
            selected,
            "No exercises yet.\nPress Ctrl+A to add one from the catalog.",
        );

        if let Some(selected) = self.picker {
            self.draw_picker(frame, area, selected);
        }
    }

    fn entry_rows(&self) -> (Vec<ListItem<'static>>, Option<usize>) {
        let mut rows = Vec::new();
        let mut selected = None;
        let focused = self.focus == Focus::Entries;

        for (entry_idx, entry) in self.form.entries().iter().enumerate() {
            let rest = entry
                .rest_seconds
                .map(|s| format!(" - rest {}s", s))
                .unwrap_or_default();
            rows.push(
                ListItem::new(format!(
                    "{} ({}){}",
                    entry.exercise.name, entry.exercise.category, rest
                ))
                .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            );

            for (set_idx, set) in entry.sets.iter().enumerate() {
                let here = focused && self.cursor == (Cursor { entry: entry_idx, set: set_idx });
                if here {
                    selected = Some(rows.len());
                }
                let line = self.set_line(set, here);
                let style = if here { selected_style() } else { Style::default() };
                rows.push(ListItem::new(line).style(style));
            }
        }
        (rows, selected)
    }

    fn set_line(&self, set: &ExerciseSet, focused: bool) -> String {
        let mut reps = set.reps.to_string();
        let mut weight = format!("{:.1}", set.weight);
        if focused {
            let cell = match self.column {
                SetColumn::Reps => &mut reps,
                SetColumn::Weight => &mut weight,
            };
            *cell = if self.value_input.is_empty() {
                format!("<{}>", cell)
            } else {
                format!("<{}_>", self.value_input)
            };
        }
        format!("   Set {}: {} reps x {} kg", set.index, reps, weight)
    }

    fn draw_picker(&self, frame: &mut Frame, area: Rect, selected: usize) {
        let area = popup(frame, area, 70, 14);
        let chunks = Layout::vertical([Constraint::Length(3), Constraint::Min(1)]).split(area);

        let search = Paragraph::new(Line::from(format!("{}_", self.form.search)))
            .style(input_style())
            .block(bordered("Search exercises"));
        frame.render_widget(search, chunks[0]);

        let results = self.form.search_results();
        let rows = results
            .iter()
            .map(|e| format!("{} - {} ({})", e.name, e.category, e.muscle_groups.join(", ")))
            .collect();
        render_list(
            frame,
            chunks[1],
            format!("Catalog ({} matches)", results.len()),
            highlighted_rows(rows, selected),
            Some(selected),
            "No matching exercises",
        );
    }
}

pub fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).ok()
}

/// Blank means no duration recorded.
fn parse_minutes(input: &str) -> Result<Option<i64>, ()> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    input.parse::<i64>().map(Some).map_err(|_| ())
}
