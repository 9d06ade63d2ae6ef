use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    widgets::{ListItem, Paragraph},
};

use liftlog::db::models::Goal;
use liftlog::store::SqliteStore;
use liftlog::views::{GoalForm, GoalsView};

use super::Action;
use super::widgets::{
    bordered, field_line, popup, progress_bar, render_confirm, render_list, selected_style,
};
use super::workout_form::{DATE_FORMAT, parse_date};

const PROGRESS_WIDTH: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GoalField {
    Type,
    Target,
    Current,
    TargetDate,
}

impl GoalField {
    fn step(self, forward: bool) -> GoalField {
        use GoalField::*;
        match (self, forward) {
            (Type, true) | (Current, false) => Target,
            (Target, true) | (TargetDate, false) => Current,
            (Current, true) | (Type, false) => TargetDate,
            (TargetDate, true) | (Target, false) => Type,
        }
    }
}

/// Text buffers behind the open goal form.
#[derive(Debug, Clone, PartialEq)]
struct GoalInputs {
    field: GoalField,
    target: String,
    current: String,
    target_date: String,
}

impl GoalInputs {
    fn from_form(form: &GoalForm) -> Self {
        Self {
            field: GoalField::Type,
            target: if form.target_value > 0.0 {
                form.target_value.to_string()
            } else {
                String::new()
            },
            current: form.current_value.to_string(),
            target_date: form
                .target_date
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
        }
    }

    /// Copies the buffers onto `form`. Unparseable numbers become NaN so the
    /// form's own validation reports them.
    fn apply(&self, form: &mut GoalForm) -> Result<(), &'static str> {
        let target_date = match self.target_date.trim() {
            "" => None,
            text => Some(parse_date(text).ok_or("Target date must be YYYY-MM-DD")?),
        };
        form.target_value = self.target.trim().parse().unwrap_or(f64::NAN);
        form.current_value = match self.current.trim() {
            "" => 0.0,
            text => text.parse().unwrap_or(f64::NAN),
        };
        form.target_date = target_date;
        Ok(())
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        match self.field {
            GoalField::Type => None,
            GoalField::Target => Some(&mut self.target),
            GoalField::Current => Some(&mut self.current),
            GoalField::TargetDate => Some(&mut self.target_date),
        }
    }
}

pub fn goal_line(goal: &Goal) -> String {
    let mark = if goal.achieved { "[x]" } else { "[ ]" };
    let due = goal
        .target_date
        .map(|d| format!(" by {}", d.format(DATE_FORMAT)))
        .unwrap_or_default();
    format!(
        "{} {}: {} / {}{}",
        mark, goal.goal_type, goal.current_value, goal.target_value, due
    )
}

pub struct GoalsScreen {
    view: GoalsView<SqliteStore>,
    inputs: Option<GoalInputs>,
}

impl GoalsScreen {
    pub async fn open(mut view: GoalsView<SqliteStore>) -> Self {
        view.load().await;
        Self { view, inputs: None }
    }

    pub fn hint(&self) -> &'static str {
        if self.inputs.is_some() {
            "Tab: next field | ←/→: goal type | Enter: save | Esc: cancel"
        } else if self.view.pending_delete().is_some() {
            "y: delete goal | n: keep it"
        } else {
            "j/k: navigate | n: new | e: edit | space: toggle achieved | d: delete | Tab: switch view | q: quit"
        }
    }

    pub async fn handle_key(&mut self, key: KeyEvent, status: &mut String) -> Action {
        if self.inputs.is_some() {
            self.form_key(key, status).await;
            return Action::Handled;
        }

        if self.view.pending_delete().is_some() {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    *status = if self.view.confirm_delete().await {
                        "Deleted goal".to_string()
                    } else {
                        "Error deleting goal".to_string()
                    };
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.view.cancel_delete();
                }
                _ => {}
            }
            return Action::Handled;
        }

        let selected = self.view.selected_goal().map(|g| g.id);
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.view.scroll_down(),
            KeyCode::Char('k') | KeyCode::Up => self.view.scroll_up(),
            KeyCode::Char('r') => self.view.load().await,
            KeyCode::Char('n') => {
                self.view.start_create();
                self.inputs = self.view.form().map(GoalInputs::from_form);
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(id) = selected
                    && self.view.start_edit(id)
                {
                    self.inputs = self.view.form().map(GoalInputs::from_form);
                }
            }
            KeyCode::Char(' ') | KeyCode::Char('a') => {
                if let Some(id) = selected
                    && !self.view.toggle_achieved(id).await
                {
                    *status = "Error updating goal".to_string();
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = selected {
                    self.view.request_delete(id);
                }
            }
            _ => return Action::Unhandled,
        }
        Action::Handled
    }

    async fn form_key(&mut self, key: KeyEvent, status: &mut String) {
        let Some(inputs) = self.inputs.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => {
                self.view.cancel_form();
                self.inputs = None;
            }
            KeyCode::Tab | KeyCode::Down => inputs.field = inputs.field.step(true),
            KeyCode::BackTab | KeyCode::Up => inputs.field = inputs.field.step(false),
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')
                if inputs.field == GoalField::Type =>
            {
                if let Some(form) = self.view.form_mut() {
                    form.cycle_goal_type();
                }
            }
            KeyCode::Backspace => {
                if let Some(text) = inputs.focused_text() {
                    text.pop();
                }
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' || c == '-' => {
                if let Some(text) = inputs.focused_text() {
                    text.push(c);
                }
            }
            KeyCode::Enter => {
                let applied = match self.view.form_mut() {
                    Some(form) => inputs.apply(form),
                    None => return,
                };
                if let Err(message) = applied {
                    *status = message.to_string();
                    return;
                }
                if self.view.submit().await {
                    *status = "Goal saved".to_string();
                    self.inputs = None;
                } else {
                    *status = self.view.alert().unwrap_or_default().to_string();
                }
            }
            _ => {}
        }
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        let goals = self.view.goals();
        let rows: Vec<ListItem<'static>> = goals
            .iter()
            .enumerate()
            .map(|(idx, goal)| {
                let content = format!(
                    "{:<48} {}",
                    goal_line(goal),
                    progress_bar(goal.progress_percent(), PROGRESS_WIDTH)
                );
                let style = if idx == self.view.selected() {
                    selected_style()
                } else if goal.achieved {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default()
                };
                ListItem::new(content).style(style)
            })
            .collect();
        render_list(
            frame,
            area,
            format!("Goals ({} total)", goals.len()),
            rows,
            Some(self.view.selected()),
            "No goals yet.\nPress 'n' to set your first goal!",
        );

        if let Some(goal) = self.view.pending_delete() {
            render_confirm(
                frame,
                area,
                &format!("Delete goal '{}'?", goal_line(goal)),
            );
        }

        if let (Some(inputs), Some(form)) = (&self.inputs, self.view.form()) {
            let title = match form.editing {
                Some(id) => format!("Edit Goal #{}", id),
                None => "New Goal".to_string(),
            };
            let popup_area = popup(frame, area, 60, 6);
            let body = Paragraph::new(vec![
                field_line(
                    "Type",
                    &format!("< {} >", form.goal_type),
                    inputs.field == GoalField::Type,
                ),
                field_line("Target", &inputs.target, inputs.field == GoalField::Target),
                field_line("Current", &inputs.current, inputs.field == GoalField::Current),
                field_line(
                    "Target date",
                    &inputs.target_date,
                    inputs.field == GoalField::TargetDate,
                ),
            ])
            .block(bordered(title));
            frame.render_widget(body, popup_area);
        }
    }
}
