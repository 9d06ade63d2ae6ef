//! Full-screen front end over the shell and its views.

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use log::info;
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Paragraph, Tabs},
};

use liftlog::store::SqliteStore;
use liftlog::views::{Dashboard, ProfileView, Route, Tab, WorkoutList};

use crate::AppShell;

mod goals;
mod widgets;
mod workout_form;

pub use goals::goal_line;
use goals::GoalsScreen;
use widgets::{bordered, field_line, highlighted_rows, render_confirm, render_list};
use workout_form::FormScreen;

/// What a key press asks the run loop to do next.
pub enum Action {
    Handled,
    /// Not consumed by the screen; global bindings get a go.
    Unhandled,
    Quit,
    Open(Tab),
    NewWorkout,
    EditWorkout(i64),
    SignOut,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum AuthField {
    #[default]
    Email,
    Name,
}

#[derive(Debug, Default)]
struct AuthForm {
    email: String,
    name: String,
    field: AuthField,
}

struct ProfileScreen {
    view: ProfileView<SqliteStore>,
    editing: bool,
}

enum Screen {
    Loading,
    Auth(AuthForm),
    Dashboard(Dashboard<SqliteStore>),
    Workouts(WorkoutList<SqliteStore>),
    WorkoutForm(Box<FormScreen>),
    Goals(GoalsScreen),
    Profile(ProfileScreen),
}

struct App {
    shell: AppShell,
    screen: Screen,
    status_message: String,
}

pub async fn run(mut terminal: DefaultTerminal, shell: AppShell) -> Result<()> {
    let mut app = App {
        shell,
        screen: Screen::Loading,
        status_message: String::new(),
    };
    terminal.draw(|frame| app.draw(frame))?;
    app.shell.resolve().await;
    app.follow_route().await;

    loop {
        terminal.draw(|frame| app.draw(frame))?;

        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            let action = app.handle_key(key).await;
            if !app.apply(action).await {
                info!("Leaving interactive mode");
                return Ok(());
            }
        }
    }
}

impl App {
    /// Rebuilds the screen for wherever the shell currently routes.
    async fn follow_route(&mut self) {
        match self.shell.route() {
            Route::Loading => self.screen = Screen::Loading,
            Route::Auth => self.screen = Screen::Auth(AuthForm::default()),
            Route::Main(tab) => self.open_tab(tab).await,
        }
    }

    async fn open_tab(&mut self, tab: Tab) {
        self.shell.select(tab);
        let screen = match tab {
            Tab::Dashboard => match self.shell.dashboard() {
                Some(mut dashboard) => {
                    dashboard.load().await;
                    Some(Screen::Dashboard(dashboard))
                }
                None => None,
            },
            Tab::Workouts => match self.shell.workouts() {
                Some(mut list) => {
                    list.load().await;
                    Some(Screen::Workouts(list))
                }
                None => None,
            },
            Tab::Goals => match self.shell.goals() {
                Some(view) => Some(Screen::Goals(GoalsScreen::open(view).await)),
                None => None,
            },
            Tab::Profile => match self.shell.profile() {
                Some(mut view) => {
                    view.load().await;
                    Some(Screen::Profile(ProfileScreen {
                        view,
                        editing: false,
                    }))
                }
                None => None,
            },
        };
        self.screen = screen.unwrap_or_else(|| Screen::Auth(AuthForm::default()));
    }

    async fn handle_key(&mut self, key: KeyEvent) -> Action {
        self.status_message.clear();
        let App {
            shell,
            screen,
            status_message,
        } = self;

        let action = match screen {
            Screen::Loading => Action::Unhandled,
            Screen::Auth(form) => auth_key(shell, form, key, status_message).await,
            Screen::Dashboard(dashboard) => match key.code {
                KeyCode::Char('r') => {
                    dashboard.load().await;
                    Action::Handled
                }
                KeyCode::Char('n') => Action::NewWorkout,
                _ => Action::Unhandled,
            },
            Screen::Workouts(list) => workouts_key(list, key, status_message).await,
            Screen::WorkoutForm(form) => form.handle_key(key, status_message).await,
            Screen::Goals(goals) => goals.handle_key(key, status_message).await,
            Screen::Profile(profile) => profile_key(profile, key, status_message).await,
        };

        match action {
            Action::Unhandled => self.global_key(key),
            other => other,
        }
    }

    fn global_key(&self, key: KeyEvent) -> Action {
        let tab = self.shell.tab();
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Action::Quit,
            _ if self.shell.identity().is_none() => Action::Handled,
            KeyCode::Tab | KeyCode::Char('l') | KeyCode::Right => Action::Open(tab.next()),
            KeyCode::BackTab | KeyCode::Char('h') | KeyCode::Left => Action::Open(tab.previous()),
            KeyCode::Char(c @ '1'..='4') => {
                let idx = c as usize - '1' as usize;
                Action::Open(Tab::ALL[idx])
            }
            _ => Action::Handled,
        }
    }

    /// Returns `false` once the user asked to quit.
    async fn apply(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return false,
            Action::Handled | Action::Unhandled => {}
            Action::Open(tab) => self.open_tab(tab).await,
            Action::NewWorkout => {
                if let Some(form) = self.shell.new_workout_form() {
                    self.shell.select(Tab::Workouts);
                    self.screen = Screen::WorkoutForm(Box::new(FormScreen::open(form).await));
                }
            }
            Action::EditWorkout(workout_id) => {
                if let Some(form) = self.shell.edit_workout_form(workout_id) {
                    self.shell.select(Tab::Workouts);
                    self.screen = Screen::WorkoutForm(Box::new(FormScreen::open(form).await));
                }
            }
            Action::SignOut => {
                self.shell.sign_out().await;
                self.status_message = "Signed out".to_string();
                self.follow_route().await;
            }
        }
        true
    }

    fn hint(&self) -> &'static str {
        match &self.screen {
            Screen::Loading => "Loading...",
            Screen::Auth(_) => "Tab: switch field | Enter: sign in | Esc: quit",
            Screen::Dashboard(_) => {
                "r: refresh | n: new workout | Tab/1-4: switch view | q: quit"
            }
            Screen::Workouts(list) if list.pending_delete().is_some() => {
                "y: delete workout | n: keep it"
            }
            Screen::Workouts(_) => {
                "j/k: navigate | n: new | e: edit | d: delete | Tab/1-4: switch view | q: quit"
            }
            Screen::WorkoutForm(form) => form.hint(),
            Screen::Goals(goals) => goals.hint(),
            Screen::Profile(profile) if profile.editing => "Enter: save | Esc: cancel",
            Screen::Profile(_) => "e: edit name | o: sign out | Tab/1-4: switch view | q: quit",
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let chunks = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

        // Header
        if self.shell.identity().is_some() {
            let tabs = Tabs::new(Tab::ALL.iter().map(|t| t.title()))
                .select(self.shell.tab().position())
                .highlight_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )
                .block(bordered(format!(
                    "Liftlog - {}",
                    self.shell
                        .identity()
                        .map(|i| i.display_name())
                        .unwrap_or_default()
                )));
            frame.render_widget(tabs, chunks[0]);
        } else {
            let header = Paragraph::new("Liftlog - Fitness Tracker")
                .style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )
                .block(bordered(""));
            frame.render_widget(header, chunks[0]);
        }

        match &self.screen {
            Screen::Loading => {
                let loading = Paragraph::new("Loading...")
                    .style(Style::default().fg(Color::Gray))
                    .block(bordered(""));
                frame.render_widget(loading, chunks[1]);
            }
            Screen::Auth(form) => draw_auth(frame, chunks[1], form),
            Screen::Dashboard(dashboard) => draw_dashboard(frame, chunks[1], dashboard),
            Screen::Workouts(list) => draw_workouts(frame, chunks[1], list),
            Screen::WorkoutForm(form) => form.draw(frame, chunks[1]),
            Screen::Goals(goals) => goals.draw(frame, chunks[1]),
            Screen::Profile(profile) => draw_profile(frame, chunks[1], profile),
        }

        // Footer with status
        let status = if self.status_message.is_empty() {
            self.hint()
        } else {
            self.status_message.as_str()
        };
        let footer = Paragraph::new(status)
            .style(Style::default().fg(Color::White))
            .block(bordered("Status"));
        frame.render_widget(footer, chunks[2]);
    }
}

async fn auth_key(
    shell: &mut AppShell,
    form: &mut AuthForm,
    key: KeyEvent,
    status: &mut String,
) -> Action {
    match key.code {
        KeyCode::Esc => return Action::Quit,
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            form.field = match form.field {
                AuthField::Email => AuthField::Name,
                AuthField::Name => AuthField::Email,
            };
        }
        KeyCode::Enter => {
            let name = form.name.trim();
            let name = (!name.is_empty()).then_some(name);
            if shell.sign_in(form.email.trim(), name).await {
                return Action::Open(Tab::Dashboard);
            }
            *status = "Enter a valid email address".to_string();
        }
        KeyCode::Backspace => {
            match form.field {
                AuthField::Email => form.email.pop(),
                AuthField::Name => form.name.pop(),
            };
        }
        KeyCode::Char(c) => match form.field {
            AuthField::Email => form.email.push(c),
            AuthField::Name => form.name.push(c),
        },
        _ => {}
    }
    Action::Handled
}

async fn workouts_key(
    list: &mut WorkoutList<SqliteStore>,
    key: KeyEvent,
    status: &mut String,
) -> Action {
    if list.pending_delete().is_some() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                *status = if list.confirm_delete().await {
                    "Deleted workout".to_string()
                } else {
                    "Error deleting workout".to_string()
                };
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => list.cancel_delete(),
            _ => {}
        }
        return Action::Handled;
    }

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => list.scroll_down(),
        KeyCode::Char('k') | KeyCode::Up => list.scroll_up(),
        KeyCode::Char('r') => list.load().await,
        KeyCode::Char('n') => return Action::NewWorkout,
        KeyCode::Char('e') | KeyCode::Enter => {
            if let Some(workout_id) = list.selected_workout_id() {
                return Action::EditWorkout(workout_id);
            }
        }
        KeyCode::Char('d') => {
            if let Some(workout_id) = list.selected_workout_id() {
                list.request_delete(workout_id);
            }
        }
        _ => return Action::Unhandled,
    }
    Action::Handled
}

async fn profile_key(profile: &mut ProfileScreen, key: KeyEvent, status: &mut String) -> Action {
    if profile.editing {
        match key.code {
            KeyCode::Enter => {
                *status = if profile.view.save().await {
                    "Profile saved".to_string()
                } else {
                    "Error saving profile".to_string()
                };
                profile.editing = false;
            }
            KeyCode::Esc => {
                profile.view.load().await;
                profile.editing = false;
            }
            KeyCode::Backspace => {
                profile.view.full_name.pop();
            }
            KeyCode::Char(c) => profile.view.full_name.push(c),
            _ => {}
        }
        return Action::Handled;
    }

    match key.code {
        KeyCode::Char('e') | KeyCode::Enter => profile.editing = true,
        KeyCode::Char('o') => return Action::SignOut,
        KeyCode::Char('r') => profile.view.load().await,
        _ => return Action::Unhandled,
    }
    Action::Handled
}

fn draw_auth(frame: &mut Frame, area: Rect, form: &AuthForm) {
    let body = Paragraph::new(vec![
        Line::from("Sign in to track your workouts and goals."),
        Line::from(""),
        field_line("Email", &form.email, form.field == AuthField::Email),
        field_line("Name", &form.name, form.field == AuthField::Name),
    ])
    .block(bordered("Sign in"));
    frame.render_widget(body, area);
}

fn draw_dashboard(frame: &mut Frame, area: Rect, dashboard: &Dashboard<SqliteStore>) {
    let chunks = Layout::vertical([Constraint::Length(4), Constraint::Min(1)]).split(area);
    let cards = Layout::horizontal([Constraint::Ratio(1, 4); 4]).split(chunks[0]);

    let stats = dashboard.stats();
    let values = [
        ("Total workouts", stats.total_workouts.to_string()),
        ("Total minutes", stats.total_minutes.to_string()),
        ("Active goals", stats.active_goals.to_string()),
        ("This week", stats.this_week.to_string()),
    ];
    for ((title, value), card) in values.into_iter().zip(cards.iter()) {
        let widget = Paragraph::new(value)
            .style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .block(bordered(title));
        frame.render_widget(widget, *card);
    }

    let rows = dashboard.recent().iter().map(|s| s.to_string()).collect();
    render_list(
        frame,
        chunks[1],
        "Recent workouts".to_string(),
        highlighted_rows(rows, usize::MAX),
        None,
        "No workouts yet.\nPress 'n' to log your first workout!",
    );
}

fn draw_workouts(frame: &mut Frame, area: Rect, list: &WorkoutList<SqliteStore>) {
    let rows = list.workouts().iter().map(|s| s.to_string()).collect();
    render_list(
        frame,
        area,
        format!("Workouts ({} total)", list.workouts().len()),
        highlighted_rows(rows, list.selected()),
        Some(list.selected()),
        "No workouts found.\nPress 'n' to create your first workout!",
    );

    if let Some(pending) = list.pending_delete() {
        render_confirm(
            frame,
            area,
            &format!("Delete workout '{}' and its exercises?", pending.workout.name),
        );
    }
}

fn draw_profile(frame: &mut Frame, area: Rect, profile: &ProfileScreen) {
    let since = profile
        .view
        .profile()
        .map(|p| p.created_at.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    let body = Paragraph::new(vec![
        field_line("Email", profile.view.email(), false),
        field_line("Name", &profile.view.full_name, profile.editing),
        field_line("Member since", &since, false),
    ])
    .block(bordered("Profile"));
    frame.render_widget(body, area);
}
