use chrono::NaiveDate;
use log::{error, info};
use std::sync::Arc;
use thiserror::Error;

use crate::db::models::{Goal, GoalDraft, GoalFilter, GoalType};
use crate::identity::Identity;
use crate::store::Store;
use crate::views::step_cursor;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GoalFormError {
    #[error("Target value must be greater than zero")]
    NonPositiveTarget,
    #[error("Current value must be a number")]
    InvalidCurrent,
}

/// Create/update form state. `editing` holds the goal id in update mode.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalForm {
    pub editing: Option<i64>,
    pub goal_type: GoalType,
    pub target_value: f64,
    pub current_value: f64,
    pub target_date: Option<NaiveDate>,
}

impl Default for GoalForm {
    fn default() -> Self {
        Self {
            editing: None,
            goal_type: GoalType::WeightLoss,
            target_value: 0.0,
            current_value: 0.0,
            target_date: None,
        }
    }
}

impl GoalForm {
    pub fn from_goal(goal: &Goal) -> Self {
        Self {
            editing: Some(goal.id),
            goal_type: goal.goal_type.clone(),
            target_value: goal.target_value,
            current_value: goal.current_value,
            target_date: goal.target_date,
        }
    }

    /// Moves to the next entry of [`GoalType::CHOICES`], wrapping around.
    pub fn cycle_goal_type(&mut self) {
        let next = GoalType::CHOICES
            .iter()
            .position(|t| *t == self.goal_type)
            .map(|i| (i + 1) % GoalType::CHOICES.len())
            .unwrap_or(0);
        self.goal_type = GoalType::CHOICES[next].clone();
    }

    pub fn draft(&self) -> Result<GoalDraft, GoalFormError> {
        if !self.target_value.is_finite() || self.target_value <= 0.0 {
            return Err(GoalFormError::NonPositiveTarget);
        }
        if !self.current_value.is_finite() {
            return Err(GoalFormError::InvalidCurrent);
        }
        Ok(GoalDraft {
            goal_type: self.goal_type.clone(),
            target_value: self.target_value,
            current_value: self.current_value,
            target_date: self.target_date,
        })
    }
}

pub struct GoalsView<S> {
    store: Arc<S>,
    identity: Identity,
    goals: Vec<Goal>,
    selected: usize,
    form: Option<GoalForm>,
    pending_delete: Option<i64>,
    alert: Option<String>,
}

impl<S: Store> GoalsView<S> {
    pub fn new(store: Arc<S>, identity: Identity) -> Self {
        Self {
            store,
            identity,
            goals: Vec::new(),
            selected: 0,
            form: None,
            pending_delete: None,
            alert: None,
        }
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_goal(&self) -> Option<&Goal> {
        self.goals.get(self.selected)
    }

    pub fn scroll_down(&mut self) {
        self.selected = step_cursor(self.selected, self.goals.len(), true);
    }

    pub fn scroll_up(&mut self) {
        self.selected = step_cursor(self.selected, self.goals.len(), false);
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub async fn load(&mut self) {
        match self.store.list_goals(&self.identity, GoalFilter::All).await {
            Ok(goals) => {
                self.goals = goals;
                if self.selected >= self.goals.len() {
                    self.selected = self.goals.len().saturating_sub(1);
                }
            }
            Err(e) => error!("Error fetching goals: {}", e),
        }
    }

    pub fn form(&self) -> Option<&GoalForm> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut GoalForm> {
        self.form.as_mut()
    }

    pub fn start_create(&mut self) {
        self.alert = None;
        self.form = Some(GoalForm::default());
    }

    pub fn start_edit(&mut self, goal_id: i64) -> bool {
        let Some(goal) = self.goals.iter().find(|g| g.id == goal_id) else {
            return false;
        };
        self.alert = None;
        self.form = Some(GoalForm::from_goal(goal));
        true
    }

    pub fn cancel_form(&mut self) {
        self.form = None;
    }

    /// Creates or updates from the open form, then re-fetches. The form
    /// stays open (with an alert) when validation or the write fails.
    pub async fn submit(&mut self) -> bool {
        let Some(form) = self.form.as_ref() else {
            return false;
        };
        let draft = match form.draft() {
            Ok(draft) => draft,
            Err(e) => {
                self.alert = Some(e.to_string());
                return false;
            }
        };

        let result = match form.editing {
            Some(goal_id) => self.store.update_goal(&self.identity, goal_id, &draft).await,
            None => self.store.insert_goal(&self.identity, &draft).await,
        };
        let saved = match result {
            Ok(goal) => {
                info!("Saved {} goal #{}", goal.goal_type.as_str(), goal.id);
                self.form = None;
                self.alert = None;
                true
            }
            Err(e) => {
                error!("Error saving goal: {}", e);
                self.alert = Some("Error saving goal".to_string());
                false
            }
        };
        self.load().await;
        saved
    }

    /// Flips the manual achieved flag.
    pub async fn toggle_achieved(&mut self, goal_id: i64) -> bool {
        let Some(achieved) = self.goals.iter().find(|g| g.id == goal_id).map(|g| g.achieved) else {
            return false;
        };
        let toggled = match self
            .store
            .set_goal_achieved(&self.identity, goal_id, !achieved)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                error!("Error updating goal #{}: {}", goal_id, e);
                false
            }
        };
        self.load().await;
        toggled
    }

    pub fn request_delete(&mut self, goal_id: i64) -> bool {
        if self.goals.iter().any(|g| g.id == goal_id) {
            self.pending_delete = Some(goal_id);
            true
        } else {
            false
        }
    }

    pub fn pending_delete(&self) -> Option<&Goal> {
        let id = self.pending_delete?;
        self.goals.iter().find(|g| g.id == id)
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub async fn confirm_delete(&mut self) -> bool {
        let Some(goal_id) = self.pending_delete.take() else {
            return false;
        };
        let deleted = match self.store.delete_goal(&self.identity, goal_id).await {
            Ok(()) => {
                info!("Deleted goal #{}", goal_id);
                true
            }
            Err(e) => {
                error!("Error deleting goal #{}: {}", goal_id, e);
                false
            }
        };
        self.load().await;
        deleted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::testing::store_with_user;

    async fn create(view: &mut GoalsView<crate::store::MemoryStore>, target: f64, current: f64) {
        view.start_create();
        let form = view.form_mut().unwrap();
        form.target_value = target;
        form.current_value = current;
        assert!(view.submit().await);
    }

    #[tokio::test]
    async fn test_create_and_progress() {
        let (store, who) = store_with_user("ana@example.com").await;
        let mut view = GoalsView::new(store, who);
        create(&mut view, 200.0, 50.0).await;
        create(&mut view, 200.0, 250.0).await;

        let goals = view.goals();
        assert_eq!(goals.len(), 2);
        // Newest first.
        assert_eq!(goals[0].progress_percent(), 100.0);
        assert_eq!(goals[1].progress_percent(), 25.0);
        assert!(view.form().is_none());
    }

    #[tokio::test]
    async fn test_zero_target_is_rejected() {
        let (store, who) = store_with_user("ana@example.com").await;
        let mut view = GoalsView::new(store, who);
        view.start_create();
        view.form_mut().unwrap().current_value = 5.0;
        assert!(!view.submit().await);
        assert_eq!(view.alert(), Some("Target value must be greater than zero"));
        assert!(view.form().is_some());
        assert!(view.goals().is_empty());
    }

    #[tokio::test]
    async fn test_edit_goal() {
        let (store, who) = store_with_user("ana@example.com").await;
        let mut view = GoalsView::new(store, who);
        create(&mut view, 10.0, 1.0).await;
        let id = view.goals()[0].id;

        assert!(view.start_edit(id));
        {
            let form = view.form_mut().unwrap();
            form.current_value = 7.5;
            form.cycle_goal_type();
        }
        assert!(view.submit().await);
        let goal = &view.goals()[0];
        assert_eq!(goal.current_value, 7.5);
        assert_eq!(goal.goal_type, GoalType::MuscleGain);
        assert_eq!(goal.progress_percent(), 75.0);
    }

    #[tokio::test]
    async fn test_achieved_is_manual() {
        let (store, who) = store_with_user("ana@example.com").await;
        let mut view = GoalsView::new(store, who);
        create(&mut view, 10.0, 50.0).await;
        let id = view.goals()[0].id;
        assert!(!view.goals()[0].achieved);

        assert!(view.toggle_achieved(id).await);
        assert!(view.goals()[0].achieved);
        assert!(view.toggle_achieved(id).await);
        assert!(!view.goals()[0].achieved);
    }

    #[tokio::test]
    async fn test_delete_goal_with_confirmation() {
        let (store, who) = store_with_user("ana@example.com").await;
        let mut view = GoalsView::new(store, who);
        create(&mut view, 10.0, 1.0).await;
        let id = view.goals()[0].id;

        assert!(!view.request_delete(id + 100));
        assert!(view.request_delete(id));
        assert!(view.confirm_delete().await);
        assert!(view.goals().is_empty());
    }

    #[test]
    fn test_cycle_goal_type_wraps() {
        let mut form = GoalForm::default();
        for _ in 0..GoalType::CHOICES.len() {
            form.cycle_goal_type();
        }
        assert_eq!(form.goal_type, GoalType::WeightLoss);
    }
}
