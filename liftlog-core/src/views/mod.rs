//! View-models behind each screen.
//!
//! Each view owns its snapshot of rows, loads it on mount and re-fetches
//! after every mutation. Store failures are logged and leave the last-known
//! snapshot in place.

mod dashboard;
mod goals;
mod profile;
mod shell;
mod workout_form;
mod workouts;

pub use dashboard::{Dashboard, RECENT_WORKOUTS};
pub use goals::{GoalForm, GoalFormError, GoalsView};
pub use profile::{ProfileView, ensure_profile};
pub use shell::{AuthState, Route, Shell, Tab};
pub use workout_form::{FormEntry, FormError, SAVE_ERROR_ALERT, WorkoutForm};
pub use workouts::WorkoutList;

/// Moves a list cursor by one, staying inside `0..len`.
pub(crate) fn step_cursor(cursor: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        0
    } else if forward {
        (cursor + 1).min(len - 1)
    } else {
        cursor.saturating_sub(1)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use crate::identity::Identity;
    use crate::store::{MemoryStore, Store};

    pub async fn store_with_user(email: &str) -> (Arc<MemoryStore>, Identity) {
        let store = Arc::new(MemoryStore::new());
        let who = Identity::for_email(email, Some("Test User"));
        store.insert_profile(&who, Some("Test User")).await.unwrap();
        (store, who)
    }
}
