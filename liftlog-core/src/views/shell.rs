use log::{error, info};
use std::sync::Arc;

use crate::identity::{Identity, IdentityProvider};
use crate::store::Store;
use crate::views::{Dashboard, GoalsView, ProfileView, WorkoutForm, WorkoutList, ensure_profile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Dashboard,
    Workouts,
    Goals,
    Profile,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Dashboard, Tab::Workouts, Tab::Goals, Tab::Profile];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Workouts => "Workouts",
            Tab::Goals => "Goals",
            Tab::Profile => "Profile",
        }
    }

    pub fn position(&self) -> usize {
        Tab::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    pub fn next(&self) -> Tab {
        Tab::ALL[(self.position() + 1) % Tab::ALL.len()]
    }

    pub fn previous(&self) -> Tab {
        Tab::ALL[(self.position() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    Pending,
    SignedOut,
    SignedIn(Identity),
}

/// Where the shell sends the user for the current auth state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Loading,
    Auth,
    Main(Tab),
}

/// Top-level navigation: identity gate plus the four-tab switch.
pub struct Shell<S, P> {
    store: Arc<S>,
    provider: Arc<P>,
    auth: AuthState,
    tab: Tab,
}

impl<S: Store, P: IdentityProvider> Shell<S, P> {
    pub fn new(store: Arc<S>, provider: Arc<P>) -> Self {
        Self {
            store,
            provider,
            auth: AuthState::Pending,
            tab: Tab::default(),
        }
    }

    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    pub fn identity(&self) -> Option<&Identity> {
        match &self.auth {
            AuthState::SignedIn(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn route(&self) -> Route {
        match self.auth {
            AuthState::Pending => Route::Loading,
            AuthState::SignedOut => Route::Auth,
            AuthState::SignedIn(_) => Route::Main(self.tab),
        }
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn select(&mut self, tab: Tab) {
        self.tab = tab;
    }

    /// Asks the provider who is signed in and makes sure their profile row exists.
    pub async fn resolve(&mut self) {
        self.auth = AuthState::Pending;
        let identity = self.provider.current_identity().await;
        self.establish(identity).await;
    }

    pub async fn sign_in(&mut self, email: &str, full_name: Option<&str>) -> bool {
        let identity = self.provider.sign_in(email, full_name).await;
        self.establish(identity).await;
        matches!(self.auth, AuthState::SignedIn(_))
    }

    pub async fn sign_out(&mut self) {
        self.provider.sign_out().await;
        self.auth = AuthState::SignedOut;
        self.tab = Tab::default();
    }

    async fn establish(&mut self, identity: Option<Identity>) {
        self.auth = match identity {
            Some(identity) => {
                if let Err(e) = ensure_profile(self.store.as_ref(), &identity).await {
                    error!("Error ensuring profile for {}: {}", identity.email, e);
                }
                info!("Session established for {}", identity.email);
                AuthState::SignedIn(identity)
            }
            None => AuthState::SignedOut,
        };
    }

    fn signed_in(&self) -> Option<(Arc<S>, Identity)> {
        self.identity().map(|i| (self.store.clone(), i.clone()))
    }

    pub fn dashboard(&self) -> Option<Dashboard<S>> {
        self.signed_in().map(|(s, i)| Dashboard::new(s, i))
    }

    pub fn workouts(&self) -> Option<WorkoutList<S>> {
        self.signed_in().map(|(s, i)| WorkoutList::new(s, i))
    }

    pub fn new_workout_form(&self) -> Option<WorkoutForm<S>> {
        self.signed_in().map(|(s, i)| WorkoutForm::create(s, i))
    }

    pub fn edit_workout_form(&self, workout_id: i64) -> Option<WorkoutForm<S>> {
        self.signed_in()
            .map(|(s, i)| WorkoutForm::edit(s, i, workout_id))
    }

    pub fn goals(&self) -> Option<GoalsView<S>> {
        self.signed_in().map(|(s, i)| GoalsView::new(s, i))
    }

    pub fn profile(&self) -> Option<ProfileView<S>> {
        self.signed_in().map(|(s, i)| ProfileView::new(s, i))
    }
}
