use log::{error, info};
use std::sync::Arc;

use crate::db::models::Profile;
use crate::error::StoreResult;
use crate::identity::Identity;
use crate::store::Store;

/// Fetches the identity's profile, creating it from the display name when absent.
pub async fn ensure_profile<S: Store>(store: &S, identity: &Identity) -> StoreResult<Profile> {
    if let Some(profile) = store.get_profile(identity).await? {
        return Ok(profile);
    }
    let display_name = identity.display_name();
    info!("Creating profile for {} ({})", identity.email, display_name);
    store.insert_profile(identity, Some(&display_name)).await
}

pub struct ProfileView<S> {
    store: Arc<S>,
    identity: Identity,
    profile: Option<Profile>,
    /// Edit buffer for the display name.
    pub full_name: String,
}

impl<S: Store> ProfileView<S> {
    pub fn new(store: Arc<S>, identity: Identity) -> Self {
        Self {
            store,
            identity,
            profile: None,
            full_name: String::new(),
        }
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn email(&self) -> &str {
        &self.identity.email
    }

    pub async fn load(&mut self) {
        match ensure_profile(self.store.as_ref(), &self.identity).await {
            Ok(profile) => {
                self.full_name = profile.full_name.clone().unwrap_or_default();
                self.profile = Some(profile);
            }
            Err(e) => error!("Error loading profile: {}", e),
        }
    }

    /// Stores the edited name (blank clears it) and re-fetches.
    pub async fn save(&mut self) -> bool {
        let name = self.full_name.trim();
        let name = (!name.is_empty()).then_some(name);
        let saved = match self.store.update_profile(&self.identity, name).await {
            Ok(_) => true,
            Err(e) => {
                error!("Error updating profile: {}", e);
                false
            }
        };
        self.load().await;
        saved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_load_creates_missing_profile() {
        let store = Arc::new(MemoryStore::new());
        let who = Identity::for_email("ana@example.com", Some("Ana Lima"));
        assert!(store.get_profile(&who).await.unwrap().is_none());

        let mut view = ProfileView::new(store.clone(), who.clone());
        view.load().await;
        assert_eq!(view.full_name, "Ana Lima");
        assert_eq!(view.profile().map(|p| p.id), Some(who.id));

        // A second load finds the row instead of inserting again.
        view.load().await;
        assert!(view.profile().is_some());
    }

    #[tokio::test]
    async fn test_save_touches_updated_at() {
        let store = Arc::new(MemoryStore::new());
        let who = Identity::for_email("ana@example.com", None);
        let mut view = ProfileView::new(store, who);
        view.load().await;
        assert_eq!(view.full_name, "ana");
        let before = view.profile().unwrap().updated_at;

        view.full_name = "  Ana  ".into();
        assert!(view.save().await);
        let profile = view.profile().unwrap();
        assert_eq!(profile.full_name.as_deref(), Some("Ana"));
        assert!(profile.updated_at >= before);

        view.full_name = "   ".into();
        assert!(view.save().await);
        assert_eq!(view.profile().unwrap().full_name, None);
        assert_eq!(view.full_name, "");
    }
}
