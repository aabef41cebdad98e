//! Almacén en memoria de perfiles de usuario, sembrado con un usuario de demo.
//! Vive en `AppState`; no se persiste entre reinicios.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::models::{UserProfile, UserProfileUpdate};

#[derive(Debug, Clone, Default)]
pub struct UserStore {
    users: Arc<RwLock<HashMap<String, UserProfile>>>,
}

impl UserStore {
    /// Almacén con el usuario de demostración `user-1`.
    pub fn seeded() -> Self {
        let demo = UserProfile {
            id: "user-1".to_string(),
            name: "John Doe".to_string(),
            age: 30,
            gender: "male".to_string(),
            height: 175.0,
            weight: 70.0,
            activity_level: "moderate".to_string(),
            dosha: "VATA".to_string(),
            health_goals: Vec::new(),
            health_concerns: vec!["Low Energy".to_string(), "Digestive Issues".to_string()],
            dietary_restrictions: vec!["Vegetarian".to_string()],
        };

        let mut users = HashMap::new();
        users.insert(demo.id.clone(), demo);
        Self {
            users: Arc::new(RwLock::new(users)),
        }
    }

    pub async fn get(&self, id: &str) -> Option<UserProfile> {
        self.users.read().await.get(id).cloned()
    }

    /// Aplica una actualización parcial. `None` si el usuario no existe.
    pub async fn update(&self, id: &str, update: UserProfileUpdate) -> Option<UserProfile> {
        let mut users = self.users.write().await;
        let user = users.get_mut(id)?;
        user.apply(update);
        Some(user.clone())
    }

    /// Registra un perfil nuevo con un id generado; se ignora el id recibido.
    pub async fn create(&self, mut profile: UserProfile) -> UserProfile {
        profile.id = format!("user-{}", Uuid::new_v4());
        self.users.write().await.insert(profile.id.clone(), profile.clone());
        info!("Usuario creado: {}", profile.id);
        profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::block_on;

    #[test]
    fn demo_user_is_seeded() {
        let store = UserStore::seeded();
        let user = block_on(store.get("user-1")).unwrap();
        assert_eq!(user.dosha, "VATA");
        assert_eq!(user.gender, "male");
        assert!(block_on(store.get("user-2")).is_none());
    }

    #[test]
    fn update_merges_and_unknown_user_is_none() {
        let store = UserStore::seeded();
        let updated = block_on(store.update(
            "user-1",
            UserProfileUpdate {
                age: Some(31),
                ..Default::default()
            },
        ))
        .unwrap();
        assert_eq!(updated.age, 31);
        assert_eq!(updated.name, "John Doe");
        assert!(block_on(store.update("ghost", UserProfileUpdate::default())).is_none());
    }

    #[test]
    fn created_users_get_fresh_ids() {
        let store = UserStore::default();
        let profile = UserProfile {
            id: "ignored".into(),
            name: "Priya".into(),
            dosha: "KAPHA".into(),
            ..Default::default()
        };
        let created = block_on(store.create(profile));
        assert!(created.id.starts_with("user-"));
        assert_ne!(created.id, "ignored");
        assert_eq!(block_on(store.get(&created.id)).unwrap().name, "Priya");
    }
}
