use tokio::sync::RwLock;

use crate::types::{Role, UserRecord};

/// In-memory set of known users. Lives as long as the owning [`crate::AppState`].
#[derive(Debug, Default)]
pub struct CredentialStore {
    users: RwLock<Vec<UserRecord>>,
}

impl CredentialStore {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Store holding the two development accounts
    pub fn seeded() -> Self {
        Self::with_users(seed_users())
    }

    pub fn with_users(users: Vec<UserRecord>) -> Self {
        Self {
            users: RwLock::new(users),
        }
    }

    /// Case-sensitive exact match on email
    pub async fn find_by_email(&self, email: &str) -> Option<UserRecord> {
        self.users
            .read()
            .await
            .iter()
            .find(|user| user.email == email)
            .cloned()
    }

    pub async fn find_by_id(&self, id: &str) -> Option<UserRecord> {
        self.users
            .read()
            .await
            .iter()
            .find(|user| user.id == id)
            .cloned()
    }

    pub async fn first(&self) -> Option<UserRecord> {
        self.users.read().await.first().cloned()
    }

    /// Add a record as-is. Callers check for duplicate emails beforehand.
    pub async fn append(&self, record: UserRecord) {
        self.users.write().await.push(record);
    }

    /// Add a record unless its email is already taken. Returns whether it was added.
    pub async fn insert_new(&self, record: UserRecord) -> bool {
        let mut users = self.users.write().await;
        if users.iter().any(|user| user.email == record.email) {
            return false;
        }
        users.push(record);
        true
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

/// Development accounts available on every start-up
pub fn seed_users() -> Vec<UserRecord> {
    vec![
        UserRecord {
            id: "1".to_string(),
            email: "admin@synapseai.com".to_string(),
            password: "Admin123!".to_string(),
            name: "Administrador".to_string(),
            role: Role::Admin,
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
        },
        UserRecord {
            id: "2".to_string(),
            email: "user@synapseai.com".to_string(),
            password: "User123!".to_string(),
            name: "Usuário Teste".to_string(),
            role: Role::User,
            created_at: "2024-01-02T00:00:00Z".to_string(),
            updated_at: "2024-01-02T00:00:00Z".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, email: &str) -> UserRecord {
        UserRecord {
            id: id.to_string(),
            email: email.to_string(),
            password: "secret".to_string(),
            name: "Someone".to_string(),
            role: Role::User,
            created_at: "2024-05-01T00:00:00Z".to_string(),
            updated_at: "2024-05-01T00:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn seeded_store_holds_admin_first() {
        let store = CredentialStore::seeded();

        assert_eq!(store.len().await, 2);
        let first = store.first().await.unwrap();
        assert_eq!(first.email, "admin@synapseai.com");
        assert_eq!(first.role, Role::Admin);
    }

    #[tokio::test]
    async fn email_lookup_is_case_sensitive() {
        let store = CredentialStore::seeded();

        assert!(store.find_by_email("user@synapseai.com").await.is_some());
        assert!(store.find_by_email("USER@synapseai.com").await.is_none());
    }

    #[tokio::test]
    async fn append_does_not_check_duplicates() {
        let store = CredentialStore::empty();
        assert!(store.is_empty().await);

        store.append(record("1", "a@x.com")).await;
        store.append(record("1", "a@x.com")).await;

        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn insert_new_refuses_taken_email() {
        let store = CredentialStore::seeded();

        assert!(!store.insert_new(record("9", "admin@synapseai.com")).await);
        assert!(store.insert_new(record("9", "new@synapseai.com")).await);

        assert_eq!(store.len().await, 3);
        assert_eq!(store.find_by_id("9").await.unwrap().email, "new@synapseai.com");
    }
}
