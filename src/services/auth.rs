//! Auth Gate
//!
//! `anonymous -> authenticated(role)`. Credentials are compared in plain
//! text against the local user list; every failure reports the same
//! `InvalidCredentials` so callers cannot tell which part was wrong.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;
use crate::domain::aggregates::{Session, User};
use crate::domain::value_objects::Role;
use crate::store::Store;
use crate::{Result, StorefrontError};

/// Self-service sign-up; always yields a client.
#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
pub struct Registration {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Admin-side user creation with an explicit role.
#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
pub struct UserForm {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub whatsapp: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate)]
pub struct UserUpdate {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 6))]
    pub password: Option<String>,
    pub role: Option<Role>,
    pub whatsapp: Option<String>,
    pub active: Option<bool>,
}

/// Landing page after login. A recognised `hint` wins over the role default.
pub fn redirect_for(role: Role, hint: Option<&str>) -> &'static str {
    match (hint, role) {
        (Some("store"), Role::Client) => "user/store.html",
        (Some("store"), Role::Admin) => "admin/store.html",
        (Some("store"), Role::Distributor) => "distri/store.html",
        (Some("cart"), Role::Client) => "user/cart.html",
        (_, Role::Admin) => "admin/index.html",
        (_, Role::Distributor) => "distri/index.html",
        (_, Role::Client) => "user/store.html",
    }
}

pub struct Auth<'a> {
    store: &'a Store,
}

impl<'a> Auth<'a> {
    pub fn new(store: &'a Store) -> Self { Self { store } }

    pub fn login(&self, email: &str, password: &str) -> Result<Session> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(StorefrontError::Validation("email and password are required".into()));
        }
        let _guard = self.store.lock();
        let mut users = self.store.users();
        let Some(user) = users.iter_mut().find(|u| u.has_email(email) && u.password == password && u.active) else {
            warn!("login rejected");
            return Err(StorefrontError::InvalidCredentials);
        };
        user.last_login = Some(Utc::now());
        let session = Session::for_user(user);
        self.store.set_users(&users)?;
        self.store.set_session(&session)?;
        info!(user_id = %session.id, role = %session.role, "login");
        Ok(session)
    }

    /// Always succeeds in clearing, even with no session.
    pub fn logout(&self) -> Result<()> {
        let _guard = self.store.lock();
        self.store.clear_session()?;
        info!("logout");
        Ok(())
    }

    /// Creates a client and signs them in.
    pub fn register(&self, form: Registration) -> Result<Session> {
        form.validate()?;
        let mut user = User::create(Role::Client, form.name.trim(), form.email, form.password);
        user.phone = form.phone.filter(|p| !p.trim().is_empty());
        let _guard = self.store.lock();
        let user = self.insert_user(user)?;
        let session = Session::for_user(&user);
        self.store.set_session(&session)?;
        info!(user_id = %user.id, "registered");
        Ok(session)
    }

    pub fn current_session(&self) -> Option<Session> { self.store.session() }

    /// Session whose role is one of `roles`.
    pub fn require_role(&self, roles: &[Role]) -> Result<Session> {
        self.current_session()
            .filter(|s| roles.contains(&s.role))
            .ok_or(StorefrontError::Unauthorized)
    }

    // -------------------------------------------------------------------------
    // User management
    // -------------------------------------------------------------------------

    pub fn users(&self) -> Vec<User> { self.store.users() }
    pub fn active_users(&self) -> Vec<User> { self.users().into_iter().filter(|u| u.active).collect() }

    pub fn user(&self, id: &str) -> Result<User> {
        self.users().into_iter().find(|u| u.id == id).ok_or(StorefrontError::UserNotFound)
    }

    pub fn create_user(&self, form: UserForm) -> Result<User> {
        form.validate()?;
        let mut user = User::create(form.role, form.name.trim(), form.email, form.password);
        if form.role == Role::Distributor {
            user.whatsapp = form.whatsapp.filter(|w| !w.trim().is_empty());
        }
        let _guard = self.store.lock();
        let user = self.insert_user(user)?;
        info!(user_id = %user.id, role = %user.role, "user created");
        Ok(user)
    }

    pub fn update_user(&self, id: &str, update: UserUpdate) -> Result<User> {
        update.validate()?;
        let _guard = self.store.lock();
        self.apply_update(id, update)
    }

    /// Flips the soft-delete flag.
    pub fn toggle_active(&self, id: &str) -> Result<User> {
        let _guard = self.store.lock();
        let active = !self.user(id)?.active;
        self.apply_update(id, UserUpdate { active: Some(active), ..Default::default() })
    }

    fn apply_update(&self, id: &str, update: UserUpdate) -> Result<User> {
        let mut users = self.users();
        if let Some(email) = &update.email {
            if users.iter().any(|u| u.id != id && u.has_email(email)) {
                return Err(StorefrontError::DuplicateEmail);
            }
        }
        let user = users.iter_mut().find(|u| u.id == id).ok_or(StorefrontError::UserNotFound)?;
        if let Some(name) = update.name { user.name = name.trim().to_string(); }
        if let Some(email) = update.email { user.email = email.trim().to_lowercase(); }
        if let Some(password) = update.password { user.password = password; }
        if let Some(role) = update.role { user.role = role; }
        if let Some(whatsapp) = update.whatsapp { user.whatsapp = Some(whatsapp).filter(|w| !w.trim().is_empty()); }
        if let Some(active) = update.active { user.active = active; }
        let updated = user.clone();
        self.store.set_users(&users)?;
        Ok(updated)
    }

    /// Removes the record entirely.
    pub fn delete_user(&self, id: &str) -> Result<()> {
        let _guard = self.store.lock();
        let mut users = self.users();
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before { return Err(StorefrontError::UserNotFound); }
        self.store.set_users(&users)?;
        info!(user_id = id, "user deleted");
        Ok(())
    }

    /// Caller holds the store lock.
    fn insert_user(&self, user: User) -> Result<User> {
        let mut users = self.users();
        if users.iter().any(|u| u.has_email(&user.email)) {
            return Err(StorefrontError::DuplicateEmail);
        }
        users.push(user.clone());
        self.store.set_users(&users)?;
        Ok(user)
    }
}
