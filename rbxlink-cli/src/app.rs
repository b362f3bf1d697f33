use std::sync::Arc;

use anyhow::{Context, Result, bail};
use dialoguer::Confirm;
use rbxlink_config::Config;
use rbxlink_core::{
    BindingService, BindingSummary, NotificationSink, RegisterOutcome, SessionContext,
    UnregisterOutcome, UserId, UserRecord, UserRole, UserStore,
    infra::{FileSession, JsonFileUserStore, TracingSink, WebhookSink},
};
use tracing::info;

use crate::render;

/// Terminal front end over the binding service.
#[derive(Debug)]
pub struct App {
    service: BindingService,
    store: Arc<JsonFileUserStore>,
    session: FileSession,
}

impl App {
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = Arc::new(JsonFileUserStore::new(&config.store.path));
        let session = FileSession::open(&config.session.path).with_context(|| {
            format!("failed to open session {}", config.session.path.display())
        })?;

        let notifier: Arc<dyn NotificationSink> =
            match &config.notifications.webhook_url {
                Some(url) => Arc::new(
                    WebhookSink::new(url.clone(), config.notifications.timeout)
                        .context("failed to build webhook client")?,
                ),
                None => Arc::new(TracingSink),
            };

        Ok(Self {
            service: BindingService::new(store.clone(), notifier),
            store,
            session,
        })
    }

    pub async fn use_account(&self, username: &str) -> Result<()> {
        let users = self.store.list().await?;
        let Some(user) = users.into_iter().find(|user| user.username == username)
        else {
            bail!("no stored account named '{username}'");
        };

        self.session.sign_in(user.clone())?;
        print!("{}", render::session(Some(&user)));
        Ok(())
    }

    pub fn show_session(&self) {
        print!("{}", render::session(self.session.current().as_ref()));
    }

    pub fn clear_session(&self) -> Result<()> {
        self.session.sign_out()?;
        println!("Session cleared.");
        Ok(())
    }

    pub async fn add_user(
        &self,
        username: &str,
        email: &str,
        role: UserRole,
    ) -> Result<()> {
        let username = username.trim();
        if username.is_empty() {
            bail!("username cannot be empty");
        }
        let users = self.store.list().await?;
        if users.iter().any(|user| user.username == username) {
            bail!("an account named '{username}' already exists");
        }

        let user = UserRecord::new(username, email.trim(), role);
        self.store.insert(user.clone()).await?;
        info!(user_id = %user.id, username = %user.username, role = %user.role, "account added");
        println!("Added {} ({}) with ID {}", user.username, user.role, user.id);
        Ok(())
    }

    /// Print the bindings the acting account may see.
    pub async fn list(&self) -> Result<()> {
        let visible = self.service.list_visible(&self.session).await?;
        let rows: Vec<_> = visible
            .iter()
            .filter_map(BindingSummary::from_record)
            .collect();
        print!("{}", render::bindings(&rows));
        Ok(())
    }

    pub async fn register(&self, name: &str, assume_yes: bool) -> Result<()> {
        let record = match self.service.register(&self.session, name).await? {
            RegisterOutcome::Registered(record) => record,
            RegisterOutcome::AlreadyBound(confirmation) => {
                let prompt = format!(
                    "{} is registered to your account. Unregister it and register {} instead?",
                    confirmation.roblox_username(),
                    name.trim(),
                );
                if !confirm(&prompt, assume_yes)? {
                    println!("Kept {}.", confirmation.roblox_username());
                    return Ok(());
                }

                let released = self
                    .service
                    .confirm_and_unregister(&self.session, confirmation)
                    .await?;
                if let Some(value) = released.released() {
                    println!("Unregistered {value}.");
                }

                match self.service.register(&self.session, name).await? {
                    RegisterOutcome::Registered(record) => record,
                    RegisterOutcome::AlreadyBound(confirmation) => bail!(
                        "{} is still registered to your account",
                        confirmation.roblox_username()
                    ),
                }
            }
        };

        println!(
            "Registered {} to {}.",
            record.binding().unwrap_or_default(),
            record.username
        );
        self.list().await
    }

    pub async fn unregister(&self, target: Option<UserId>, assume_yes: bool) -> Result<()> {
        let actor = self.session.current().map(|user| user.id);
        match target {
            Some(target) if actor.as_ref() != Some(&target) => {
                self.unregister_other(target, assume_yes).await?
            }
            _ => self.unregister_self(assume_yes).await?,
        }
        self.list().await
    }

    async fn unregister_self(&self, assume_yes: bool) -> Result<()> {
        let Some(confirmation) =
            self.service.propose_unregister_then_retry(&self.session)?
        else {
            println!("No Roblox account is registered to your account.");
            return Ok(());
        };

        let prompt = format!("Unregister {}?", confirmation.roblox_username());
        if !confirm(&prompt, assume_yes)? {
            return Ok(());
        }

        let outcome = self
            .service
            .confirm_and_unregister(&self.session, confirmation)
            .await?;
        report(&outcome);
        Ok(())
    }

    async fn unregister_other(&self, target: UserId, assume_yes: bool) -> Result<()> {
        let detail = self.service.describe(&self.session, target.clone()).await?;
        let Some(current) = detail.roblox_username.as_deref() else {
            println!("{} has no Roblox account registered.", detail.username);
            return Ok(());
        };

        let prompt = format!("Unregister {current} from {}?", detail.username);
        if !confirm(&prompt, assume_yes)? {
            return Ok(());
        }

        let outcome = self.service.unregister(&self.session, target).await?;
        report(&outcome);
        Ok(())
    }

    pub async fn describe(&self, id: UserId) -> Result<()> {
        let detail = self.service.describe(&self.session, id).await?;
        print!("{}", render::detail(&detail));
        Ok(())
    }
}

fn report(outcome: &UnregisterOutcome) {
    let record = outcome.record();
    match outcome.released() {
        Some(value) => println!("Unregistered {value} from {}.", record.username),
        None => println!("{} has no Roblox account registered.", record.username),
    }
}

fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .context("confirmation prompt failed; pass --yes to skip it")
}
