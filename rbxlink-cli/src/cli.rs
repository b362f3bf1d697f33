use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rbxlink_core::{UserId, UserRole};

#[derive(Debug, Parser)]
#[command(
    name = "rbxlink",
    version,
    about = "Bind accounts to Roblox usernames"
)]
pub struct Cli {
    /// Configuration file (defaults to rbxlink.toml or config/rbxlink.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Environment file loaded before reading RBXLINK_* variables
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Choose which stored account acts
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
    /// Manage stored accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Show the Roblox bindings visible to the acting account
    List,
    /// Register a Roblox username to the acting account
    Register {
        /// Roblox username, 3-20 characters
        name: String,
        /// Release the current binding without asking
        #[arg(short, long)]
        yes: bool,
    },
    /// Release a Roblox binding
    Unregister {
        /// Account to release (admins only; defaults to the acting account)
        #[arg(long)]
        user: Option<UserId>,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show one account's details
    Describe {
        /// Account ID
        id: UserId,
    },
}

#[derive(Debug, Subcommand)]
pub enum SessionAction {
    /// Act as the stored account with this username
    Use { username: String },
    /// Print the acting account
    Show,
    /// Forget the acting account
    Clear,
}

#[derive(Debug, Subcommand)]
pub enum UserAction {
    /// Add an account to the user store
    Add {
        username: String,
        #[arg(long, default_value = "")]
        email: String,
        /// user or admin
        #[arg(long, default_value = "user")]
        role: UserRole,
    },
}
