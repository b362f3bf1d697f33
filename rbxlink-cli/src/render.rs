//! Plain-text output for the terminal.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use rbxlink_core::{BindingSummary, UserDetail, UserRecord};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

pub fn bindings(rows: &[BindingSummary]) -> String {
    if rows.is_empty() {
        return "No Roblox accounts registered.\n".to_string();
    }

    let headers = ["USER", "ROBLOX ACCOUNT", "SINCE", "USER ID"];
    let cells: Vec<[String; 4]> = rows
        .iter()
        .map(|row| {
            [
                row.username.clone(),
                row.roblox_username.clone(),
                formatted(row.since, DATE_FORMAT),
                row.user_id.to_string(),
            ]
        })
        .collect();

    let mut widths = headers.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &headers.map(String::from), &widths);
    for row in &cells {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String; 4], widths: &[usize; 4]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

pub fn detail(detail: &UserDetail) -> String {
    let mut out = String::new();
    let rows = [
        ("User", detail.username.clone()),
        ("User ID", detail.user_id.to_string()),
        ("Email", or_dash(&detail.email)),
        (
            "Roblox account",
            detail
                .roblox_username
                .clone()
                .unwrap_or_else(|| "-".to_string()),
        ),
        ("Registered at", formatted(detail.roblox_registered_at, TIME_FORMAT)),
        ("Joined", formatted(detail.join_date, TIME_FORMAT)),
        ("Scripts executed", detail.scripts_executed.to_string()),
    ];
    for (label, value) in rows {
        let _ = writeln!(out, "{:<18}{value}", format!("{label}:"));
    }
    out
}

pub fn session(current: Option<&UserRecord>) -> String {
    match current {
        Some(user) => format!(
            "Acting as {} ({}, {})\nRoblox account: {}\n",
            user.username,
            user.role,
            user.id,
            user.binding().unwrap_or("-"),
        ),
        None => "No active session. Run `rbxlink session use <username>`.\n"
            .to_string(),
    }
}

fn formatted(at: Option<DateTime<Utc>>, format: &str) -> String {
    at.map(|at| at.format(format).to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn or_dash(value: &str) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}
