//! CLI Command Handlers
//!
//! Implements all CLI commands on top of the storefront context.
//! Each handler takes CLI args and Output, returns ExitCode.

use serde::Serialize;

use streamfront::cli::{
    read_descriptor, validate_pin, ComponentCmd, DetailsCmd, ExitCode, FavouriteAction,
    FavouriteCmd, HealthCmd, HealthStatus, Output, PinCmd, ProgressCmd, RecentCmd, StatusOk,
};
use streamfront::{Outcome, Storefront};

/// Print a ready outcome, map the rest to exit codes
fn finish<T: Serialize>(outcome: Outcome<T>, output: &Output, what: &str) -> ExitCode {
    match outcome {
        Outcome::Ready(data) => match output.print(&data) {
            Ok(()) => ExitCode::Success,
            Err(e) => output.error(format!("Failed to serialize: {}", e), ExitCode::Error),
        },
        Outcome::Empty => output.error(format!("No {} available", what), ExitCode::NoContent),
        Outcome::Failed(kind) => output.error(
            format!("{} failed: {}", what, kind),
            ExitCode::from_kind(kind),
        ),
    }
}

// =============================================================================
// Content Commands
// =============================================================================

pub async fn component_cmd(cmd: ComponentCmd, store: &Storefront, output: &Output) -> ExitCode {
    let descriptor = match read_descriptor(&cmd.descriptor) {
        Ok(d) => d,
        Err(e) => return output.error(format!("{:#}", e), ExitCode::InvalidArgs),
    };
    let ttl = cmd.ttl.unwrap_or_else(|| store.config().default_ttl());

    output.info(format!("Fetching {} component (ttl {})...", descriptor.kind, ttl));

    let outcome = store
        .fetch_component_data(
            &descriptor,
            ttl,
            cmd.initiator_id.as_deref(),
            cmd.initiator_type.as_deref(),
            cmd.page,
        )
        .await;
    finish(outcome, output, "Component data")
}

pub async fn details_cmd(cmd: DetailsCmd, store: &Storefront, output: &Output) -> ExitCode {
    output.info(format!("Fetching {} {}...", cmd.kind, cmd.uid));
    let outcome = store.fetch_details(&cmd.uid, &cmd.kind, cmd.ttl).await;
    finish(outcome, output, "Details")
}

pub async fn health_cmd(_cmd: HealthCmd, store: &Storefront, output: &Output) -> ExitCode {
    let online = store.check_connectivity().await;
    let status = HealthStatus {
        online,
        base_url: store.config().base_url.clone(),
    };
    if let Err(e) = output.print(&status) {
        return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
    }
    if online {
        ExitCode::Success
    } else {
        ExitCode::NetworkError
    }
}

// =============================================================================
// Playback Commands
// =============================================================================

pub async fn progress_cmd(cmd: ProgressCmd, store: &Storefront, output: &Output) -> ExitCode {
    let outcome = store
        .playback()
        .report_progress(&cmd.uid, cmd.position, cmd.duration)
        .await;
    finish(outcome.map(|_| StatusOk::default()), output, "Progress report")
}

pub async fn favourite_cmd(cmd: FavouriteCmd, store: &Storefront, output: &Output) -> ExitCode {
    let playback = store.playback();
    let outcome = match cmd.action {
        FavouriteAction::Add => playback.add_favourite(&cmd.uid).await,
        FavouriteAction::Remove => playback.remove_favourite(&cmd.uid).await,
    };
    finish(outcome.map(|_| StatusOk::default()), output, "Favourite update")
}

pub async fn recent_cmd(cmd: RecentCmd, store: &Storefront, output: &Output) -> ExitCode {
    let outcome = store.playback().recently_watched(cmd.page).await;
    finish(outcome, output, "Recently watched")
}

pub async fn pin_cmd(cmd: PinCmd, store: &Storefront, output: &Output) -> ExitCode {
    if let Err(e) = validate_pin(&cmd.pin) {
        return output.error(e, ExitCode::InvalidArgs);
    }
    let outcome = store.playback().verify_pin(&cmd.pin).await;
    finish(outcome, output, "PIN check")
}
