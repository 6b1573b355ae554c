//! Command dispatch: one function per subcommand.

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::services::{PyramidReport, PyramidService};
use crate::application::View;
use crate::cli::args::{Cli, Commands, ConfigCommands, SessionCommands, TargetArgs};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::{Role, Session, TreeRender};
use crate::infrastructure::di::ServiceContainer;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        debug!("no subcommand given");
        return Ok(());
    };

    match command {
        Commands::Levels { file, target } => cmd_levels(&container(cli)?, file, target),
        Commands::Report { target } => cmd_report(&container(cli)?, target),
        Commands::Fetch { target, output } => {
            cmd_fetch(&container(cli)?, target, output.as_deref())
        }
        Commands::Tree { file, target } => cmd_tree(&container(cli)?, file, target),
        Commands::Session { command } => cmd_session(&container(cli)?, command),
        Commands::Config { command } => cmd_config(cli.config.as_deref(), command),
        Commands::Completion { shell } => {
            cmd_completion(*shell);
            Ok(())
        }
    }
}

fn container(cli: &Cli) -> CliResult<ServiceContainer> {
    let settings = Settings::load(cli.config.as_deref())?;
    Ok(ServiceContainer::new(settings)?)
}

fn pyramid_service(container: &ServiceContainer, target: &TargetArgs) -> CliResult<PyramidService> {
    if target.max_level == Some(0) {
        return Err(CliError::Usage("--max-level must be at least 1".into()));
    }
    Ok(container.pyramid_service(target.max_level))
}

/// `--user`, else the session's user, else nobody.
fn target_user(container: &ServiceContainer, target: &TargetArgs) -> CliResult<Option<String>> {
    if let Some(user) = &target.user {
        return Ok(Some(user.clone()));
    }
    Ok(container
        .session_service()
        .load()?
        .map(|session| session.user_id))
}

#[instrument(skip(container))]
fn cmd_levels(container: &ServiceContainer, file: &Path, target: &TargetArgs) -> CliResult<()> {
    let service = pyramid_service(container, target)?;
    let view = View::from(target.view);
    if view == View::Commissions {
        output::warning("commission amounts come from the API; use `pyramid report` to see them");
    }

    let response = service.load_snapshot(file)?;
    let user = target_user(container, target)?;
    let report = service.evaluate(view, response, user.as_deref(), None);

    print_report(&report);
    Ok(())
}

#[instrument(skip(container))]
fn cmd_report(container: &ServiceContainer, target: &TargetArgs) -> CliResult<()> {
    let session = container.session_service().require()?;
    let user = target.user.clone().unwrap_or_else(|| session.user_id.clone());
    let service = pyramid_service(container, target)?;

    let report = service.report(View::from(target.view), &user, &session)?;

    print_report(&report);
    Ok(())
}

#[instrument(skip(container))]
fn cmd_fetch(
    container: &ServiceContainer,
    target: &TargetArgs,
    output_path: Option<&Path>,
) -> CliResult<()> {
    let session = container.session_service().require()?;
    let user = target.user.clone().unwrap_or_else(|| session.user_id.clone());
    let service = pyramid_service(container, target)?;

    let response = service.fetch(View::from(target.view), &user, &session)?;

    match output_path {
        Some(path) => {
            service.save_snapshot(path, &response)?;
            output::action("Saved", &path.display());
        }
        None => output::info(&PyramidService::to_json(&response)?),
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_tree(container: &ServiceContainer, file: &Path, target: &TargetArgs) -> CliResult<()> {
    let service = pyramid_service(container, target)?;
    let response = service.load_snapshot(file)?;
    let user = target_user(container, target)?;

    let report = service.evaluate(View::from(target.view), response, user.as_deref(), None);

    output::info(&report.arena.to_tree_string());
    output::detail(&format!(
        "{} members, {} completed levels",
        report.members(),
        report.result.completed_levels
    ));
    Ok(())
}

fn cmd_session(container: &ServiceContainer, command: &SessionCommands) -> CliResult<()> {
    let sessions = container.session_service();
    match command {
        SessionCommands::Show => match sessions.load()? {
            Some(session) => {
                output::action("User", &session.user_id);
                output::action("Role", &format!("{:?}", session.role).to_lowercase());
                output::action(
                    "Token",
                    if session.token.is_some() { "set" } else { "not set" },
                );
            }
            None => output::warning(&format!("no session at {}", sessions.path().display())),
        },
        SessionCommands::Set { user, token, admin } => {
            let role = if *admin { Role::Admin } else { Role::User };
            let mut session = Session::new(user.clone(), role);
            if let Some(token) = token {
                session = session.with_token(token.clone());
            }
            sessions.save(&session)?;
            output::success(&format!("session stored for {}", user));
        }
        SessionCommands::Clear => {
            if sessions.clear()? {
                output::success("session cleared");
            } else {
                output::warning("no session to clear");
            }
        }
    }
    Ok(())
}

fn cmd_config(config_file: Option<&Path>, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(config_file)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("Global", &path.display()),
                None => output::warning("no config directory on this platform"),
            }
            if let Some(path) = config_file {
                output::action("Explicit", &path.display());
            }
            let settings = Settings::load(config_file)?;
            output::action("Session", &settings.session_path().display());
        }
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(())
}

fn cmd_completion(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

fn print_report(report: &PyramidReport) {
    let who = report.user_id.as_deref().unwrap_or("(member)");
    output::header(&format!("{} pyramid of {}", report.view, who));
    output::detail(&format!(
        "{} members, {} levels deep",
        report.members(),
        report.arena.depth()
    ));

    for level in &report.result.levels {
        output::level(level);
    }
    output::action(
        "Completed levels",
        &format!("{}/{}", report.result.completed_levels, report.max_level),
    );

    if let Some(lines) = &report.commissions {
        output::header("Commissions");
        for line in lines {
            output::commission(line);
        }
    }
    if let Some(earned) = report.earned {
        output::action("Earned", &earned);
    }
}
