//! Marketing Cloud SDK prebuild CLI
//!
//! Applies the Marketing Cloud SDK setup to the iOS and Android projects
//! generated by `expo prebuild`.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use mcsdk_cli::output::{self, format_count, format_duration, OutputFormat, Status};
use mcsdk_core::config::Config;
use mcsdk_core::error::exit_codes;
use mcsdk_core::options::{Mode, PluginOptions};
use mcsdk_core::run_once::RunOnceRegistry;
use mcsdk_plugin::{
    ApplyReport, ApplySettings, BlockState, CleanReport, Outcome, Platforms, ProjectLayout,
};
use mcsdk_telemetry::{TelemetryConfig, Timer};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mcsdk-prebuild")]
#[command(about = "Apply the Marketing Cloud SDK setup to generated native projects")]
#[command(version)]
struct Cli {
    /// Project root containing the ios/ and android/ directories
    #[arg(long, global = true, default_value = ".", env = "MCSDK_PROJECT_ROOT")]
    project_root: PathBuf,

    /// Config file path
    #[arg(short, long, global = true, env = "MCSDK_CONFIG")]
    config: Option<PathBuf>,

    /// Increase output verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(flatten)]
    options: OptionArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Plugin options; each overrides the `[plugin]` table of the config file
#[derive(Args)]
struct OptionArgs {
    /// Marketing Cloud server URL
    #[arg(long, global = true, env = "MCSDK_SERVER_URL")]
    server_url: Option<String>,

    /// Marketing Cloud application id
    #[arg(long, global = true, env = "MCSDK_APP_ID")]
    app_id: Option<String>,

    /// Marketing Cloud access token
    #[arg(long, global = true, env = "MCSDK_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// APNs environment: development or production
    #[arg(long, global = true, env = "MCSDK_MODE")]
    mode: Option<Mode>,

    /// Enable SDK analytics
    #[arg(long, global = true, env = "MCSDK_ANALYTICS_ENABLED")]
    analytics_enabled: Option<bool>,
}

impl OptionArgs {
    fn into_options(self) -> PluginOptions {
        PluginOptions {
            server_url: self.server_url,
            app_id: self.app_id,
            access_token: self.access_token,
            mode: self.mode,
            analytics_enabled: self.analytics_enabled,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the SDK setup to the native projects
    Apply {
        /// Platforms to configure: ios, android or all
        #[arg(long, default_value = "all")]
        platform: Platforms,
        /// Show the changes without writing them
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate options and report pending changes without writing
    Check {
        /// Platforms to check: ios, android or all
        #[arg(long, default_value = "all")]
        platform: Platforms,
    },

    /// Show generated blocks and whether they are current
    Status {
        /// Platforms to inspect: ios, android or all
        #[arg(long, default_value = "all")]
        platform: Platforms,
    },

    /// Remove every generated block
    Clean {
        /// Platforms to clean: ios, android or all
        #[arg(long, default_value = "all")]
        platform: Platforms,
        /// Show the changes without writing them
        #[arg(long)]
        dry_run: bool,
    },
}

/// Settings shared by every command
struct Context {
    layout: ProjectLayout,
    options: PluginOptions,
    format: OutputFormat,
    quiet: bool,
}

impl Context {
    /// Options for the pass, or `None` when nothing was configured anywhere
    fn options(&self) -> Option<&PluginOptions> {
        (!self.options.is_empty()).then_some(&self.options)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    output::set_color(!cli.no_color);

    let config = match Config::load(cli.config.as_deref(), &cli.project_root) {
        Ok(config) => config,
        Err(e) => {
            output::print_error(&e, cli.format);
            std::process::exit(e.code.exit_code());
        }
    };

    mcsdk_telemetry::init_with_config(TelemetryConfig {
        log_level: TelemetryConfig::level_for(cli.verbose, cli.quiet, &config.schema.logging.level),
        json: config.schema.logging.json,
        ansi: !cli.no_color,
        ..TelemetryConfig::default()
    })?;

    let ctx = Context {
        layout: ProjectLayout::from_config(&cli.project_root, &config.schema.project),
        options: cli.options.into_options().or(config.schema.plugin),
        format: cli.format,
        quiet: cli.quiet,
    };

    let exit_code = match cli.command {
        Commands::Apply { platform, dry_run } => run_apply(&ctx, platform, dry_run),
        Commands::Check { platform } => run_check(&ctx, platform),
        Commands::Status { platform } => run_status(&ctx, platform),
        Commands::Clean { platform, dry_run } => run_clean(&ctx, platform, dry_run),
    };

    std::process::exit(exit_code);
}

/// Print a failed pass and map it to its exit code
fn fail(ctx: &Context, error: &mcsdk_core::Error) -> i32 {
    tracing::debug!(code = %error.code, "pass failed");
    output::print_error(error, ctx.format);
    error.code.exit_code()
}

fn emit_json<T: serde::Serialize>(ctx: &Context, value: &T) -> i32 {
    match output::print_json(value) {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => fail(ctx, &e),
    }
}

fn run_apply(ctx: &Context, platforms: Platforms, dry_run: bool) -> i32 {
    let timer = Timer::start("apply");
    let settings = ApplySettings { platforms, dry_run };

    let report = match mcsdk_plugin::with_marketing_cloud_sdk(
        &ctx.layout,
        ctx.options(),
        RunOnceRegistry::global(),
        &settings,
    ) {
        Ok(report) => report,
        Err(e) => return fail(ctx, &e),
    };
    let elapsed = timer.stop();

    if ctx.format == OutputFormat::Json {
        return emit_json(ctx, &report);
    }
    if !ctx.quiet {
        print_apply_report(&report);
        Status::info(&format!("Finished in {}", format_duration(elapsed)));
    }
    exit_codes::SUCCESS
}

fn print_apply_report(report: &ApplyReport) {
    if let Outcome::Skipped { previous } = &report.outcome {
        Status::warning(&format!("{} already applied, skipping", previous));
        return;
    }

    if report.changes.is_empty() {
        Status::success("Native projects already up to date");
        return;
    }

    if report.dry_run {
        Status::header("Pending changes");
        for change in &report.changes {
            output::print_diff(&change.diff);
        }
        Status::info(&format!(
            "{} would change (dry run)",
            format_count(report.changes.len(), "file", "files")
        ));
    } else {
        for change in &report.changes {
            let verb = if change.created { "Created" } else { "Updated" };
            Status::success(&format!("{} {}", verb, change.path.display()));
        }
    }
}

fn run_check(ctx: &Context, platforms: Platforms) -> i32 {
    let settings = ApplySettings {
        platforms,
        dry_run: true,
    };

    let report = match mcsdk_plugin::with_marketing_cloud_sdk(
        &ctx.layout,
        ctx.options(),
        RunOnceRegistry::global(),
        &settings,
    ) {
        Ok(report) => report,
        Err(e) => return fail(ctx, &e),
    };

    let code = if report.changes.is_empty() {
        exit_codes::SUCCESS
    } else {
        exit_codes::FAILURE
    };

    if ctx.format == OutputFormat::Json {
        let json_code = emit_json(ctx, &report);
        return if json_code == exit_codes::SUCCESS { code } else { json_code };
    }

    if report.changes.is_empty() {
        if !ctx.quiet {
            Status::success("Options valid, native projects up to date");
        }
    } else {
        Status::warning(&format!(
            "{} pending; run `mcsdk-prebuild apply`",
            format_count(report.changes.len(), "file change", "file changes")
        ));
        if !ctx.quiet {
            for change in &report.changes {
                eprintln!("  {}", change.path.display());
            }
        }
    }
    code
}

fn run_status(ctx: &Context, platforms: Platforms) -> i32 {
    let blocks = match mcsdk_plugin::status(&ctx.layout, ctx.options(), platforms) {
        Ok(blocks) => blocks,
        Err(e) => return fail(ctx, &e),
    };

    if ctx.format == OutputFormat::Json {
        return emit_json(ctx, &blocks);
    }

    if !ctx.quiet {
        Status::header("Generated blocks");
        for block in &blocks {
            let location = match block.lines {
                Some((start, end)) => format!("{}:{}-{}", block.path.display(), start, end),
                None => block.path.display().to_string(),
            };
            let line = format!("{} {}", block.tag, location);
            match block.state {
                BlockState::Current => Status::success(&line),
                BlockState::Stale => Status::warning(&format!("{} (stale)", line)),
                BlockState::Missing => Status::error(&format!("{} (missing)", line)),
            }
        }
    }
    exit_codes::SUCCESS
}

fn run_clean(ctx: &Context, platforms: Platforms, dry_run: bool) -> i32 {
    let report = match mcsdk_plugin::clean(&ctx.layout, platforms, dry_run) {
        Ok(report) => report,
        Err(e) => return fail(ctx, &e),
    };

    if ctx.format == OutputFormat::Json {
        return emit_json(ctx, &report);
    }
    if !ctx.quiet {
        print_clean_report(&report);
    }
    exit_codes::SUCCESS
}

fn print_clean_report(report: &CleanReport) {
    if report.removed.is_empty() {
        Status::info("No generated blocks found");
        return;
    }

    if report.dry_run {
        for change in &report.changes {
            output::print_diff(&change.diff);
        }
    }
    for block in &report.removed {
        Status::success(&format!("Removed {} from {}", block.tag, block.path.display()));
    }
    Status::info(&format!(
        "{}{}",
        format_count(report.removed.len(), "block", "blocks"),
        if report.dry_run { " would be removed (dry run)" } else { " removed" }
    ));
}
