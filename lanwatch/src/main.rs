//! Entry point for the lanwatch TUI. Parses args, resolves the backend profile and runs the App.

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use lanwatch::api::{DataSource, HttpSource};
use lanwatch::app::App;
use lanwatch::config::{http_timeout, PollConfig};
use lanwatch::demo::DemoSource;
use lanwatch::logging;
use lanwatch::profiles::{
    load_profiles, save_profiles, ProfileEntry, ProfileRequest, ProfilesFile, ResolveProfile,
};
use lanwatch::sync::Origin;

const USAGE_FLAGS: &str = "[--tls-ca CERT_PEM|-t CERT_PEM] [--profile NAME|-P NAME] [--save] [--demo] [--no-fallback] [--log-file PATH] [--dry-run] [http://HOST:PORT/api/]";

#[derive(Debug, Default)]
struct ParsedArgs {
    url: Option<String>,
    tls_ca: Option<String>,
    profile: Option<String>,
    save: bool,
    demo: bool,
    no_fallback: bool,
    log_file: Option<PathBuf>,
    dry_run: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<ParsedArgs, String> {
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "lanwatch".into());
    let mut p = ParsedArgs::default();

    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                return Err(format!("Usage: {prog} {USAGE_FLAGS}"));
            }
            "--tls-ca" | "-t" => {
                p.tls_ca = it.next();
            }
            "--profile" | "-P" => {
                p.profile = it.next();
            }
            "--log-file" => {
                p.log_file = it.next().map(PathBuf::from);
            }
            "--save" => p.save = true,
            "--demo" => p.demo = true,
            "--no-fallback" => p.no_fallback = true,
            "--dry-run" => p.dry_run = true,
            _ if arg.starts_with("--tls-ca=") => {
                if let Some((_, v)) = arg.split_once('=') {
                    if !v.is_empty() {
                        p.tls_ca = Some(v.to_string());
                    }
                }
            }
            _ if arg.starts_with("--profile=") => {
                if let Some((_, v)) = arg.split_once('=') {
                    if !v.is_empty() {
                        p.profile = Some(v.to_string());
                    }
                }
            }
            _ if arg.starts_with('-') => {
                return Err(format!("Unknown flag '{arg}'. Usage: {prog} {USAGE_FLAGS}"));
            }
            _ => {
                if p.url.is_none() {
                    p.url = Some(arg);
                } else {
                    return Err(format!("Unexpected argument. Usage: {prog} {USAGE_FLAGS}"));
                }
            }
        }
    }
    Ok(p)
}

/// Where the dashboard gets its data.
enum Target {
    Demo,
    Backend(ProfileEntry),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let parsed = match parse_args(env::args()) {
        Ok(v) => v,
        Err(msg) => {
            eprintln!("{msg}");
            return Ok(());
        }
    };

    let log_path = parsed.log_file.clone().unwrap_or_else(logging::default_log_path);
    if let Err(e) = logging::init(&log_path) {
        // Logging is best-effort; the dashboard still works without it
        eprintln!("logging disabled: {e:#}");
    }

    let Some(target) = resolve_target(&parsed)? else {
        return Ok(());
    };

    if parsed.dry_run {
        match &target {
            Target::Demo => println!("demo"),
            Target::Backend(entry) => println!("{}", entry.url),
        }
        return Ok(());
    }

    let cfg = PollConfig::from_env();
    let (source, origin, label, fallback): (Arc<dyn DataSource>, Origin, String, bool) =
        match target {
            Target::Demo => (Arc::new(DemoSource::new()), Origin::Demo, "demo".into(), false),
            Target::Backend(entry) => {
                let src = HttpSource::new(&entry.url, entry.tls_ca.as_deref(), http_timeout())
                    .with_context(|| format!("cannot use backend '{}'", entry.url))?;
                let fallback = !parsed.no_fallback && entry.fallback.unwrap_or(true);
                (Arc::new(src), Origin::Live, entry.url, fallback)
            }
        };
    info!(source = %label, fallback, "starting dashboard");

    let mut app = App::new(&cfg, fallback, label);
    app.run(source, origin).await
}

/// Turns flags plus saved profiles into a target, prompting on stderr where the
/// inputs are incomplete. `None` means the user aborted.
fn resolve_target(parsed: &ParsedArgs) -> anyhow::Result<Option<Target>> {
    if parsed.demo || matches!(parsed.profile.as_deref(), Some("demo")) {
        return Ok(Some(Target::Demo));
    }

    let profiles_file = load_profiles();
    let req = ProfileRequest {
        profile_name: parsed.profile.clone(),
        url: parsed.url.clone(),
        tls_ca: parsed.tls_ca.clone(),
    };
    let mut profiles_mut = profiles_file.clone();

    let entry = match req.resolve(&profiles_file) {
        ResolveProfile::Direct(entry) => {
            if let Some(name) = parsed.profile.as_ref() {
                persist_direct(&mut profiles_mut, name, &entry, parsed.save)?;
            }
            entry
        }
        ResolveProfile::Loaded(entry) => entry,
        ResolveProfile::PromptSelect(mut names) => {
            if !names.iter().any(|n| n == "demo") {
                names.push("demo".into());
            }
            eprintln!("Select profile:");
            for (i, n) in names.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, n);
            }
            let line = prompt_string("Enter number (or blank to abort): ")?;
            let Some(name) = line
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|idx| idx.checked_sub(1))
                .and_then(|idx| names.get(idx))
            else {
                return Ok(None);
            };
            if name == "demo" {
                return Ok(Some(Target::Demo));
            }
            match profiles_mut.profiles.get(name) {
                Some(entry) => entry.clone(),
                None => return Ok(None),
            }
        }
        ResolveProfile::PromptCreate(name) => {
            eprintln!("Profile '{name}' does not exist yet.");
            let url = prompt_string("Enter URL (http://HOST:PORT/api/ or https://...): ")?;
            if url.trim().is_empty() {
                return Ok(None);
            }
            let ca = prompt_string("Enter TLS CA path (or leave blank): ")?;
            let entry = ProfileEntry {
                url: url.trim().to_string(),
                tls_ca: Some(ca.trim().to_string()).filter(|s| !s.is_empty()),
                fallback: None,
            };
            profiles_mut.profiles.insert(name, entry.clone());
            save_profiles(&profiles_mut).context("saving profiles")?;
            entry
        }
        ResolveProfile::None => {
            eprintln!("No URL provided and no profiles to select.");
            return Ok(None);
        }
    };
    Ok(Some(Target::Backend(entry)))
}

/// A named profile given with a URL: new names are saved right away, changed
/// ones only with `--save` or after confirmation.
fn persist_direct(
    pf: &mut ProfilesFile,
    name: &str,
    entry: &ProfileEntry,
    save: bool,
) -> anyhow::Result<()> {
    let write = match pf.profiles.get(name) {
        None => true,
        Some(existing) if existing.url == entry.url && existing.tls_ca == entry.tls_ca => false,
        Some(_) => save || prompt_yes_no(&format!("Overwrite existing profile '{name}'? [y/N]: ")),
    };
    if write {
        let fallback = pf.profiles.get(name).and_then(|e| e.fallback);
        pf.profiles.insert(
            name.to_string(),
            ProfileEntry {
                fallback,
                ..entry.clone()
            },
        );
        save_profiles(pf).context("saving profiles")?;
    }
    Ok(())
}

fn prompt_yes_no(prompt: &str) -> bool {
    match prompt_string(prompt) {
        Ok(line) => matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

fn prompt_string(prompt: &str) -> io::Result<String> {
    eprint!("{prompt}");
    let _ = io::stderr().flush();
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line)
}
