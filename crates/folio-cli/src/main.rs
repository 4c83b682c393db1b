//! `folio`: read, list and edit a markdown content tree from the shell

mod commands;
mod config;

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use commands::{Location, UserAction};
use config::FolioConfig;
use folio_auth::SessionService;
use folio_content::Lang;
use folio_schema::Vertical;
use folio_store::{ContentStore, ListQuery};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn vertical_arg() -> Arg {
    Arg::new("vertical")
        .long("vertical")
        .short('v')
        .default_value("news")
        .value_parser(value_parser!(Vertical))
        .help("Content vertical deciding schema and listing rule")
}

fn url_arg() -> Arg {
    Arg::new("url")
        .required(true)
        .help("Request path, e.g. /api/news or /api/news/my-post")
}

fn location_args(cmd: Command) -> Command {
    cmd.arg(Arg::new("section").required(true).help("Section directory, e.g. news"))
        .arg(Arg::new("slug").required(true).help("Document file name without .md"))
        .arg(vertical_arg())
}

fn credential_args(cmd: Command) -> Command {
    cmd.arg(Arg::new("username").required(true))
        .arg(
            Arg::new("password")
                .long("password")
                .required(true)
                .help("Account password"),
        )
}

fn cli() -> Command {
    Command::new("folio")
        .version(folio_store::VERSION)
        .about("Markdown-as-database content engine")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Config file (default: ./folio.toml when present)"),
        )
        .arg(
            Arg::new("lang")
                .long("lang")
                .global(true)
                .default_value("en")
                .value_parser(value_parser!(Lang))
                .help("Content language: en or vi"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(
            Command::new("read")
                .about("Read and render one document")
                .arg(url_arg())
                .arg(vertical_arg()),
        )
        .subcommand(
            Command::new("list")
                .about("List a collection page")
                .arg(url_arg())
                .arg(vertical_arg())
                .arg(
                    Arg::new("page")
                        .long("page")
                        .default_value("1")
                        .value_parser(value_parser!(usize))
                        .help("Page number, from 1"),
                )
                .arg(
                    Arg::new("page-size")
                        .long("page-size")
                        .value_parser(value_parser!(usize))
                        .help("Override the configured page size"),
                )
                .arg(
                    Arg::new("editor")
                        .long("editor")
                        .action(ArgAction::SetTrue)
                        .help("Include drafts visible to editors"),
                ),
        )
        .subcommand(
            Command::new("about")
                .about("Read a section's _index.md as a document")
                .arg(url_arg())
                .arg(vertical_arg()),
        )
        .subcommand(
            location_args(Command::new("create").about("Create a document from a markdown file"))
                .arg(
                    Arg::new("file")
                        .long("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(Arg::new("author").long("author").help("Author stamp")),
        )
        .subcommand(
            location_args(Command::new("update").about("Merge a markdown file into a document"))
                .arg(
                    Arg::new("file")
                        .long("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(location_args(Command::new("delete").about("Delete a document")))
        .subcommand(
            Command::new("render")
                .about("Render a markdown file to HTML")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Validate every document in a section")
                .arg(url_arg())
                .arg(vertical_arg()),
        )
        .subcommand(
            Command::new("user")
                .about("Manage editor accounts and sessions")
                .subcommand_required(true)
                .subcommand(credential_args(Command::new("register").about("Create an account")))
                .subcommand(credential_args(Command::new("login").about("Open a session")))
                .subcommand(
                    Command::new("logout")
                        .about("Revoke a session token")
                        .arg(Arg::new("token").required(true)),
                )
                .subcommand(
                    Command::new("whoami")
                        .about("Show the account behind a token")
                        .arg(Arg::new("token").required(true)),
                ),
        )
}

fn string<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a str> {
    args.get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("missing argument {name}"))
}

fn vertical(args: &ArgMatches) -> Result<Vertical> {
    args.get_one::<Vertical>("vertical")
        .copied()
        .context("missing argument vertical")
}

fn path<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a PathBuf> {
    args.get_one::<PathBuf>(name)
        .with_context(|| format!("missing argument {name}"))
}

fn location<'a>(args: &'a ArgMatches, lang: Lang) -> Result<Location<'a>> {
    Ok(Location {
        lang,
        section: string(args, "section")?,
        slug: string(args, "slug")?,
        vertical: vertical(args)?,
    })
}

fn print(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_user(config: &FolioConfig, args: &ArgMatches) -> Result<()> {
    let service = SessionService::from_config(&config.auth)
        .await
        .context("opening account store")?;
    let action = match args.subcommand() {
        Some(("register", sub)) => UserAction::Register {
            username: string(sub, "username")?,
            password: string(sub, "password")?,
        },
        Some(("login", sub)) => UserAction::Login {
            username: string(sub, "username")?,
            password: string(sub, "password")?,
        },
        Some(("logout", sub)) => UserAction::Logout {
            token: string(sub, "token")?,
        },
        Some(("whoami", sub)) => UserAction::Whoami {
            token: string(sub, "token")?,
        },
        _ => anyhow::bail!("unknown user command"),
    };
    print(&commands::user(&service, action).await?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("json"));

    let config = FolioConfig::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    let lang = matches.get_one::<Lang>("lang").copied().unwrap_or_default();

    if let Some(("user", args)) = matches.subcommand() {
        return run_user(&config, args).await;
    }

    let store = ContentStore::new(config.engine()).context("opening content store")?;
    tracing::debug!(root = %store.config().content_dir.display(), %lang, "content store ready");

    match matches.subcommand() {
        Some(("read", args)) => {
            print(&commands::read(&store, lang, string(args, "url")?, vertical(args)?).await?)
        }
        Some(("list", args)) => {
            let mut query = ListQuery::page(args.get_one::<usize>("page").copied().unwrap_or(1));
            if let Some(size) = args.get_one::<usize>("page-size") {
                query = query.with_page_size(*size);
            }
            if args.get_flag("editor") {
                query = query.as_editor();
            }
            let url = string(args, "url")?;
            print(&commands::list(&store, lang, url, vertical(args)?, query).await?)
        }
        Some(("about", args)) => {
            print(&commands::about(&store, lang, string(args, "url")?, vertical(args)?).await?)
        }
        Some(("create", args)) => {
            let at = location(args, lang)?;
            let author = args.get_one::<String>("author").map(String::as_str);
            print(&commands::create(&store, &at, path(args, "file")?, author).await?)
        }
        Some(("update", args)) => {
            let at = location(args, lang)?;
            print(&commands::update(&store, &at, path(args, "file")?).await?)
        }
        Some(("delete", args)) => print(&commands::delete(&store, &location(args, lang)?).await?),
        Some(("render", args)) => {
            println!("{}", commands::render(&store, path(args, "file")?).await?);
            Ok(())
        }
        Some(("check", args)) => {
            let url = string(args, "url")?;
            let problems = commands::check(&store, lang, url, vertical(args)?).await?;
            print(&serde_json::to_value(&problems)?)?;
            if !problems.is_empty() {
                std::process::exit(1);
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn parses_list_with_globals() {
        let matches = cli()
            .try_get_matches_from([
                "folio", "--lang", "vi", "list", "/api/members", "-v", "member", "--page", "2",
            ])
            .unwrap();
        assert_eq!(matches.get_one::<Lang>("lang"), Some(&Lang::Vi));
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "list");
        assert_eq!(vertical(args).unwrap(), Vertical::Member);
        assert_eq!(args.get_one::<usize>("page"), Some(&2));
    }

    #[test]
    fn unknown_vertical_rejected() {
        assert!(cli()
            .try_get_matches_from(["folio", "read", "/api/x/y", "--vertical", "blog"])
            .is_err());
    }
}
