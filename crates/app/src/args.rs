use std::fmt;

use care_core::model::{Category, CategoryFilter, FeedTab, UserId};

pub const DEFAULT_DB_URL: &str = "sqlite://session.sqlite3";

#[derive(Debug)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    MissingFlag { command: &'static str, flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidValue { flag: &'static str, raw: String },
    InvalidDbUrl { raw: String },
    Domain(care_core::Error),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingFlag { command, flag } => write!(f, "{command} requires {flag}"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidValue { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::Domain(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<care_core::Error> for ArgsError {
    fn from(err: care_core::Error) -> Self {
        ArgsError::Domain(err)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Calendar {
        month: Option<(i32, u32)>,
    },
    Chat {
        message: String,
    },
    Feed {
        filter: CategoryFilter,
        tab: FeedTab,
        tags: Vec<String>,
    },
    Post {
        category: Category,
        content: String,
        tags: Vec<String>,
    },
    Verify {
        female: bool,
    },
    Login {
        email: String,
        password: String,
    },
    Logout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub db_url: String,
    pub user: Option<UserId>,
    pub command: Command,
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  app calendar [--month <YYYY-MM>]");
    eprintln!("  app chat <message...>");
    eprintln!("  app feed [--category <name>] [--tab recent|popular|discussed] [--tag <t>]...");
    eprintln!("  app post --category <name> --content <text> [--tag <t>]...");
    eprintln!("  app verify --female | --not-female");
    eprintln!("  app login --email <email> --password <password>");
    eprintln!("  app logout");
    eprintln!();
    eprintln!("Common flags:");
    eprintln!("  --db <sqlite_url>   (default {DEFAULT_DB_URL})");
    eprintln!("  --user <id>         (default: stored user, else demoUser)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PCOD_DB_URL, PCOD_USER_ID, PCOD_API_BASE_URL, PCOD_ML_BASE_URL,");
    eprintln!("  PCOD_ML_API_KEY, PCOD_HTTP_TIMEOUT_SECS, PCOD_TYPING_INTERVAL_MS, RUST_LOG");
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

#[derive(Default)]
struct Flags {
    db_url: Option<String>,
    user: Option<UserId>,
    month: Option<(i32, u32)>,
    category: Option<Category>,
    content: Option<String>,
    tab: Option<FeedTab>,
    tags: Vec<String>,
    email: Option<String>,
    password: Option<String>,
    female: Option<bool>,
    words: Vec<String>,
}

/// Parse argv (without the program name). `Ok(None)` means help was requested.
///
/// # Errors
///
/// Returns `ArgsError` for an unknown subcommand, flag, or malformed value.
pub fn parse(
    argv: impl IntoIterator<Item = String>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Option<Invocation>, ArgsError> {
    let mut args = argv.into_iter();
    let Some(command) = args.next() else {
        return Ok(None);
    };
    if matches!(command.as_str(), "--help" | "-h" | "help") {
        return Ok(None);
    }

    let mut flags = Flags::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--db" => {
                let value = require_value(&mut args, "--db")?;
                if value.trim().is_empty() {
                    return Err(ArgsError::InvalidDbUrl { raw: value });
                }
                flags.db_url = Some(value);
            }
            "--user" => {
                let value = require_value(&mut args, "--user")?;
                let user = value.parse::<UserId>().map_err(|_| ArgsError::InvalidValue {
                    flag: "--user",
                    raw: value.clone(),
                })?;
                flags.user = Some(user);
            }
            "--month" => {
                let value = require_value(&mut args, "--month")?;
                flags.month = Some(parse_month(&value)?);
            }
            "--category" => {
                let value = require_value(&mut args, "--category")?;
                let category = Category::from_label(&value).map_err(care_core::Error::from)?;
                flags.category = Some(category);
            }
            "--content" => flags.content = Some(require_value(&mut args, "--content")?),
            "--tab" => {
                let value = require_value(&mut args, "--tab")?;
                flags.tab = Some(parse_tab(&value)?);
            }
            "--tag" => flags.tags.push(require_value(&mut args, "--tag")?),
            "--email" => flags.email = Some(require_value(&mut args, "--email")?),
            "--password" => flags.password = Some(require_value(&mut args, "--password")?),
            "--female" => flags.female = Some(true),
            "--not-female" => flags.female = Some(false),
            "--help" | "-h" => return Ok(None),
            other if other.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
            _ => flags.words.push(arg),
        }
    }

    let db_url = flags
        .db_url
        .or_else(|| env("PCOD_DB_URL").filter(|value| !value.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_DB_URL.to_string());
    let user = flags
        .user
        .or_else(|| env("PCOD_USER_ID").and_then(|value| value.parse().ok()));

    let command = match command.as_str() {
        "calendar" => Command::Calendar { month: flags.month },
        "chat" => {
            let message = flags.words.join(" ");
            if message.trim().is_empty() {
                return Err(ArgsError::MissingFlag {
                    command: "chat",
                    flag: "a message",
                });
            }
            flags.words.clear();
            Command::Chat { message }
        }
        "feed" => Command::Feed {
            filter: flags
                .category
                .map_or(CategoryFilter::All, CategoryFilter::Only),
            tab: flags.tab.unwrap_or_default(),
            tags: flags.tags,
        },
        "post" => Command::Post {
            category: flags.category.ok_or(ArgsError::MissingFlag {
                command: "post",
                flag: "--category",
            })?,
            content: flags.content.ok_or(ArgsError::MissingFlag {
                command: "post",
                flag: "--content",
            })?,
            tags: flags.tags,
        },
        "verify" => Command::Verify {
            female: flags.female.ok_or(ArgsError::MissingFlag {
                command: "verify",
                flag: "--female or --not-female",
            })?,
        },
        "login" => Command::Login {
            email: flags.email.ok_or(ArgsError::MissingFlag {
                command: "login",
                flag: "--email",
            })?,
            password: flags.password.ok_or(ArgsError::MissingFlag {
                command: "login",
                flag: "--password",
            })?,
        },
        "logout" => Command::Logout,
        _ => return Err(ArgsError::UnknownCommand(command)),
    };

    if let Some(stray) = flags.words.into_iter().next() {
        return Err(ArgsError::UnknownArg(stray));
    }

    Ok(Some(Invocation {
        db_url,
        user,
        command,
    }))
}

fn parse_month(raw: &str) -> Result<(i32, u32), ArgsError> {
    let invalid = || ArgsError::InvalidValue {
        flag: "--month",
        raw: raw.to_string(),
    };
    let (year, month) = raw.trim().split_once('-').ok_or_else(invalid)?;
    let year = year.parse::<i32>().map_err(|_| invalid())?;
    let month = month.parse::<u32>().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((year, month))
}

fn parse_tab(raw: &str) -> Result<FeedTab, ArgsError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "recent" => Ok(FeedTab::Recent),
        "popular" => Ok(FeedTab::Popular),
        "discussed" => Ok(FeedTab::Discussed),
        _ => Err(ArgsError::InvalidValue {
            flag: "--tab",
            raw: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn empty_argv_requests_help() {
        assert!(parse(argv(&[]), no_env).unwrap().is_none());
        assert!(parse(argv(&["post", "--help"]), no_env).unwrap().is_none());
    }

    #[test]
    fn post_collects_tags_and_category() {
        let parsed = parse(
            argv(&[
                "post",
                "--category",
                "parenting",
                "--content",
                "hi",
                "--tag",
                "x",
                "--tag",
                "y",
            ]),
            no_env,
        )
        .unwrap()
        .unwrap();
        assert_eq!(parsed.db_url, DEFAULT_DB_URL);
        assert_eq!(
            parsed.command,
            Command::Post {
                category: Category::Parenting,
                content: "hi".into(),
                tags: vec!["x".into(), "y".into()],
            }
        );
    }

    #[test]
    fn chat_joins_words_and_env_supplies_defaults() {
        let env = |key: &str| match key {
            "PCOD_DB_URL" => Some("sqlite://other.sqlite3".to_string()),
            "PCOD_USER_ID" => Some("u9".to_string()),
            _ => None,
        };
        let parsed = parse(argv(&["chat", "what", "is", "pcod?"]), env)
            .unwrap()
            .unwrap();
        assert_eq!(parsed.db_url, "sqlite://other.sqlite3");
        assert_eq!(parsed.user, Some(UserId::new("u9")));
        assert_eq!(
            parsed.command,
            Command::Chat {
                message: "what is pcod?".into()
            }
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            parse(argv(&["post", "--category", "Gardening"]), no_env),
            Err(ArgsError::Domain(_))
        ));
        assert!(matches!(
            parse(argv(&["post", "--category", "Education"]), no_env),
            Err(ArgsError::MissingFlag { flag: "--content", .. })
        ));
        assert!(matches!(
            parse(argv(&["calendar", "--month", "2025-13"]), no_env),
            Err(ArgsError::InvalidValue { flag: "--month", .. })
        ));
        assert!(matches!(
            parse(argv(&["calendar", "extra"]), no_env),
            Err(ArgsError::UnknownArg(_))
        ));
        assert!(matches!(
            parse(argv(&["dance"]), no_env),
            Err(ArgsError::UnknownCommand(_))
        ));
        assert!(matches!(
            parse(argv(&["login", "--email"]), no_env),
            Err(ArgsError::MissingValue { flag: "--email" })
        ));
    }

    #[test]
    fn feed_defaults_to_all_recent() {
        let parsed = parse(argv(&["feed", "--tab", "Popular"]), no_env)
            .unwrap()
            .unwrap();
        assert_eq!(
            parsed.command,
            Command::Feed {
                filter: CategoryFilter::All,
                tab: FeedTab::Popular,
                tags: Vec::new(),
            }
        );
    }
}
