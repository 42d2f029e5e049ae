use std::io::Write;

use care_core::model::{
    Category, ChatTranscript, Credentials, SessionContext, Speaker, TRENDING_TAGS,
};
use care_core::progress::{CalendarCell, ProgressLevel};
use chrono::Datelike;
use log::info;
use services::{AppServices, CancelToken, ChatOutcome, Clock, ServiceConfig, SubmitOutcome};

mod args;

use args::{ArgsError, Command, Invocation, print_usage};

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let parsed = args::parse(std::env::args().skip(1), |key| std::env::var(key).ok())
        .map_err(|e| {
            eprintln!("{e}");
            print_usage();
            e
        })?;
    let Some(Invocation {
        db_url,
        user,
        command,
    }) = parsed
    else {
        print_usage();
        return Ok(());
    };

    let db_url = normalize_sqlite_url(db_url);
    prepare_sqlite_file(&db_url)?;
    let config = ServiceConfig::from_env()?;
    let app = AppServices::new_sqlite(&db_url, Clock::system(), config).await?;
    let mut session = app.sessions().restore().await?;
    let user = user.unwrap_or_else(|| session.effective_user_id());

    match command {
        Command::Calendar { month } => {
            let mut tracker = app.tracker(user);
            tracker.refresh_history().await?;
            let today = app.clock().today();
            let (year, month) = month.unwrap_or((today.year(), today.month()));
            let grid = tracker.month_grid(year, month)?;
            print_calendar(year, month, &grid);
        }
        Command::Chat { message } => {
            let chat = app.chat();
            let token = CancelToken::new();
            let on_interrupt = token.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_interrupt.cancel();
                }
            });

            let mut transcript = ChatTranscript::new();
            let mut shown = 0;
            let outcome = chat
                .send(&mut transcript, &message, &token, |t| {
                    let Some(last) = t.last().filter(|m| m.speaker() == Speaker::Assistant)
                    else {
                        return;
                    };
                    let text = last.text();
                    if let Some(fresh) = text.get(shown..) {
                        print!("{fresh}");
                        std::io::stdout().flush().ok();
                    }
                    shown = text.len();
                })
                .await;
            println!();
            if outcome? == ChatOutcome::Cancelled {
                eprintln!("(stopped)");
            }
        }
        Command::Feed { filter, tab, tags } => {
            let mut feed = app.feed();
            feed.open(&session).await?;
            feed.set_filter(filter);
            feed.set_tab(tab);
            for tag in &tags {
                feed.search_trending(tag);
            }
            if tags.is_empty() {
                println!("trending: {}", TRENDING_TAGS.join(" "));
            }
            for (post, age) in feed.visible_with_age(app.clock().now()) {
                let icon = Category::from_label(&post.category).map_or("•", Category::icon);
                println!(
                    "{icon} [{}] {} ({}) by {}",
                    post.category,
                    age,
                    post.likes,
                    post.author_name.as_deref().unwrap_or("Anonymous")
                );
                println!("    {}", post.content);
                if !post.tags.is_empty() {
                    println!("    #{}", post.tags.join(" #"));
                }
            }
        }
        Command::Post {
            category,
            content,
            tags,
        } => {
            let wizard = app.wizard();
            wizard.set_category(Some(category));
            let step = wizard.advance()?;
            info!("post wizard step {}: {}", step.number(), step.title());
            wizard.set_content(content);
            let step = wizard.advance()?;
            info!("post wizard step {}: {}", step.number(), step.title());
            for tag in &tags {
                wizard.add_tag(tag);
            }
            match wizard.submit(&session).await? {
                SubmitOutcome::Submitted(post) => println!("published post {}", post.id),
                SubmitOutcome::AlreadyPending => eprintln!("a post is already being published"),
                SubmitOutcome::Cancelled => eprintln!("post cancelled"),
            }
        }
        Command::Verify { female } => {
            app.sessions()
                .verify_community_access(&mut session, female)
                .await?;
            println!("community access granted");
        }
        Command::Login { email, password } => {
            let credentials = Credentials::new(&email, &password).map_err(care_core::Error::from)?;
            app.doctors().login(&mut session, &credentials).await?;
            println!("signed in");
        }
        Command::Logout => {
            app.doctors().logout(&mut session).await?;
            println!("signed out");
        }
    }

    info!("done for {}", describe(&session));
    Ok(())
}

fn describe(session: &SessionContext) -> String {
    match session.doctor_id() {
        Some(doctor) => format!("doctor {doctor}"),
        None => format!("user {}", session.effective_user_id()),
    }
}

fn print_calendar(year: i32, month: u32, grid: &[CalendarCell]) {
    println!("{year}-{month:02}");
    println!(" Su  Mo  Tu  We  Th  Fr  Sa");
    for week in grid.chunks(7) {
        let row: Vec<String> = week
            .iter()
            .map(|cell| match cell.day_of_month() {
                None => "    ".to_string(),
                Some(day) => format!("{day:>3}{}", mark(cell)),
            })
            .collect();
        println!("{}", row.concat());
    }
    println!("legend: ✓ complete, * 70%+, + 30%+, . started");
}

fn mark(cell: &CalendarCell) -> char {
    if cell.is_complete() {
        return '✓';
    }
    match cell.level() {
        ProgressLevel::High => '*',
        ProgressLevel::Medium => '+',
        ProgressLevel::Low => '.',
        ProgressLevel::None | ProgressLevel::Blank => ' ',
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
