use anyhow::{bail, Context, Result};
use artify_kids::config::{default_config_path, load_config};
use artify_kids::identity::{bootstrap, FirebaseIdentity, UserIdCell};
use artify_kids::prompt::Theme;
use artify_kids::transform::GeminiImageTransformer;
use artify_kids::Session;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const HELP: &str = "\
Artify Kids: transform a child's drawing with AI

USAGE:
  artify-kids --image <PATH> [OPTIONS]

OPTIONS:
  --image <PATH>        Drawing to transform (any image format)
  --theme <NAME>        Cartoon Network, Disney, Brawl Stars, Warner Bros, Simpsons, Bluey, or none
  --creativity <0-100>  Less creative (0) to more creative (100), default 50
  --prompt <TEXT>       Additional creative command
  --config <PATH>       Config file (default: <data dir>/artify-kids/config.json)
  --out <DIR>           Where to save the transformed image
  --list-themes         Print the available themes and exit
  -h, --help            Print this help
";

struct Args {
    image: Option<PathBuf>,
    theme: Option<Theme>,
    creativity: Option<u8>,
    prompt: Option<String>,
    config: Option<PathBuf>,
    out: Option<PathBuf>,
}

fn parse_theme(s: &str) -> Result<Option<Theme>, String> {
    if s.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    s.parse::<Theme>().map(Some).map_err(|e| e.to_string())
}

fn parse_args(mut pargs: pico_args::Arguments) -> Result<Args> {
    let args = Args {
        image: pargs.opt_value_from_str("--image")?,
        theme: pargs.opt_value_from_fn("--theme", parse_theme)?.flatten(),
        creativity: pargs.opt_value_from_fn("--creativity", |s| {
            s.parse::<u8>()
                .ok()
                .filter(|v| *v <= 100)
                .ok_or_else(|| format!("creativity must be 0-100, got '{}'", s))
        })?,
        prompt: pargs.opt_value_from_str("--prompt")?,
        config: pargs.opt_value_from_str("--config")?,
        out: pargs.opt_value_from_str("--out")?,
    };

    let rest = pargs.finish();
    if !rest.is_empty() {
        bail!("Unexpected arguments: {:?}", rest);
    }
    Ok(args)
}

fn render(session: &Session) {
    println!("──────────── Artify Kids ────────────");
    if let Some(uid) = session.user_id() {
        println!("User ID: {}", uid);
    }
    match session.preview_url() {
        Some(url) => println!("Uploaded: {}", url),
        None => println!("Uploaded: (click to upload)"),
    }
    println!(
        "Theme: {}",
        session.theme().map(|t| t.display_name()).unwrap_or("None")
    );
    println!("Creativity Level: {}%", session.creativity().value());
    if !session.prompt().trim().is_empty() {
        println!("Creative command: {}", session.prompt());
    }
    if session.is_transforming() {
        println!("Transforming...");
    } else if session.transformed_image().is_some() {
        println!("Transformed image ready.");
    }
    if let Some(error) = session.error() {
        println!("!! {}", error);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut pargs = pico_args::Arguments::from_env();
    if pargs.contains(["-h", "--help"]) {
        print!("{}", HELP);
        return Ok(());
    }
    if pargs.contains("--list-themes") {
        for theme in Theme::ALL {
            println!("{}", theme.display_name());
        }
        return Ok(());
    }
    let args = parse_args(pargs).context("Invalid arguments (see --help)")?;

    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let mut config = load_config(&config_path);
    config.apply_env();
    tracing::info!("[Config] App id: {}", config.app_id);

    let identity = FirebaseIdentity::new(&config.firebase);
    let user_id = UserIdCell::new();
    let subscription = bootstrap(
        &identity,
        config.initial_auth_token.as_deref(),
        user_id.clone(),
    )
    .await;

    let mut session = Session::new(user_id);
    if let Some(path) = &args.image {
        if let Err(e) = session.select_file_from_path(path) {
            tracing::error!("[Session] {}", e);
        }
    }
    session.select_theme(args.theme);
    if let Some(level) = args.creativity {
        session.set_creativity(level);
    }
    if let Some(prompt) = args.prompt {
        session.set_prompt(prompt);
    }

    let transformer = GeminiImageTransformer::from_config(&config.transform);
    session.transform(&transformer).await;
    render(&session);

    if session.transformed_image().is_some() {
        let out_dir = args
            .out
            .or(config.output_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        match session.download(&out_dir) {
            Ok(path) => println!("Downloaded: {}", path.display()),
            Err(e) => println!("!! Download failed: {}", e),
        }
    }

    subscription.unsubscribe();
    Ok(())
}
