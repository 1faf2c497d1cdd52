use std::env;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use pantry_chef::formatting::{
    format_error, format_history, format_ingredients_list, format_preferences, format_recipes,
};
use pantry_chef::localization::LocalizationManager;
use pantry_chef::{
    recipe_model::{DEFAULT_SERVINGS, MAX_SERVINGS, MIN_SERVINGS},
    AppConfig, DietaryFlag, FileStorage, GeminiClient, HistoryStore, ImagePayload, Outcome,
    Preferences, RecipeAssistant, RecipeSession, Result,
};

#[derive(Parser)]
#[command(name = "pantry-chef", version, about = "Recipe ideas from photos of your ingredients")]
struct Cli {
    /// Language for messages (en, es); defaults to $LANG
    #[arg(long, global = true)]
    lang: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the ingredients visible in 1 to 5 photos
    Analyze {
        /// Image files or data URIs
        #[arg(required = true, num_args = 1..=5)]
        images: Vec<String>,
    },
    /// Suggest recipes and save them to the history
    Suggest(SuggestArgs),
    /// Inspect or edit the saved history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Args)]
struct SuggestArgs {
    /// Photo to detect ingredients from (up to 5)
    #[arg(long = "image")]
    images: Vec<String>,
    /// Ingredient to add to the detected ones
    #[arg(long = "ingredient", short = 'i')]
    ingredients: Vec<String>,
    #[arg(long)]
    quick: bool,
    #[arg(long)]
    healthy: bool,
    #[arg(long)]
    no_oven: bool,
    #[arg(long)]
    vegetarian: bool,
    /// Number of people to cook for
    #[arg(
        long,
        default_value_t = DEFAULT_SERVINGS,
        value_parser = clap::value_parser!(u32).range(MIN_SERVINGS as i64..=MAX_SERVINGS as i64)
    )]
    servings: u32,
    /// Foods to leave out (allergies, dislikes)
    #[arg(long = "exclude", default_value = "")]
    exclude: String,
}

impl SuggestArgs {
    fn preferences(&self) -> Preferences {
        let mut prefs = Preferences::default()
            .with_servings(self.servings)
            .with_allergies(self.exclude.trim());
        let flags = [
            (DietaryFlag::Quick, self.quick),
            (DietaryFlag::Healthy, self.healthy),
            (DietaryFlag::NoOven, self.no_oven),
            (DietaryFlag::Vegetarian, self.vegetarian),
        ];
        for (flag, value) in flags {
            prefs.set_flag(flag, value);
        }
        prefs
    }
}

#[derive(Subcommand)]
enum HistoryAction {
    /// Show saved searches, most recent first
    List,
    /// Print the recipes of one saved search
    Show { id: String },
    /// Delete one saved search
    Remove { id: String },
    /// Delete the whole history
    Clear,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let json = env::var("PANTRY_CHEF_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

type Session = RecipeSession<GeminiClient, FileStorage>;

fn open_session(config: AppConfig) -> Result<Session> {
    let history = HistoryStore::open(FileStorage::new(&config.data_dir));
    let client = GeminiClient::new(&config)?;
    Ok(RecipeSession::new(RecipeAssistant::new(client, config), history))
}

async fn analyze(session: &Session, images: &[String], l10n: &LocalizationManager, lang: &str) -> Result<()> {
    let payloads = images
        .iter()
        .map(|arg| ImagePayload::from_argument(arg))
        .collect::<Result<Vec<_>>>()?;

    match session.analyze(&payloads).await? {
        Outcome::Applied(detected) if detected.is_empty() => {
            println!("{}", l10n.message("analyze-none", lang, &[]));
        }
        Outcome::Applied(detected) => {
            println!("{}", l10n.message("analyze-detected", lang, &[]));
            print!("{}", format_ingredients_list(&detected));
        }
        Outcome::Superseded => println!("{}", l10n.message("analyze-superseded", lang, &[])),
    }
    Ok(())
}

async fn suggest(session: &Session, args: &SuggestArgs, l10n: &LocalizationManager, lang: &str) -> Result<()> {
    if !args.images.is_empty() {
        analyze(session, &args.images, l10n, lang).await?;
    }
    for ingredient in &args.ingredients {
        session.add_ingredient(ingredient).await;
    }

    let ingredients = session.ingredients().await;
    if ingredients.is_empty() {
        println!("{}", l10n.message("analyze-none", lang, &[]));
        return Ok(());
    }

    let prefs = args.preferences();
    println!("{}", format_preferences(&prefs, l10n, lang));
    session.set_preferences(prefs).await;

    if let Outcome::Applied(recipes) = session.generate().await? {
        println!();
        println!("{}", format_recipes(&ingredients, &recipes, l10n, lang));
    }
    Ok(())
}

async fn history(session: &Session, action: &HistoryAction, l10n: &LocalizationManager, lang: &str) -> Result<()> {
    match action {
        HistoryAction::List => print!("{}", format_history(&session.history().await, l10n, lang)),
        HistoryAction::Show { id } => match session.restore_history_item(id).await {
            Some(item) => println!("{}", format_recipes(&item.ingredients, &item.recipes, l10n, lang)),
            None => println!("{}", l10n.message("history-not-found", lang, &[("id", id.as_str())])),
        },
        HistoryAction::Remove { id } => {
            let existed = session.history().await.iter().any(|item| &item.id == id);
            session.remove_history_item(id).await?;
            let key = if existed { "history-removed" } else { "history-not-found" };
            println!("{}", l10n.message(key, lang, &[("id", id.as_str())]));
        }
        HistoryAction::Clear => {
            session.clear_history().await?;
            println!("{}", l10n.message("history-cleared", lang, &[]));
        }
    }
    Ok(())
}

async fn run(command: &Command, config: AppConfig, l10n: &LocalizationManager, lang: &str) -> Result<()> {
    let session = open_session(config)?;
    match command {
        Command::Analyze { images } => analyze(&session, images, l10n, lang).await,
        Command::Suggest(args) => suggest(&session, args, l10n, lang).await,
        Command::History { action } => history(&session, action, l10n, lang).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenv::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let l10n = match LocalizationManager::new() {
        Ok(manager) => manager,
        Err(e) => {
            eprintln!("Failed to load messages: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    let env_lang = env::var("LANG").ok();
    let lang = l10n.resolve_language(cli.lang.as_deref().or(env_lang.as_deref()));

    let config = AppConfig::from_env();
    info!(data_dir = %config.data_dir.display(), "Starting pantry-chef");

    match run(&cli.command, config, &l10n, &lang).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "Command failed");
            eprintln!("{}", format_error(&err, &l10n, &lang));
            ExitCode::FAILURE
        }
    }
}
