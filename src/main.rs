use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scrum_board::board::{Board, Outcome};
use scrum_board::config::{get_config_path, Config};
use scrum_board::drag::{DragSession, DropTarget};
use scrum_board::forms::{EpicForm, Modal, SprintForm, StoryForm};
use scrum_board::models::{StoryStatus, EPIC_COLORS, EPIC_ICONS};
use scrum_board::store::HttpStore;
use scrum_board::views::EpicFilter;
use scrum_board::{auth, render};

#[derive(Parser)]
#[command(name = "scrum")]
#[command(about = "Scrum board: sprints, epics and stories from a JSON document store")]
struct Cli {
    /// Base URL of the document store
    #[arg(long, global = true)]
    url: Option<String>,

    /// Login user
    #[arg(long, global = true)]
    user: Option<String>,

    /// Login password
    #[arg(long, global = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show stats, epics, sprints and the board of one sprint
    Board {
        /// Sprint to show (defaults to the active sprint)
        #[arg(short, long)]
        sprint: Option<String>,

        /// Only show stories of this epic
        #[arg(short, long)]
        epic: Option<String>,
    },
    /// Create, edit, move or delete stories
    #[command(subcommand)]
    Story(StoryCommand),
    /// Create, edit or delete epics
    #[command(subcommand)]
    Epic(EpicCommand),
    /// Create, edit, delete or activate sprints
    #[command(subcommand)]
    Sprint(SprintCommand),
    /// Check credentials against the store
    Login {
        /// Store URL and credentials in the config file once accepted
        #[arg(long)]
        save: bool,
    },
}

#[derive(Subcommand)]
enum StoryCommand {
    Create(StoryFields),
    Edit {
        id: String,
        #[command(flatten)]
        fields: StoryFields,
    },
    Delete {
        id: String,
    },
    /// Advance status: todo → in-progress → done → blocked → todo
    Toggle {
        id: String,
    },
    /// Move to the end of another sprint
    Move {
        id: String,
        #[arg(long)]
        to: String,
    },
    /// Drop onto a board column (todo, in-progress, done)
    Drop {
        id: String,
        #[arg(long)]
        column: String,
    },
    /// Move to a new position within its sprint
    Reorder {
        id: String,
        #[arg(long)]
        index: usize,
    },
}

#[derive(Args)]
struct StoryFields {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    epic: Option<String>,
    #[arg(long)]
    points: Option<u32>,
    #[arg(long)]
    status: Option<String>,
    #[arg(long)]
    assignee: Option<String>,
    #[arg(long)]
    details: Option<String>,
    /// Target sprint
    #[arg(long)]
    sprint: Option<String>,
}

#[derive(Subcommand)]
enum EpicCommand {
    Create(EpicFields),
    Edit {
        id: String,
        #[command(flatten)]
        fields: EpicFields,
    },
    Delete {
        id: String,
    },
}

#[derive(Args)]
struct EpicFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    icon: Option<String>,
    #[arg(long)]
    color: Option<String>,
}

#[derive(Subcommand)]
enum SprintCommand {
    Create(SprintFields),
    Edit {
        id: String,
        #[command(flatten)]
        fields: SprintFields,
    },
    Delete {
        id: String,
    },
    /// Make this the only active sprint
    Activate {
        id: String,
    },
}

#[derive(Args)]
struct SprintFields {
    #[arg(long)]
    name: Option<String>,
    /// Date range label, e.g. "Feb 01 - Feb 14"
    #[arg(long)]
    weeks: Option<String>,
}

/// Initialize tracing on stderr so stdout only carries the rendered board.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "scrum_board=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = Config::load();
    if let Some(url) = cli.url {
        config.base_url = url;
    }
    if let Some(user) = cli.user {
        config.user = Some(user);
    }
    if let Some(password) = cli.password {
        config.password = Some(password);
    }

    let store = HttpStore::new(config.base_url.clone());

    let (Some(user), Some(password)) = (config.user.as_deref(), config.password.as_deref()) else {
        bail!("Credentials required: pass --user/--password or set SCRUM_BOARD_USER/SCRUM_BOARD_PASSWORD");
    };
    auth::login(&store, user, password).await?;

    let command = cli.command.unwrap_or(Commands::Board {
        sprint: None,
        epic: None,
    });
    if let Commands::Login { save } = command {
        println!("Credentials accepted by {}", store.base_url());
        if save {
            config.save()?;
            println!("Saved to {}", get_config_path()?.display());
        }
        return Ok(());
    }

    let mut board = Board::load(store)
        .await
        .context("Make sure the document store is running")?
        .with_story_prefix(config.story_prefix.clone());

    let mut shown_sprint = None;
    let mut filter = EpicFilter::All;

    let outcome = match command {
        Commands::Login { .. } => Outcome::Unchanged,
        Commands::Board { sprint, epic } => {
            shown_sprint = sprint;
            if let Some(epic) = epic {
                filter = EpicFilter::Epic(epic);
            }
            Outcome::Unchanged
        }
        Commands::Story(cmd) => match cmd {
            StoryCommand::Create(fields) => {
                let mut form = StoryForm::create(board.snapshot());
                fields.apply(&mut form)?;
                shown_sprint = Some(form.sprint_id.clone());
                submit(&mut board, Modal::Story(form)).await?
            }
            StoryCommand::Edit { id, fields } => {
                let mut form = StoryForm::edit(board.snapshot(), &id)
                    .with_context(|| format!("Story not found: {}", id))?;
                fields.apply(&mut form)?;
                shown_sprint = Some(form.sprint_id.clone());
                submit(&mut board, Modal::Story(form)).await?
            }
            StoryCommand::Delete { id } => {
                shown_sprint = board.snapshot().owner_of(&id).map(str::to_string);
                board.delete_story(&id).await?
            }
            StoryCommand::Toggle { id } => {
                shown_sprint = board.snapshot().owner_of(&id).map(str::to_string);
                board.toggle_status(&id).await?
            }
            StoryCommand::Move { id, to } => {
                shown_sprint = Some(to.clone());
                board.move_story(&id, &to).await?
            }
            StoryCommand::Drop { id, column } => {
                let sprint_id = board
                    .snapshot()
                    .owner_of(&id)
                    .map(str::to_string)
                    .with_context(|| format!("Story not found: {}", id))?;
                let mut session = DragSession::new(sprint_id.clone());
                session.lift(id);
                shown_sprint = Some(sprint_id);
                match session.drop(board.snapshot(), DropTarget::Column(&column))? {
                    Some(command) => board.execute(command).await?,
                    None => Outcome::Unchanged,
                }
            }
            StoryCommand::Reorder { id, index } => {
                shown_sprint = board.snapshot().owner_of(&id).map(str::to_string);
                board.reorder_story(&id, index).await?
            }
        },
        Commands::Epic(cmd) => match cmd {
            EpicCommand::Create(fields) => {
                let mut form = EpicForm::create();
                fields.apply(&mut form)?;
                submit(&mut board, Modal::Epic(form)).await?
            }
            EpicCommand::Edit { id, fields } => {
                let mut form = EpicForm::edit(board.snapshot(), &id)
                    .with_context(|| format!("Epic not found: {}", id))?;
                fields.apply(&mut form)?;
                submit(&mut board, Modal::Epic(form)).await?
            }
            EpicCommand::Delete { id } => board.delete_epic(&id).await?,
        },
        Commands::Sprint(cmd) => match cmd {
            SprintCommand::Create(fields) => {
                let mut form = SprintForm::create();
                fields.apply(&mut form);
                submit(&mut board, Modal::Sprint(form)).await?
            }
            SprintCommand::Edit { id, fields } => {
                let mut form = SprintForm::edit(board.snapshot(), &id)
                    .with_context(|| format!("Sprint not found: {}", id))?;
                fields.apply(&mut form);
                shown_sprint = Some(id);
                submit(&mut board, Modal::Sprint(form)).await?
            }
            SprintCommand::Delete { id } => board.delete_sprint(&id).await?,
            SprintCommand::Activate { id } => {
                shown_sprint = Some(id.clone());
                board.activate_sprint(&id).await?
            }
        },
    };

    match outcome {
        Outcome::Created(id) => println!("Created {}\n", id),
        Outcome::Applied => println!("Saved\n"),
        Outcome::Unchanged => {}
    }

    let snapshot = board.snapshot();
    print!("{}", render::render_stats(&board.stats()));
    println!();
    print!("{}", render::render_epics(snapshot));
    println!();
    print!("{}", render::render_sprints(snapshot));
    println!();

    let sprint = shown_sprint
        .as_deref()
        .and_then(|id| snapshot.sprint(id))
        .or_else(|| snapshot.active_sprint())
        .or_else(|| snapshot.sprints().first());
    match sprint {
        Some(sprint) => print!("{}", render::render_board(sprint, &filter)),
        None => println!("No sprints yet"),
    }

    Ok(())
}

/// Close the modal and run the command its form produced.
async fn submit(board: &mut Board<HttpStore>, mut modal: Modal) -> anyhow::Result<Outcome> {
    match modal.submit() {
        Some(command) => Ok(board.execute(command).await?),
        None => Ok(Outcome::Unchanged),
    }
}

impl StoryFields {
    fn apply(self, form: &mut StoryForm) -> anyhow::Result<()> {
        if let Some(title) = self.title {
            form.title = title;
        }
        if let Some(epic) = self.epic {
            form.epic_name = epic;
        }
        if let Some(points) = self.points {
            form.story_points = points;
        }
        if let Some(status) = self.status {
            form.status = StoryStatus::from_str(&status)
                .with_context(|| format!("Unknown status: {}", status))?;
        }
        if let Some(assignee) = self.assignee {
            form.assignee = assignee;
        }
        if let Some(details) = self.details {
            form.show_details = true;
            form.details = details;
        }
        if let Some(sprint) = self.sprint {
            form.set_sprint(sprint);
        }
        Ok(())
    }
}

impl EpicFields {
    fn apply(self, form: &mut EpicForm) -> anyhow::Result<()> {
        if let Some(name) = self.name {
            form.name = name;
        }
        if let Some(icon) = self.icon {
            if !EPIC_ICONS.contains(&icon.as_str()) {
                bail!("Unknown icon {}; choose one of {}", icon, EPIC_ICONS.join(", "));
            }
            form.icon_key = icon;
        }
        if let Some(color) = self.color {
            if !EPIC_COLORS.contains(&color.as_str()) {
                bail!("Unknown color {}; choose one of {}", color, EPIC_COLORS.join(", "));
            }
            form.color_key = color;
        }
        Ok(())
    }
}

impl SprintFields {
    fn apply(self, form: &mut SprintForm) {
        if let Some(name) = self.name {
            form.name = name;
        }
        if let Some(weeks) = self.weeks {
            form.date_range = weeks;
        }
    }
}
