pub(crate) use crate::commands::{association, entity, health, migrate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use gastro_review_database::types::EntityKind;
use gastro_review_lib::config::ReviewArgs;

#[derive(Parser, Debug)]
#[clap(
    name = "gastro-review",
    about = "Gastro Review association service",
    version,
    rename_all = "kebab-case"
)]
pub struct Opt {
    #[clap(subcommand)]
    pub command: GastroReview,
}

#[allow(clippy::large_enum_variant)]
#[derive(Debug, Subcommand)]
pub enum GastroReview {
    /// Apply the database migrations.
    Migrate(MigrateCommand),

    /// Check that the database is reachable.
    Health(HealthCommand),

    /// Create, fetch or delete a referenced entity.
    Entity(EntityCommand),

    /// Manage composite-key associations.
    Association(AssociationCommand),
}

#[derive(Debug, Args)]
pub struct MigrateCommand {
    #[clap(flatten)]
    pub args: ReviewArgs,
}

#[derive(Debug, Args)]
pub struct HealthCommand {
    #[clap(flatten)]
    pub args: ReviewArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EntityKindArg {
    Users,
    Restaurants,
    Addresses,
    Roles,
    Categories,
}

impl From<EntityKindArg> for EntityKind {
    fn from(kind: EntityKindArg) -> Self {
        match kind {
            EntityKindArg::Users => EntityKind::User,
            EntityKindArg::Restaurants => EntityKind::Restaurant,
            EntityKindArg::Addresses => EntityKind::Address,
            EntityKindArg::Roles => EntityKind::Role,
            EntityKindArg::Categories => EntityKind::Category,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EntityAction {
    Create,
    Get,
    Delete,
}

#[derive(Debug, Args)]
pub struct EntityCommand {
    /// Kind of entity.
    #[clap(value_enum)]
    pub kind: EntityKindArg,

    /// Operation to run.
    #[clap(value_enum)]
    pub action: EntityAction,

    /// Identifier of the entity, for `get` and `delete`.
    pub id: Option<String>,

    /// JSON body of the entity, for `create`.
    #[clap(long, value_name = "JSON", help = "JSON body of the entity to create.")]
    pub data: Option<String>,

    #[clap(flatten)]
    pub args: ReviewArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RelationKind {
    RestaurantAddress,
    UserRole,
    Friendship,
    RestaurantCategory,
    UserAddress,
    FavoriteRestaurant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AssociationAction {
    Create,
    Get,
    Update,
    Delete,
    List,
}

#[derive(Debug, Args)]
pub struct AssociationCommand {
    /// Relation to operate on.
    #[clap(value_enum)]
    pub relation: RelationKind,

    /// Operation to run.
    #[clap(value_enum)]
    pub action: AssociationAction,

    /// Owner side of the composite key.
    #[clap(long, help = "Owner side of the composite key.")]
    pub owner: Option<String>,

    /// Target side of the composite key.
    #[clap(long, help = "Target side of the composite key.")]
    pub target: Option<String>,

    /// Mark the association as the owner's exclusive one.
    #[clap(long, value_parser, value_name = "BOOL", help = "Mark the association as the owner's exclusive one.")]
    pub exclusive: Option<bool>,

    /// Relation attributes as a JSON object.
    #[clap(long, value_name = "JSON", help = "Relation attributes as a JSON object.")]
    pub attributes: Option<String>,

    /// Zero-based page index for `list`.
    #[clap(long, default_value_t = 0, help = "Zero-based page index for `list`.")]
    pub page: usize,

    /// List the associations of this owner.
    #[clap(long, value_name = "ID", help = "List the associations of this owner.")]
    pub by_owner: Option<String>,

    /// List the associations pointing at this target.
    #[clap(long, value_name = "ID", help = "List the associations pointing at this target.")]
    pub by_target: Option<String>,

    #[clap(flatten)]
    pub args: ReviewArgs,
}

pub async fn run_cli() -> anyhow::Result<()> {
    let opt = Opt::try_parse();

    match opt {
        Ok(opt) => match opt.command {
            GastroReview::Migrate(command) => migrate::exec(command).await,
            GastroReview::Health(command) => health::exec(command).await,
            GastroReview::Entity(command) => entity::exec(command).await,
            GastroReview::Association(command) => association::exec(command).await,
        },
        Err(e) => {
            // Prints the error and exits.
            e.exit()
        }
    }
}
