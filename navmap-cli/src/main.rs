//! NavMap CLI - Command-line interface
//!
//! Runs the map query layer against a compiled navigation database: list
//! what a map would draw in a rectangle, look up idents, find the nearest
//! navaid, or walk an airway.

mod commands;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use navmap::logging::{default_log_dir, default_log_file, init_logging};
use navmap::Pos;

use commands::common::{load_config, open_query, AirportSource, ObjectKind};
use commands::config::ConfigCommands;
use commands::query::{run_airway, run_ident, run_nearest, run_rect, RectArgs};
use error::CliError;

#[derive(Parser)]
#[command(name = "navmap")]
#[command(version, about = "Query chart objects from a navigation database", long_about = None)]
struct Cli {
    /// Navigation database (SQLite)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Configuration file (default: ~/.navmap/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List objects of one kind inside a rectangle
    Rect {
        /// Object kind
        #[arg(long, value_enum)]
        kind: ObjectKind,

        /// West bound in degrees (greater than east to cross the antimeridian)
        #[arg(long, allow_hyphen_values = true)]
        west: f64,

        /// South bound in degrees
        #[arg(long, allow_hyphen_values = true)]
        south: f64,

        /// East bound in degrees
        #[arg(long, allow_hyphen_values = true)]
        east: f64,

        /// North bound in degrees
        #[arg(long, allow_hyphen_values = true)]
        north: f64,

        /// Airport tier
        #[arg(long, value_enum, default_value = "all")]
        source: AirportSource,

        /// Minimum longest runway length in feet for full airports
        #[arg(long, default_value = "0")]
        min_runway: i32,

        /// Only airspaces with a floor below this altitude in feet
        #[arg(long)]
        below: Option<i32>,

        /// Only airspaces with a ceiling above this altitude in feet
        #[arg(long)]
        above: Option<i32>,
    },

    /// Look up objects by ident
    Ident {
        /// Ident, or airway name
        ident: String,

        /// Object kinds (default: airport, vor, ndb, waypoint, ils)
        #[arg(long, value_enum, value_delimiter = ',')]
        kind: Vec<ObjectKind>,

        /// ICAO region of navaids and waypoints
        #[arg(long, default_value = "")]
        region: String,

        /// Airport ident of ILS
        #[arg(long, default_value = "")]
        airport: String,

        /// Sort by distance to this longitude (requires --lat)
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        /// Sort by distance to this latitude (requires --lon)
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Drop matches farther away than this L1 distance in degrees
        #[arg(long, requires = "lon")]
        max_distance: Option<f64>,
    },

    /// Find the object of one kind nearest to a position
    Nearest {
        /// Object kind (airport, vor, ndb or waypoint)
        #[arg(long, value_enum)]
        kind: ObjectKind,

        /// Longitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Latitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
    },

    /// List the waypoints of an airway in order
    Airway {
        /// Airway name
        name: String,
    },

    /// View or initialize the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "navmap=debug" } else { "warn" };
    let _logging_guard = match init_logging(&default_log_dir(), default_log_file(), level) {
        Ok(guard) => Some(guard),
        Err(e) => {
            // A read-only home directory should not prevent queries
            eprintln!("Warning: {}", CliError::LoggingInit(e));
            None
        }
    };

    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    if let Commands::Config { command } = cli.command {
        return commands::config::run(command, cli.config.as_deref());
    }

    let config = load_config(cli.config.as_deref())?;
    let mut query = open_query(cli.db.as_deref(), config)?;

    match cli.command {
        Commands::Rect {
            kind,
            west,
            south,
            east,
            north,
            source,
            min_runway,
            below,
            above,
        } => {
            let args = RectArgs {
                kind,
                west,
                south,
                east,
                north,
                source,
                min_runway,
                below,
                above,
            };
            run_rect(&mut query, &args)
        }
        Commands::Ident {
            ident,
            kind,
            region,
            airport,
            lon,
            lat,
            max_distance,
        } => {
            let near = lon.zip(lat).map(|(lon, lat)| Pos::new(lon, lat));
            run_ident(
                &mut query,
                &kind,
                &ident,
                &region,
                &airport,
                near,
                max_distance,
            )
        }
        Commands::Nearest { kind, lon, lat } => {
            run_nearest(&mut query, kind, Pos::new(lon, lat))
        }
        Commands::Airway { name } => run_airway(&mut query, &name),
        Commands::Config { .. } => Ok(()),
    }
}
