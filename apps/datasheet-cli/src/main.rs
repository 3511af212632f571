//! Command-line client for the datasheet REST API.
//!
//! Wraps the record operations of `datasheet-client` for shell use. Field
//! values are given as `key=value`; values parse as JSON and fall back to
//! plain strings.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};

use datasheet_client::config::{ENV_API_BASE, ENV_API_TOKEN};
use datasheet_client::{
    api_request, CellFormat, Client, ClientConfig, DatasheetOptions, FieldDescriptor, FieldKey,
    FieldKeyMap, QuerySet, RecordQuery,
};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// API host
    #[arg(long, env = ENV_API_BASE, default_value = "https://api.vika.cn")]
    api_base: String,

    /// API token
    #[arg(long, env = ENV_API_TOKEN, hide_env_values = true)]
    token: Option<String>,

    /// Datasheet id
    #[arg(short, long)]
    datasheet: String,

    /// Address fields by `name` or `id`
    #[arg(long, default_value = "name")]
    field_key: FieldKey,

    /// Field alias, `alias=field` (repeatable)
    #[arg(long = "alias", value_parser = parse_alias)]
    aliases: Vec<(String, String)>,

    /// Raise when a page fails mid-listing instead of printing partial rows
    #[arg(long)]
    strict: bool,

    /// Request timeout in milliseconds
    #[arg(long, default_value_t = 30000)]
    request_timeout_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List fields as `key<TAB>type`, keyed by the chosen field-key mode
    Fields {
        /// Print the full field descriptors as JSON
        #[arg(long)]
        json: bool,
    },
    /// List records
    List {
        /// View id
        #[arg(long)]
        view: Option<String>,
        /// Sort object such as '{"title":"asc"}' (repeatable)
        #[arg(long)]
        sort: Vec<String>,
        /// Fields to return (repeatable)
        #[arg(long)]
        field: Vec<String>,
        /// Formula filter
        #[arg(long)]
        formula: Option<String>,
        #[arg(long)]
        max_records: Option<u64>,
        /// Render every cell as a string
        #[arg(long)]
        strings: bool,
        /// Fetch only this page size (disables auto-pagination)
        #[arg(long)]
        page_size: Option<u64>,
        /// Fetch only this page (disables auto-pagination)
        #[arg(long)]
        page_num: Option<u64>,
    },
    /// Print the first record matching every `key=value`
    Get {
        #[arg(required = true, value_parser = parse_assignment)]
        constraints: Vec<(String, Value)>,
    },
    /// Print every record matching every `key=value`
    Filter {
        #[arg(value_parser = parse_assignment)]
        constraints: Vec<(String, Value)>,
    },
    /// Create one record from `key=value` pairs
    Create {
        #[arg(required = true, value_parser = parse_assignment)]
        fields: Vec<(String, Value)>,
    },
    /// Update fields of one record
    Update {
        record_id: String,
        #[arg(required = true, value_parser = parse_assignment)]
        fields: Vec<(String, Value)>,
    },
    /// Delete records by id
    Delete {
        #[arg(required = true)]
        record_ids: Vec<String>,
    },
    /// Upload a local file or URL and print its attachment descriptor
    Upload { location: String },
}

fn parse_assignment(s: &str) -> Result<(String, Value), String> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    // Try to parse as JSON, fall back to string
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

fn parse_alias(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(alias, field)| (alias.to_string(), field.to_string()))
        .ok_or_else(|| format!("expected alias=field, got '{}'", s))
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn field_lines(fields: &[FieldDescriptor], mode: FieldKey) -> Vec<String> {
    fields
        .iter()
        .map(|field| format!("{}\t{}", field.key(mode), field.field_type))
        .collect()
}

fn print_rows(set: &QuerySet) -> anyhow::Result<()> {
    print_json(&set.rows())?;
    eprintln!("{} records", set.len());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig {
        api_base: args.api_base,
        token: args.token,
        request_timeout_ms: args.request_timeout_ms,
        strict_pagination: args.strict,
        ..Default::default()
    };
    let client = Client::new(config).context("Failed to create client")?;

    let mut options = DatasheetOptions::new(args.field_key);
    if !args.aliases.is_empty() {
        options = options.with_field_key_map(args.aliases.into_iter().collect::<FieldKeyMap>());
    }
    let datasheet = client.datasheet(args.datasheet, options);
    tracing::debug!("Opened datasheet {}", datasheet.id());

    match args.command {
        Command::Fields { json } => {
            let fields = datasheet.fields().await?;
            if json {
                print_json(&fields.all())?;
            } else {
                for line in field_lines(fields.all(), datasheet.field_key()) {
                    println!("{}", line);
                }
            }
        }
        Command::List {
            view,
            sort,
            field,
            formula,
            max_records,
            strings,
            page_size,
            page_num,
        } => {
            let sort_values = sort
                .iter()
                .map(|s| serde_json::from_str::<Value>(s))
                .collect::<Result<Vec<_>, _>>()
                .context("--sort expects a JSON object")?;
            let mut query = RecordQuery::new().fields(field);
            query.sort = api_request::parse_sort(&sort_values)?;
            query.view_id = view;
            query.filter_by_formula = formula;
            query.max_records = max_records;
            query.page_size = page_size;
            query.page_num = page_num;
            if strings {
                query = query.cell_format(CellFormat::String);
            }
            print_rows(&datasheet.records().all(query).await?)?;
        }
        Command::Get { constraints } => {
            let record = datasheet.records().get(constraints).await?;
            let mut out = Map::new();
            out.insert("recordId".to_string(), Value::from(record.id()));
            out.insert("fields".to_string(), Value::Object(record.to_json().await?));
            print_json(&out)?;
        }
        Command::Filter { constraints } => {
            print_rows(&datasheet.records().filter(constraints).await?)?;
        }
        Command::Create { fields } => {
            let record = datasheet.records().create(fields).await?;
            println!("{}", record.id());
        }
        Command::Update { record_id, fields } => {
            let record = datasheet.records().get_by_id(&record_id).await?;
            let updated = record.update(fields).await?;
            if updated != 1 {
                bail!("server updated {} records", updated);
            }
            print_json(&record.to_json().await?)?;
        }
        Command::Delete { record_ids } => {
            if !datasheet.records().delete(&record_ids).await? {
                bail!("server refused to delete {:?}", record_ids);
            }
        }
        Command::Upload { location } => {
            print_json(&datasheet.upload_attachment(&location).await?)?;
        }
    }

    Ok(())
}
