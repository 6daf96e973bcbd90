use clap::Subcommand;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;

use crate::auth::{hash_password, PasswordPolicy};
use crate::cli::utils::{connect_store, output_success};
use crate::cli::OutputFormat;
use crate::config::{config, IndexNames};
use crate::database::models::{fields, UserRole};
use crate::database::DocumentStore;
use crate::services::{CustomerService, NewContact, NewUser, UserService};

pub const DEMO_CUSTOMERS: &[&str] = &[
    "BNP PARIBAS",
    "BNP NTM",
    "ORANGE",
    "SOCIÉTÉ GÉNÉRALE",
    "BPCE",
    "EDF",
    "CRÉDIT AGRICOLE",
    "THALES",
    "SNCF",
    "TELEFONICA",
    "ALLIANZ",
];

#[derive(Subcommand)]
pub enum FixtureCommands {
    #[command(about = "Create the users, needs and customers indices when missing")]
    Init,

    #[command(about = "Seed customers, skipping names that already exist")]
    Customers {
        #[arg(long, help = "YAML file holding a list of customer names (defaults to the demo list)")]
        file: Option<PathBuf>,
    },

    #[command(about = "Add a user with a hashed password")]
    User {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        password: String,
        #[arg(long, help = "Give the user the consultant role")]
        consultant: bool,
    },

    #[command(about = "Add a contact to a customer")]
    Contact {
        #[arg(long, help = "Customer id")]
        customer: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
}

pub async fn handle(cmd: FixtureCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config();
    let store = connect_store(config).await?;
    let indices = &config.store.indices;

    match cmd {
        FixtureCommands::Init => {
            let created = init_indices(store.as_ref(), indices).await?;
            output_success(
                &output_format,
                &format!("{} index(es) created", created.len()),
                Some(json!({ "created": created })),
            )
        }
        FixtureCommands::Customers { file } => {
            let names = match file {
                Some(path) => load_customer_names(&path)?,
                None => DEMO_CUSTOMERS.iter().map(|s| s.to_string()).collect(),
            };
            let customers = CustomerService::new(store, indices.customers.clone());
            let added = seed_customers(&customers, &names).await?;
            output_success(
                &output_format,
                &format!("{} customer(s) added", added.len()),
                Some(json!({ "added": added })),
            )
        }
        FixtureCommands::User { email, name, password, consultant } => {
            let users = UserService::new(store, indices.users.clone());
            if users.get_user_by_email(&email).await?.is_some() {
                anyhow::bail!("User {} already exist", email);
            }

            let policy = PasswordPolicy::from_config(&config.security);
            let password_hash = tokio::task::spawn_blocking(move || hash_password(&policy, &password)).await??;
            let role = if consultant { UserRole::Consultant } else { UserRole::Other };

            let user = users
                .create_user(NewUser {
                    email,
                    name,
                    role,
                    password_hash: Some(password_hash),
                })
                .await?
                .ok_or_else(|| anyhow::anyhow!("Unable to save user"))?;
            output_success(
                &output_format,
                &format!("User {} added", user.email),
                Some(json!({ "id": user.id, "role": user.role.as_str() })),
            )
        }
        FixtureCommands::Contact { customer, name, email } => {
            let customers = CustomerService::new(store, indices.customers.clone());
            if customers.get_customer_by_id(&customer).await?.is_none() {
                anyhow::bail!("Customer not found");
            }

            let contact = customers
                .create_contact(&NewContact { name, email, customer })
                .await?
                .ok_or_else(|| anyhow::anyhow!("Unable to save contact"))?;
            output_success(
                &output_format,
                &format!("Contact {} added", contact.name),
                Some(json!({ "id": contact.id })),
            )
        }
    }
}

/// Index body with the edge-ngram `autocomplete` analyzer applied to
/// `autocomplete` and exact `keyword` mappings on `keywords`
pub fn index_body(autocomplete: &[&str], keywords: &[&str]) -> Value {
    let mut properties = serde_json::Map::new();
    for field in autocomplete {
        properties.insert(
            field.to_string(),
            json!({
                "type": "text",
                "analyzer": "autocomplete",
                "search_analyzer": "standard"
            }),
        );
    }
    for field in keywords {
        properties.insert(field.to_string(), json!({ "type": "keyword" }));
    }

    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 0,
            "analysis": {
                "filter": {
                    "autocomplete_filter": {
                        "type": "edge_ngram",
                        "min_gram": 1,
                        "max_gram": 20
                    }
                },
                "analyzer": {
                    "autocomplete": {
                        "type": "custom",
                        "tokenizer": "standard",
                        "filter": ["lowercase", "autocomplete_filter"]
                    }
                }
            }
        },
        "mappings": { "properties": properties }
    })
}

/// Create each missing index, returning the names that were created
pub async fn init_indices(store: &dyn DocumentStore, indices: &IndexNames) -> anyhow::Result<Vec<String>> {
    let plans = [
        (
            &indices.users,
            index_body(&[fields::NAME], &[fields::KIND, fields::ROLE]),
        ),
        (
            &indices.needs,
            index_body(
                &[fields::TITLE],
                &[
                    fields::KIND,
                    fields::AUTHOR,
                    fields::CUSTOMER,
                    fields::CONTACT,
                    fields::STATUS,
                    fields::NEED,
                ],
            ),
        ),
        (
            &indices.customers,
            index_body(&[fields::NAME, fields::EMAIL], &[fields::KIND, fields::CUSTOMER]),
        ),
    ];

    let mut created = Vec::new();
    for (index, body) in plans {
        if store.index_exists(index).await? {
            tracing::info!(index = %index, "Index already exists");
            continue;
        }
        store.create_index(index, body).await?;
        tracing::info!(index = %index, "Index created");
        created.push(index.clone());
    }
    Ok(created)
}

pub fn load_customer_names(path: &PathBuf) -> anyhow::Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Unable to read {}: {}", path.display(), e))?;
    let names: Vec<String> = serde_yaml::from_str(&raw)?;
    Ok(names.into_iter().map(|n| n.trim().to_string()).filter(|n| !n.is_empty()).collect())
}

/// Create every customer whose name is not already present
pub async fn seed_customers(customers: &CustomerService, names: &[String]) -> anyhow::Result<Vec<String>> {
    let mut added = Vec::new();
    for name in names {
        if customers.get_customer_by_name(name).await?.is_some() {
            tracing::info!(customer = %name, "Customer already exist");
            continue;
        }
        if customers.create_customer(name).await?.is_some() {
            added.push(name.clone());
        }
    }
    Ok(added)
}
