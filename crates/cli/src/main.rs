use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use patient_core::config::patient_data_file_from_env_value;
use patient_core::{CoreConfig, Patch, PatientDraft, PatientService, PatientUpdate};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "patients")]
#[command(about = "Patient records CLI")]
struct Cli {
    /// Patient data file (defaults to $PATIENT_DATA_FILE, then patient.json)
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all patients
    List,
    /// Show one patient
    Get {
        /// Patient ID
        id: String,
    },
    /// List patients sorted by height, weight or bmi
    Sort {
        /// Field to sort on
        sort_by: String,
        /// asc or desc
        #[arg(long)]
        order: Option<String>,
    },
    /// Create a patient
    Create {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        city: String,
        #[arg(long, allow_hyphen_values = true)]
        age: i64,
        /// male, female or other
        #[arg(long)]
        gender: String,
        /// Height in metres
        #[arg(long, allow_hyphen_values = true)]
        height: f64,
        /// Weight in kilograms
        #[arg(long, allow_hyphen_values = true)]
        weight: f64,
    },
    /// Update the given fields of a patient
    Update {
        /// Patient ID
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        age: Option<i64>,
        #[arg(long)]
        gender: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        height: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        weight: Option<f64>,
    },
    /// Delete a patient
    Delete {
        /// Patient ID
        id: String,
    },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let data_file = cli.data_file.unwrap_or_else(|| {
        patient_data_file_from_env_value(std::env::var("PATIENT_DATA_FILE").ok())
    });
    let cfg = CoreConfig::new(data_file).context("invalid data file")?;
    let service = PatientService::from_config(&cfg);

    match cli.command {
        Commands::List => {
            let records = service.list_patients()?;
            if records.is_empty() {
                eprintln!("No patients found.");
            }
            print_json(&records)?;
        }
        Commands::Get { id } => {
            print_json(&service.get_patient(&id)?)?;
        }
        Commands::Sort { sort_by, order } => {
            print_json(&service.sort_patients(&sort_by, order.as_deref())?)?;
        }
        Commands::Create {
            id,
            name,
            city,
            age,
            gender,
            height,
            weight,
        } => {
            let draft = PatientDraft {
                id: Some(id),
                name: Some(name),
                city: Some(city),
                age: Some(age),
                gender: Some(gender),
                height: Some(height),
                weight: Some(weight),
            };
            let record = service.create_patient(draft)?;
            print_json(&record)?;
        }
        Commands::Update {
            id,
            name,
            city,
            age,
            gender,
            height,
            weight,
        } => {
            let update = PatientUpdate {
                name: Patch::from(name),
                city: Patch::from(city),
                age: Patch::from(age),
                gender: Patch::from(gender),
                height: Patch::from(height),
                weight: Patch::from(weight),
            };
            let record = service.update_patient(&id, &update)?;
            print_json(&record)?;
        }
        Commands::Delete { id } => {
            service.delete_patient(&id)?;
            println!("Deleted patient {}", id);
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    run(Cli::parse())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_flags_parse_as_optional() {
        let cli = Cli::try_parse_from(["patients", "update", "P001", "--weight", "60.5"])
            .expect("should parse");
        match cli.command {
            Commands::Update {
                id, weight, name, ..
            } => {
                assert_eq!(id, "P001");
                assert_eq!(weight, Some(60.5));
                assert_eq!(name, None);
            }
            _ => panic!("expected update"),
        }
    }

    #[test]
    fn test_create_and_get_against_data_file() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let data_file = dir.path().join("patient.json");
        let file_arg = data_file.to_str().expect("utf-8 path");

        let create = Cli::try_parse_from([
            "patients", "--data-file", file_arg, "create", "--id", "P001", "--name", "Ananya",
            "--city", "Guwahati", "--age", "28", "--gender", "female", "--height", "1.65",
            "--weight", "90",
        ])
        .expect("should parse");
        run(create).expect("create should succeed");

        let get = Cli::try_parse_from(["patients", "--data-file", file_arg, "get", "P001"])
            .expect("should parse");
        run(get).expect("get should succeed");

        let missing = Cli::try_parse_from(["patients", "--data-file", file_arg, "get", "P404"])
            .expect("should parse");
        assert!(run(missing).is_err());
    }
}
