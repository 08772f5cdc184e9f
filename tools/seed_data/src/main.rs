use std::env;

use dotenvy::dotenv;
use thesis_workflow::auth::hash_password;
use thesis_workflow::models::{Course, Keyed, Professor, Student};
use thesis_workflow::registry::{Table, load_table, save_table};
use thesis_workflow::repository::{Collection, JsonFileGateway, PersistenceGateway};

fn is_dry_run() -> bool {
    !std::env::args().any(|a| a == "--apply")
}

fn demo_professors() -> Vec<Professor> {
    [
        ("prof1", "Dr. Ada Byron", 3, 4),
        ("prof2", "Dr. Alan Church", 2, 3),
        ("prof3", "Dr. Grace Liskov", 1, 2),
    ]
    .into_iter()
    .map(|(id, name, supervision, examiner)| Professor {
        user_id: id.to_string(),
        name: name.to_string(),
        password_hash: hash_password(id),
        supervision_capacity: supervision,
        examiner_capacity: examiner,
    })
    .collect()
}

fn demo_students() -> Vec<Student> {
    [("std1", "Alice Moreno"), ("std2", "Bob Tanaka"), ("std3", "Carol Diaz")]
        .into_iter()
        .map(|(id, name)| Student {
            user_id: id.to_string(),
            name: name.to_string(),
            password_hash: hash_password(id),
        })
        .collect()
}

fn demo_courses() -> Vec<Course> {
    [
        ("C101", "Thesis in Programming Languages", "prof1", 2),
        ("C102", "Thesis in Distributed Systems", "prof2", 1),
        ("C103", "Thesis in Formal Methods", "prof3", 1),
    ]
    .into_iter()
    .map(|(id, title, professor_id, capacity)| Course {
        course_id: id.to_string(),
        title: title.to_string(),
        professor_id: professor_id.to_string(),
        capacity,
        year: Some(2025),
        semester: Some("Fall".to_string()),
        unit: Some(6),
    })
    .collect()
}

/// Adds the demo rows whose ids are missing; existing rows are left alone.
async fn seed<T>(
    gateway: &dyn PersistenceGateway,
    collection: Collection,
    rows: Vec<T>,
    dry_run: bool,
) -> Result<usize, Box<dyn std::error::Error>>
where
    T: serde::Serialize + serde::de::DeserializeOwned + Keyed,
{
    let stored = gateway.load_all(collection).await?.len();
    let mut table: Table<T> = load_table(gateway, collection).await?;
    if stored > 0 && table.is_empty() {
        return Err(format!(
            "{} holds {} record(s) that could not be read, refusing to seed it",
            collection.name(),
            stored
        )
        .into());
    }
    let mut added = 0;

    for row in rows {
        if table.contains(row.key()) {
            continue;
        }
        if dry_run {
            println!("[DRY RUN] Would add {} {}", collection.name(), row.key());
        } else {
            println!("Added {} {}", collection.name(), row.key());
        }
        table.insert(row);
        added += 1;
    }

    if !dry_run && added > 0 {
        save_table(gateway, collection, &table).await?;
    }

    println!("{} added: {} / {}", collection.name(), added, table.len());
    Ok(added)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let data_dir = env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());
    let gateway = JsonFileGateway::new(data_dir);
    let dry_run = is_dry_run();

    seed(&gateway, Collection::Professors, demo_professors(), dry_run).await?;
    seed(&gateway, Collection::Students, demo_students(), dry_run).await?;
    seed(&gateway, Collection::Courses, demo_courses(), dry_run).await?;

    if dry_run {
        println!("Nothing written. Re-run with --apply to save.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use thesis_workflow::repository::MemoryGateway;

    #[tokio::test]
    async fn test_seed_adds_only_missing_rows() {
        let gateway = MemoryGateway::new();
        let existing = Table::from_rows(vec![demo_professors().remove(0)]);
        save_table(&gateway, Collection::Professors, &existing)
            .await
            .unwrap();

        let added = seed(&gateway, Collection::Professors, demo_professors(), false)
            .await
            .unwrap();
        assert_eq!(added, 2);

        let table: Table<Professor> = load_table(&gateway, Collection::Professors).await.unwrap();
        assert_eq!(table.len(), 3);
    }

    #[tokio::test]
    async fn test_seed_refuses_unreadable_collection() {
        let gateway = MemoryGateway::new();
        let stored = vec![json!({
            "user_id": "prof9",
            "name": "Dr. Overbooked",
            "password_hash": "",
            "supervision_capacity": 1,
            "examiner_capacity": -1
        })];
        gateway
            .save_all(Collection::Professors, stored.clone())
            .await
            .unwrap();

        let result = seed(&gateway, Collection::Professors, demo_professors(), false).await;
        assert!(result.is_err());
        assert_eq!(
            gateway.load_all(Collection::Professors).await.unwrap(),
            stored
        );
    }
}
