//! # Taskpad demo data seeder
//!
//! Creates demo users `demo1@example.com` .. `demo10@example.com` (password
//! `password123`), each with a handful of random tasks. Users that already
//! exist are left alone, so the seeder can be re-run safely.
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/taskpad cargo run -p taskpad-api --bin taskpad-seed
//! ```

use anyhow::Context;
use chrono::{Duration, Utc};
use rand::{seq::SliceRandom, Rng};
use taskpad_api::{config::LogFormat, telemetry::init_tracing};
use taskpad_shared::{
    auth::{nickname::derive_unique_nickname, password::hash_password_blocking},
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    models::{
        task::{CreateTask, Task},
        user::{CreateUser, User},
    },
};

const DEMO_USERS: u32 = 10;
const DEMO_PASSWORD: &str = "password123";

const FIRST_NAMES: &[&str] = &["Alice", "Bruno", "Carmen", "Dmitri", "Elena", "Farid", "Grace", "Hiro"];
const LAST_NAMES: &[&str] = &["Smith", "Garcia", "Okafor", "Novak", "Tanaka", "Silva", "Moreau"];
const TASK_TITLES: &[&str] = &[
    "Buy groceries",
    "Renew passport",
    "Call the dentist",
    "Prepare quarterly report",
    "Water the plants",
    "Book flight tickets",
    "Fix the leaking tap",
    "Read a chapter of a book",
    "Plan weekend hike",
    "Pay electricity bill",
];

/// Random name pair and 1-5 random tasks
fn demo_profile() -> ((String, String), Vec<CreateTask>) {
    let mut rng = rand::thread_rng();

    let first = FIRST_NAMES.choose(&mut rng).copied().unwrap_or("Demo");
    let last = LAST_NAMES.choose(&mut rng).copied().unwrap_or("User");

    let today = Utc::now().date_naive();
    let count = rng.gen_range(1..=5);
    let tasks = TASK_TITLES
        .choose_multiple(&mut rng, count)
        .map(|title| CreateTask {
            title: title.to_string(),
            description: rng.gen_bool(0.7).then(|| format!("Demo task: {}", title.to_lowercase())),
            completed: rng.gen_bool(0.3),
            due_date: rng
                .gen_bool(0.6)
                .then(|| today + Duration::days(rng.gen_range(-7..=30))),
        })
        .collect();

    ((first.to_string(), last.to_string()), tasks)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing(LogFormat::Pretty);

    let url = std::env::var("DATABASE_URL").context("DATABASE_URL environment variable is required")?;
    let pool = create_pool(DatabaseConfig {
        url,
        max_connections: 2,
        ..Default::default()
    })
    .await
    .context("Failed to connect to database")?;

    run_migrations(&pool).await.context("Failed to run migrations")?;

    let password_hash = hash_password_blocking(DEMO_PASSWORD.to_string()).await?;

    for n in 1..=DEMO_USERS {
        let email = format!("demo{}@example.com", n);
        if User::find_by_email(&pool, &email).await?.is_some() {
            tracing::info!(email = %email, "Demo user exists, skipping");
            continue;
        }

        let ((first_name, last_name), tasks) = demo_profile();
        let nickname = derive_unique_nickname(&pool, &first_name, &last_name).await?;

        let user = User::create(
            &pool,
            CreateUser {
                nickname,
                first_name,
                last_name,
                email,
                password_hash: password_hash.clone(),
            },
        )
        .await?;

        let created = Task::create_many(&pool, user.id, tasks).await?;
        tracing::info!(
            email = %user.email,
            nickname = %user.nickname,
            tasks = created.len(),
            "Seeded demo user"
        );
    }

    close_pool(pool).await;
    Ok(())
}
